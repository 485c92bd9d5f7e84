//! Terminal rendering of session snapshots and parsing of interactive commands.
//!
//! Everything here is a pure function of its input; the binary wires it to
//! stdin/stdout.

use crate::app::session_controller::{CharacterDetails, Decision, Notice, SessionState, ViewModel};
use crate::deck::Stats;
use crate::domain::{Character, CharacterId, SearchFilters};

const ARROW_LEFT: &str = "\u{1b}[D";
const ARROW_RIGHT: &str = "\u{1b}[C";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Decide(Decision),
    LoadMore,
    Details(CharacterId),
    Remove(CharacterId),
    Search(SearchFilters),
    Refresh,
    Matches,
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  l, like, >, right arrow   like the current character
  p, pass, <, left arrow    pass on the current character
  m, more                   load the next page
  d, details <id>           show a character's details
  r, remove <id>            remove a match
  s, search [name] [status=..] [gender=..]
  refresh                   re-run the last search
  matches | stats | help | q, quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    match trimmed {
        ARROW_RIGHT => return Ok(Command::Decide(Decision::Like)),
        ARROW_LEFT => return Ok(Command::Decide(Decision::Pass)),
        _ => {}
    }

    let mut parts = trimmed.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = parts.collect();

    match head.to_lowercase().as_str() {
        "l" | "like" | ">" => Ok(Command::Decide(Decision::Like)),
        "p" | "pass" | "<" => Ok(Command::Decide(Decision::Pass)),
        "m" | "more" => Ok(Command::LoadMore),
        "d" | "details" => parse_id(&rest).map(Command::Details),
        "r" | "remove" => parse_id(&rest).map(Command::Remove),
        "s" | "search" => parse_filters(&rest).map(Command::Search),
        "refresh" => Ok(Command::Refresh),
        "matches" => Ok(Command::Matches),
        "stats" => Ok(Command::Stats),
        "h" | "help" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}' (type 'help')", other)),
    }
}

fn parse_id(args: &[&str]) -> Result<CharacterId, String> {
    let raw = args.first().ok_or_else(|| "expected a character id".to_string())?;
    raw.parse()
        .map_err(|_| format!("'{}' is not a character id", raw))
}

/// `rick sanchez status=alive gender=male`: bare words form the name filter.
pub fn parse_filters(args: &[&str]) -> Result<SearchFilters, String> {
    let mut name_words = Vec::new();
    let mut status = None;
    let mut gender = None;
    for arg in args {
        match arg.split_once('=') {
            Some(("status", value)) => status = Some(value.parse()?),
            Some(("gender", value)) => gender = Some(value.parse()?),
            Some(("name", value)) => name_words.push(value),
            Some((key, _)) => return Err(format!("unknown filter '{}'", key)),
            None => name_words.push(*arg),
        }
    }
    let name = (!name_words.is_empty()).then(|| name_words.join(" "));
    Ok(SearchFilters::new(name, status, gender))
}

pub fn render_card(character: &Character) -> String {
    format!(
        "┌ #{} {}\n│ [{}] [{}] [{}]\n│ Origin:   {}\n│ Location: {}\n└ {}",
        character.id,
        character.name,
        character.status,
        character.species,
        character.gender,
        character.origin.name,
        character.location.name,
        character.image
    )
}

pub fn render_view(view: &ViewModel) -> String {
    let mut out = Vec::new();
    match view.state {
        SessionState::Idle => out.push("Search for characters to start swiping.".to_string()),
        SessionState::Browsing => {
            if let Some(current) = &view.current {
                out.push(render_card(current));
                out.push(format!("{} left in this deck   (<) pass   like (>)", view.remaining));
            }
        }
        SessionState::AwaitingMore => {
            out.push("End of the deck! Type 'more' to keep going.".to_string())
        }
        SessionState::Exhausted => {
            out.push("End of the deck! Start a new search to find more characters.".to_string())
        }
        SessionState::NoMatch => {
            out.push("Nobody in this dimension. No character matches your criteria.".to_string())
        }
        SessionState::Failed => out.push("Could not fetch characters. Try again.".to_string()),
    }
    if view.can_load_more && view.state == SessionState::Browsing {
        out.push("More characters available ('more').".to_string());
    }
    if let Some(notice) = &view.notice {
        out.push(render_notice(notice));
    }
    out.push(render_stats(view.stats, view.matches.len()));
    out.join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::SearchFailed(reason) => format!("! Search failed: {}", reason),
        Notice::LoadMoreFailed(reason) => format!("! Could not load more characters: {}", reason),
        Notice::PersistenceWarning(reason) => format!("! Not saved: {}", reason),
    }
}

pub fn render_stats(stats: Stats, match_count: usize) -> String {
    format!(
        "Likes: {}  Passes: {}  Matches: {}",
        stats.likes, stats.passes, match_count
    )
}

pub fn render_matches(matches: &[Character]) -> String {
    if matches.is_empty() {
        return "No matches yet".to_string();
    }
    matches
        .iter()
        .map(|c| format!("#{:<5} {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_details(details: &CharacterDetails) -> String {
    format!(
        "{} (#{})\n  Status:   {}\n  Species:  {}\n  Gender:   {}\n  Origin:   {}\n  Location: {}\n  Episodes: {}\n  Image:    {}",
        details.name,
        details.id,
        details.status,
        details.species,
        details.gender,
        details.origin,
        details.location,
        details.episode_count,
        details.image
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::character;
    use crate::domain::{GenderFilter, StatusFilter};

    fn view(state: SessionState) -> ViewModel {
        ViewModel {
            state,
            current: None,
            remaining: 0,
            can_decide: false,
            can_load_more: false,
            matches: Vec::new(),
            stats: Stats::default(),
            notice: None,
            filters: None,
        }
    }

    #[test]
    fn arrows_map_to_decisions() {
        assert_eq!(parse_command("\u{1b}[C"), Ok(Command::Decide(Decision::Like)));
        assert_eq!(parse_command("\u{1b}[D"), Ok(Command::Decide(Decision::Pass)));
        assert_eq!(parse_command(" > "), Ok(Command::Decide(Decision::Like)));
        assert_eq!(parse_command("PASS"), Ok(Command::Decide(Decision::Pass)));
    }

    #[test]
    fn parses_ids_and_filters() {
        assert_eq!(parse_command("d 42"), Ok(Command::Details(42)));
        assert_eq!(parse_command("remove 7"), Ok(Command::Remove(7)));
        assert!(parse_command("r seven").is_err());
        assert!(parse_command("d").is_err());

        assert_eq!(
            parse_command("s rick sanchez status=Alive gender=male"),
            Ok(Command::Search(SearchFilters::new(
                Some("rick sanchez".into()),
                Some(StatusFilter::Alive),
                Some(GenderFilter::Male)
            )))
        );
        assert_eq!(
            parse_command("s name=rick status=dead"),
            Ok(Command::Search(SearchFilters::new(
                Some("rick".into()),
                Some(StatusFilter::Dead),
                None
            )))
        );
        assert_eq!(parse_command("search"), Ok(Command::Search(SearchFilters::default())));
        assert!(parse_command("s species=human").is_err());
        assert!(parse_command("s status=zombie").is_err());
    }

    #[test]
    fn unknown_and_empty_commands_are_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("teleport").is_err());
    }

    #[test]
    fn browsing_view_shows_card() {
        let mut v = view(SessionState::Browsing);
        v.current = Some(character(1, "Rick Sanchez"));
        v.remaining = 3;
        v.can_decide = true;
        let text = render_view(&v);
        assert!(text.contains("#1 Rick Sanchez"));
        assert!(text.contains("Citadel of Ricks"));
        assert!(text.contains("3 left"));
    }

    #[test]
    fn end_of_deck_messages_differ() {
        assert!(render_view(&view(SessionState::AwaitingMore)).contains("'more'"));
        assert!(render_view(&view(SessionState::Exhausted)).contains("new search"));
        assert!(render_view(&view(SessionState::NoMatch)).contains("Nobody in this dimension"));
    }

    #[test]
    fn notices_and_stats_render() {
        let mut v = view(SessionState::Idle);
        v.notice = Some(Notice::PersistenceWarning("disk full".into()));
        v.stats = Stats { likes: 2, passes: 5 };
        let text = render_view(&v);
        assert!(text.contains("Not saved: disk full"));
        assert!(text.contains("Likes: 2  Passes: 5  Matches: 0"));
    }

    #[test]
    fn match_list_and_details() {
        assert_eq!(render_matches(&[]), "No matches yet");
        let list = render_matches(&[character(1, "Rick"), character(22, "Morty")]);
        assert_eq!(list.lines().count(), 2);

        let details = CharacterDetails::from(&character(3, "Summer"));
        assert!(render_details(&details).contains("Episodes: 2"));
    }
}
