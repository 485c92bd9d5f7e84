//! Fetch -> display -> decide -> advance cycle.
//!
//! The controller owns one [`CandidateQueue`] and one [`DecisionLedger`] and
//! derives its state from them on demand. Catalog requests carry a
//! [`RequestToken`]; a response whose token is no longer the latest issued for
//! its kind is dropped, so out-of-order completions cannot clobber newer state.

use crate::app::ports::{CatalogPort, KeyValueStore};
use crate::common::error::{Result, SwipeError};
use crate::deck::{AcceptOutcome, CandidateQueue, DecisionLedger, Stats};
use crate::domain::{Character, CharacterId, CharacterStatus, Page, SearchFilters};
use crate::observability::metrics::{FetchKind, SessionMetrics};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No search has produced candidates yet.
    Idle,
    /// A candidate is on display.
    Browsing,
    /// Local candidates are used up but another page can be fetched.
    AwaitingMore,
    /// Local candidates are used up and the catalog has nothing further.
    Exhausted,
    /// The last search matched nothing.
    NoMatch,
    /// The last search failed and there is no earlier deck to fall back on.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Like,
    Pass,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Like => "like",
            Decision::Pass => "pass",
        }
    }
}

/// User-facing message attached to the most recent action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SearchFailed(String),
    LoadMoreFailed(String),
    PersistenceWarning(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: FetchKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> FetchKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    Appended(usize),
    NothingToLoad,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub character: Character,
    /// Set for likes only.
    pub accepted: Option<AcceptOutcome>,
    pub state: SessionState,
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDetails {
    pub id: CharacterId,
    pub name: String,
    pub image: String,
    pub status: CharacterStatus,
    pub species: String,
    pub gender: String,
    pub origin: String,
    pub location: String,
    pub episode_count: usize,
}

impl From<&Character> for CharacterDetails {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            image: c.image.clone(),
            status: c.status,
            species: c.species.clone(),
            gender: c.gender.clone(),
            origin: c.origin.name.clone(),
            location: c.location.name.clone(),
            episode_count: c.episode_count(),
        }
    }
}

/// Everything a presentation layer needs to draw the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub state: SessionState,
    pub current: Option<Character>,
    pub remaining: usize,
    pub can_decide: bool,
    pub can_load_more: bool,
    pub matches: Vec<Character>,
    pub stats: Stats,
    pub notice: Option<Notice>,
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Default)]
struct Generations {
    search: u64,
    load_more: u64,
    detail: u64,
}

impl Generations {
    fn slot(&mut self, kind: FetchKind) -> &mut u64 {
        match kind {
            FetchKind::Search => &mut self.search,
            FetchKind::LoadMore => &mut self.load_more,
            FetchKind::Detail => &mut self.detail,
        }
    }

    fn issue(&mut self, kind: FetchKind) -> RequestToken {
        let slot = self.slot(kind);
        *slot += 1;
        RequestToken {
            kind,
            generation: *slot,
        }
    }

    fn is_current(&self, token: RequestToken) -> bool {
        let latest = match token.kind {
            FetchKind::Search => self.search,
            FetchKind::LoadMore => self.load_more,
            FetchKind::Detail => self.detail,
        };
        latest == token.generation
    }
}

pub struct SessionController {
    catalog: Arc<dyn CatalogPort>,
    queue: CandidateQueue,
    ledger: DecisionLedger,
    last_filters: Option<SearchFilters>,
    no_match: bool,
    /// Latest search failed; only visible as `Failed` while no deck is loaded.
    search_failed: bool,
    notice: Option<Notice>,
    generations: Generations,
}

impl SessionController {
    pub fn new(catalog: Arc<dyn CatalogPort>, ledger: DecisionLedger) -> Self {
        Self {
            catalog,
            queue: CandidateQueue::new(),
            ledger,
            last_filters: None,
            no_match: false,
            search_failed: false,
            notice: None,
            generations: Generations::default(),
        }
    }

    /// Builds a controller whose ledger is seeded from `store`. Fails when the
    /// store cannot be read.
    pub fn with_store(catalog: Arc<dyn CatalogPort>, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self::new(catalog, DecisionLedger::load(store)?))
    }

    pub fn state(&self) -> SessionState {
        if self.no_match {
            return SessionState::NoMatch;
        }
        if self.queue.is_empty() {
            return if self.search_failed {
                SessionState::Failed
            } else {
                SessionState::Idle
            };
        }
        match (self.queue.current(), self.queue.has_more()) {
            (Some(_), _) => SessionState::Browsing,
            (None, true) => SessionState::AwaitingMore,
            (None, false) => SessionState::Exhausted,
        }
    }

    pub fn snapshot(&self) -> ViewModel {
        let state = self.state();
        ViewModel {
            state,
            current: self.queue.current().cloned(),
            remaining: self.queue.remaining(),
            can_decide: state == SessionState::Browsing,
            can_load_more: !self.no_match && self.queue.has_more(),
            matches: self.ledger.all().to_vec(),
            stats: self.ledger.stats(),
            notice: self.notice.clone(),
            filters: self.last_filters.clone(),
        }
    }

    pub fn catalog(&self) -> Arc<dyn CatalogPort> {
        self.catalog.clone()
    }

    pub fn queue(&self) -> &CandidateQueue {
        &self.queue
    }

    pub fn ledger(&self) -> &DecisionLedger {
        &self.ledger
    }

    pub fn last_filters(&self) -> Option<&SearchFilters> {
        self.last_filters.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Issues a new token for `kind`, superseding any outstanding one.
    /// A new search also supersedes outstanding page loads.
    pub fn begin(&mut self, kind: FetchKind) -> RequestToken {
        if kind == FetchKind::Search {
            self.generations.issue(FetchKind::LoadMore);
        }
        self.generations.issue(kind)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generations.is_current(token)
    }

    fn discard_if_stale(&self, token: RequestToken) -> bool {
        if self.is_current(token) {
            return false;
        }
        debug!(kind = token.kind.as_str(), generation = token.generation, "Discarding stale response");
        SessionMetrics::record_stale_response(token.kind);
        true
    }

    /// Runs a search and installs its results. On failure the previous deck is kept.
    #[instrument(skip(self))]
    pub async fn search(&mut self, filters: SearchFilters) -> Result<SessionState> {
        let token = self.begin(FetchKind::Search);
        let result = self.catalog.search(&filters).await;
        self.apply_search(token, filters, result)?;
        Ok(self.state())
    }

    /// Re-runs the last search.
    pub async fn refresh(&mut self) -> Result<SessionState> {
        let Some(filters) = self.last_filters.clone() else {
            return Err(SwipeError::InvalidAction {
                action: "refresh",
                state: self.state(),
            });
        };
        self.search(filters).await
    }

    pub fn apply_search(
        &mut self,
        token: RequestToken,
        filters: SearchFilters,
        result: Result<Page>,
    ) -> Result<Applied> {
        if self.discard_if_stale(token) {
            return Ok(Applied::Stale);
        }
        self.notice = None;
        self.last_filters = Some(filters);

        match result {
            Ok(page) if page.items.is_empty() => {
                info!("No characters matched the search");
                self.queue.replace(Vec::new(), None);
                self.no_match = true;
                self.search_failed = false;
                Ok(Applied::Current)
            }
            Ok(page) => {
                info!(
                    count = page.items.len(),
                    has_more = page.next.is_some(),
                    "Search returned candidates"
                );
                self.queue.replace(page.items, page.next);
                self.no_match = false;
                self.search_failed = false;
                Ok(Applied::Current)
            }
            Err(e) => {
                warn!(error = %e, kept = self.queue.remaining(), "Search failed, keeping previous deck");
                self.no_match = false;
                self.search_failed = true;
                self.notice = Some(Notice::SearchFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Fetches the next page, if any, and appends it behind the current position.
    #[instrument(skip(self))]
    pub async fn load_more(&mut self) -> Result<LoadMoreOutcome> {
        let Some(cursor) = self.queue.next_cursor().cloned() else {
            debug!("Load more requested with no next page");
            return Ok(LoadMoreOutcome::NothingToLoad);
        };
        let token = self.begin(FetchKind::LoadMore);
        let result = self.catalog.fetch_page(&cursor).await;
        self.apply_load_more(token, result)
    }

    pub fn apply_load_more(&mut self, token: RequestToken, result: Result<Page>) -> Result<LoadMoreOutcome> {
        if self.discard_if_stale(token) {
            return Ok(LoadMoreOutcome::Stale);
        }
        match result {
            Ok(page) => {
                let added = page.items.len();
                self.queue.append(page.items, page.next);
                self.notice = None;
                info!(added, has_more = self.queue.has_more(), "Appended next page");
                Ok(LoadMoreOutcome::Appended(added))
            }
            Err(e) => {
                warn!(error = %e, "Loading more candidates failed");
                self.notice = Some(Notice::LoadMoreFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Records a like or pass for the current candidate and moves on.
    /// Store failures do not block; they surface as a notice.
    pub fn decide(&mut self, decision: Decision) -> Result<DecisionOutcome> {
        let state = self.state();
        let current = match (state, self.queue.current()) {
            (SessionState::Browsing, Some(current)) => current.clone(),
            _ => {
                return Err(SwipeError::InvalidAction {
                    action: "decide",
                    state,
                })
            }
        };
        self.notice = None;

        let (accepted, persisted) = match decision {
            Decision::Like => {
                let expected = if self.ledger.contains(current.id) {
                    AcceptOutcome::AlreadyPresent
                } else {
                    AcceptOutcome::Inserted
                };
                let persisted = self.ledger.accept(current.clone()).map(|_| ());
                (Some(expected), persisted)
            }
            Decision::Pass => (None, self.ledger.reject()),
        };
        self.queue.advance();
        SessionMetrics::record_decision(decision.as_str());
        debug!(id = current.id, decision = decision.as_str(), "Decision recorded");

        let persistence_warning = persisted.err().map(|e| {
            let message = e.to_string();
            self.notice = Some(Notice::PersistenceWarning(message.clone()));
            message
        });

        Ok(DecisionOutcome {
            decision,
            character: current,
            accepted,
            state: self.state(),
            persistence_warning,
        })
    }

    /// Drops a character from the accepted set. Returns whether it was present.
    pub fn remove_accepted(&mut self, id: CharacterId) -> bool {
        match self.ledger.remove(id) {
            Ok(removed) => removed,
            Err(e) => {
                self.notice = Some(Notice::PersistenceWarning(e.to_string()));
                true
            }
        }
    }

    /// Detail view for `id`, served from the accepted set when possible.
    /// `None` means a newer detail request superseded this one.
    #[instrument(skip(self))]
    pub async fn show_details(&mut self, id: CharacterId) -> Result<Option<CharacterDetails>> {
        if let Some(known) = self.ledger.get(id) {
            return Ok(Some(CharacterDetails::from(known)));
        }
        let token = self.begin(FetchKind::Detail);
        let result = self.catalog.fetch_by_id(id).await;
        self.apply_details(token, result)
    }

    pub fn apply_details(
        &mut self,
        token: RequestToken,
        result: Result<Character>,
    ) -> Result<Option<CharacterDetails>> {
        if self.discard_if_stale(token) {
            return Ok(None);
        }
        let character = result?;
        Ok(Some(CharacterDetails::from(&character)))
    }
}
