use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use swipe_deck::app::ports::CatalogPort;
use swipe_deck::app::session_controller::{Decision, LoadMoreOutcome, SessionController};
use swipe_deck::config::{Config, StoreBackend};
use swipe_deck::deck::AcceptOutcome;
use swipe_deck::domain::{CharacterId, GenderFilter, SearchFilters, StatusFilter};
use swipe_deck::infra::{open_store, RestCatalogClient};
use swipe_deck::observability::{init_logging, init_metrics};
use swipe_deck::presentation::{
    parse_command, render_details, render_matches, render_stats, render_view, Command, HELP,
};

#[derive(Parser)]
#[command(name = "swipe_deck")]
#[command(about = "Swipe through Rick and Morty characters")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep matches and stats in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and swipe interactively
    Swipe {
        /// Substring of the character name
        #[arg(long)]
        name: Option<String>,
        /// alive, dead or unknown
        #[arg(long)]
        status: Option<StatusFilter>,
        /// female, male, genderless or unknown
        #[arg(long)]
        gender: Option<GenderFilter>,
    },
    /// List accepted characters
    Matches,
    /// Show like/pass counters
    Stats,
    /// Remove an accepted character
    Remove { id: CharacterId },
    /// Show a character's details
    Show { id: CharacterId },
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

async fn execute(session: &mut SessionController, command: Command) -> swipe_deck::Result<()> {
    match command {
        Command::Decide(decision) => {
            let outcome = session.decide(decision)?;
            match (decision, outcome.accepted) {
                (Decision::Like, Some(AcceptOutcome::Inserted)) => {
                    println!("❤️  It's a match with {}!", outcome.character.name)
                }
                (Decision::Like, _) => println!("❤️  {} was already a match", outcome.character.name),
                (Decision::Pass, _) => println!("👋 Passed on {}", outcome.character.name),
            }
            println!("{}", render_view(&session.snapshot()));
        }
        Command::LoadMore => {
            match session.load_more().await {
                Ok(LoadMoreOutcome::Appended(count)) => println!("📥 Loaded {} more characters", count),
                Ok(LoadMoreOutcome::NothingToLoad) => println!("No more pages to load"),
                Ok(LoadMoreOutcome::Stale) => {}
                Err(e) => warn!(error = %e, "Load more failed"),
            }
            println!("{}", render_view(&session.snapshot()));
        }
        Command::Details(id) => {
            if let Some(details) = session.show_details(id).await? {
                println!("{}", render_details(&details));
            }
        }
        Command::Remove(id) => {
            if session.remove_accepted(id) {
                println!("🗑️  Removed #{} from matches", id);
            } else {
                println!("#{} is not in your matches", id);
            }
        }
        Command::Search(filters) => {
            if let Err(e) = session.search(filters).await {
                warn!(error = %e, "Search failed");
            }
            println!("{}", render_view(&session.snapshot()));
        }
        Command::Refresh => {
            session.refresh().await.map(|_| ()).or_else(|e| match e {
                swipe_deck::SwipeError::Upstream { .. } => {
                    warn!(error = %e, "Refresh failed");
                    Ok(())
                }
                other => Err(other),
            })?;
            println!("{}", render_view(&session.snapshot()));
        }
        Command::Matches => println!("{}", render_matches(session.ledger().all())),
        Command::Stats => println!(
            "{}",
            render_stats(session.ledger().stats(), session.ledger().len())
        ),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

async fn run_interactive(session: &mut SessionController, filters: SearchFilters) -> anyhow::Result<()> {
    println!("{}\n", HELP);
    execute(session, Command::Search(filters)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt();
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(session, command).await {
                    println!("⚠️  {}", e);
                }
            }
            Err(message) => println!("{}", message),
        }
        prompt();
    }
    info!(stats = ?session.ledger().stats(), "Session finished");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let _log_guard = init_logging(&config.logging.dir)?;
    info!(api = %config.api.base_url, data_dir = %config.storage.data_dir.display(), "Starting swipe_deck");
    if cli.ephemeral {
        config.storage.backend = StoreBackend::Memory;
    }
    if let Some(addr) = &config.metrics.listen_addr {
        if let Err(e) = init_metrics(addr) {
            warn!(error = %e, "Metrics exporter not started");
        }
    }

    let store = open_store(&config.storage)?;
    let catalog: Arc<dyn CatalogPort> = Arc::new(RestCatalogClient::new(&config.api)?);
    let mut session = SessionController::with_store(catalog, store)?;

    match cli.command {
        Commands::Swipe { name, status, gender } => {
            let filters = SearchFilters::new(name, status, gender);
            run_interactive(&mut session, filters).await?;
        }
        Commands::Matches => execute(&mut session, Command::Matches).await?,
        Commands::Stats => execute(&mut session, Command::Stats).await?,
        Commands::Remove { id } => {
            execute(&mut session, Command::Remove(id)).await?;
            if let Some(notice) = session.notice() {
                println!("{}", swipe_deck::presentation::render_notice(notice));
            }
        }
        Commands::Show { id } => execute(&mut session, Command::Details(id)).await?,
    }
    Ok(())
}
