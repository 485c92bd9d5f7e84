/// Catalog and storage constants shared across the codebase

// Remote character catalog
pub const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api/character";
pub const DEFAULT_USER_AGENT: &str = concat!("swipe_deck/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Persistent store slot keys (kept compatible with the browser build's localStorage keys)
pub const MATCHES_KEY: &str = "myMatches";
pub const STATS_KEY: &str = "stats";

// Local data layout
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const SQLITE_FILE_NAME: &str = "swipe.db";
pub const CONFIG_FILE_NAME: &str = "config.toml";
