//! Swipe-style browsing over the Rick and Morty character catalog.

pub mod app;
pub mod common;
pub mod config;
pub mod deck;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod presentation;

// Re-export commonly used types
pub use app::session_controller::{Decision, SessionController, SessionState, ViewModel};
pub use common::error::{Result, SwipeError};
pub use domain::{Character, Page, PageCursor, SearchFilters};
