use crate::common::error::Result;
use crate::domain::{Character, CharacterId, Page, PageCursor, SearchFilters};
use async_trait::async_trait;

/// Remote character catalog.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// A listing with zero matches is an empty page, not an error.
    async fn search(&self, filters: &SearchFilters) -> Result<Page>;
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Page>;
    async fn fetch_by_id(&self, id: CharacterId) -> Result<Character>;
}

/// String-keyed slots that survive restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}
