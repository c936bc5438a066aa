//! baochinhphu.vn crawler: HTML extraction, HTTP fetching and raw storage.

pub mod category;
pub mod parser;
pub mod retry;
pub mod scraper;
pub mod store;

pub use category::CategoryMapper;
pub use scraper::NewsScraper;
pub use store::ArticleStore;
