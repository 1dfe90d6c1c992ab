//! PubMed client for searching and fetching article metadata
//!
//! The client functionality is split across:
//! - `client/mod.rs` - Core client struct, constructors, search and fetch
//! - `client/elink` - PubMed to PMC links (ELink API)

pub mod client;
pub mod models;
pub mod parser;
pub mod query;
pub(crate) mod responses;

pub use client::PubMedClient;
pub use models::{Author, PubDate, PubMedArticle};
pub use parser::{parse_article_from_xml, parse_articles_from_xml};
pub use query::SortOrder;
