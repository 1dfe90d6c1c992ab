//! PMC (PubMed Central) open-access PDF retrieval

pub mod client;
pub mod oa;

pub use client::PmcClient;
pub use oa::{PdfLink, parse_oa_response, rewrite_ftp_link};
