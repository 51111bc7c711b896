//! PubMed retrieval: E-utilities search and fetch, XML extraction and CSV
//! export.

pub mod client;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod record;

pub use client::EutilsClient;
pub use parser::extract_records;
pub use pipeline::{PipelineSummary, run_pipeline};
pub use record::{ArticleKind, ArticleRecord, Author, Grant};
