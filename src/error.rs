use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML Error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Category lookup failed for page {page_id}: {source}")]
    CategoryLookup {
        page_id: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Invalid parameter for filter {filter}: {param:?}")]
    InvalidFilterParam { filter: String, param: String },
    #[error("Malformed dump at position {position}: {reason}")]
    MalformedDump { position: usize, reason: String },
}
