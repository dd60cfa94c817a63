use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("malformed table {name}: {source}")]
    Json {
        name: String,
        source: serde_json::Error,
    },

    #[error("table {0} has a record with an empty case_id")]
    MissingCaseId(String),
}
