use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool queries the catalog, downloads data files, or emits the combined table.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading standard input or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport level failures from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a sheet does not follow the expected layout.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// The catalog reported that the requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog refused the request for the anonymous caller.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The catalog rejected the action parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other failure reported by a CKAN action.
    #[error("action '{action}' failed ({kind}): {message}")]
    ActionFailed {
        action: String,
        kind: String,
        message: String,
    },

    /// The endpoint answered with something that is not a CKAN response.
    #[error("response from {url} (status {status}) is not a CKAN API response")]
    NotCkan { url: String, status: u16 },

    /// Raised when no API URL was supplied and the prompt reached end of input.
    #[error("no CKAN URL provided")]
    MissingApiUrl,

    /// Raised when the dataset lookup produced no resource list.
    #[error("no resource list available for dataset '{0}'")]
    MissingResources(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
