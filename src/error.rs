use thiserror::Error;

/// Error types for back office operations.
///
/// Every failure that reaches a caller is one of these variants, so a front end
/// can show the user what went wrong instead of silently degrading.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use catalog_backoffice::{artists::ArtistResource, BackofficeClient, BackofficeError, ResourceEditor};
///
/// #[tokio::main]
/// async fn main() {
///     let client = BackofficeClient::new(Box::new(http_client::native::NativeClient::new()));
///     let mut editor = ResourceEditor::<ArtistResource>::new(client);
///
///     match editor.submit().await {
///         Ok(outcome) => println!("Saved: {outcome:?}"),
///         Err(BackofficeError::Validation { field }) => eprintln!("Please fill in '{field}'"),
///         Err(BackofficeError::ServerRejected { status, message }) => {
///             eprintln!("Server refused the change ({status}): {message}");
///         }
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
///
/// Nothing in this crate retries automatically: every operation is user initiated
/// and safe to repeat by hand.
#[derive(Error, Debug)]
pub enum BackofficeError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, DNS errors and bodies that could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// A required draft field was blank.
    ///
    /// Returned before any request is sent.
    #[error("Missing required field: {field}")]
    Validation {
        /// Name of the first blank required field
        field: &'static str,
    },

    /// Authentication failures.
    ///
    /// # Common Causes
    /// - No bearer token stored (not logged in)
    /// - Expired token rejected by the backend (401/403)
    /// - Invalid login credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The backend answered with a non-success status.
    #[error("Server rejected request ({status}): {message}")]
    ServerRejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A record id was not found in the loaded list.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The operation was cancelled by its owner.
    #[error("Operation cancelled")]
    Cancelled,

    /// File system I/O errors.
    ///
    /// Reading audio files or persisting local state.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackofficeError {
    /// Whether this error was produced locally before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BackofficeError::Validation { .. } | BackofficeError::Cancelled
        )
    }
}

impl From<serde_json::Error> for BackofficeError {
    fn from(e: serde_json::Error) -> Self {
        BackofficeError::Decode(e.to_string())
    }
}
