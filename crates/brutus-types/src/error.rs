use std::fmt;

/// Result type for brutus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every brutus crate
#[derive(Debug)]
pub enum Error {
    /// No usable credential could be obtained
    Auth(String),

    /// The call did not complete (connection, DNS, TLS, timeout)
    Network(String),

    /// The call completed but access was denied
    Authorization {
        status: Option<u16>,
        message: String,
    },

    /// The call completed with a non-success status other than a denial
    Api { status: u16, message: String },

    /// A hierarchy could not be assembled from the listing
    Discovery(String),

    /// Configuration error
    Config(String),

    /// IO operation failed
    Io(std::io::Error),

    /// JSON parsing failed
    Json(serde_json::Error),
}

impl Error {
    /// HTTP status attached to the failure, when the transport exposed one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authorization { status, .. } => *status,
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth(msg) => write!(f, "Authentication error: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Authorization {
                status: Some(code),
                message,
            } => write!(f, "Authorization failed ({}): {}", code, message),
            Error::Authorization {
                status: None,
                message,
            } => write!(f, "Authorization failed: {}", message),
            Error::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Error::Discovery(msg) => write!(f, "Discovery error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Auth(_)
            | Error::Network(_)
            | Error::Authorization { .. }
            | Error::Api { .. }
            | Error::Discovery(_)
            | Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
