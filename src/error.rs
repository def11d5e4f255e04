use std::fmt;

/// Crate-wide error type
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Model identifier matches no known family
    UnknownModelFamily(String)
  , /// Expected text field missing from a document or fragment
    MalformedResponse
    {   reason: String
      , document: String
    }
  , /// Failure reported by the invoker (network, auth, throttling)
    Transport(String)
  , /// Streaming requested for a family without a streaming format
    StreamingNotSupported(String)
  , /// Invalid configuration or generation parameters
    InvalidConfiguration(String)
  , /// Failed to serialize a request payload
    Encode(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Build a `MalformedResponse` keeping the offending bytes
    pub fn malformed(reason: impl Into<String>, document: &[u8]) -> Self
    {   Error::MalformedResponse
        {   reason: reason.into()
          , document: String::from_utf8_lossy(document).into_owned()
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::UnknownModelFamily(model_id) => {
              write!(f, "Unknown model family for: {}", model_id)
            }
          , Error::MalformedResponse { reason, document } => {
              write!(f,
                "Malformed response ({}): {}",
                reason, document
              )
            }
          , Error::Transport(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , Error::StreamingNotSupported(family) => {
              write!(f,
                "Streaming not supported by family: {}",
                family
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Encode(msg) => {
              write!(f, "Encode error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
