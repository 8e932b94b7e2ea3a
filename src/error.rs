use std::fmt;

/// Error type for the chat proxy.
/// Implements Clone so attempts can be recorded per tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Inbound request carried no usable message
    NoMessage
  , /// Inbound body was not a JSON object with a string message
    InvalidBody(String)
  , /// HTTP transport error
    HttpError(String)
  , /// Provider rejected the credential (401/403)
    Unauthorized(String)
  , /// Rate limit exceeded (429)
    RateLimitExceeded
  , /// API returned some other non-2xx response
    ApiError
    {   status: u16
      , body: String
    }
  , /// Failed to parse API response
    ParseError(String)
  , /// Response parsed but held no text
    EmptyReply
  , /// Provider attempt timed out
    Timeout
  , /// Provider call panicked; carries the panic message
    ProviderPanicked(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Listener or file I/O failure
    Io(String)
}

impl Error
{   /// True for the variants produced while calling a provider.
    /// These are never surfaced to the caller; the chain falls through.
    pub fn is_provider_failure(&self) -> bool
    {   matches!(
          self
        , Error::HttpError(_)
          | Error::Unauthorized(_)
          | Error::RateLimitExceeded
          | Error::ApiError { .. }
          | Error::ParseError(_)
          | Error::EmptyReply
          | Error::Timeout
          | Error::ProviderPanicked(_)
        )
    }

    /// Short label used in log lines
    pub fn kind(&self) -> &'static str
    {   match self
        {   Error::NoMessage => "no_message"
          , Error::InvalidBody(_) => "invalid_body"
          , Error::HttpError(_) => "transport"
          , Error::Unauthorized(_) => "unauthorized"
          , Error::RateLimitExceeded => "rate_limited"
          , Error::ApiError { .. } => "api_error"
          , Error::ParseError(_) => "malformed_response"
          , Error::EmptyReply => "empty_reply"
          , Error::Timeout => "timeout"
          , Error::ProviderPanicked(_) => "panicked"
          , Error::InvalidConfiguration(_) => "configuration"
          , Error::Io(_) => "io"
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::NoMessage => {
              write!(f, "No message provided")
            }
          , Error::InvalidBody(msg) => {
              write!(f, "Invalid request body: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Unauthorized(msg) => {
              write!(f, "Unauthorized: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::ApiError { status, body } => {
              write!(f, "API error {}: {}", status, body)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::EmptyReply => {
              write!(f, "API response contained no text")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::ProviderPanicked(msg) => {
              write!(f, "Provider panicked: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}
