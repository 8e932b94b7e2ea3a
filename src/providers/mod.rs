//! LLM provider implementations

use std::time::Duration;
use async_trait::async_trait;
use log::{error, warn};

pub mod gemini;
pub mod groq;

// Re-export for convenience
pub use gemini::GeminiClient;
pub use groq::GroqClient;

/// Connection establishment bound; the whole attempt is bounded
/// by the failover chain
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// A hosted model that turns a prompt into reply text
#[async_trait]
pub trait ChatProvider: Send + Sync
{   /// Provider name used in logs
    fn name(&self) -> &str;

    /// One attempt, no retries
    async fn complete(
      &self
    , request: &crate::request::PromptRequest
    ) -> Result<String, crate::error::Error>;
}

pub(crate) fn http_client()
  -> Result<reqwest::Client, crate::error::Error>
{   reqwest::Client::builder()
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
      .map_err(|e| {
        crate::error::Error::InvalidConfiguration(
          format!("HTTP client: {}", e)
        )
      })
}

pub(crate) fn transport_error(
  provider: &str
, e: reqwest::Error
) -> crate::error::Error
{   if e.is_timeout()
    {   warn!("{} request timed out", provider);
        return crate::error::Error::Timeout;
    }
    // Request URLs are never echoed into logs or the attempt trail
    let e = e.without_url();
    error!("{} HTTP error: {}", provider, e);
    crate::error::Error::HttpError(e.to_string())
}

/// Map a non-2xx status into the error taxonomy
pub(crate) fn status_error(
  provider: &str
, status: reqwest::StatusCode
, body: String
) -> crate::error::Error
{   error!("{} API error {}: {}", provider, status, body);
    match status.as_u16()
    {   401 | 403 => crate::error::Error::Unauthorized(
          format!("{} rejected the API key", provider)
        )
      , 429 => crate::error::Error::RateLimitExceeded
      , code => crate::error::Error::ApiError
        {   status: code
          , body
        }
    }
}

/// Read a typed body, classifying undecodable JSON as a parse error
pub(crate) async fn read_json<T>(
  provider: &str
, response: reqwest::Response
) -> Result<T, crate::error::Error>
where T: serde::de::DeserializeOwned
{   let status = response.status();
    let body = response.text().await
      .map_err(|e| transport_error(provider, e))?;

    if !status.is_success()
    {   return Err(status_error(provider, status, body));
    }

    serde_json::from_str(&body).map_err(|e| {
      error!("{} parse error: {}", provider, e);
      crate::error::Error::ParseError(e.to_string())
    })
}

/// Trimmed reply text, or EmptyReply
pub(crate) fn reply_text(
  text: Option<&str>
) -> Result<String, crate::error::Error>
{   text.map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_string)
      .ok_or(crate::error::Error::EmptyReply)
}

/// Base URL without a trailing slash
pub(crate) fn trim_base(base: &str) -> String
{   base.trim_end_matches('/').to_string()
}
