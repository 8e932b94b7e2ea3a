//! Configuration for the chat proxy, its providers and the fallback chain

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const GROQ_API_BASE: &str
  = "https://api.groq.com/openai/v1";
pub const GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_SPEAKER: &str = "Assistant";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   /// Socket address to listen on
    pub listen: SocketAddr
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   listen: SocketAddr::from(([127, 0, 0, 1], 3000))
        }
    }
}

/// Where the persona text comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaConfig
{   /// File holding the persona text; built-in text when unset
    pub path: Option<PathBuf>
  , /// Label the model answers as in single-prompt providers
    pub speaker: Option<String>
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Provider name
    pub name: String
  , /// Credential; the tier is skipped when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>
  , /// API base URL
    pub api_base: String
  , /// Model name
    pub model: String
}

impl ProviderConfig
{   pub fn gemini() -> Self
    {   ProviderConfig
        {   name: "gemini".to_string()
          , api_key: None
          , api_base: GEMINI_API_BASE.to_string()
          , model: GEMINI_MODEL.to_string()
        }
    }

    pub fn groq() -> Self
    {   ProviderConfig
        {   name: "groq".to_string()
          , api_key: None
          , api_base: GROQ_API_BASE.to_string()
          , model: GROQ_MODEL.to_string()
        }
    }

    pub fn is_enabled(&self) -> bool
    {   self.api_key.is_some()
    }
}

/// Fallback chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig
{   /// Upper bound for a single provider attempt, in seconds
    pub provider_timeout_secs: u64
  , /// Sampling temperature sent to every provider
    pub temperature: f64
  , /// Output-token ceiling sent to every provider
    pub max_tokens: u32
}

impl FailoverConfig
{   pub fn provider_timeout(&self) -> Duration
    {   Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for FailoverConfig
{   fn default() -> Self
    {   FailoverConfig
        {   provider_timeout_secs: 8
          , temperature: 0.1
          , max_tokens: 1000
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig
{   pub server: ServerConfig
  , pub persona: PersonaConfig
  , pub gemini: ProviderConfig
  , pub groq: ProviderConfig
  , pub failover: FailoverConfig
}

impl Default for AppConfig
{   fn default() -> Self
    {   AppConfig
        {   server: ServerConfig::default()
          , persona: PersonaConfig::default()
          , gemini: ProviderConfig::gemini()
          , groq: ProviderConfig::groq()
          , failover: FailoverConfig::default()
        }
    }
}

impl AppConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let mut config = AppConfig::default();

        if let Some(listen) = get("CHAT_LISTEN")
        {   config.server.listen = listen.parse()
              .map_err(|e| {
                crate::error::Error::InvalidConfiguration(
                  format!("CHAT_LISTEN={}: {}", listen, e)
                )
              })?;
        }

        config.persona.path
          = get("PERSONA_PROMPT_PATH").map(PathBuf::from);
        config.persona.speaker = get("PERSONA_NAME");

        config.gemini.api_key = get("GOOGLE_API_KEY");
        if let Some(model) = get("GEMINI_MODEL")
        {   config.gemini.model = model;
        }
        if let Some(base) = get("GEMINI_API_BASE")
        {   config.gemini.api_base = base;
        }

        config.groq.api_key = get("GROQ_API_KEY");
        if let Some(model) = get("GROQ_MODEL")
        {   config.groq.model = model;
        }
        if let Some(base) = get("GROQ_API_BASE")
        {   config.groq.api_base = base;
        }

        if let Some(raw) = get("PROVIDER_TIMEOUT_SECS")
        {   let secs: u64 = raw.parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(
                format!("PROVIDER_TIMEOUT_SECS={}", raw)
              )
            })?;
            if secs == 0
            {   return Err(
                  crate::error::Error::InvalidConfiguration(
                    "PROVIDER_TIMEOUT_SECS must be positive"
                      .to_string()
                  )
                );
            }
            config.failover.provider_timeout_secs = secs;
        }

        debug!(
          "Loaded config: listen={} gemini={} groq={}",
          config.server.listen,
          config.gemini.is_enabled(),
          config.groq.is_enabled()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty()
    {   let config = AppConfig::from_lookup(lookup(&[]))
          .unwrap();
        assert_eq!(config.server.listen.to_string(), DEFAULT_LISTEN);
        assert!(!config.gemini.is_enabled());
        assert!(!config.groq.is_enabled());
        assert_eq!(config.gemini.model, GEMINI_MODEL);
        assert_eq!(config.groq.api_base, GROQ_API_BASE);
        assert_eq!(config.failover.provider_timeout_secs, 8);
    }

    #[test]
    fn blank_credentials_count_as_unset()
    {   let config = AppConfig::from_lookup(lookup(&[
          ("GOOGLE_API_KEY", "   ")
        , ("GROQ_API_KEY", "gsk-test")
        ])).unwrap();
        assert!(!config.gemini.is_enabled());
        assert_eq!(config.groq.api_key.as_deref(), Some("gsk-test"));
    }

    #[test]
    fn overrides_are_applied()
    {   let config = AppConfig::from_lookup(lookup(&[
          ("CHAT_LISTEN", "0.0.0.0:8080")
        , ("GEMINI_MODEL", "gemini-pro")
        , ("GROQ_API_BASE", "http://localhost:9999")
        , ("PERSONA_NAME", "Sam")
        , ("PROVIDER_TIMEOUT_SECS", "3")
        ])).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.groq.api_base, "http://localhost:9999");
        assert_eq!(config.persona.speaker.as_deref(), Some("Sam"));
        assert_eq!(
          config.failover.provider_timeout(),
          Duration::from_secs(3)
        );
    }

    #[test]
    fn bad_values_are_rejected()
    {   for pairs in [
          [("PROVIDER_TIMEOUT_SECS", "soon")]
        , [("PROVIDER_TIMEOUT_SECS", "0")]
        , [("CHAT_LISTEN", "not-an-addr")]
        ]
        {   let err = AppConfig::from_lookup(lookup(&pairs))
              .unwrap_err();
            assert_eq!(err.kind(), "configuration");
        }
    }
}
