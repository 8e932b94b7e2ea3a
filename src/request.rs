//! Wire envelopes for /api/chat and the provider-neutral prompt

use serde::{Deserialize, Serialize};

/// Shown when the inbound message is missing or blank
pub const NO_MESSAGE_REPLY: &str
  = "I didn't receive your message. Could you please try again?";

/// Shown when request handling failed unexpectedly
pub const INTERNAL_ERROR_REPLY: &str
  = "Sorry, I'm having trouble responding right now. \
     Please try again in a moment!";

/// Which tier of the fallback chain produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Source
{   ProviderA
  , ProviderB
  , Fallback
}

impl Source
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Source::ProviderA => "providerA"
          , Source::ProviderB => "providerB"
          , Source::Fallback => "fallback"
        }
    }
}

impl std::fmt::Display for Source
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// Inbound chat request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest
{   #[serde(default)]
    pub message: Option<String>
}

impl ChatRequest
{   pub fn new(message: impl Into<String>) -> Self
    {   ChatRequest
        {   message: Some(message.into())
        }
    }
}

/// Successful reply envelope (providers and fallback alike)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse
{   pub success: bool
  , /// Generated or canned reply text
    pub response: String
  , /// Echo of the inbound message
    pub message: String
  , pub source: Source
}

/// Error envelope for 4xx/5xx replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody
{   pub error: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>
}

impl ErrorBody
{   pub fn method_not_allowed() -> Self
    {   ErrorBody
        {   error: "Method not allowed".to_string()
          , response: None
        }
    }

    pub fn no_message() -> Self
    {   ErrorBody
        {   error: crate::error::Error::NoMessage.to_string()
          , response: Some(NO_MESSAGE_REPLY.to_string())
        }
    }

    pub fn internal(error: impl Into<String>) -> Self
    {   ErrorBody
        {   error: error.into()
          , response: Some(INTERNAL_ERROR_REPLY.to_string())
        }
    }
}

/// Provider-neutral prompt; each provider renders its own wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest
{   /// Persona instructions
    pub system_message: String
  , /// The user's message
    pub prompt: String
  , /// Label the model answers as in single-prompt formats
    pub speaker: String
  , /// Max tokens to generate
    pub max_tokens: u32
  , /// Temperature for sampling
    pub temperature: f64
}

impl PromptRequest
{   /// Persona and message folded into one transcript-style prompt
    pub fn combined(&self) -> String
    {   format!(
          "{}\n\nUser: {}\n{}:",
          self.system_message, self.prompt, self.speaker
        )
    }
}
