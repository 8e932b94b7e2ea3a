use std::sync::Arc;
use log::{debug, info, warn};

use crate::failover::{CannedReplies, ChatReply, FailoverChain};
use crate::persona::PersonaPrompt;
use crate::providers::{ChatProvider, GeminiClient, GroqClient};
use crate::request::{ChatRequest, ChatResponse, PromptRequest};

/// Turns one inbound message into one reply.
///
/// Holds no per-request state; share it behind an `Arc` across
/// concurrent requests.
pub struct ChatClient
{   persona: PersonaPrompt
  , chain: FailoverChain
  , temperature: f64
  , max_tokens: u32
}

impl ChatClient
{   /// Assemble from explicit parts
    pub fn new(
      persona: PersonaPrompt
    , chain: FailoverChain
    , failover: &crate::config::FailoverConfig
    ) -> Self
    {   ChatClient
        {   persona
          , chain
          , temperature: failover.temperature
          , max_tokens: failover.max_tokens
        }
    }

    /// Build the real provider tiers from configuration
    pub fn from_config(
      config: &crate::config::AppConfig
    , persona: PersonaPrompt
    ) -> Result<Self, crate::error::Error>
    {   let primary = GeminiClient::from_config(&config.gemini)?
          .map(|c| Arc::new(c) as Arc<dyn ChatProvider>);
        let secondary = GroqClient::from_config(&config.groq)?
          .map(|c| Arc::new(c) as Arc<dyn ChatProvider>);

        if primary.is_none()
        {   warn!("GOOGLE_API_KEY not set; primary tier disabled");
        }
        if secondary.is_none()
        {   warn!("GROQ_API_KEY not set; secondary tier disabled");
        }

        let chain = FailoverChain::new(
          primary,
          secondary,
          CannedReplies::default(),
          config.failover.provider_timeout()
        );
        for (source, name) in chain.enabled_tiers()
        {   info!("Tier {} -> {}", source, name);
        }

        Ok(Self::new(persona, chain, &config.failover))
    }

    /// Trimmed message, or NoMessage when missing or blank
    pub fn validate(
      request: &ChatRequest
    ) -> Result<&str, crate::error::Error>
    {   request.message.as_deref()
          .map(str::trim)
          .filter(|m| !m.is_empty())
          .ok_or(crate::error::Error::NoMessage)
    }

    pub fn prompt_for(&self, message: &str) -> PromptRequest
    {   PromptRequest
        {   system_message: self.persona.text().to_string()
          , prompt: message.to_string()
          , speaker: self.persona.speaker().to_string()
          , max_tokens: self.max_tokens
          , temperature: self.temperature
        }
    }

    /// Run the fallback chain for an already validated message
    pub async fn reply(&self, message: &str) -> ChatReply
    {   let prompt = self.prompt_for(message);
        self.chain.run(&prompt).await
    }

    /// Validate, reply and wrap in the wire envelope
    pub async fn handle(
      &self
    , request: ChatRequest
    ) -> Result<ChatResponse, crate::error::Error>
    {   Self::validate(&request)?;
        // validated above, so the message is present
        let message = request.message.unwrap_or_default();
        debug!("Handling chat message ({} bytes)", message.len());

        let reply = self.reply(&message).await;
        debug!(
          "Answered from {} after {} call(s)",
          reply.source,
          reply.calls_made()
        );

        Ok(ChatResponse
        {   success: true
          , response: reply.text
          , message
          , source: reply.source
        })
    }

    pub fn chain(&self) -> &FailoverChain
    {   &self.chain
    }
}
