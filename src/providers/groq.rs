use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , #[serde(default)]
    pub content: Option<String>
}

impl ChatMessage
{   pub fn new(role: &str, content: &str) -> Self
    {   ChatMessage
        {   role: role.to_string()
          , content: Some(content.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroqChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f64
  , pub max_tokens: u32
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: Option<ChatMessage>
  , pub finish_reason: Option<String>
}

impl GroqChatResponse
{   /// choices[0].message.content
    pub fn first_text(&self) -> Option<&str>
    {   self.choices.first()
          .and_then(|c| c.message.as_ref())
          .and_then(|m| m.content.as_deref())
    }
}

// ===== Client =====

/// Groq chat-completions client (secondary tier)
pub struct GroqClient
{   api_key: String
  , api_base: String
  , model: String
  , http_client: reqwest::Client
}

impl GroqClient
{   pub fn new(
      api_key: String
    , config: &crate::config::ProviderConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GroqClient for {}", config.model);
        Ok(GroqClient
        {   api_key
          , api_base: super::trim_base(&config.api_base)
          , model: config.model.clone()
          , http_client: super::http_client()?
        })
    }

    /// None when no credential is configured
    pub fn from_config(
      config: &crate::config::ProviderConfig
    ) -> Result<Option<Self>, crate::error::Error>
    {   match &config.api_key
        {   Some(key) => Self::new(key.clone(), config).map(Some)
          , None => Ok(None)
        }
    }
}

#[async_trait]
impl super::ChatProvider for GroqClient
{   fn name(&self) -> &str
    {   "groq"
    }

    async fn complete(
      &self
    , request: &crate::request::PromptRequest
    ) -> Result<String, crate::error::Error>
    {   let body = GroqChatRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage::new("system", &request.system_message)
            , ChatMessage::new("user", &request.prompt)
            ]
          , temperature: request.temperature
          , max_tokens: request.max_tokens
        };

        trace!("Groq request: model={}", body.model);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(&self.api_key)
          .json(&body)
          .send()
          .await
          .map_err(|e| super::transport_error("groq", e))?;

        trace!("Groq response status: {}", response.status());

        let parsed: GroqChatResponse
          = super::read_json("groq", response).await?;

        super::reply_text(parsed.first_text())
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;

    #[test]
    fn first_text_reads_first_choice()
    {   let parsed: GroqChatResponse = serde_json::from_value(json!({
          "choices": [
            { "message": { "role": "assistant", "content": "Hey!" } },
            { "message": { "role": "assistant", "content": "Other" } }
          ]
        })).unwrap();
        assert_eq!(parsed.first_text(), Some("Hey!"));
    }

    #[test]
    fn first_text_is_none_without_choices()
    {   let parsed: GroqChatResponse
          = serde_json::from_value(json!({ "choices": [] }))
            .unwrap();
        assert_eq!(parsed.first_text(), None);
    }
}
