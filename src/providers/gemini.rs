use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

// ===== Request Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig
{   pub temperature: f64
  , #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32
}

// ===== Response Types =====

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate
{   pub content: Option<Content>
  , #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>
}

impl GenerateContentResponse
{   /// candidates[0].content.parts[0].text
    pub fn first_text(&self) -> Option<&str>
    {   self.candidates.first()
          .and_then(|c| c.content.as_ref())
          .and_then(|c| c.parts.first())
          .and_then(|p| p.text.as_deref())
    }
}

// ===== Client =====

/// Credential header; keeps the key out of request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini generateContent client (primary tier)
pub struct GeminiClient
{   api_key: String
  , api_base: String
  , model: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   pub fn new(
      api_key: String
    , config: &crate::config::ProviderConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GeminiClient for {}", config.model);
        Ok(GeminiClient
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

    fn endpoint(&self) -> String
    {   format!(
          "{}/models/{}:generateContent",
          self.api_base, self.model
        )
    }
}

#[async_trait]
impl super::ChatProvider for GeminiClient
{   fn name(&self) -> &str
    {   "gemini"
    }

    async fn complete(
      &self
    , request: &crate::request::PromptRequest
    ) -> Result<String, crate::error::Error>
    {   let body = GenerateContentRequest
        {   contents: vec![
              Content
              {   parts: vec![
                    Part
                    {   text: Some(request.combined())
                    }
                  ]
              }
            ]
          , generation_config: GenerationConfig
            {   temperature: request.temperature
              , max_output_tokens: request.max_tokens
            }
        };

        trace!("Gemini request to {}", self.endpoint());

        let response = self.http_client
          .post(self.endpoint())
          .header(API_KEY_HEADER, self.api_key.as_str())
          .json(&body)
          .send()
          .await
          .map_err(|e| super::transport_error("gemini", e))?;

        trace!("Gemini response status: {}", response.status());

        let parsed: GenerateContentResponse
          = super::read_json("gemini", response).await?;

        if let Some(reason) = parsed.candidates.first()
          .and_then(|c| c.finish_reason.as_deref())
        {   debug!("Gemini finish reason: {}", reason);
        }

        super::reply_text(parsed.first_text())
    }
}
