//! Persona prompt, loaded once at startup

use std::path::Path;
use std::sync::Arc;
use log::{debug, info};

/// Persona text compiled into the binary
pub const BUILTIN_PERSONA: &str
  = include_str!("../prompts/persona.md");

/// Immutable persona instructions shared by every request
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaPrompt
{   text: Arc<str>
  , speaker: Arc<str>
}

impl PersonaPrompt
{   pub fn new(
      text: impl AsRef<str>
    , speaker: impl AsRef<str>
    ) -> Result<Self, crate::error::Error>
    {   let text = text.as_ref().trim();
        if text.is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "persona prompt is empty".to_string()
            ));
        }
        let speaker = speaker.as_ref().trim();
        let speaker = if speaker.is_empty()
          { crate::config::DEFAULT_SPEAKER }
          else { speaker };
        Ok(PersonaPrompt
        {   text: Arc::from(text)
          , speaker: Arc::from(speaker)
        })
    }

    /// Built-in persona with the given speaker label
    pub fn builtin(speaker: &str)
      -> Result<Self, crate::error::Error>
    {   Self::new(BUILTIN_PERSONA, speaker)
    }

    /// Load from the configured file, or fall back to the built-in text
    pub fn load(
      config: &crate::config::PersonaConfig
    ) -> Result<Self, crate::error::Error>
    {   let speaker = config.speaker.as_deref()
          .unwrap_or(crate::config::DEFAULT_SPEAKER);
        match &config.path
        {   Some(path) => Self::from_file(path, speaker)
          , None => {
              debug!("Using built-in persona");
              Self::builtin(speaker)
            }
        }
    }

    pub fn from_file(
      path: &Path
    , speaker: &str
    ) -> Result<Self, crate::error::Error>
    {   let text = std::fs::read_to_string(path)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("persona file {}: {}", path.display(), e)
            )
          })?;
        let persona = Self::new(text, speaker)?;
        info!(
          "Loaded persona from {} ({} bytes)",
          path.display(),
          persona.text.len()
        );
        Ok(persona)
    }

    pub fn text(&self) -> &str
    {   &self.text
    }

    pub fn speaker(&self) -> &str
    {   &self.speaker
    }
}
