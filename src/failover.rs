//! Sequential fallback chain: primary provider, secondary provider,
//! then a canned reply. One attempt per provider, never raced.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use futures_util::FutureExt;
use log::{debug, info, warn};

use crate::providers::ChatProvider;
use crate::request::{PromptRequest, Source};

/// Replies used when no provider produced text
pub const DEFAULT_CANNED_REPLIES: [&str; 3] = [
  "Thanks for your question! I'm experiencing some technical \
   difficulties with my AI responses right now. Feel free to explore \
   my project showcases using the quick question buttons, or try \
   asking again in a moment! 🚀"
, "I appreciate your interest! My AI response system is temporarily \
   unavailable. You can learn more about me through the preset \
   questions below, or please try again shortly! 💻"
, "Great question! I'm having some trouble with my response system \
   at the moment. Check out my projects, skills, and other sections \
   using the buttons below, or give me another try in a bit! ⚡"
];

/// Fixed set of last-resort replies
#[derive(Debug, Clone, PartialEq)]
pub struct CannedReplies
{   replies: Vec<String>
}

impl CannedReplies
{   /// Uniform pick; the first entry when OS randomness is unavailable
    pub fn pick(&self) -> &str
    {   &self.replies[random_index(self.replies.len())]
    }
}

impl Default for CannedReplies
{   fn default() -> Self
    {   CannedReplies
        {   replies: DEFAULT_CANNED_REPLIES
              .iter()
              .map(|r| r.to_string())
              .collect()
        }
    }
}

/// Text carried by a panic payload, if any
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String
{   if let Some(s) = payload.downcast_ref::<String>()
    {   s.clone()
    }
    else if let Some(s) = payload.downcast_ref::<&str>()
    {   s.to_string()
    }
    else
    {   "unknown panic".to_string()
    }
}

fn random_index(len: usize) -> usize
{   let mut buf = [0u8; 4];
    match getrandom::fill(&mut buf)
    {   Ok(()) => u32::from_le_bytes(buf) as usize % len
      , Err(e) => {
          warn!("OS randomness unavailable: {}", e);
          0
        }
    }
}

/// What happened to one tier during a run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome
{   /// No credential configured; not attempted
    Skipped
  , Failed(crate::error::Error)
  , Succeeded
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attempt
{   pub source: Source
  , pub outcome: Outcome
}

/// Final text plus the tier that produced it
#[derive(Debug, Clone)]
pub struct ChatReply
{   pub text: String
  , pub source: Source
  , pub attempts: Vec<Attempt>
}

impl ChatReply
{   /// Number of tiers that were actually called
    pub fn calls_made(&self) -> usize
    {   self.attempts.iter()
          .filter(|a| a.outcome != Outcome::Skipped)
          .count()
    }
}

struct Tier
{   source: Source
  , provider: Option<Arc<dyn ChatProvider>>
}

/// Provider tiers in fixed priority order
pub struct FailoverChain
{   tiers: Vec<Tier>
  , canned: CannedReplies
  , attempt_timeout: Duration
}

impl FailoverChain
{   pub fn new(
      primary: Option<Arc<dyn ChatProvider>>
    , secondary: Option<Arc<dyn ChatProvider>>
    , canned: CannedReplies
    , attempt_timeout: Duration
    ) -> Self
    {   let chain = FailoverChain
        {   tiers: vec![
              Tier
              {   source: Source::ProviderA
                , provider: primary
              }
            , Tier
              {   source: Source::ProviderB
                , provider: secondary
              }
            ]
          , canned
          , attempt_timeout
        };
        debug!(
          "Creating failover chain with {} provider tiers",
          chain.enabled_tiers().len()
        );
        chain
    }

    /// Tiers that have a provider configured, in order
    pub fn enabled_tiers(&self) -> Vec<(Source, String)>
    {   self.tiers.iter()
          .filter_map(|t| {
            t.provider.as_ref()
              .map(|p| (t.source, p.name().to_string()))
          })
          .collect()
    }

    /// Walk the tiers until one yields text. Cannot fail.
    pub async fn run(&self, request: &PromptRequest) -> ChatReply
    {   let mut attempts = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers
        {   let provider = match &tier.provider
            {   Some(p) => p
              , None => {
                  debug!("Skipping {}: no credential", tier.source);
                  attempts.push(Attempt
                  {   source: tier.source
                    , outcome: Outcome::Skipped
                  });
                  continue;
                }
            };

            // A panicking provider is a failed tier, not a failed request
            let attempt = AssertUnwindSafe(provider.complete(request))
              .catch_unwind();
            let result = match tokio::time::timeout(
              self.attempt_timeout,
              attempt
            ).await
            {   Ok(Ok(result)) => result
              , Ok(Err(payload)) => Err(
                  crate::error::Error::ProviderPanicked(
                    panic_message(payload.as_ref())
                  )
                )
              , Err(_) => Err(crate::error::Error::Timeout)
            };

            match result
            {   Ok(text) => {
                  info!(
                    "Reply from {} ({})",
                    tier.source, provider.name()
                  );
                  attempts.push(Attempt
                  {   source: tier.source
                    , outcome: Outcome::Succeeded
                  });
                  return ChatReply
                  {   text
                    , source: tier.source
                    , attempts
                  };
                }
              , Err(e) => {
                  warn!(
                    "{} ({}) failed [{}]: {}; trying next tier",
                    tier.source, provider.name(), e.kind(), e
                  );
                  attempts.push(Attempt
                  {   source: tier.source
                    , outcome: Outcome::Failed(e)
                  });
                }
            }
        }

        info!("All providers unavailable; using canned reply");
        ChatReply
        {   text: self.canned.pick().to_string()
          , source: Source::Fallback
          , attempts
        }
    }
}
