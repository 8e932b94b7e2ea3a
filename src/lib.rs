//! Chat proxy for a portfolio site's "talk to me" window.
//!
//! A message posted to `/api/chat` is answered in the site owner's
//! persona by the first tier that succeeds:
//!
//! ```text
//!   Gemini (providerA) -> Groq (providerB) -> canned reply (fallback)
//! ```
//!
//! Each provider gets exactly one attempt, bounded by a timeout.
//! Provider failures never reach the caller; only bad input does.
//!
//! persona-chat/
//! ├── src/
//! │   ├── lib.rs          # Re-exports
//! │   ├── main.rs         # Binary entry point
//! │   ├── error.rs        # Error taxonomy
//! │   ├── config.rs       # Environment configuration
//! │   ├── persona.rs      # Persona prompt loading
//! │   ├── request.rs      # Wire envelopes and prompt type
//! │   ├── providers/      # Gemini and Groq clients
//! │   ├── failover.rs     # Fallback chain
//! │   ├── client.rs       # Request handling core
//! │   └── server.rs       # axum router
//! ├── prompts/            # Built-in persona text
//! └── tests/

pub mod error;
pub mod config;
pub mod persona;
pub mod request;
pub mod providers;
pub mod failover;
pub mod client;
pub mod server;

pub use client::ChatClient;
pub use config::AppConfig;
pub use error::Error;
pub use failover::{CannedReplies, ChatReply, FailoverChain};
pub use persona::PersonaPrompt;
pub use providers::ChatProvider;
pub use request::{ChatRequest, ChatResponse, ErrorBody, PromptRequest, Source};
pub use server::{build_router, AppState};
