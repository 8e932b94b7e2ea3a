#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Router,
};
use persona_chat::config::FailoverConfig;
use persona_chat::{
    CannedReplies, ChatClient, ChatProvider, Error, FailoverChain,
    PersonaPrompt, PromptRequest,
};

pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);

/// Scripted provider behaviour
#[derive(Clone)]
pub enum Behaviour
{   Reply(String)
  , Fail(Error)
  , Hang
  , Panic
}

/// Provider stub that counts calls and keeps the last prompt
pub struct StubProvider
{   name: String
  , behaviour: Behaviour
  , calls: AtomicUsize
  , last_prompt: Mutex<Option<PromptRequest>>
}

impl StubProvider
{   pub fn new(name: &str, behaviour: Behaviour) -> Arc<Self>
    {   Arc::new(StubProvider
        {   name: name.to_string()
          , behaviour
          , calls: AtomicUsize::new(0)
          , last_prompt: Mutex::new(None)
        })
    }

    pub fn replying(name: &str, text: &str) -> Arc<Self>
    {   Self::new(name, Behaviour::Reply(text.to_string()))
    }

    pub fn failing(name: &str, error: Error) -> Arc<Self>
    {   Self::new(name, Behaviour::Fail(error))
    }

    pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<PromptRequest>
    {   self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for StubProvider
{   fn name(&self) -> &str
    {   &self.name
    }

    async fn complete(
      &self
    , request: &PromptRequest
    ) -> Result<String, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.clone());
        match &self.behaviour
        {   Behaviour::Reply(text) => Ok(text.clone())
          , Behaviour::Fail(e) => Err(e.clone())
          , Behaviour::Hang => {
              tokio::time::sleep(Duration::from_secs(30)).await;
              Ok("too late".to_string())
            }
          , Behaviour::Panic => panic!("stub provider exploded")
        }
    }
}

fn as_dyn(p: Option<&Arc<StubProvider>>) -> Option<Arc<dyn ChatProvider>>
{   p.map(|p| p.clone() as Arc<dyn ChatProvider>)
}

pub fn chain(
  primary: Option<&Arc<StubProvider>>
, secondary: Option<&Arc<StubProvider>>
) -> FailoverChain
{   FailoverChain::new(
      as_dyn(primary),
      as_dyn(secondary),
      CannedReplies::default(),
      TEST_TIMEOUT
    )
}

pub fn persona() -> PersonaPrompt
{   PersonaPrompt::new("You are a test persona.", "Tester").unwrap()
}

pub fn client(
  primary: Option<&Arc<StubProvider>>
, secondary: Option<&Arc<StubProvider>>
) -> ChatClient
{   ChatClient::new(
      persona(),
      chain(primary, secondary),
      &FailoverConfig::default()
    )
}

pub fn prompt(message: &str) -> PromptRequest
{   client(None, None).prompt_for(message)
}

// ===== Fake upstream HTTP server =====

/// One request seen by the fake upstream
#[derive(Debug, Clone)]
pub struct Recorded
{   pub path: String
  , pub query: Option<String>
  , pub authorization: Option<String>
  , pub api_key: Option<String>
  , pub body: serde_json::Value
}

#[derive(Clone)]
struct Upstream
{   status: StatusCode
  , body: String
  , delay: Duration
  , seen: Arc<Mutex<Vec<Recorded>>>
}

async fn upstream_handler(
  State(upstream): State<Upstream>
, uri: Uri
, headers: HeaderMap
, body: Bytes
) -> (StatusCode, String)
{   upstream.seen.lock().unwrap().push(Recorded
    {   path: uri.path().to_string()
      , query: uri.query().map(str::to_string)
      , authorization: headers
          .get("authorization")
          .and_then(|v| v.to_str().ok())
          .map(str::to_string)
      , api_key: headers
          .get("x-goog-api-key")
          .and_then(|v| v.to_str().ok())
          .map(str::to_string)
      , body: serde_json::from_slice(&body)
          .unwrap_or(serde_json::Value::Null)
    });
    if !upstream.delay.is_zero()
    {   tokio::time::sleep(upstream.delay).await;
    }
    (upstream.status, upstream.body.clone())
}

/// Serve a fixed reply on 127.0.0.1; returns base URL and request log
pub async fn fake_upstream(
  status: StatusCode
, body: impl Into<String>
, delay: Duration
) -> (String, Arc<Mutex<Vec<Recorded>>>)
{   let seen = Arc::new(Mutex::new(Vec::new()));
    let state = Upstream
    {   status
      , body: body.into()
      , delay
      , seen: seen.clone()
    };
    let app = Router::new()
      .fallback(upstream_handler)
      .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}
