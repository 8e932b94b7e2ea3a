//! HTTP surface: POST/OPTIONS /api/chat

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{debug, error, info, warn};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::client::ChatClient;
use crate::error::Error;
use crate::failover::panic_message;
use crate::request::{ChatRequest, ErrorBody};

pub const CHAT_PATH: &str = "/api/chat";

/// Largest accepted chat body; anything bigger is a 400
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState
{   client: Arc<ChatClient>
}

impl AppState
{   pub fn new(client: ChatClient) -> Self
    {   AppState
        {   client: Arc::new(client)
        }
    }
}

pub fn build_router(state: AppState) -> Router
{   with_layers(
      Router::new()
        .route(
          CHAT_PATH,
          post(chat_handler)
            .options(preflight)
            .fallback(method_not_allowed)
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
    )
}

/// Panic guard and CORS headers, applied to every response
fn with_layers(router: Router) -> Router
{   router
      .layer(CatchPanicLayer::custom(handle_panic))
      .layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*")
      ))
      .layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS")
      ))
      .layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type")
      ))
}

/// Bind and serve until Ctrl-C
pub async fn run(
  config: &crate::config::ServerConfig
, state: AppState
) -> Result<(), Error>
{   let app = build_router(state);
    let listener
      = tokio::net::TcpListener::bind(config.listen).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal()
{   if let Err(e) = tokio::signal::ctrl_c().await
    {   error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("shutdown requested");
}

async fn chat_handler(
  State(state): State<AppState>
, body: Result<Bytes, BytesRejection>
) -> Response
{   let body = match body
    {   Ok(body) => body
      , Err(rejection) => {
          let err = Error::InvalidBody(rejection.body_text());
          warn!("rejecting chat request: {}", err);
          return bad_request(err);
        }
    };

    let request: ChatRequest = match serde_json::from_slice(&body)
    {   Ok(request) => request
      , Err(e) => {
          let err = Error::InvalidBody(e.to_string());
          warn!("rejecting chat request: {}", err);
          return bad_request(err);
        }
    };

    match state.client.handle(request).await
    {   Ok(reply) => (StatusCode::OK, Json(reply)).into_response()
      , Err(Error::NoMessage) => {
          debug!("rejecting chat request without message");
          bad_request(Error::NoMessage)
        }
      , Err(e) => {
          error!("chat handler failed: {}", e);
          (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::internal(e.to_string()))
          ).into_response()
        }
    }
}

fn bad_request(err: Error) -> Response
{   let body = match err
    {   Error::NoMessage => ErrorBody::no_message()
      , other => ErrorBody
        {   error: other.to_string()
          , ..ErrorBody::no_message()
        }
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn preflight() -> StatusCode
{   StatusCode::OK
}

async fn method_not_allowed() -> Response
{   (
      StatusCode::METHOD_NOT_ALLOWED,
      Json(ErrorBody::method_not_allowed())
    ).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response
{   let detail = panic_message(err.as_ref());
    error!("request handler panicked: {}", detail);
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(ErrorBody::internal(detail))
    ).into_response()
}
