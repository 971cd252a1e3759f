//! HTTP routes of the diagram service.
//!
//! | Route | Reply |
//! |---|---|
//! | `GET /` | welcome message |
//! | `GET /status` | liveness message |
//! | `GET /diagram?description=...` | classified diagram as `image/png` |
//! | `POST /diagram` | diagram of the JSON spec body as `image/png` |
//! | `POST /assistant_chat` | assistant reply as JSON |
//!
//! Every failure is answered with `{"error": "..."}`.

use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use warp::{
    Filter, Rejection, Reply,
    http::StatusCode,
    reply::Response,
};

use cloudgram::{Renderer, spec::DiagramSpec};

use crate::{assistant::Assistant, error::ServerError, run_blocking};

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Shared handles passed to every request.
#[derive(Clone)]
pub struct AppState {
    renderer: Arc<Renderer>,
    assistant: Option<Arc<dyn Assistant>>,
}

impl AppState {
    pub fn new(renderer: Arc<Renderer>) -> Self {
        Self {
            renderer,
            assistant: None,
        }
    }

    pub fn with_assistant(mut self, assistant: impl Assistant + 'static) -> Self {
        self.assistant = Some(Arc::new(assistant));
        self
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }
}

#[derive(Debug, Deserialize)]
struct DiagramQuery {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    conversation_id: String,
    response: String,
    image_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// All routes, with rejections turned into JSON errors.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| message_reply("Welcome to the Cloudgram diagram service."));

    let status = warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| message_reply("Diagram service is running."));

    let sketch = warp::path("diagram")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<DiagramQuery>())
        .and(with_state(state.clone()))
        .and_then(sketch_diagram);

    let render = warp::path("diagram")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<DiagramSpec>())
        .and(with_state(state.clone()))
        .and_then(render_diagram);

    let chat = warp::path("assistant_chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<ChatRequest>())
        .and(with_state(state))
        .and_then(assistant_chat);

    root.or(status)
        .or(sketch)
        .or(render)
        .or(chat)
        .recover(handle_rejection)
        .with(warp::log("cloudgram::http"))
}

/// Serves `routes` on `addr` until Ctrl-C is received.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(err:% = err; "Failed to listen for shutdown signal");
        }
    };

    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|err| ServerError::Bind {
            address: addr.to_string(),
            message: err.to_string(),
        })?;

    info!(address:% = bound; "Diagram service listening");
    server.await;
    info!("Diagram service stopped");
    Ok(())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn sketch_diagram(query: DiagramQuery, state: AppState) -> Result<Response, Rejection> {
    let description = query.description.trim().to_string();
    if description.is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "No description provided"));
    }

    let renderer = Arc::clone(&state.renderer);
    let rendered = run_blocking(move || renderer.classify_and_render(&description)).await;
    Ok(png_reply(rendered).await)
}

async fn render_diagram(spec: DiagramSpec, state: AppState) -> Result<Response, Rejection> {
    let renderer = Arc::clone(&state.renderer);
    let rendered = run_blocking(move || renderer.render(&spec)).await;
    Ok(png_reply(rendered).await)
}

async fn assistant_chat(request: ChatRequest, state: AppState) -> Result<Response, Rejection> {
    if request.message.trim().is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Message is required"));
    }

    let Some(assistant) = state.assistant else {
        return Ok(error_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            "Assistant not available",
        ));
    };

    match assistant.reply(&request.message).await {
        Ok(reply) => {
            let body = ChatResponse {
                conversation_id: request
                    .conversation_id
                    .unwrap_or_else(|| "default".to_string()),
                response: reply.text().to_string(),
                image_path: reply.image_path().cloned(),
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(err) => Ok(failure_reply(err, "Failed to generate response")),
    }
}

async fn png_reply(rendered: Result<PathBuf, ServerError>) -> Response {
    let path = match rendered {
        Ok(path) => path,
        Err(err) => return failure_reply(err, "Failed to generate diagram"),
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => warp::reply::with_header(bytes, "content-type", "image/png").into_response(),
        Err(err) => failure_reply(err.into(), "Failed to generate diagram"),
    }
}

/// Client errors carry their message; anything else is logged and hidden
/// behind `summary`.
fn failure_reply(err: ServerError, summary: &str) -> Response {
    if err.is_client_error() {
        warn!(err:% = err; "Rejected request");
        error_reply(StatusCode::BAD_REQUEST, err.to_string())
    } else {
        error!(err:% = err; "{summary}");
        error_reply(StatusCode::INTERNAL_SERVER_ERROR, summary)
    }
}

fn message_reply(message: &str) -> Response {
    warp::reply::json(&MessageBody { message }).into_response()
}

fn error_reply(status: StatusCode, error: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: error.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {err}"))
    } else if let Some(err) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected an application/json body".to_string(),
        )
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!(rejection:? = rejection; "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(error_reply(status, message))
}
