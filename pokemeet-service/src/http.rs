//! HTTP surface: the generation gateway routes consumed by the onboarding
//! client, plus the flow routes that drive a session one transition per
//! request.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use dialogue_flow::{ExecutionResult, FlowError, FlowRunner, PendingOperation};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, error};
use uuid::Uuid;

use crate::gateway::{self, GenerationBackend, GenerationError, GenerationErrorKind};

/// The gateway enforces its own 20 MiB limit; the transport accepts a bit
/// more so oversized uploads get the proper error message instead of an
/// aborted connection.
const MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn GenerationBackend>,
    pub runner: FlowRunner,
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/generate-avatar", post(generate_avatar))
        .route("/generate-pokemon", post(generate_pokemon))
        .route("/flow/start", post(start_flow))
        .route("/flow/execute", post(execute_flow))
        .route("/flow/upload", post(upload_flow))
        .route("/flow/session/{id}", get(get_flow_session))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }
    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct AvatarResponse {
    success: bool,
    #[serde(rename = "imageUrl")]
    image_url: String,
    style: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct PokemonCardBody {
    id: u32,
    #[serde(rename = "type")]
    card_type: String,
    image_url: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct PokemonResponse {
    success: bool,
    pokemon_cards: Vec<PokemonCardBody>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
            details: None,
        }),
    )
        .into_response()
}

fn status_for(kind: GenerationErrorKind) -> StatusCode {
    match kind {
        GenerationErrorKind::InvalidInput | GenerationErrorKind::ContentRejected => {
            StatusCode::BAD_REQUEST
        }
        GenerationErrorKind::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
        GenerationErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GenerationErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn generate_avatar(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut image: Option<(String, Bytes)> = None;
    let mut gender: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_json(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {e}"),
                );
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(data) => image = Some((mime_type, data)),
                    Err(e) => {
                        return error_json(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read uploaded file: {e}"),
                        );
                    }
                }
            }
            "gender" => {
                gender = field.text().await.ok().filter(|text| !text.is_empty());
            }
            _ => {}
        }
    }

    let Some((mime_type, bytes)) = image else {
        return error_json(StatusCode::BAD_REQUEST, "No image file provided");
    };

    match gateway::generate_avatar(state.backend.as_ref(), &bytes, &mime_type, gender.as_deref())
        .await
    {
        Ok(artifact) => Json(AvatarResponse {
            success: true,
            image_url: artifact.image_url,
            style: artifact.style,
            description: artifact.description,
        })
        .into_response(),
        Err(error) => error_json(status_for(error.kind), error.message),
    }
}

async fn generate_pokemon(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut resume: Option<Bytes> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_json(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {e}"),
                );
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "resume" {
            match field.bytes().await {
                Ok(data) => resume = Some(data),
                Err(e) => {
                    return error_json(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read uploaded file: {e}"),
                    );
                }
            }
        }
    }

    let Some(bytes) = resume else {
        return error_json(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    match gateway::generate_cards(state.backend.as_ref(), &bytes).await {
        Ok(cards) => Json(PokemonResponse {
            success: true,
            pokemon_cards: cards
                .into_iter()
                .map(|card| PokemonCardBody {
                    id: card.id,
                    card_type: card.persona,
                    image_url: card.image_url,
                    description: card.description,
                })
                .collect(),
        })
        .into_response(),
        Err(error) if error.kind == GenerationErrorKind::InvalidInput => {
            error_json(StatusCode::BAD_REQUEST, error.message)
        }
        Err(error) => (
            status_for(error.kind),
            Json(ErrorBody {
                error: "Failed to generate Pokemon cards".to_string(),
                details: Some(error.message),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    session_id: String,
    content: Option<String>,
}

fn flow_error_status(error: FlowError) -> StatusCode {
    match error {
        FlowError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        FlowError::InputRequired(_)
        | FlowError::OperationPending(_)
        | FlowError::UnexpectedUpload(_) => StatusCode::BAD_REQUEST,
        FlowError::StepOutOfRange(_) | FlowError::StorageError(_) => {
            error!(error = %error, "flow execution failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn start_flow(State(state): State<AppState>) -> Result<Json<ExecutionResult>, StatusCode> {
    state
        .runner
        .start()
        .await
        .map(Json)
        .map_err(flow_error_status)
}

async fn execute_flow(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecutionResult>, StatusCode> {
    state
        .runner
        .execute(&request.session_id, request.content)
        .await
        .map(Json)
        .map_err(flow_error_status)
}

async fn get_flow_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ExecutionResult>, StatusCode> {
    state
        .runner
        .view(&session_id)
        .await
        .map(Json)
        .map_err(flow_error_status)
}

/// Upload for the session's current file step. Dispatches to the avatar or
/// card gateway based on the operation the state machine opened, then feeds
/// the result back in under the issued ticket.
async fn upload_flow(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut session_id: Option<String> = None;
    let mut gender: Option<String> = None;
    let mut file: Option<(String, String, Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_json(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {e}"),
                );
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "session_id" => {
                session_id = field.text().await.ok();
            }
            "gender" => {
                gender = field.text().await.ok().filter(|text| !text.is_empty());
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(data) => file = Some((file_name, mime_type, data)),
                    Err(e) => {
                        return error_json(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read uploaded file: {e}"),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let Some(session_id) = session_id else {
        return error_json(StatusCode::BAD_REQUEST, "No session_id provided");
    };
    let Some((file_name, mime_type, bytes)) = file else {
        return error_json(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    let (ticket, pending) = match state.runner.capture_file(&session_id, &file_name).await {
        Ok(opened) => opened,
        Err(error) => return flow_error_status(error).into_response(),
    };

    let applied = match pending {
        PendingOperation::GeneratingAvatar => {
            let outcome = gateway::generate_avatar(
                state.backend.as_ref(),
                &bytes,
                &mime_type,
                gender.as_deref(),
            )
            .await;
            state
                .runner
                .apply_avatar_result(&session_id, ticket, outcome.map_err(user_message))
                .await
        }
        PendingOperation::GeneratingCards => {
            let outcome = gateway::generate_cards(state.backend.as_ref(), &bytes).await;
            state
                .runner
                .apply_cards_result(&session_id, ticket, outcome.map_err(user_message))
                .await
        }
        PendingOperation::None => {
            error!(session_id = %session_id, "capture_file opened no operation");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match applied {
        Ok(result) => Json(result).into_response(),
        Err(error) => flow_error_status(error).into_response(),
    }
}

fn user_message(error: GenerationError) -> String {
    error.message
}
