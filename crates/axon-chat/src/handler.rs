//! Axum route handlers for the OpenAI-compatible endpoints

use std::pin::Pin;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use axon_core::RequestContext;
use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use crate::convert;
use crate::error::ChatError;
use crate::protocol::openai::{OpenAiModel, OpenAiModelList, OpenAiRequest, OpenAiResponse};
use crate::state::ChatState;
use crate::types::StreamEvent;

/// Build the chat router with all endpoints
pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .route("/v1/models", routing::get(list_models))
        .with_state(state)
}

/// Handle `POST /v1/chat/completions`
async fn chat_completions(
    State(state): State<ChatState>,
    axum::Extension(context): axum::Extension<RequestContext>,
    Json(wire_request): Json<OpenAiRequest>,
) -> Response {
    let is_stream = wire_request.stream.unwrap_or(false);
    let internal_request: crate::types::CompletionRequest = wire_request.into();

    if is_stream {
        match state.complete_stream(internal_request, context).await {
            Ok((model, stream)) => sse_response(stream, model).into_response(),
            Err(e) => error_response(&e),
        }
    } else {
        match state.complete(internal_request, context).await {
            Ok(response) => {
                let wire_response: OpenAiResponse = response.into();
                Json(wire_response).into_response()
            }
            Err(e) => error_response(&e),
        }
    }
}

/// Handle `GET /v1/models`
async fn list_models(State(state): State<ChatState>) -> Response {
    let now = crate::emulation::assemble::unix_now();

    let data: Vec<OpenAiModel> = state
        .models()
        .iter()
        .map(|id| OpenAiModel {
            id: id.clone(),
            object: "model".to_owned(),
            created: now,
            owned_by: "axon".to_owned(),
        })
        .collect();

    Json(OpenAiModelList {
        object: "list".to_owned(),
        data,
    })
    .into_response()
}

/// Frame the synthetic delta sequence as `OpenAI` SSE events
fn sse_response(
    stream: Pin<Box<dyn Stream<Item = Result<StreamEvent, ChatError>> + Send>>,
    model: String,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let created = crate::emulation::assemble::unix_now();
    let response_id = format!("chatcmpl-{}", Uuid::new_v4());

    let event_stream = stream.map(move |result| match result {
        Ok(StreamEvent::Delta(delta)) => {
            let chunk = convert::delta_to_chunk(&delta, &response_id, &model, created);
            let data = serde_json::to_string(&chunk).unwrap_or_default();
            Ok(Event::default().data(data))
        }
        Ok(StreamEvent::Done) => Ok(Event::default().data("[DONE]")),
        Err(e) => {
            let error_data = serde_json::json!({
                "error": {
                    "message": e.to_string(),
                    "type": "streaming_error"
                }
            });
            Ok(Event::default().data(error_data.to_string()))
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

/// Convert a chat error to an `OpenAI`-style JSON error response
fn error_response(error: &ChatError) -> Response {
    use axon_core::HttpError;

    let status = error.status_code();
    let body = serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": serde_json::Value::Null,
        }
    });

    (status, Json(body)).into_response()
}
