use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, sse::{Event, KeepAlive, Sse}},
};
use futures_util::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use shelfwise_shared::Message;

use super::state::AppState;
use super::types::*;
use crate::agent::Graph;
use crate::events;

pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> axum::response::Response {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message cannot be empty" })),
        )
            .into_response();
    }

    if req.stream.unwrap_or(false) {
        handle_chat_stream(state, req).into_response()
    } else {
        handle_chat_standard(state, req).await.into_response()
    }
}

fn turn_input(req: ChatRequest) -> (usize, Vec<Message>) {
    let prior = req.messages.len();
    let mut messages = req.messages;
    messages.push(Message::user(req.message));
    (prior, messages)
}

async fn handle_chat_standard(
    state: Arc<AppState>,
    req: ChatRequest,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (prior, messages) = turn_input(req);
    info!(history = prior, "chat turn");

    match state.graph().run(messages, None).await {
        Ok(outcome) => Ok(Json(ChatResponse {
            content: outcome.final_text().unwrap_or_default().to_string(),
            messages: outcome.appended().to_vec(),
        })),
        Err(e) => {
            warn!(error = %e, "chat turn failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Task execution failed: {}", e) })),
            ))
        }
    }
}

fn handle_chat_stream(
    state: Arc<AppState>,
    req: ChatRequest,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (events, rx) = events::channel();

    tokio::spawn(async move {
        let (prior, messages) = turn_input(req);
        info!(history = prior, "streaming chat turn");

        match state.graph().run(messages, Some(&events)).await {
            Ok(outcome) => {
                events.response_complete(outcome.final_text().unwrap_or_default().to_string());
                events.done(outcome.appended().to_vec());
            }
            Err(e) => {
                warn!(error = %e, "streaming chat turn failed");
                events.error(format!("Task execution failed: {}", e));
            }
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        let json = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn handle_greeting(State(state): State<Arc<AppState>>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        messages: Graph::seed(&state.config.graph),
    })
}

pub async fn handle_list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.toolbox.tools(),
    })
}

pub async fn health_check() -> &'static str {
    "Shelfwise is running"
}
