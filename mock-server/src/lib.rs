use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{FromRequest, Path, Request, State},
    http::header,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use axum::http::StatusCode;

/// One event as the collector received it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceivedEvent {
    pub id: Uuid,
    pub event: String,
    pub content_type: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

/// Shared store of received events.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<RwLock<Vec<ReceivedEvent>>>,
    reject_with: Option<StatusCode>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose POST route answers every event with `status`.
    pub fn failing(status: StatusCode) -> Self {
        Self {
            events: Arc::default(),
            reject_with: Some(status),
        }
    }

    pub async fn events(&self) -> Vec<ReceivedEvent> {
        self.events.read().await.clone()
    }
}

pub fn app() -> Router {
    app_with_log(EventLog::new())
}

pub fn app_with_log(log: EventLog) -> Router {
    Router::new()
        .route("/analysis/appsflyer_post/{event}", post(record_event))
        .route("/analysis/events", get(list_events))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_log(listener, EventLog::new()).await
}

pub async fn run_with_log(listener: TcpListener, log: EventLog) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_log(log)).await
}

async fn list_events(State(log): State<EventLog>) -> Json<Vec<ReceivedEvent>> {
    Json(log.events().await)
}

async fn record_event(
    State(log): State<EventLog>,
    Path(event): Path<String>,
    request: Request,
) -> Result<&'static str, StatusCode> {
    if let Some(status) = log.reject_with {
        tracing::info!(%event, %status, "rejecting event");
        return Err(status);
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let headers = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let params = if content_type.starts_with("application/x-www-form-urlencoded") {
        Form::<BTreeMap<String, String>>::from_request(request, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?
            .0
    } else {
        Json::<BTreeMap<String, String>>::from_request(request, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?
            .0
    };

    let received = ReceivedEvent {
        id: Uuid::new_v4(),
        event,
        content_type,
        headers,
        params,
    };
    tracing::info!(id = %received.id, event = %received.event, params = received.params.len(), "event recorded");
    log.events.write().await.push(received);
    Ok("OK")
}
