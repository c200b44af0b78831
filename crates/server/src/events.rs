use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use uuid::Uuid;

use crate::config::AppState;

/// Events sent on the `/sse` notification stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// First event on every connection
    Connected { connection_id: Uuid },
    /// Keep-alive
    Heartbeat { timestamp: DateTime<Utc> },
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }

    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::Connected { connection_id } => serde_json::json!({
                "status": "connected",
                "service": "vetta",
                "connection_id": connection_id,
            }),
            Self::Heartbeat { timestamp } => serde_json::json!({
                "status": "alive",
                "timestamp": timestamp.to_rfc3339(),
            }),
        }
    }

    fn into_sse(self) -> Event {
        Event::default().event(self.name()).data(self.data().to_string())
    }
}

struct ConnectionGuard(Uuid);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        tracing::info!(connection_id = %self.0, "SSE connection closed");
    }
}

/// `connected` immediately, then a heartbeat every `period`, forever.
pub fn event_stream(connection_id: Uuid, period: Duration) -> impl Stream<Item = StreamEvent> {
    async_stream::stream! {
        let _guard = ConnectionGuard(connection_id);
        yield StreamEvent::Connected { connection_id };

        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            yield StreamEvent::Heartbeat { timestamp: Utc::now() };
        }
    }
}

/// SSE handler for long-lived client connections
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection_id = Uuid::new_v4();
    tracing::info!(%connection_id, "New SSE connection established");

    let stream = event_stream(connection_id, state.heartbeat_interval)
        .map(|event| Ok::<_, Infallible>(event.into_sse()));

    Sse::new(stream)
}
