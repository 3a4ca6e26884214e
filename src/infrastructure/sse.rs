// Server-sent event streaming of state published on a watch channel
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::watch;

/// Serialize one state as an SSE `data:` frame under `event`
fn to_event<T: Serialize>(event: &str, state: &T) -> Option<Event> {
    match Event::default().event(event).json_data(state) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!("SSE serialization error: {}", e);
            None
        }
    }
}

/// Emit the current value, then every subsequent change until the sender drops
pub fn stream_from_watch<T>(
    mut rx: watch::Receiver<T>,
    event: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        if let Some(frame) = to_event(event, &current) {
            yield Ok::<Event, Infallible>(frame);
        }

        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            if let Some(frame) = to_event(event, &next) {
                yield Ok(frame);
            }
        }
        tracing::debug!("SSE source closed for '{}'", event);
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_streams_current_value_until_sender_drops() {
        let (tx, rx) = watch::channel(serde_json::json!({"hour": 12}));
        tx.send_replace(serde_json::json!({"hour": 13}));
        let response = stream_from_watch(rx, "date").into_response();
        drop(tx);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.contains("event: date"));
        assert!(text.contains(r#"data: {"hour":13}"#));
        assert!(!text.contains(r#""hour":12"#));
    }
}
