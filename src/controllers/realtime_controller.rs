use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

// GET /events
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.alerts.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            let evt = match rx.recv().await {
                Ok(ev) => match Event::default().event("alertTriggered").json_data(&ev) {
                    Ok(evt) => evt,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode alert event");
                        continue;
                    }
                },
                Err(RecvError::Lagged(n)) => Event::default().event("ping").data(format!("lagged {n}")),
                // sender lives as long as the service
                Err(RecvError::Closed) => return None,
            };

            return Some((Ok(evt), rx));
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    )
}
