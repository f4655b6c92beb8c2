//! Per-connection tracking sessions
//!
//! Each WebSocket upgrade gets a fresh `SessionTracker` and
//! `AdvisoryThrottle`, owned by one task. Frames are processed and pushed
//! one way at ~20 fps until the client goes away; nothing is read from the
//! client beyond close handling.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use advisory::AdvisoryRequest;
use alerting::AdvisoryThrottle;
use face_geometry::{LandmarkSource, SyntheticConfig, SyntheticSource};
use tracker::{FrameMetrics, SessionTracker};

use crate::{AppState, SourceKind};

/// Frame period for the session loop (~20 fps).
const FRAME_PERIOD: Duration = Duration::from_millis(50);

/// WebSocket tracking endpoint.
pub async fn ws_track(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        state.total_sessions.fetch_add(1, Ordering::Relaxed);
        state.active_sessions.fetch_add(1, Ordering::Relaxed);
        run_session(socket, &state).await;
        state.active_sessions.fetch_sub(1, Ordering::Relaxed);
    })
}

/// Drive one tracking session until the client disconnects.
async fn run_session(socket: WebSocket, state: &AppState) {
    let session_id = Uuid::new_v4();

    let mut tracker = match SessionTracker::new(state.settings.tracker.clone()) {
        Ok(tracker) => tracker,
        Err(e) => {
            warn!(%session_id, "Session rejected: {}", e);
            return;
        }
    };
    let mut throttle = match AdvisoryThrottle::new(
        state.settings.throttle.clone(),
        Arc::clone(&state.provider),
    ) {
        Ok(throttle) => throttle,
        Err(e) => {
            warn!(%session_id, "Session rejected: {}", e);
            return;
        }
    };
    let mut source = make_source(state.settings.source);

    info!(%session_id, source = ?state.settings.source, "Session started");

    let (mut sender, mut receiver) = socket.split();
    let mut ticks = tokio::time::interval(FRAME_PERIOD);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut frames: u64 = 0;
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let metrics =
                    next_metrics(source.as_mut(), &mut tracker, &mut throttle).await;
                let json = match serde_json::to_string(&metrics) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(%session_id, "Failed to serialize metrics: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    debug!(%session_id, "Send failed, client gone");
                    break;
                }
                frames += 1;
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // The client is not expected to send anything else.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let session = tracker.state();
    info!(
        %session_id,
        frames,
        blinks = session.blink_count,
        seconds = session.started_at.elapsed().as_secs(),
        "Session ended"
    );
}

/// Process one frame: pull landmarks, update the tracker, and attach
/// advisory text when the frame carries an alert. The advisory await is
/// bounded by the throttle's timeout, so a slow provider stalls at most
/// one frame interval's worth of output, never the whole session.
async fn next_metrics(
    source: &mut dyn LandmarkSource,
    tracker: &mut SessionTracker,
    throttle: &mut AdvisoryThrottle,
) -> FrameMetrics {
    let frame = source.next_frame();
    let mut metrics = tracker.process(frame.as_ref());

    if let Some(alert) = metrics.alert {
        let request = AdvisoryRequest {
            kind: alert,
            blink_rate: metrics.blink_rate,
            rate_drop_pct: metrics.rate_drop_pct,
            session_seconds: metrics.session_seconds,
        };
        metrics.advisory = Some(throttle.advise(&request).await);
    }

    metrics
}

/// Build the scripted landmark source for one session.
fn make_source(kind: SourceKind) -> Box<dyn LandmarkSource> {
    let config = match kind {
        SourceKind::Synthetic => SyntheticConfig::default(),
        SourceKind::SyntheticCloseUp => SyntheticConfig::close_up(),
        SourceKind::SyntheticDrowsy => SyntheticConfig::drowsy(),
    };
    Box::new(SyntheticSource::new(config))
}
