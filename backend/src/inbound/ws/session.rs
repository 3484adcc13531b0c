//! Per-connection WebSocket handler.
//!
//! The public contract pings every 5s and considers a connection idle after
//! 10s without client traffic. Tests shorten both intervals. Toasts are
//! pulled from the subscription on a separate task so a heartbeat tick never
//! cancels a half-finished snapshot refresh.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::Toast;
use crate::domain::ports::ToastStream;
use crate::inbound::ws::messages::ToastMessage;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

const TOAST_BUFFER: usize = 16;

pub(super) async fn handle_ws_session(
    toasts: Box<dyn ToastStream>,
    session: Session,
    stream: MessageStream,
) {
    let (sender, receiver) = mpsc::channel(TOAST_BUFFER);
    let pump = ToastPump(tokio::spawn(pump_toasts(toasts, sender)));
    WsSession { toasts: receiver }.run(session, stream).await;
    drop(pump);
}

async fn pump_toasts(mut toasts: Box<dyn ToastStream>, sender: mpsc::Sender<Toast>) {
    while let Some(toast) = toasts.next_toast().await {
        if sender.send(toast).await.is_err() {
            return;
        }
    }
}

/// Aborts the subscription task when the session ends.
struct ToastPump(JoinHandle<()>);

impl Drop for ToastPump {
    fn drop(&mut self) {
        self.0.abort();
    }
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    FeedClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    toasts: mpsc::Receiver<Toast>,
}

impl WsSession {
    async fn run(&mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    Self::handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
                toast = self.toasts.recv() => {
                    Self::handle_toast(&mut session, toast).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                close_session_if_needed(session, close_action_for(&error)).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message.map_err(SessionError::Protocol)? {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session.pong(&payload).await.map_err(SessionError::Network)
            }
            Message::Text(_) | Message::Binary(_) => {
                *last_heartbeat = Instant::now();
                debug!("ignoring inbound WebSocket data frame");
                Ok(())
            }
            Message::Pong(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_toast(session: &mut Session, toast: Option<Toast>) -> Result<(), SessionError> {
        let Some(toast) = toast else {
            return Err(SessionError::FeedClosed);
        };
        match serde_json::to_string(&ToastMessage::from(toast)) {
            Ok(body) => session.text(body).await.map_err(SessionError::Network),
            Err(error) => {
                warn!(error = %error, "Failed to serialize toast");
                Ok(())
            }
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::FeedClosed => {
            warn!("toast feed closed; closing connection");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::FeedClosed => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Away,
            description: Some("toast feed closed".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}
