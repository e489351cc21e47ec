//! Session connection manager.
//!
//! [`Session`] is the synchronous state machine: connection state, frame decode and
//! dispatch, poll gating and intents. It never returns errors; bad input becomes a
//! [`FrameOutcome`] and a log line. The async driver started by [`spawn_session`] owns
//! the socket and the poll timer and feeds every event into the session one at a time.

use std::{fmt::Display, future::Future, pin::Pin, time::Duration};

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, timeout, Instant, MissedTickBehavior},
};
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{DecodeError, TransportError};
use crate::normalize::normalize_snapshot;
use crate::procs::ProcessColumn;
use crate::types::RawStats;
use crate::view::{CoreState, ViewModel, ViewPublisher, ViewReceiver};
use crate::ws::{self, Request, WsStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connecting,
    Open,
    #[default]
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "error",
        }
    }
}

/// Intents the presentation layer sends back into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Sort(ProcessColumn),
    ToggleView,
    /// Close the current connection (if any) and connect again.
    Reconnect,
}

/// A decoded inbound frame.
#[derive(Debug)]
pub enum Frame {
    Stats(RawStats),
    Other(String),
}

#[derive(Debug)]
pub enum FrameOutcome {
    Applied,
    Ignored(String),
    Dropped(DecodeError),
}

const STATS_ELEMENTS: usize = 4;

/// Decode `[kind, payload]`. Only `stats` payloads are decoded further.
pub fn decode_frame(raw: &[u8]) -> Result<Frame, DecodeError> {
    let value: Value = serde_json::from_slice(raw)?;
    let Value::Array(items) = value else {
        return Err(DecodeError::NotAFrame);
    };
    let mut items = items.into_iter();
    let kind = match items.next() {
        Some(Value::String(kind)) => kind,
        _ => return Err(DecodeError::NotAFrame),
    };
    if kind != "stats" {
        return Ok(Frame::Other(kind));
    }
    decode_stats(items.next().unwrap_or(Value::Null)).map(Frame::Stats)
}

fn decode_stats(payload: Value) -> Result<RawStats, DecodeError> {
    let Value::Array(items) = payload else {
        return Err(DecodeError::PayloadNotAList);
    };
    if items.len() < STATS_ELEMENTS {
        return Err(DecodeError::MissingElements {
            expected: STATS_ELEMENTS,
            found: items.len(),
        });
    }
    let mut it = items.into_iter();
    Ok(RawStats {
        metrics: element("metrics", it.next())?,
        processes: element("processes", it.next())?,
        system_info: element("system_info", it.next())?,
        log_tail: element("log_tail", it.next())?,
    })
}

fn element<T: DeserializeOwned>(name: &'static str, v: Option<Value>) -> Result<T, DecodeError> {
    serde_json::from_value(v.unwrap_or(Value::Null)).map_err(|source| DecodeError::Element {
        element: name,
        source,
    })
}

pub struct Session {
    core: CoreState,
    publisher: ViewPublisher,
}

impl Session {
    pub fn new(endpoint: impl Into<String>) -> (Self, ViewReceiver) {
        let core = CoreState::new(endpoint);
        let (publisher, rx) = ViewPublisher::new(core.view());
        (Self { core, publisher }, rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.core.connection
    }

    pub fn core(&self) -> &CoreState {
        &self.core
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.publisher.subscribe()
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.core.connection != next {
            info!(from = self.core.connection.label(), to = next.label(), "connection state");
        }
        self.core.connection = next;
    }

    pub fn begin_connect(&mut self) {
        self.set_state(ConnectionState::Connecting);
        self.publisher.publish(&self.core);
    }

    /// Connection established. Returns the eager first request so the view fills
    /// without waiting for the first tick.
    pub fn on_open(&mut self) -> Request {
        self.set_state(ConnectionState::Open);
        self.core.last_error = None;
        self.publisher.publish(&self.core);
        Request::Stats
    }

    pub fn on_frame(&mut self, raw: &str) -> FrameOutcome {
        self.on_frame_bytes(raw.as_bytes())
    }

    pub fn on_frame_bytes(&mut self, raw: &[u8]) -> FrameOutcome {
        let outcome = match decode_frame(raw) {
            Ok(Frame::Stats(stats)) => {
                let snap = normalize_snapshot(stats);
                debug!(processes = snap.processes.len(), "applying stats snapshot");
                self.core.apply_snapshot(snap);
                FrameOutcome::Applied
            }
            Ok(Frame::Other(kind)) => {
                debug!(%kind, "ignoring frame of unknown kind");
                self.core.counters.ignored += 1;
                FrameOutcome::Ignored(kind)
            }
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                self.core.counters.dropped += 1;
                self.core.last_error = Some(e.to_string());
                FrameOutcome::Dropped(e)
            }
        };
        self.publisher.publish(&self.core);
        outcome
    }

    /// Poll gate: a request only while the connection is open. Nothing is queued.
    pub fn tick(&self) -> Option<Request> {
        (self.core.connection == ConnectionState::Open).then_some(Request::Stats)
    }

    pub fn on_close(&mut self) {
        self.set_state(ConnectionState::Closed);
        self.publisher.publish(&self.core);
    }

    pub fn on_error(&mut self, err: &dyn Display) {
        warn!(error = %err, "transport error");
        self.set_state(ConnectionState::Errored);
        self.core.last_error = Some(err.to_string());
        self.publisher.publish(&self.core);
    }

    pub fn request_sort(&mut self, column: ProcessColumn) {
        self.core.sort(column);
        self.publisher.publish(&self.core);
    }

    pub fn toggle_view(&mut self) {
        self.core.toggle_view();
        self.publisher.publish(&self.core);
    }
}

// ---------- Async driver ----------

/// Owner-side handle to a running session task.
pub struct SessionHandle {
    intents: mpsc::Sender<Intent>,
    view: ViewReceiver,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn view(&self) -> ViewReceiver {
        self.view.clone()
    }

    pub fn intents(&self) -> mpsc::Sender<Intent> {
        self.intents.clone()
    }

    /// Queue an intent without waiting. Returns false if the queue is full or the
    /// session has ended.
    pub fn send(&self, intent: Intent) -> bool {
        match self.intents.try_send(intent) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(intent)) => {
                warn!(?intent, "intent queue full, dropping intent");
                false
            }
            Err(mpsc::error::TrySendError::Closed(intent)) => {
                debug!(?intent, "session ended, dropping intent");
                false
            }
        }
    }

    /// Stop the session: a pending handshake is abandoned, the socket is closed and the
    /// poll timer dropped before this returns. Other intent senders still alive must be
    /// dropped by their owners.
    pub async fn shutdown(self) {
        let SessionHandle { intents, task, .. } = self;
        drop(intents);
        let _ = task.await;
    }
}

pub fn spawn_session(config: ClientConfig) -> SessionHandle {
    let (session, view) = Session::new(config.url.clone());
    let (tx, rx) = mpsc::channel(32);
    let driver = Driver {
        session,
        conn: None,
        connecting: None,
        config,
    };
    let task = tokio::spawn(driver.run(rx));
    SessionHandle {
        intents: tx,
        view,
        task,
    }
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<WsStream, TransportError>> + Send>>;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

struct Driver {
    session: Session,
    conn: Option<WsStream>,
    /// In-flight handshake. Polled from the select loop so intents keep flowing.
    connecting: Option<ConnectFuture>,
    config: ClientConfig,
}

impl Driver {
    async fn run(mut self, mut intents: mpsc::Receiver<Intent>) {
        self.connect().await;

        let period = self.config.poll_interval;
        // first request is sent eagerly on open
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    None => break,
                    Some(Intent::Reconnect) => self.connect().await,
                    Some(Intent::Sort(column)) => self.session.request_sort(column),
                    Some(Intent::ToggleView) => self.session.toggle_view(),
                },
                res = pending_connect(&mut self.connecting) => self.on_connected(res).await,
                _ = ticker.tick() => {
                    if let Some(req) = self.session.tick() {
                        self.send(req).await;
                    }
                }
                msg = next_message(&mut self.conn) => self.on_message(msg),
            }
        }

        // dropping an unfinished handshake cancels it
        self.connecting = None;
        self.close().await;
        info!("session stopped");
    }

    /// Start a handshake. At most one live or pending connection: any existing one is
    /// closed or abandoned first.
    async fn connect(&mut self) {
        self.close().await;
        self.session.begin_connect();
        let url = self.config.url.clone();
        let tls_ca = self.config.tls_ca.clone();
        let limit = self.config.connect_timeout;
        self.connecting = Some(Box::pin(async move {
            match timeout(limit, ws::connect(&url, tls_ca.as_deref())).await {
                Ok(res) => res,
                Err(_) => Err(TransportError::ConnectTimeout(limit)),
            }
        }));
    }

    async fn on_connected(&mut self, res: Result<WsStream, TransportError>) {
        self.connecting = None;
        match res {
            Ok(stream) => {
                self.conn = Some(stream);
                let req = self.session.on_open();
                self.send(req).await;
            }
            Err(e) => self.session.on_error(&e),
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.conn.take() {
            if timeout(CLOSE_TIMEOUT, stream.close(None)).await.is_err() {
                debug!("close handshake timed out, dropping socket");
            }
            self.session.on_close();
        }
    }

    async fn send(&mut self, req: Request) {
        let Some(stream) = self.conn.as_mut() else {
            return;
        };
        if let Err(e) = ws::send_request(stream, req).await {
            self.conn = None;
            self.session.on_error(&e);
        }
    }

    fn on_message(&mut self, msg: Option<Result<Message, tungstenite::Error>>) {
        match msg {
            Some(Ok(Message::Text(text))) => {
                self.session.on_frame(&text);
            }
            Some(Ok(Message::Binary(data))) => {
                self.session.on_frame_bytes(&data);
            }
            Some(Ok(Message::Close(_))) | None => {
                self.conn = None;
                self.session.on_close();
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                self.conn = None;
                self.session.on_error(&e);
            }
        }
    }
}

async fn pending_connect(
    connecting: &mut Option<ConnectFuture>,
) -> Result<WsStream, TransportError> {
    match connecting {
        Some(fut) => fut.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_message(
    conn: &mut Option<WsStream>,
) -> Option<Result<Message, tungstenite::Error>> {
    match conn {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
