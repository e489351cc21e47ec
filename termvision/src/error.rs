//! Error types for frame decoding and the WebSocket transport.

use thiserror::Error;

/// A frame that could not be turned into a snapshot. Always recovered locally:
/// the frame is dropped and the published view stays as it was.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is not a [kind, payload] pair")]
    NotAFrame,

    #[error("stats payload is not a list")]
    PayloadNotAList,

    #[error("stats payload has {found} of {expected} elements")]
    MissingElements { expected: usize, found: usize },

    #[error("stats payload element `{element}` is malformed: {source}")]
    Element {
        element: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection-level failures. These change the connection state, never crash the client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint `{0}`")]
    Endpoint(String),

    #[error("failed to load TLS CA `{path}`: {reason}")]
    TlsCa { path: String, reason: String },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),
}
