//! Minimal WebSocket client helpers: connect (optionally trusting a custom CA) and send
//! request frames.

use std::{fs::File, io::BufReader, sync::Arc};

use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, connect_async_tls_with_config, tungstenite::Message, Connector,
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound request frames. `stats` is the only one the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Stats,
}

impl Request {
    pub fn as_str(self) -> &'static str {
        match self {
            Request::Stats => "stats",
        }
    }
}

pub fn parse_endpoint(url: &str) -> Result<Url, TransportError> {
    let parsed = Url::parse(url).map_err(|_| TransportError::Endpoint(url.to_string()))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(parsed),
        _ => Err(TransportError::Endpoint(url.to_string())),
    }
}

// Connect to the producer and return the WS stream
pub async fn connect(url: &str, tls_ca: Option<&str>) -> Result<WsStream, TransportError> {
    let endpoint = parse_endpoint(url)?;
    let ws = match tls_ca {
        Some(path) if endpoint.scheme() == "wss" => {
            let cfg = load_ca_config(path)?;
            let (ws, _) = connect_async_tls_with_config(
                endpoint.as_str(),
                None,
                false,
                Some(Connector::Rustls(Arc::new(cfg))),
            )
            .await?;
            ws
        }
        _ => {
            let (ws, _) = connect_async(endpoint.as_str()).await?;
            ws
        }
    };
    debug!(%endpoint, "websocket handshake complete");
    Ok(ws)
}

fn load_ca_config(path: &str) -> Result<rustls::ClientConfig, TransportError> {
    let fail = |reason: String| TransportError::TlsCa {
        path: path.to_string(),
        reason,
    };
    let file = File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(|e| fail(e.to_string()))?;
        roots.add(cert).map_err(|e| fail(e.to_string()))?;
    }
    if roots.is_empty() {
        return Err(fail("no certificates found".into()));
    }
    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}

// Send one request frame
pub async fn send_request(ws: &mut WsStream, req: Request) -> Result<(), TransportError> {
    ws.send(Message::Text(req.as_str().into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_websocket_url() {
        assert!(parse_endpoint("wss://localhost:8765/ws").is_ok());
        assert!(parse_endpoint("ws://127.0.0.1:1/ws").is_ok());
        assert!(matches!(
            parse_endpoint("http://localhost/ws"),
            Err(TransportError::Endpoint(_))
        ));
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn missing_ca_file_is_reported() {
        let err = load_ca_config("/definitely/not/here.pem").unwrap_err();
        assert!(matches!(err, TransportError::TlsCa { .. }));
    }

    #[test]
    fn stats_request_token() {
        assert_eq!(Request::Stats.as_str(), "stats");
    }
}
