//! WebSocket upgrade handling

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::WebSocketStream;

use super::connection::Connection;
use super::routes::{text_response, ServerState};

/// Reasons an upgrade request is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeError {
    /// Request is not a well-formed WebSocket upgrade
    #[error("invalid WebSocket upgrade request: {0}")]
    Invalid(&'static str),

    /// Origin is not allowed
    #[error("origin not allowed: {0}")]
    OriginRejected(String),
}

impl UpgradeError {
    fn status(&self) -> StatusCode {
        match self {
            UpgradeError::Invalid(_) => StatusCode::BAD_REQUEST,
            UpgradeError::OriginRejected(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Validate upgrade headers and return the `Sec-WebSocket-Key`
pub fn validate_upgrade_request(
    method: &Method,
    headers: &HeaderMap,
) -> Result<String, UpgradeError> {
    if method != Method::GET {
        return Err(UpgradeError::Invalid("method must be GET"));
    }

    let upgrade = header_str(headers, header::UPGRADE)
        .ok_or(UpgradeError::Invalid("missing Upgrade header"))?;
    if !upgrade.eq_ignore_ascii_case("websocket") {
        return Err(UpgradeError::Invalid("Upgrade header must be 'websocket'"));
    }

    let connection = header_str(headers, header::CONNECTION)
        .ok_or(UpgradeError::Invalid("missing Connection header"))?;
    if !connection
        .split(',')
        .any(|s| s.trim().eq_ignore_ascii_case("upgrade"))
    {
        return Err(UpgradeError::Invalid("Connection header must contain 'Upgrade'"));
    }

    let version = header_str(headers, header::SEC_WEBSOCKET_VERSION)
        .ok_or(UpgradeError::Invalid("missing Sec-WebSocket-Version header"))?;
    if version != "13" {
        return Err(UpgradeError::Invalid("Sec-WebSocket-Version must be 13"));
    }

    header_str(headers, header::SEC_WEBSOCKET_KEY)
        .map(str::to_string)
        .ok_or(UpgradeError::Invalid("missing Sec-WebSocket-Key header"))
}

/// Answer an upgrade request and start the session once hyper hands over the socket
pub fn accept<B>(
    mut req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>> {
    let key = match validate_upgrade_request(req.method(), req.headers()) {
        Ok(key) => key,
        Err(e) => return reject(peer_addr, e),
    };

    let origin = header_str(req.headers(), header::ORIGIN);
    if !state.config.origins.allows(origin) {
        let origin = origin.unwrap_or_default().to_string();
        return reject(peer_addr, UpgradeError::OriginRejected(origin));
    }

    // Viewer limit: the permit lives as long as the session
    let permit = match &state.session_limit {
        Some(limit) => match Arc::clone(limit).try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                return text_response(StatusCode::SERVICE_UNAVAILABLE, "connection limit reached");
            }
        },
        None => None,
    };

    let on_upgrade = hyper::upgrade::on(&mut req);

    tokio::spawn(async move {
        let _permit = permit;

        match on_upgrade.await {
            Ok(upgraded) => {
                let ws = WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None)
                    .await;
                let connection = Connection::new(
                    peer_addr,
                    state.hub.clone(),
                    state.config.outbound_capacity,
                );

                if let Err(e) = connection.run(ws).await {
                    tracing::debug!(peer = %peer_addr, error = %e, "Connection error");
                }
            }
            Err(e) => {
                tracing::error!(peer = %peer_addr, error = %e, "WebSocket upgrade failed");
            }
        }
    });

    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    let headers = response.headers_mut();
    headers.insert(header::UPGRADE, HeaderValue::from_static("websocket"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("Upgrade"));
    if let Ok(accept) = HeaderValue::from_str(&derive_accept_key(key.as_bytes())) {
        headers.insert(header::SEC_WEBSOCKET_ACCEPT, accept);
    }
    response
}

fn reject(peer_addr: SocketAddr, error: UpgradeError) -> Response<Full<Bytes>> {
    tracing::warn!(peer = %peer_addr, error = %error, "WebSocket upgrade rejected");
    text_response(error.status(), &error.to_string())
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
