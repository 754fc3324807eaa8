//! Request routing

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::Full;
use tokio::sync::Semaphore;

use crate::sync::HubHandle;

use super::config::ServerConfig;
use super::{health, upgrade};

/// State shared by every request handler
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub hub: HubHandle,
    /// Free viewer slots, when `max_connections` is set
    pub session_limit: Option<Arc<Semaphore>>,
}

/// Route one HTTP request
///
/// `GET /health` reports status, the WebSocket path upgrades, everything else
/// is a 404.
pub async fn route<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();

    if path == "/health" {
        let is_get = req.method() == Method::GET;
        return if is_get {
            health::respond(&state).await
        } else {
            text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        };
    }

    if path == state.config.ws_path {
        return upgrade::accept(req, peer_addr, state);
    }

    tracing::debug!(peer = %peer_addr, path = %path, "Unknown path");
    text_response(StatusCode::NOT_FOUND, "not found")
}

/// Plain-text response
pub fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", Bytes::from(body.to_string()))
}

/// JSON response from pre-encoded bytes
pub fn json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    response(status, "application/json", body)
}

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use http_body_util::BodyExt;

    use super::*;
    use crate::record::FakeGenerator;
    use crate::sync::Hub;

    fn peer() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 60000)
    }

    fn state() -> Arc<ServerState> {
        let config = ServerConfig::default();
        let (hub, handle) = Hub::new(&config.sync, FakeGenerator::seeded(4));
        hub.spawn();
        Arc::new(ServerState {
            config: Arc::new(config),
            hub: handle,
            session_limit: None,
        })
    }

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = route(get("/nope"), peer(), state()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_ok() {
        let response = route(get("/health"), peer(), state()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["port"], 3000);
        assert_eq!(json["environment"], "development");
        assert_eq!(json["records"], 10);
    }

    #[tokio::test]
    async fn test_health_wrong_method() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/health")
            .body(())
            .unwrap();
        let response = route(req, peer(), state()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_ws_path_without_upgrade_is_400() {
        let response = route(get("/ws"), peer(), state()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ws_disallowed_origin_is_403() {
        let req = Request::builder()
            .uri("/ws")
            .header(header::UPGRADE, "websocket")
            .header(header::CONNECTION, "Upgrade")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
            .header(header::ORIGIN, "https://evil.example")
            .body(())
            .unwrap();

        let response = route(req, peer(), state()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ws_session_limit_is_503() {
        let mut state = (*state()).clone();
        state.session_limit = Some(Arc::new(Semaphore::new(0)));

        let req = Request::builder()
            .uri("/ws")
            .header(header::UPGRADE, "websocket")
            .header(header::CONNECTION, "Upgrade")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
            .body(())
            .unwrap();

        let response = route(req, peer(), Arc::new(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
