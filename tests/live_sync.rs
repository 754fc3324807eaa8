//! End-to-end tests against a real listener

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use employee_sync::{EmployeeServer, ServerConfig, SyncConfig};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

async fn start(sync: SyncConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig::with_addr(addr).sync(sync);
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let server = EmployeeServer::new(config);
        server
            .serve(listener, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });

    TestServer {
        addr,
        _shutdown: tx,
    }
}

fn quiet_sync() -> SyncConfig {
    // Long interval keeps the timer out of the way
    SyncConfig::default().insert_interval(Duration::from_secs(3600))
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

async fn next_event(client: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_event(client: &mut Client, name: &str) -> Value {
    let value = next_event(client).await;
    assert_eq!(value["event"], name, "unexpected frame: {value}");
    value["data"].clone()
}

async fn send(client: &mut Client, json: &str) {
    client.send(Message::Text(json.to_string())).await.unwrap();
}

async fn handshake(client: &mut Client) -> (Value, Value) {
    let snapshot = expect_event(client, "initialSnapshot").await;
    let count = expect_event(client, "syncCount").await;
    (snapshot, count)
}

#[tokio::test]
async fn test_connect_receives_snapshot_and_count() {
    let server = start(quiet_sync()).await;
    let mut client = connect(server.addr).await;

    let (snapshot, count) = handshake(&mut client).await;
    assert_eq!(snapshot["page"], 1);
    assert_eq!(snapshot["total"], 10);
    assert_eq!(snapshot["records"].as_array().unwrap().len(), 10);
    assert_eq!(snapshot["hasMore"], false);
    assert_eq!(count["total"], 10);
    assert_eq!(count["totalPages"], 1);
}

#[tokio::test]
async fn test_out_of_range_page_is_empty() {
    let server = start(quiet_sync().page_size(5)).await;
    let mut client = connect(server.addr).await;
    handshake(&mut client).await;

    send(&mut client, r#"{"event":"requestPage","data":99}"#).await;
    let page = expect_event(&mut client, "pageData").await;
    assert_eq!(page["page"], 99);
    assert_eq!(page["records"].as_array().unwrap().len(), 0);
    assert_eq!(page["hasMore"], false);
    assert_eq!(page["totalPages"], 2);
}

#[tokio::test]
async fn test_add_reaches_every_viewer_then_hits_limit() {
    let server = start(quiet_sync()).await;
    let mut first = connect(server.addr).await;
    handshake(&mut first).await;
    let mut second = connect(server.addr).await;
    handshake(&mut second).await;

    send(&mut first, r#"{"event":"addRecords","data":15}"#).await;
    for client in [&mut first, &mut second] {
        let added = expect_event(client, "recordsAdded").await;
        assert_eq!(added["added"], 10);
        assert_eq!(added["total"], 20);
        assert_eq!(added["totalPages"], 2);
        assert_eq!(added["message"], "Added 10 new employees");
    }

    send(&mut second, r#"{"event":"addRecords","data":5}"#).await;
    let limit = expect_event(&mut second, "recordsAdded").await;
    assert_eq!(limit["added"], 0);
    assert_eq!(limit["message"], "Maximum employee limit reached");

    // The limit reply is private; the first viewer sees the next page reply
    send(&mut first, r#"{"event":"requestPage","data":1}"#).await;
    let page = expect_event(&mut first, "pageData").await;
    assert_eq!(page["total"], 20);
}

#[tokio::test]
async fn test_delete_is_broadcast_once() {
    let server = start(quiet_sync()).await;
    let mut first = connect(server.addr).await;
    let (snapshot, _) = handshake(&mut first).await;
    let mut second = connect(server.addr).await;
    handshake(&mut second).await;

    let id = snapshot["records"][0]["id"].as_str().unwrap().to_string();
    let delete = format!(r#"{{"event":"deleteRecord","data":"{id}"}}"#);

    send(&mut second, &delete).await;
    for client in [&mut first, &mut second] {
        let deleted = expect_event(client, "recordDeleted").await;
        assert_eq!(deleted["id"], id.as_str());
        assert_eq!(deleted["total"], 9);
        assert_eq!(deleted["message"], "Employee deleted");
    }

    // Second delete of the same id is silent
    send(&mut second, &delete).await;
    send(&mut second, r#"{"event":"requestPage","data":1}"#).await;
    let page = expect_event(&mut second, "pageData").await;
    assert_eq!(page["total"], 9);
}

#[tokio::test]
async fn test_timer_inserts_while_watched() {
    let sync = SyncConfig::default()
        .initial_records(0)
        .insert_interval(Duration::from_millis(50));
    let server = start(sync).await;
    let mut client = connect(server.addr).await;
    handshake(&mut client).await;

    let inserted = expect_event(&mut client, "recordInserted").await;
    assert!(inserted["record"]["id"].is_string());
    assert_eq!(inserted["total"], 1);
    assert_eq!(inserted["totalPages"], 1);
}

#[tokio::test]
async fn test_health_over_plain_http() {
    let server = start(quiet_sync()).await;
    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("application/json"));
    assert!(response.contains(r#""status":"ok""#));
    assert!(response.contains(r#""records":10"#));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = start(quiet_sync()).await;
    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket
        .write_all(b"GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
}
