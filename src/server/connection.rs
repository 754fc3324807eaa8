//! Per-viewer connection task
//!
//! Decodes client frames and forwards them to the hub, and drains the
//! viewer's outbound queue onto the socket. Ends when either side closes.

use std::net::SocketAddr;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::Result;
use crate::protocol::ClientMessage;
use crate::sync::HubHandle;

/// One connected viewer
pub struct Connection {
    peer_addr: SocketAddr,
    hub: HubHandle,
    outbound_capacity: usize,
}

impl Connection {
    /// Create a connection for an upgraded socket
    pub fn new(peer_addr: SocketAddr, hub: HubHandle, outbound_capacity: usize) -> Self {
        Self {
            peer_addr,
            hub,
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// Run the session until the socket or the hub goes away
    ///
    /// The session is always unregistered from the hub on return.
    pub async fn run<S>(self, ws: WebSocketStream<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (tx, mut outbound) = mpsc::channel::<Bytes>(self.outbound_capacity);
        let session = self.hub.connect(self.peer_addr, tx).await?;
        let (mut sink, mut stream) = ws.split();

        let result: Result<()> = async {
            loop {
                tokio::select! {
                    frame = outbound.recv() => match frame {
                        Some(frame) => {
                            // tungstenite owns its text payload, so each viewer copies once here
                            let text = String::from_utf8_lossy(&frame).into_owned();
                            sink.send(Message::Text(text)).await?;
                        }
                        // Hub dropped this session
                        None => return Ok(()),
                    },
                    incoming = stream.next() => match incoming {
                        Some(Ok(Message::Text(text))) => match ClientMessage::from_json(&text) {
                            Ok(message) => self.hub.dispatch(session, message).await?,
                            Err(e) => {
                                tracing::warn!(
                                    session_id = %session,
                                    error = %e,
                                    "Ignoring client frame"
                                );
                            }
                        },
                        Some(Ok(Message::Ping(payload))) => {
                            sink.send(Message::Pong(payload)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = sink.close().await;
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    },
                }
            }
        }
        .await;

        // Hub may already be gone during shutdown
        let _ = self.hub.disconnect(session).await;

        result
    }
}
