//! The hub task
//!
//! Owns the store, the session registry and the insert timer, and applies
//! every event one at a time. Handlers compute outbound messages; the hub
//! encodes each message once and queues it on the addressed sessions.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::protocol::{ClientMessage, Outbound, Recipient};
use crate::record::RecordGenerator;
use crate::session::{Delivery, SessionId, SessionRegistry};
use crate::stats::{HubCounters, HubStats};

use super::config::SyncConfig;
use super::handler::SyncHandler;
use super::inserter::PeriodicInserter;

/// Event delivered to the hub
#[derive(Debug)]
pub enum Command {
    /// A viewer opened a WebSocket
    Connect {
        peer_addr: SocketAddr,
        outbound: mpsc::Sender<Bytes>,
        reply: oneshot::Sender<SessionId>,
    },
    /// A viewer went away
    Disconnect { session: SessionId },
    /// A decoded viewer message
    Message {
        session: SessionId,
        message: ClientMessage,
    },
    /// Snapshot of hub statistics
    Stats { reply: oneshot::Sender<HubStats> },
}

/// Cloneable handle for talking to the hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<Command>,
}

impl HubHandle {
    /// Register a viewer
    ///
    /// The connect snapshot is already queued on `outbound` when this returns.
    pub async fn connect(
        &self,
        peer_addr: SocketAddr,
        outbound: mpsc::Sender<Bytes>,
    ) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect {
            peer_addr,
            outbound,
            reply,
        })
        .await?;
        rx.await.map_err(|_| Error::HubClosed)
    }

    /// Unregister a viewer
    pub async fn disconnect(&self, session: SessionId) -> Result<()> {
        self.send(Command::Disconnect { session }).await
    }

    /// Forward a viewer message
    pub async fn dispatch(&self, session: SessionId, message: ClientMessage) -> Result<()> {
        self.send(Command::Message { session, message }).await
    }

    /// Fetch current statistics
    pub async fn stats(&self) -> Result<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stats { reply }).await?;
        rx.await.map_err(|_| Error::HubClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).await.map_err(|_| Error::HubClosed)
    }
}

/// Single owner of all shared state
pub struct Hub<G> {
    handler: SyncHandler<G>,
    registry: SessionRegistry,
    inserter: PeriodicInserter,
    counters: HubCounters,
    commands: mpsc::Receiver<Command>,
}

impl<G: RecordGenerator + 'static> Hub<G> {
    /// Create a hub and the handle used to reach it
    pub fn new(config: &SyncConfig, generator: G) -> (Self, HubHandle) {
        let (tx, commands) = mpsc::channel(config.command_capacity.max(1));

        let hub = Self {
            handler: SyncHandler::new(config, generator),
            registry: SessionRegistry::new(),
            inserter: PeriodicInserter::new(config.insert_interval),
            counters: HubCounters::new(),
            commands,
        };

        (hub, HubHandle { tx })
    }

    /// Spawn the hub on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until every handle has been dropped
    pub async fn run(mut self) {
        let mut ticker = self.inserter.ticker();

        tracing::info!(
            records = self.handler.store().len(),
            capacity = self.handler.store().capacity(),
            page_size = self.handler.page_size(),
            interval_ms = self.inserter.period().as_millis() as u64,
            "Sync hub started"
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.execute(command),
                    None => break,
                },
                _ = ticker.tick() => self.on_tick(),
            }
        }

        tracing::info!("Sync hub stopped");
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Connect {
                peer_addr,
                outbound,
                reply,
            } => {
                let session = self.registry.register(peer_addr, outbound);
                self.counters.total_connections += 1;

                tracing::info!(
                    session_id = %session,
                    peer = %peer_addr,
                    live = self.registry.live_count(),
                    "Client connected"
                );

                let out = self.handler.on_connect(session);
                self.deliver(out);

                if reply.send(session).is_err() {
                    // Connection task gave up before the reply arrived
                    self.registry.unregister(session);
                }
            }
            Command::Disconnect { session } => {
                if self.registry.unregister(session).is_some() {
                    tracing::info!(
                        session_id = %session,
                        live = self.registry.live_count(),
                        "Client disconnected"
                    );
                }
            }
            Command::Message { session, message } => {
                if self.registry.get(session).is_none() {
                    tracing::debug!(session_id = %session, "Message from unknown session ignored");
                    return;
                }
                tracing::debug!(session_id = %session, event = message.event(), "Client message");

                let out = self.handler.handle(session, message);
                self.deliver(out);
            }
            Command::Stats { reply } => {
                let store = self.handler.store();
                let stats =
                    self.counters
                        .snapshot(self.registry.live_count(), store.len(), store.capacity());
                let _ = reply.send(stats);
            }
        }
    }

    fn on_tick(&mut self) {
        let out = self
            .inserter
            .fire(self.registry.live_count(), &mut self.handler);

        if !out.is_empty() {
            self.counters.timer_inserts += 1;
        }
        self.deliver(out);
    }

    fn deliver(&mut self, outbound: Vec<Outbound>) {
        for Outbound { to, message } in outbound {
            let frame = match message.encode() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(event = message.event(), error = %e, "Failed to encode message");
                    continue;
                }
            };

            match to {
                Recipient::Session(session) => match self.registry.send_to(session, frame) {
                    Delivery::Queued => self.counters.unicasts += 1,
                    Delivery::Dropped => self.counters.dropped_frames += 1,
                    Delivery::Gone => {}
                },
                Recipient::All => {
                    let report = self.registry.broadcast(frame);
                    self.counters.broadcasts += 1;
                    self.counters.dropped_frames += report.dropped as u64;

                    tracing::debug!(
                        event = message.event(),
                        queued = report.queued,
                        dropped = report.dropped,
                        "Broadcast"
                    );
                }
            }
        }
    }
}
