//! Addressed outbound messages
//!
//! Sync handlers return `Vec<Outbound>` instead of writing to sockets
//! themselves; the hub delivers them through the session registry.

use crate::session::SessionId;

use super::message::ServerMessage;

/// Who receives an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Only the given viewer
    Session(SessionId),
    /// Every connected viewer
    All,
}

/// A server message together with its audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    /// Address a message to one viewer
    pub fn unicast(session: SessionId, message: ServerMessage) -> Self {
        Self {
            to: Recipient::Session(session),
            message,
        }
    }

    /// Address a message to every viewer
    pub fn broadcast(message: ServerMessage) -> Self {
        Self {
            to: Recipient::All,
            message,
        }
    }

    /// Check if this message fans out to every viewer
    pub fn is_broadcast(&self) -> bool {
        self.to == Recipient::All
    }
}
