// SPDX-License-Identifier: MIT OR Apache-2.0
//! The session boundary for multiplayer nodes.
//!
//! The engine never opens sockets. Networking nodes emit send intents
//! through a [`SessionLink`] and observe received intents drained at the
//! start of each tick; the transport behind the link is an external
//! collaborator. Send failures surface as a failed `Ok` output on the
//! sending node, never as an engine error.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Who a message is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageScope {
    /// Every connected peer
    Broadcast,
    /// One peer, by identifier
    Direct(String),
}

/// A message the engine wants delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Addressing
    pub scope: MessageScope,
    /// Application-level message type tag
    pub message_type: String,
    /// Opaque payload
    pub payload: String,
}

/// A message delivered to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Sending peer identifier
    pub sender: String,
    /// Application-level message type tag
    pub message_type: String,
    /// Opaque payload
    pub payload: String,
}

/// Transport-level failure reported by a session link
#[derive(Debug, thiserror::Error)]
pub enum TransportFault {
    /// No session is connected
    #[error("no session connected")]
    NotConnected,
    /// The transport rejected the send
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Abstract transport the engine talks to.
///
/// Implementations must not block: `send` queues or fails immediately,
/// `poll` returns whatever has already arrived.
pub trait SessionLink {
    /// Hand a message to the transport
    fn send(&mut self, message: OutgoingMessage) -> Result<(), TransportFault>;

    /// Drain messages received since the last poll
    fn poll(&mut self) -> Vec<IncomingMessage>;

    /// Number of peers in the session, including the local player
    fn peer_count(&self) -> u32 {
        1
    }
}

/// Session link for offline play: every send fails, nothing arrives
#[derive(Debug, Default)]
pub struct NullSession;

impl SessionLink for NullSession {
    fn send(&mut self, _message: OutgoingMessage) -> Result<(), TransportFault> {
        Err(TransportFault::NotConnected)
    }

    fn poll(&mut self) -> Vec<IncomingMessage> {
        Vec::new()
    }
}

/// In-memory session for tests: records sends and lets the test inject
/// incoming messages. The send log lives behind a shared handle so it
/// stays observable after the link is boxed into an engine.
#[derive(Debug, Default)]
pub struct LoopbackSession {
    sent: Rc<RefCell<Vec<OutgoingMessage>>>,
    inbox: VecDeque<IncomingMessage>,
    peers: u32,
}

impl LoopbackSession {
    /// Create a loopback session reporting `peers` connected peers
    pub fn new(peers: u32) -> Self {
        Self {
            sent: Rc::default(),
            inbox: VecDeque::new(),
            peers,
        }
    }

    /// Handle onto everything sent through this link, in order
    pub fn sent(&self) -> Rc<RefCell<Vec<OutgoingMessage>>> {
        Rc::clone(&self.sent)
    }

    /// Queue a message for the engine to receive on its next tick
    pub fn push_incoming(&mut self, message: IncomingMessage) {
        self.inbox.push_back(message);
    }
}

impl SessionLink for LoopbackSession {
    fn send(&mut self, message: OutgoingMessage) -> Result<(), TransportFault> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }

    fn poll(&mut self) -> Vec<IncomingMessage> {
        self.inbox.drain(..).collect()
    }

    fn peer_count(&self) -> u32 {
        self.peers.max(1)
    }
}
