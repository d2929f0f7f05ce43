//! Connection lifecycle manager.
//!
//! Tracks the single connection a session may own through
//! `idle → connecting → open → closed`, and classifies every close as
//! intentional (user-initiated, silent) or unintentional (network failure,
//! surfaced to the user).
//!
//! This module is pure bookkeeping: it never touches a socket or a clock. The
//! runtime reports what the transport did, tagged with the [`ConnectionId`] it
//! was issued for, and reports from superseded connections are rejected.

use std::fmt;

use uuid::Uuid;

/// Identifies one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh, never-reused id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the session's connection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No connection has been requested yet.
    #[default]
    Idle,
    /// A connect is in flight and the handshake deadline is armed.
    Connecting(ConnectionId),
    /// The transport is open.
    Open(ConnectionId),
    /// The last connection has been torn down.
    Closed,
}

impl LinkState {
    /// The live connection, if one is connecting or open.
    pub fn live(self) -> Option<ConnectionId> {
        match self {
            Self::Connecting(id) | Self::Open(id) => Some(id),
            Self::Idle | Self::Closed => None,
        }
    }
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// Preceded by a user-initiated close; nothing to surface.
    Intentional,
    /// The transport went away on its own.
    Unintentional,
}

/// State machine for the session's one connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLifecycle {
    state: LinkState,
    intentional_close: bool,
}

impl ConnectionLifecycle {
    /// A lifecycle in the `idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// `true` while the transport is open.
    pub fn is_open(&self) -> bool {
        matches!(self.state, LinkState::Open(_))
    }

    /// The connection that is connecting or open, if any.
    pub fn live(&self) -> Option<ConnectionId> {
        self.state.live()
    }

    /// Begin connection attempt `id`.
    ///
    /// Any connection still live is closed intentionally first and returned so
    /// the caller can tear down its transport.
    pub fn begin(&mut self, id: ConnectionId) -> Option<ConnectionId> {
        let superseded = self.close_intentionally();
        self.state = LinkState::Connecting(id);
        superseded
    }

    /// The transport for `id` opened. Returns `false` (and changes nothing)
    /// if `id` is not the connection currently connecting.
    pub fn on_open(&mut self, id: ConnectionId) -> bool {
        if self.state == LinkState::Connecting(id) {
            self.state = LinkState::Open(id);
            true
        } else {
            false
        }
    }

    /// The handshake deadline for `id` passed.
    ///
    /// Returns `true` if `id` was still connecting; the pending handle is then
    /// closed intentionally. A deadline for an opened or superseded connection
    /// returns `false`, so one attempt never yields both open and timeout.
    pub fn on_handshake_timeout(&mut self, id: ConnectionId) -> bool {
        if self.state != LinkState::Connecting(id) {
            return false;
        }
        self.close_intentionally();
        true
    }

    /// Close the live connection on the user's behalf.
    ///
    /// Raises the intentional flag and immediately consumes it. Returns the
    /// connection to tear down, or `None` when nothing was live (the flag is
    /// then left untouched, so it cannot leak onto a later connection).
    pub fn close_intentionally(&mut self) -> Option<ConnectionId> {
        let id = self.live()?;
        self.intentional_close = true;
        let kind = self.on_closed(id);
        debug_assert_eq!(kind, Some(CloseKind::Intentional));
        Some(id)
    }

    /// The transport for `id` closed or failed.
    ///
    /// Returns how the close is classified, or `None` when `id` is not the
    /// live connection (a late report from a superseded handle). The
    /// intentional flag is single-use: it is cleared by the close it explains.
    pub fn on_closed(&mut self, id: ConnectionId) -> Option<CloseKind> {
        if self.live() != Some(id) {
            return None;
        }
        self.state = LinkState::Closed;
        if std::mem::take(&mut self.intentional_close) {
            Some(CloseKind::Intentional)
        } else {
            Some(CloseKind::Unintentional)
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let lifecycle = ConnectionLifecycle::new();
        assert_eq!(lifecycle.state(), LinkState::Idle);
        assert!(lifecycle.live().is_none());
    }

    #[test]
    fn connect_then_open() {
        let mut lifecycle = ConnectionLifecycle::new();
        let id = ConnectionId::new();
        assert!(lifecycle.begin(id).is_none());
        assert_eq!(lifecycle.state(), LinkState::Connecting(id));
        assert!(lifecycle.on_open(id));
        assert!(lifecycle.is_open());
    }

    #[test]
    fn begin_supersedes_live_connection() {
        let mut lifecycle = ConnectionLifecycle::new();
        let first = ConnectionId::new();
        lifecycle.begin(first);
        lifecycle.on_open(first);

        let second = ConnectionId::new();
        assert_eq!(lifecycle.begin(second), Some(first));
        assert_eq!(lifecycle.state(), LinkState::Connecting(second));

        // The old handle's close report arrives late and is ignored.
        assert_eq!(lifecycle.on_closed(first), None);
        assert_eq!(lifecycle.state(), LinkState::Connecting(second));
    }

    #[test]
    fn unexpected_close_is_unintentional() {
        let mut lifecycle = ConnectionLifecycle::new();
        let id = ConnectionId::new();
        lifecycle.begin(id);
        lifecycle.on_open(id);
        assert_eq!(lifecycle.on_closed(id), Some(CloseKind::Unintentional));
        assert_eq!(lifecycle.state(), LinkState::Closed);
    }

    #[test]
    fn intentional_flag_is_single_use() {
        let mut lifecycle = ConnectionLifecycle::new();
        let first = ConnectionId::new();
        lifecycle.begin(first);
        lifecycle.on_open(first);
        assert_eq!(lifecycle.close_intentionally(), Some(first));

        let second = ConnectionId::new();
        lifecycle.begin(second);
        lifecycle.on_open(second);
        assert_eq!(lifecycle.on_closed(second), Some(CloseKind::Unintentional));
    }

    #[test]
    fn intentional_close_without_live_connection_leaves_no_flag() {
        let mut lifecycle = ConnectionLifecycle::new();
        assert!(lifecycle.close_intentionally().is_none());

        let id = ConnectionId::new();
        lifecycle.begin(id);
        lifecycle.on_open(id);
        assert_eq!(lifecycle.on_closed(id), Some(CloseKind::Unintentional));
    }

    #[test]
    fn timeout_and_open_are_mutually_exclusive() {
        let mut lifecycle = ConnectionLifecycle::new();
        let id = ConnectionId::new();
        lifecycle.begin(id);
        assert!(lifecycle.on_handshake_timeout(id));
        assert!(!lifecycle.on_open(id));
        assert_eq!(lifecycle.state(), LinkState::Closed);

        let late = ConnectionId::new();
        lifecycle.begin(late);
        assert!(lifecycle.on_open(late));
        assert!(!lifecycle.on_handshake_timeout(late));
        assert!(lifecycle.is_open());
    }

    #[test]
    fn timeout_for_superseded_attempt_is_ignored() {
        let mut lifecycle = ConnectionLifecycle::new();
        let stale = ConnectionId::new();
        lifecycle.begin(stale);
        let fresh = ConnectionId::new();
        lifecycle.begin(fresh);
        assert!(!lifecycle.on_handshake_timeout(stale));
        assert_eq!(lifecycle.state(), LinkState::Connecting(fresh));
    }
}
