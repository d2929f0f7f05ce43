//! User-facing connectivity diagnostics.
//!
//! Each variant is a failure the player must act on (usually by checking the
//! server and pressing start again). Decode errors, stale events and dropped
//! intents are deliberately absent: those are logged, never shown.

use thiserror::Error;

const HANDSHAKE_TIMEOUT: &str = "Connection timed out. Make sure the game server is running and reachable, then press start to try again.";
const CONNECT_FAILED: &str =
    "Could not reach the game server. Make sure it is running, then press start to try again.";
const UNINTENTIONAL_DISCONNECT: &str =
    "Connection lost. Make sure the game server is still running, then press start to try again.";

/// A connectivity failure surfaced on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Diagnostic {
    /// The transport did not open before the handshake deadline.
    #[error("{}", HANDSHAKE_TIMEOUT)]
    HandshakeTimeout,
    /// The transport could not be opened at all.
    #[error("{}", CONNECT_FAILED)]
    ConnectFailed,
    /// The transport closed or failed without the user asking for it.
    #[error("{}", UNINTENTIONAL_DISCONNECT)]
    UnintentionalDisconnect,
}

impl Diagnostic {
    /// The message shown to the player, including what to do next.
    pub fn message(&self) -> &'static str {
        match self {
            Self::HandshakeTimeout => HANDSHAKE_TIMEOUT,
            Self::ConnectFailed => CONNECT_FAILED,
            Self::UnintentionalDisconnect => UNINTENTIONAL_DISCONNECT,
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
    fn every_diagnostic_tells_the_player_to_retry() {
        for diagnostic in [
            Diagnostic::HandshakeTimeout,
            Diagnostic::ConnectFailed,
            Diagnostic::UnintentionalDisconnect,
        ] {
            assert!(diagnostic.message().contains("try again"));
            assert_eq!(diagnostic.to_string(), diagnostic.message());
        }
    }
}
