//! Inputs to the session state machine other than server events.
//!
//! [`UserIntent`]s come from the view layer. [`LinkEvent`]s come from the
//! runtime: what the transport did and which timer fired, each tagged with the
//! connection it concerns.

use crate::lifecycle::ConnectionId;

/// A request from the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Set the display name. Only honoured while no connection is live.
    EnterName(String),
    /// Connect and start a game against bots.
    StartSolo,
    /// Connect and join the matchmaking queue.
    StartMatching,
    /// Leave the matching screen.
    CancelMatching,
    /// Pick the keyword at this index of the offered options.
    ChooseKeyword(usize),
    /// Try to grab the item at this slot index.
    GrabItem(usize),
    /// Ask to leave the running game. Needs [`UserIntent::ConfirmExit`].
    RequestExit,
    /// Confirm a pending exit request.
    ConfirmExit,
    /// Withdraw a pending exit request.
    DismissExit,
    /// Leave the finished game and return home.
    PlayAgain,
}

/// A notification from the runtime about the connection or a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The transport for this connection opened.
    Opened(ConnectionId),
    /// The connector gave up before the transport opened.
    ConnectFailed(ConnectionId),
    /// The open transport closed or errored.
    Closed(ConnectionId),
    /// The handshake deadline for this connection passed.
    HandshakeTimeout(ConnectionId),
    /// One second of the matching countdown elapsed.
    CountdownTick,
}
