//! Instructions produced by the session state machine.
//!
//! The machine never performs I/O. Each input yields a list of [`Action`]s,
//! executed in order by the runtime in [`crate::client`].

use crate::lifecycle::ConnectionId;
use crate::protocol::ClientMessage;
use crate::render::RenderInstruction;

/// Side effects for the runtime to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open a new connection and arm its handshake deadline.
    Connect {
        connection: ConnectionId,
        url: String,
    },
    /// Send an intent over the open connection. Dropped if it is not open.
    Send(ClientMessage),
    /// Tear down this connection, pending or open, and disarm its deadline.
    Close { connection: ConnectionId },
    /// Start the one-second matching countdown timer.
    StartCountdown,
    /// Cancel the matching countdown timer.
    StopCountdown,
    /// Hand an instruction to the view layer.
    Render(RenderInstruction),
}

impl From<RenderInstruction> for Action {
    fn from(instruction: RenderInstruction) -> Self {
        Self::Render(instruction)
    }
}
