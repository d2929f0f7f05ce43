//! # Crisis Survival Client
//!
//! Transport-agnostic Rust client for the Crisis Survival real-time party game.
//!
//! The crate is split into a pure core and an async shell:
//!
//! - [`session::SessionMachine`] consumes server events, user intents and link
//!   notifications and returns [`Action`]s. It never performs I/O.
//! - [`lifecycle::ConnectionLifecycle`] tracks the single connection a session
//!   may own and tells intentional closes from failures.
//! - [`CrisisClient`] runs the machine on a background task, drives the
//!   transport and timers, and streams [`RenderInstruction`]s to the view.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement [`Connector`] and [`Transport`] for any backend
//! - **Forward compatible**: unknown server event tags are logged and dropped
//! - **WebSocket built-in**: the default `transport-websocket` feature provides
//!   `WebSocketConnector`
//! - **Headless-friendly**: render instructions are declarative data
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crisis_survival_client::{ClientConfig, CrisisClient, TracingRenderer, WebSocketConnector};
//!
//! let (client, renders) = CrisisClient::start(
//!     WebSocketConnector,
//!     ClientConfig::new("ws://127.0.0.1:8000"),
//! );
//! client.enter_name("Alice")?;
//! client.start_solo()?;
//! crisis_survival_client::render::pump(renders, &mut TracingRenderer).await;
//! ```

pub mod action;
pub mod client;
pub mod codec;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod protocol;
pub mod render;
pub mod session;
pub mod state;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use action::Action;
pub use client::{ClientConfig, CrisisClient};
pub use diagnostic::Diagnostic;
pub use error::{ClientError, DecodeError};
pub use input::{LinkEvent, UserIntent};
pub use lifecycle::{ConnectionId, LinkState};
pub use protocol::{ClientMessage, Phase, ServerEvent};
pub use render::{RenderInstruction, Renderer, TracingRenderer};
pub use session::{SessionMachine, SessionSettings};
pub use state::{Mode, Screen, SessionView};
pub use transport::{Connector, Transport};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
