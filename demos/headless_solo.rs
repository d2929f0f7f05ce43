//! # Headless Solo Example
//!
//! Plays one solo game of Crisis Survival without a UI:
//!
//! 1. Connect to a game server via WebSocket
//! 2. Start a solo game under a chosen name
//! 3. Pick the first keyword and grab the first free item each round
//! 4. Log every render instruction
//! 5. Shut down on Ctrl+C, on game over, or on a connectivity alert
//!
//! ## Running
//!
//! ```sh
//! # Start a Crisis Survival server on localhost:8000, then:
//! cargo run --example headless_solo
//!
//! # Override the server URL and player name:
//! CRISIS_SURVIVAL_URL=ws://my-server:8000 CRISIS_SURVIVAL_NAME=Alice \
//!     cargo run --example headless_solo
//! ```

use crisis_survival_client::{
    ClientConfig, CrisisClient, RenderInstruction, Renderer, TracingRenderer, WebSocketConnector,
};

/// Default server URL when `CRISIS_SURVIVAL_URL` is not set.
const DEFAULT_URL: &str = "ws://127.0.0.1:8000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("CRISIS_SURVIVAL_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let name = std::env::var("CRISIS_SURVIVAL_NAME").unwrap_or_default();
    tracing::info!("Playing solo against {url}");

    let config = ClientConfig::new(url);
    let (mut client, mut render_rx) = CrisisClient::start(WebSocketConnector, config);

    client.enter_name(name)?;
    client.start_solo()?;

    let mut renderer = TracingRenderer;
    let mut grabbed_this_round = false;

    // ── Render loop ─────────────────────────────────────────────────
    loop {
        tokio::select! {
            instruction = render_rx.recv() => {
                let Some(instruction) = instruction else {
                    tracing::info!("Render channel closed, exiting");
                    break;
                };
                renderer.render(&instruction);

                match instruction {
                    RenderInstruction::KeywordOptions { options, chosen: None }
                        if !options.is_empty() =>
                    {
                        client.choose_keyword(0)?;
                    }
                    RenderInstruction::RoundCounter { .. } => grabbed_this_round = false,
                    RenderInstruction::Items(items) if !grabbed_this_round => {
                        if let Some(index) = items.iter().position(|slot| !slot.is_grabbed()) {
                            client.grab_item(index)?;
                            grabbed_this_round = true;
                        }
                    }
                    RenderInstruction::FinalStandings(_) => {
                        tracing::info!("Game over");
                        break;
                    }
                    RenderInstruction::Alert(_) => break,
                    _ => {}
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, leaving");
                client.request_exit()?;
                client.confirm_exit()?;
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
