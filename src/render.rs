//! View boundary.
//!
//! The session machine describes what the player should see as a stream of
//! declarative [`RenderInstruction`]s. A view implements [`Renderer`] and
//! recomputes visibility from the screen and phase values it is given; it
//! never infers state from its own widgets.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::diagnostic::Diagnostic;
use crate::protocol::{Phase, ScoreEntry};
use crate::state::{
    Commentary, Crisis, FinalStandings, ItemSlot, JudgmentOutcome, Mode, RosterEntry, Screen,
};

/// One thing for the view layer to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Show exactly this screen.
    Screen(Screen),
    /// Configure the matching screen for solo preparation or queueing.
    MatchingPanel { mode: Mode },
    /// Players currently in the matchmaking queue.
    QueueSize(u32),
    /// Seconds left on the cosmetic matching countdown.
    Countdown(u32),
    /// Home-screen hint; `None` restores the default text.
    HomeHint(Option<String>),
    /// A connectivity failure to raise to the player.
    Alert(Diagnostic),
    /// Show exactly this phase panel, or none.
    Phase(Option<Phase>),
    /// Text of the phase header.
    PhaseLabel(String),
    /// Narrator line.
    Narrator(String),
    /// Short-lived message-log entry.
    Log(String),
    /// Round counter in the game header.
    RoundCounter { round: u32, max_rounds: u32 },
    /// The full roster with scores and per-round markers.
    Roster(Vec<RosterEntry>),
    /// Keyword buttons; all are disabled once `chosen` is set.
    KeywordOptions {
        options: Vec<String>,
        chosen: Option<usize>,
    },
    /// The crisis card.
    Crisis(Crisis),
    /// The scavenge grid.
    Items(Vec<ItemSlot>),
    /// The single visible commentary, or none.
    Commentary(Option<Commentary>),
    /// Judgment cards announced so far this round.
    JudgmentResults(Vec<JudgmentOutcome>),
    /// Scores for the round that just ended.
    RoundScores(Vec<ScoreEntry>),
    /// Final rankings and tie-break rationale.
    FinalStandings(FinalStandings),
    /// Show or hide the exit confirmation prompt.
    ConfirmExit(bool),
}

/// A sink for render instructions.
pub trait Renderer {
    /// Apply one instruction.
    fn render(&mut self, instruction: &RenderInstruction);
}

impl<F> Renderer for F
where
    F: FnMut(&RenderInstruction),
{
    fn render(&mut self, instruction: &RenderInstruction) {
        self(instruction)
    }
}

/// Drain `instructions` into `renderer` until the client shuts down.
pub async fn pump<R: Renderer>(
    mut instructions: mpsc::Receiver<RenderInstruction>,
    renderer: &mut R,
) {
    while let Some(instruction) = instructions.recv().await {
        renderer.render(&instruction);
    }
}

/// A headless [`Renderer`] that writes each instruction to the log.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&mut self, instruction: &RenderInstruction) {
        match instruction {
            RenderInstruction::Screen(screen) => info!(?screen, "screen"),
            RenderInstruction::Phase(phase) => info!(?phase, "phase"),
            RenderInstruction::PhaseLabel(label) => info!("== {label} =="),
            RenderInstruction::Narrator(text) => info!("narrator: {text}"),
            RenderInstruction::Log(text) => info!("{text}"),
            RenderInstruction::Alert(diagnostic) => warn!("{diagnostic}"),
            RenderInstruction::KeywordOptions { options, chosen } => {
                info!(?chosen, "keywords: {}", options.join(" / "));
            }
            RenderInstruction::Crisis(crisis) => {
                info!("crisis: {} ({})", crisis.name, crisis.scenario);
            }
            RenderInstruction::Items(items) => {
                for (index, slot) in items.iter().enumerate() {
                    info!(
                        index,
                        tier = ?slot.tier,
                        grabbed_by = slot.grabbed_by.as_deref().unwrap_or("-"),
                        "item: {}",
                        slot.name
                    );
                }
            }
            RenderInstruction::Commentary(Some(commentary)) => {
                info!("{} on {}: {}", commentary.player, commentary.item_name, commentary.comment);
            }
            RenderInstruction::FinalStandings(standings) => {
                for (place, ranking) in standings.rankings.iter().enumerate() {
                    info!("#{} {} {}", place + 1, ranking.name, ranking.score);
                }
                if let Some(reason) = &standings.tiebreaker_reason {
                    info!("tie broken: {reason}");
                }
            }
            other => tracing::debug!(?other, "render"),
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

    #[tokio::test]
    async fn pump_forwards_in_order_until_channel_closes() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(RenderInstruction::Screen(Screen::Matching))
            .await
            .unwrap();
        tx.send(RenderInstruction::QueueSize(2)).await.unwrap();
        drop(tx);

        let mut seen = Vec::new();
        let mut renderer = |instruction: &RenderInstruction| seen.push(instruction.clone());
        pump(rx, &mut renderer).await;

        assert_eq!(
            seen,
            vec![
                RenderInstruction::Screen(Screen::Matching),
                RenderInstruction::QueueSize(2),
            ]
        );
    }

    #[test]
    fn tracing_renderer_accepts_every_instruction() {
        let mut renderer = TracingRenderer;
        renderer.render(&RenderInstruction::Alert(Diagnostic::HandshakeTimeout));
        renderer.render(&RenderInstruction::Commentary(None));
        renderer.render(&RenderInstruction::Items(vec![ItemSlot {
            name: "Radio".into(),
            tier: crate::protocol::ItemTier::Legendary,
            grabbed_by: None,
        }]));
    }
}
