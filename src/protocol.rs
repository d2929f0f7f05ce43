//! Wire-compatible protocol types for the Crisis Survival game server.
//!
//! Every message is a flat JSON object tagged with a snake_case `type` field,
//! e.g. `{"type":"grab_item","index":2}`. Fields the client does not know about
//! are ignored so that server-side additions never break decoding.

use serde::{Deserialize, Serialize};

// ── Type aliases ────────────────────────────────────────────────────

/// Durable player identity assigned by the server in the `connected` event.
pub type PlayerId = String;

// ── Enums ───────────────────────────────────────────────────────────

/// A stage of one round, shown as a single panel on the game screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players pick a keyword that feeds the crisis.
    CrisisSetup,
    /// The generated crisis is displayed.
    CrisisReveal,
    /// Players race to grab one item each.
    Scavenge,
    /// Survival outcomes are announced one by one.
    Judgment,
    /// Scores for the finished round are displayed.
    RoundEnd,
    /// Final rankings are displayed.
    GameOver,
    /// A phase this client does not know. Ignored by the session machine.
    #[serde(other)]
    Unrecognized,
}

impl Phase {
    /// Human-readable label for the phase header.
    pub fn label(self) -> &'static str {
        match self {
            Self::CrisisSetup => "Crisis setup",
            Self::CrisisReveal => "Crisis revealed",
            Self::Scavenge => "Scavenge",
            Self::Judgment => "Judgment",
            Self::RoundEnd => "Round over",
            Self::GameOver => "Game over",
            Self::Unrecognized => "Unknown phase",
        }
    }
}

/// Rarity tier of a scavenge item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemTier {
    /// The one item that almost guarantees survival.
    Legendary,
    /// Ordinary supplies.
    #[default]
    Normal,
    /// Junk.
    Trash,
}

// ── Structs ─────────────────────────────────────────────────────────

/// A roster entry announced in `game_starting`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// An item offered during the scavenge phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemInfo {
    /// Server-side slot index; the list position stands in when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub name: String,
    #[serde(default)]
    pub tier: ItemTier,
}

/// One authoritative score in `round_end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
}

/// One line of the final standings in `game_over`, already server-ordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ranking {
    pub name: String,
    pub score: i64,
    #[serde(default)]
    pub is_bot: bool,
}

// ── Messages ────────────────────────────────────────────────────────

/// Intents sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a game against two bots immediately.
    StartSolo,
    /// Join the multiplayer matchmaking queue.
    StartMatching,
    /// Leave the matchmaking queue.
    CancelMatching,
    /// Contribute a keyword to this round's crisis.
    KeywordChoice { choice: String },
    /// Try to claim the item at `index`.
    GrabItem { index: usize },
    /// Leave the running game; a bot takes over the seat.
    ExitGame,
}

impl ClientMessage {
    /// The wire `type` tag of this message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::StartSolo => "start_solo",
            Self::StartMatching => "start_matching",
            Self::CancelMatching => "cancel_matching",
            Self::KeywordChoice { .. } => "keyword_choice",
            Self::GrabItem { .. } => "grab_item",
            Self::ExitGame => "exit_game",
        }
    }
}

/// Events pushed from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake complete; the server assigned this connection an identity.
    Connected {
        player_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The player entered the matchmaking queue.
    MatchingStarted { queue_size: u32 },
    /// The player left the matchmaking queue.
    MatchingCancelled,
    /// A room was formed; the roster is final.
    GameStarting {
        players: Vec<PlayerSummary>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
    },
    /// A new round begins.
    RoundStart { round: u32, max_rounds: u32 },
    /// The room moved to a new phase.
    PhaseChange {
        phase: Phase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Vec<ItemInfo>>,
    },
    /// Keyword choices offered to this player.
    KeywordOptions { options: Vec<String> },
    /// Some player locked in a keyword.
    KeywordSubmitted { player: String },
    /// The server is composing the crisis.
    GeneratingCrisis,
    /// The crisis for this round.
    CrisisRevealed {
        name: String,
        scenario: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keywords: Vec<String>,
    },
    /// A player claimed an item.
    ItemGrabbed {
        item_index: usize,
        player: String,
        item_name: String,
        #[serde(default)]
        comment: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tier: Option<ItemTier>,
    },
    /// This player's grab was rejected.
    GrabFailed { message: String },
    /// The server is deciding who survives.
    Judging,
    /// One player's survival outcome.
    JudgmentResult {
        player: String,
        survived: bool,
        #[serde(default)]
        item: String,
        story: String,
    },
    /// Round finished; authoritative scores for every roster entry.
    RoundEnd {
        scores: Vec<ScoreEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<u32>,
    },
    /// Game finished.
    GameOver {
        rankings: Vec<Ranking>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tiebreaker_reason: Option<String>,
    },
    /// A human left and a bot took over their seat.
    PlayerLeft {
        player: String,
        #[serde(default)]
        message: String,
    },
    /// Any `type` tag this client does not know.
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// The wire `type` tag of this event.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::MatchingStarted { .. } => "matching_started",
            Self::MatchingCancelled => "matching_cancelled",
            Self::GameStarting { .. } => "game_starting",
            Self::RoundStart { .. } => "round_start",
            Self::PhaseChange { .. } => "phase_change",
            Self::KeywordOptions { .. } => "keyword_options",
            Self::KeywordSubmitted { .. } => "keyword_submitted",
            Self::GeneratingCrisis => "generating_crisis",
            Self::CrisisRevealed { .. } => "crisis_revealed",
            Self::ItemGrabbed { .. } => "item_grabbed",
            Self::GrabFailed { .. } => "grab_failed",
            Self::Judging => "judging",
            Self::JudgmentResult { .. } => "judgment_result",
            Self::RoundEnd { .. } => "round_end",
            Self::GameOver { .. } => "game_over",
            Self::PlayerLeft { .. } => "player_left",
            Self::Unknown => "unknown",
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
    fn client_message_tags_match_serialized_type() {
        let messages = [
            ClientMessage::StartSolo,
            ClientMessage::StartMatching,
            ClientMessage::CancelMatching,
            ClientMessage::KeywordChoice {
                choice: "flood".into(),
            },
            ClientMessage::GrabItem { index: 3 },
            ClientMessage::ExitGame,
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["type"], msg.tag());
        }
    }

    #[test]
    fn unknown_phase_is_unrecognized() {
        let phase: Phase = serde_json::from_str(r#""waiting_room""#).unwrap();
        assert_eq!(phase, Phase::Unrecognized);
    }

    #[test]
    fn item_tier_defaults_to_normal() {
        let item: ItemInfo = serde_json::from_str(r#"{"name":"Rope"}"#).unwrap();
        assert_eq!(item.tier, ItemTier::Normal);
        assert_eq!(item.index, None);
    }
}
