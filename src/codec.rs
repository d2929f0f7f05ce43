//! Protocol codec: outbound [`ClientMessage`]s to JSON text, inbound JSON text
//! to [`ServerEvent`]s.
//!
//! Decoding is forward compatible. A well-formed message whose `type` tag this
//! client does not know decodes to `Ok(None)` and is logged, never rejected.
//! Only structurally broken input produces a [`DecodeError`].

use serde_json::Value;
use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::protocol::{ClientMessage, ServerEvent};

/// Serialize an outbound intent to its JSON wire form.
///
/// # Errors
///
/// Returns [`ClientError::Serialization`](crate::ClientError::Serialization) if
/// serialization fails, which only happens for programming errors.
pub fn encode(message: &ClientMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decode one inbound wire message.
///
/// Returns:
/// - `Ok(Some(event))` for a known event with a valid payload
/// - `Ok(None)` for an unknown `type` tag (dropped with a debug log)
/// - `Err(_)` for malformed JSON, a missing tag, or a bad payload
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode(text: &str) -> std::result::Result<Option<ServerEvent>, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let Value::Object(ref fields) = value else {
        return Err(DecodeError::Malformed("expected a JSON object".into()));
    };
    let tag = match fields.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        _ => return Err(DecodeError::MissingTag),
    };

    let event: ServerEvent = serde_json::from_value(value)
        .map_err(|source| DecodeError::InvalidPayload {
            tag: tag.clone(),
            source,
        })?;

    if matches!(event, ServerEvent::Unknown) {
        debug!(tag = %tag, "dropping unknown server event");
        return Ok(None);
    }
    Ok(Some(event))
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
    use crate::protocol::{ItemTier, Phase};

    #[test]
    fn encode_grab_item_is_flat() {
        let json = encode(&ClientMessage::GrabItem { index: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"grab_item","index":2}"#);
    }

    #[test]
    fn encode_unit_intent_carries_only_tag() {
        let json = encode(&ClientMessage::StartSolo).unwrap();
        assert_eq!(json, r#"{"type":"start_solo"}"#);
    }

    #[test]
    fn decode_connected() {
        let event = decode(r#"{"type":"connected","player_id":"p1","message":"hi"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ServerEvent::Connected {
                player_id: "p1".into(),
                message: Some("hi".into()),
            }
        );
    }

    #[test]
    fn decode_scavenge_phase_with_items() {
        let event = decode(
            r#"{"type":"phase_change","phase":"scavenge",
                "items":[{"index":0,"name":"Radio","tier":"legendary"},
                         {"index":1,"name":"Sock","tier":"trash"}]}"#,
        )
        .unwrap()
        .unwrap();
        let ServerEvent::PhaseChange { phase, items } = event else {
            panic!("expected PhaseChange");
        };
        assert_eq!(phase, Phase::Scavenge);
        let items = items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tier, ItemTier::Legendary);
        assert_eq!(items[1].name, "Sock");
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let event = decode(r#"{"type":"judging","eta_ms":1200}"#).unwrap();
        assert_eq!(event, Some(ServerEvent::Judging));
    }

    #[test]
    fn decode_null_tiebreaker_is_none() {
        let event = decode(r#"{"type":"game_over","rankings":[],"tiebreaker_reason":null}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ServerEvent::GameOver {
                rankings: vec![],
                tiebreaker_reason: None,
            }
        );
    }

    #[test]
    fn decode_unknown_tag_is_dropped_not_error() {
        let event = decode(r#"{"type":"confetti","color":"gold"}"#).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn decode_invalid_json_is_malformed() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn decode_non_object_is_malformed() {
        let err = decode("[1,2,3]").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn decode_missing_tag() {
        let err = decode(r#"{"player_id":"p1"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingTag));

        let err = decode(r#"{"type":7}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingTag));
    }

    #[test]
    fn decode_bad_payload_names_the_tag() {
        let err = decode(r#"{"type":"round_start","round":"one"}"#).unwrap_err();
        match err {
            DecodeError::InvalidPayload { tag, .. } => assert_eq!(tag, "round_start"),
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }
}
