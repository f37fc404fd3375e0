//! Events emitted by the rules engine to its observers (rendering, audio, stats).

use serde::{Deserialize, Serialize};

use crate::{Piece, Position, TypeCode};

/// A completed swap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub from: Position,
    pub to: Position,
    pub valid: bool,
}

/// A single piece removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopEvent {
    /// The piece as it was when popped
    pub piece: Piece,
    #[serde(rename = "type")]
    pub kind: TypeCode,
    /// Process round (combo level) the pop happened in; 0 outside a cascade
    pub round: u32,
    pub is_special: bool,
    pub caused_by_special: bool,
}

/// A cascade round suspended board interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRoundEvent {
    /// Round counter before the round bumps it
    pub round: u32,
    pub is_super_special: bool,
}

/// Everything observers can receive from a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Match3Event {
    Move(MoveEvent),
    Pop(PopEvent),
    ProcessStart,
    ProcessComplete,
    MatchedRound(MatchedRoundEvent),
}

impl Match3Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Match3Event::Move(_) => "move",
            Match3Event::Pop(_) => "pop",
            Match3Event::ProcessStart => "processStart",
            Match3Event::ProcessComplete => "processComplete",
            Match3Event::MatchedRound(_) => "matchedRound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceId;

    #[test]
    fn pop_event_wire_shape() {
        let event = Match3Event::Pop(PopEvent {
            piece: Piece {
                id: PieceId(7),
                kind: 3,
                row: 1,
                column: 2,
                locked: false,
            },
            kind: 3,
            round: 2,
            is_special: false,
            caused_by_special: true,
        });

        let v = serde_json::to_value(event).unwrap();
        assert_eq!(v["type"], "pop");
        assert_eq!(v["data"]["type"], 3);
        assert_eq!(v["data"]["round"], 2);
        assert_eq!(v["data"]["causedBySpecial"], true);
        assert_eq!(v["data"]["piece"]["column"], 2);
    }

    #[test]
    fn unit_events_have_no_payload() {
        let v = serde_json::to_value(Match3Event::ProcessComplete).unwrap();
        assert_eq!(v["type"], "processComplete");
        assert!(v.get("data").is_none());

        let back: Match3Event = serde_json::from_value(v).unwrap();
        assert_eq!(back, Match3Event::ProcessComplete);
        assert_eq!(back.as_str(), "processComplete");
    }
}
