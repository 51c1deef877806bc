//! Move token parsing
//!
//! Tokens are UCI long algebraic notation: origin square, destination square
//! and an optional promotion piece (`e2e4`, `g1f3`, `e7e8q`). Parsing yields a
//! typed [`UciMove`]; whether the move is legal in a given position is
//! decided by the legality oracle.

use serde::{Serialize, Serializer};
use shakmaty::uci::UciMove;
use shakmaty::Role;
use std::fmt;
use thiserror::Error;

/// Structural problems with a submitted move list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveTokenError {
    #[error("moves must contain at least one move")]
    Empty,

    #[error("malformed move at index {index}: \"{token}\" (expected UCI like e2e4 or e7e8q)")]
    Malformed { index: usize, token: String },
}

/// A single ply: a board move in lowercase UCI
///
/// Null moves (`0000`) and drops (`Q@e4`) are not puzzle moves and never
/// parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveToken(UciMove);

impl MoveToken {
    pub fn parse(token: &str) -> Option<Self> {
        // Canonical form only, so the stored text matches what was submitted
        if !token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return None;
        }

        let uci: UciMove = token.parse().ok()?;
        let board_move = matches!(
            uci,
            UciMove::Normal { promotion, .. }
                if !matches!(promotion, Some(Role::King | Role::Pawn))
        );
        board_move.then_some(MoveToken(uci))
    }

    pub fn uci(&self) -> &UciMove {
        &self.0
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for MoveToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Parse a full move list; the sequence must be non-empty and every token well formed
pub fn parse_move_list<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<MoveToken>, MoveTokenError> {
    if tokens.is_empty() {
        return Err(MoveTokenError::Empty);
    }

    tokens
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.as_ref();
            MoveToken::parse(raw).ok_or_else(|| MoveTokenError::Malformed {
                index,
                token: raw.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    #[test]
    fn test_parse_plain_and_promotion() {
        assert_eq!(MoveToken::parse("e2e4").unwrap().to_string(), "e2e4");
        assert_eq!(MoveToken::parse("a7a8q").unwrap().to_string(), "a7a8q");
        assert!(MoveToken::parse("h2h1n").is_some());
    }

    #[test]
    fn test_parsed_token_is_typed() {
        let token = MoveToken::parse("e7e8q").unwrap();
        assert_eq!(
            token.uci(),
            &UciMove::Normal {
                from: Square::E7,
                to: Square::E8,
                promotion: Some(Role::Queen),
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for bad in ["", "e2", "e2e", "e2e9", "i2e4", "e2e4k", "e2e4p", "E2E4", "e2-e4", "Nf3"] {
            assert!(MoveToken::parse(bad).is_none(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_null_move_and_drop_rejected() {
        assert!(MoveToken::parse("0000").is_none());
        assert!(MoveToken::parse("Q@e4").is_none());
        assert!(MoveToken::parse("q@e4").is_none());
    }

    #[test]
    fn test_serializes_as_uci_text() {
        let moves = parse_move_list(&["g1f3", "b7b8n"]).unwrap();
        assert_eq!(serde_json::to_string(&moves).unwrap(), r#"["g1f3","b7b8n"]"#);
    }

    #[test]
    fn test_move_list_empty_rejected() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(parse_move_list(&empty), Err(MoveTokenError::Empty));
    }

    #[test]
    fn test_move_list_reports_first_malformed_index() {
        let err = parse_move_list(&["e2e4", "e7e5", "Ng1f3", "zz"]).unwrap_err();
        assert_eq!(
            err,
            MoveTokenError::Malformed {
                index: 2,
                token: "Ng1f3".to_string()
            }
        );
    }
}
