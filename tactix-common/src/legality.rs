//! Move legality validation
//!
//! Creation replays a puzzle's moves once, before anything is persisted. The
//! rules themselves live behind [`LegalityOracle`]; [`StandardChess`] is the
//! production adapter over `shakmaty`.

use shakmaty::{fen::Fen, CastlingMode, Chess, Color, FromSetup, Position, PositionError};
use thiserror::Error;

use crate::models::SideToMove;
use crate::moves::MoveToken;

/// Reasons a move sequence is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegalityError {
    #[error("Invalid position: {reason}")]
    InvalidPosition { reason: String },

    #[error("Invalid move: {token} (move {index})")]
    IllegalMove { index: usize, token: String },
}

/// Replays a move sequence from a starting position and reports the first violation
///
/// Implementations are pure: no state is kept between calls and the resulting
/// position is not surfaced.
pub trait LegalityOracle: Send + Sync {
    fn validate(
        &self,
        initial_position: &str,
        side_to_move: SideToMove,
        moves: &[MoveToken],
    ) -> Result<(), LegalityError>;
}

/// Standard chess rules (FEN positions, UCI moves)
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    fn starting_position(
        initial_position: &str,
        side_to_move: SideToMove,
    ) -> Result<Chess, LegalityError> {
        let fen: Fen = initial_position
            .trim()
            .parse()
            .map_err(|e| LegalityError::InvalidPosition {
                reason: format!("{}", e),
            })?;

        let mut setup = fen.into_setup();
        let turn = match side_to_move {
            SideToMove::White => Color::White,
            SideToMove::Black => Color::Black,
        };
        // The submitted side overrides the FEN's active colour; an en passant
        // square only makes sense for the colour the FEN was written for.
        if setup.turn != turn {
            setup.turn = turn;
            setup.ep_square = None;
        }

        // Composed studies may show check patterns no legal game reaches;
        // those still have well-defined legal moves.
        Chess::from_setup(setup, CastlingMode::Standard)
            .or_else(PositionError::ignore_impossible_check)
            .map_err(|e| LegalityError::InvalidPosition {
                reason: format!("{}", e),
            })
    }
}

impl LegalityOracle for StandardChess {
    fn validate(
        &self,
        initial_position: &str,
        side_to_move: SideToMove,
        moves: &[MoveToken],
    ) -> Result<(), LegalityError> {
        let mut position = Self::starting_position(initial_position, side_to_move)?;

        for (index, token) in moves.iter().enumerate() {
            let illegal = || LegalityError::IllegalMove {
                index,
                token: token.to_string(),
            };

            let m = token.uci().to_move(&position).map_err(|_| illegal())?;
            position.play_unchecked(&m);
        }

        Ok(())
    }
}
