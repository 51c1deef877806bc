//! Practice sequence endpoint
//!
//! One store snapshot per request feeds both orders. Each request owns its
//! generator so concurrent requests never share RNG state.

use axum::{extract::State, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tactix_common::db::puzzles;
use tactix_common::sequencing::build_sequence;
use tactix_common::{Puzzle, SideToMove};
use tracing::debug;

use crate::{ApiError, AppState, SequenceSettings};

/// One puzzle as served in a sequence
#[derive(Debug, Serialize)]
pub struct SequenceEntry {
    pub id: i64,
    pub initial_position: String,
    pub moves: Vec<String>,
    pub side_to_move: SideToMove,
    pub category: Option<String>,
}

impl From<Puzzle> for SequenceEntry {
    fn from(p: Puzzle) -> Self {
        Self {
            id: p.id,
            initial_position: p.initial_position,
            moves: p.moves,
            side_to_move: p.side_to_move,
            category: p.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SequenceResponse {
    pub ordered: Vec<SequenceEntry>,
    pub random: Vec<SequenceEntry>,
}

/// Per-request generator: seeded when configured, otherwise fresh entropy
fn request_rng(settings: &SequenceSettings) -> StdRng {
    match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// GET /api/exercises/sequence
pub async fn get_sequence(
    State(state): State<AppState>,
) -> Result<Json<SequenceResponse>, ApiError> {
    let snapshot = puzzles::list_puzzles(&state.db).await?;

    let mut rng = request_rng(&state.sequence);
    let sequence = build_sequence(&snapshot, state.sequence.cap, &mut rng);

    if sequence.random_stopped_early {
        debug!(
            served = sequence.random.len(),
            available = snapshot.len(),
            "Random order truncated to avoid a category repeat"
        );
    }

    Ok(Json(SequenceResponse {
        ordered: sequence.ordered.into_iter().map(SequenceEntry::from).collect(),
        random: sequence.random.into_iter().map(SequenceEntry::from).collect(),
    }))
}
