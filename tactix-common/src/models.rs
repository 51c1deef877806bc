//! Domain models shared by the store, the sequencing engine and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::moves::MoveToken;
use crate::Error;

/// Side to move in a puzzle's starting position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideToMove {
    White,
    Black,
}

impl SideToMove {
    /// Wire and storage representation ("white" / "black")
    pub fn as_str(&self) -> &'static str {
        match self {
            SideToMove::White => "white",
            SideToMove::Black => "black",
        }
    }
}

impl fmt::Display for SideToMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SideToMove {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(SideToMove::White),
            "black" => Ok(SideToMove::Black),
            other => Err(Error::InvalidInput(format!(
                "side_to_move must be \"white\" or \"black\", got \"{}\"",
                other
            ))),
        }
    }
}

/// Grouping key derived from a puzzle's category
///
/// Variant order drives the derived `Ord`: every named category sorts before
/// `Uncategorized`, and named categories compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Named(String),
    Uncategorized,
}

impl CategoryKey {
    /// Derive the key from an optional category; blank text is uncategorized
    pub fn from_category(category: Option<&str>) -> Self {
        match category.map(str::trim) {
            Some(name) if !name.is_empty() => CategoryKey::Named(name.to_string()),
            _ => CategoryKey::Uncategorized,
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Named(name) => f.write_str(name),
            CategoryKey::Uncategorized => f.write_str("<uncategorized>"),
        }
    }
}

/// A stored training puzzle
///
/// Immutable once persisted; only deletion changes the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: i64,
    pub initial_position: String,
    pub side_to_move: SideToMove,
    pub moves: Vec<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Puzzle {
    pub fn category_key(&self) -> CategoryKey {
        CategoryKey::from_category(self.category.as_deref())
    }
}

/// A puzzle that passed structural and legality validation, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewPuzzle {
    pub initial_position: String,
    pub side_to_move: SideToMove,
    pub moves: Vec<MoveToken>,
    pub category: Option<String>,
}

/// A registered learner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

/// One recorded attempt at a puzzle, owned by the submitting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub id: i64,
    pub exercise_id: i64,
    pub user_id: i64,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}
