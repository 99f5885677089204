//! Playlist ordering rules.
//!
//! Videos in a playlist hold 1-based, contiguous positions. The repository
//! layer performs the reads and writes inside a transaction; the decisions
//! about what a move or removal means, and whether the stored ordering is
//! still sound, live here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Position};

/// Position assigned to the first video of an empty playlist.
pub const FIRST_POSITION: Position = 1;

/// Direction of a relative move within a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards position 1.
    Up,
    /// Towards the end of the playlist.
    Down,
}

impl MoveDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(CoreError::Validation(format!(
                "Invalid move direction '{other}'. Valid directions: up, down"
            ))),
        }
    }
}

/// A video's place in its playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub video_id: DbId,
    pub position: Position,
}

/// Position for a video appended to a playlist whose current maximum is
/// `current_max` (`None` when the playlist is empty).
pub fn next_position(current_max: Option<Position>) -> Position {
    current_max.map_or(FIRST_POSITION, |max| max + 1)
}

/// Choose the immediate neighbour from candidates sorted nearest-first.
///
/// `candidates` must already be restricted to one side of the moving video
/// (strictly before for an upward move, strictly after for a downward one).
/// Only the two nearest are needed: if they share a position the neighbour is
/// ambiguous and the stored ordering is corrupt.
pub fn pick_neighbour(candidates: &[Slot]) -> Result<Option<Slot>, CoreError> {
    match candidates {
        [] => Ok(None),
        [first, second, ..] if first.position == second.position => {
            Err(CoreError::Consistency(format!(
                "Videos {} and {} share position {}",
                first.video_id, second.video_id, first.position
            )))
        }
        [first, ..] => Ok(Some(*first)),
    }
}

/// Fail if more than one video holds `position` in the playlist.
pub fn ensure_unique_position(position: Position, holders: i64) -> Result<(), CoreError> {
    if holders > 1 {
        return Err(CoreError::Consistency(format!(
            "{holders} videos share position {position}"
        )));
    }
    Ok(())
}

/// New assignments for swapping a video with its neighbour.
pub fn swap(moving: Slot, neighbour: Slot) -> [Slot; 2] {
    [
        Slot {
            video_id: moving.video_id,
            position: neighbour.position,
        },
        Slot {
            video_id: neighbour.video_id,
            position: moving.position,
        },
    ]
}

/// Verify that `positions`, sorted ascending, are exactly `1..=n`.
pub fn check_contiguous(positions: &[Position]) -> Result<(), CoreError> {
    for (index, pair) in positions.windows(2).enumerate() {
        if pair[0] == pair[1] {
            return Err(CoreError::Consistency(format!(
                "Duplicate position {} at index {index}",
                pair[0]
            )));
        }
    }
    for (index, &position) in positions.iter().enumerate() {
        let expected = index as Position + FIRST_POSITION;
        if position != expected {
            return Err(CoreError::Consistency(format!(
                "Expected position {expected}, found {position}"
            )));
        }
    }
    Ok(())
}
