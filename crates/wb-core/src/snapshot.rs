//! Whole-board snapshots.
//!
//! MessagePack (`rmp-serde`) is the persistence format; JSON is what the
//! browser bridge hands to the host.

use crate::board::Board;
use crate::error::SnapshotError;
use crate::layout::GridPlacer;
use crate::model::Item;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub items: Vec<Item>,
    pub max_z: u32,
    #[serde(default)]
    pub placer: GridPlacer,
}

impl BoardSnapshot {
    pub fn of(board: &Board) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            items: board.items().to_vec(),
            max_z: board.max_z(),
            placer: board.placer(),
        }
    }

    pub fn into_board(self) -> Board {
        if self.version != SNAPSHOT_VERSION {
            log::warn!("loading snapshot version {} (current {SNAPSHOT_VERSION})", self.version);
        }
        Board::from_parts(self.items, self.max_z, self.placer)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
