//! Spatial region descriptors supplied by the host's region index.

use serde::{Deserialize, Serialize};

/// A tile coordinate in the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePoint {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TilePoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A spatial region as reported by the host's point-containment query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Region name (unique within a world)
    pub name: String,
    /// Host-assigned region id
    pub id: i32,
    /// Overlap priority; higher wins
    pub priority: i32,
    /// Bounding area in tiles
    pub area: u64,
}

impl RegionInfo {
    /// Creates a region descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, id: i32, priority: i32, area: u64) -> Self {
        Self {
            name: name.into(),
            id,
            priority,
            area,
        }
    }
}
