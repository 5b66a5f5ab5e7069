//! World description: regions, groups and items.

use std::path::Path;

use parking_lot::RwLock;
use regiontrigger_core::{RegionInfo, TilePoint};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::{GroupResolver, Hook, HookRegistry, ItemInfo, ItemResolver, SpatialIndex};

/// An axis-aligned rectangular region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectRegion {
    /// Region name
    pub name: String,
    /// Region id
    #[serde(default)]
    pub id: i32,
    /// Overlap priority
    #[serde(default)]
    pub priority: i32,
    /// Left column
    pub x: i32,
    /// Top row
    pub y: i32,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
}

impl RectRegion {
    /// Creates a rectangle.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        id: i32,
        priority: i32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            priority,
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the tile at `point` lies inside.
    #[must_use]
    pub fn contains(&self, point: TilePoint) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x && px < x + i64::from(self.width) && py >= y && py < y + i64::from(self.height)
    }

    /// Descriptor reported to the engine.
    #[must_use]
    pub fn info(&self) -> RegionInfo {
        RegionInfo::new(
            self.name.clone(),
            self.id,
            self.priority,
            u64::from(self.width) * u64::from(self.height),
        )
    }
}

/// A world file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct World {
    /// Spatial regions
    pub regions: Vec<RectRegion>,
    /// Permission group names
    pub groups: Vec<String>,
    /// Known items
    pub items: Vec<ItemInfo>,
}

impl World {
    /// Reads a YAML world file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] or [`ConfigError::ParseError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        Self::parse(&raw, path)
    }

    /// Parses YAML world text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed YAML.
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }
}

/// Spatial index over rectangles. Regions can be removed at runtime.
#[derive(Debug, Default)]
pub struct SimIndex {
    regions: RwLock<Vec<RectRegion>>,
}

impl SimIndex {
    /// Creates an index over `regions`.
    #[must_use]
    pub fn new(regions: Vec<RectRegion>) -> Self {
        Self {
            regions: RwLock::new(regions),
        }
    }

    /// Removes a region. Returns whether it existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut regions = self.regions.write();
        let before = regions.len();
        regions.retain(|r| r.name != name);
        regions.len() != before
    }
}

impl SpatialIndex for SimIndex {
    fn regions_at(&self, point: TilePoint) -> Vec<RegionInfo> {
        self.regions
            .read()
            .iter()
            .filter(|r| r.contains(point))
            .map(RectRegion::info)
            .collect()
    }

    fn region(&self, name: &str) -> Option<RegionInfo> {
        self.regions
            .read()
            .iter()
            .find(|r| r.name == name)
            .map(RectRegion::info)
    }
}

/// Group names, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct SimGroups {
    groups: Vec<String>,
}

impl SimGroups {
    /// Creates a resolver over `groups`.
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl GroupResolver for SimGroups {
    fn resolve(&self, name: &str) -> Option<String> {
        self.groups
            .iter()
            .find(|g| g.eq_ignore_ascii_case(name))
            .cloned()
    }
}

/// Item table with id, exact-name and partial-name lookup.
#[derive(Debug, Clone, Default)]
pub struct SimItems {
    items: Vec<ItemInfo>,
}

impl SimItems {
    /// Creates a resolver over `items`.
    #[must_use]
    pub const fn new(items: Vec<ItemInfo>) -> Self {
        Self { items }
    }
}

impl ItemResolver for SimItems {
    fn find(&self, query: &str) -> Vec<ItemInfo> {
        let query = query.trim();
        if let Ok(id) = query.parse::<i32>() {
            return self.items.iter().filter(|i| i.id == id).cloned().collect();
        }
        if let Some(exact) = self.items.iter().find(|i| i.name.eq_ignore_ascii_case(query)) {
            return vec![exact.clone()];
        }
        let needle = query.to_ascii_lowercase();
        self.items
            .iter()
            .filter(|i| i.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// Records hook registration.
#[derive(Debug, Default)]
pub struct SimHooks {
    registered: Vec<Hook>,
}

impl SimHooks {
    /// Hooks currently registered, in registration order.
    #[must_use]
    pub fn registered(&self) -> &[Hook] {
        &self.registered
    }
}

impl HookRegistry for SimHooks {
    fn register(&mut self, hook: Hook) {
        if !self.registered.contains(&hook) {
            self.registered.push(hook);
        }
    }

    fn deregister(&mut self, hook: Hook) {
        self.registered.retain(|h| *h != hook);
    }
}
