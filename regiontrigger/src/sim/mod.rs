//! In-process reference host
//!
//! A small rectangle-based world that implements every host collaborator
//! trait. The CLI uses it to run scripted sessions and the test suites use
//! it as the host double.

pub mod participant;
pub mod script;
pub mod world;

use std::sync::Arc;

pub use participant::{Effect, SimDirectory, SimParticipant};
pub use script::{Script, Step, run_script};
pub use world::{RectRegion, SimGroups, SimHooks, SimIndex, SimItems, World};

use crate::plugin::HostServices;

/// Every simulated collaborator, kept with its concrete type so callers
/// can drive the world directly.
#[derive(Debug, Clone)]
pub struct SimHost {
    /// Rectangle index
    pub index: Arc<SimIndex>,
    /// Connected participants
    pub directory: Arc<SimDirectory>,
    /// Permission groups
    pub groups: Arc<SimGroups>,
    /// Item table
    pub items: Arc<SimItems>,
}

impl SimHost {
    /// Builds a host over `world` with nobody connected.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        Self {
            index: Arc::new(SimIndex::new(world.regions.clone())),
            directory: Arc::new(SimDirectory::new()),
            groups: Arc::new(SimGroups::new(world.groups.iter().cloned())),
            items: Arc::new(SimItems::new(world.items.clone())),
        }
    }

    /// The collaborators as trait objects.
    #[must_use]
    pub fn services(&self) -> HostServices {
        HostServices {
            index: self.index.clone(),
            directory: self.directory.clone(),
            groups: self.groups.clone(),
            items: self.items.clone(),
        }
    }
}
