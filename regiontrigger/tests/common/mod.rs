//! Shared integration-test harness: an engine bound to the in-process
//! simulated host, plus helpers for running the CLI binary.

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;
use std::sync::Arc;

use regiontrigger::config::Settings;
use regiontrigger::host::{ItemInfo, Participant, ParticipantId};
use regiontrigger::observability::EventEmitter;
use regiontrigger::plugin::RegionTrigger;
use regiontrigger::sim::{RectRegion, SimHost, SimParticipant, World};
use regiontrigger::store::MemoryBackend;
use regiontrigger_core::TilePoint;

/// An engine over a rectangle world with an in-memory store.
pub struct Harness {
    pub plugin: Arc<RegionTrigger>,
    pub host: SimHost,
    pub backend: Arc<MemoryBackend>,
}

impl Harness {
    /// Builds a harness over `regions` with the `vip` group and two items.
    #[allow(clippy::missing_panics_doc)]
    pub fn new(regions: Vec<RectRegion>) -> Self {
        let world = World {
            regions,
            groups: vec!["vip".to_string()],
            items: vec![
                ItemInfo {
                    id: 1,
                    name: "Dirt Rod".to_string(),
                },
                ItemInfo {
                    id: 2,
                    name: "Iron Pickaxe".to_string(),
                },
            ],
        };
        let host = SimHost::from_world(&world);
        let backend = Arc::new(MemoryBackend::new());
        let plugin = RegionTrigger::new(
            Settings::default(),
            host.services(),
            Arc::clone(&backend) as Arc<dyn regiontrigger::store::PolicyBackend>,
            Arc::new(EventEmitter::noop()),
        )
        .expect("memory backend loads");
        Self {
            plugin: Arc::new(plugin),
            host,
            backend,
        }
    }

    /// A single 10x10 region named `Arena` at the origin.
    pub fn arena() -> Self {
        Self::new(vec![RectRegion::new("Arena", 1, 0, 0, 0, 10, 10)])
    }

    /// Connects a participant at (`x`, `y`).
    pub fn join(&self, id: u32, name: &str, x: i32, y: i32) -> Arc<SimParticipant> {
        let participant = Arc::new(SimParticipant::new(ParticipantId(id), name));
        participant.set_position(TilePoint::new(x, y));
        self.host.directory.insert(Arc::clone(&participant));
        self.plugin.on_participant_join(participant.id());
        participant
    }

    /// Runs a command line and returns the reply texts.
    pub fn run(&self, line: &str) -> Vec<String> {
        self.plugin
            .execute_line(line)
            .into_iter()
            .map(|reply| reply.text)
            .collect()
    }

    /// Moves a participant and runs one tick.
    pub fn move_and_tick(&self, participant: &SimParticipant, x: i32, y: i32) {
        participant.set_position(TilePoint::new(x, y));
        self.plugin.tick();
    }
}

/// Runs the `regiontrigger` binary with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn run_cli(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_regiontrigger"))
        .args(args)
        .env_remove("REGIONTRIGGER_LOG_LEVEL")
        .output()
        .expect("failed to run regiontrigger binary")
}

/// Writes a world file with one 10x10 `Arena` region and returns its path.
#[allow(clippy::missing_panics_doc)]
pub fn write_world(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("world.yaml");
    std::fs::write(
        &path,
        "regions:\n  - { name: Arena, id: 1, x: 0, y: 0, width: 10, height: 10 }\n\
         groups: [vip]\n\
         items:\n  - { id: 1, name: Dirt Rod }\n",
    )
    .expect("write world file");
    path
}
