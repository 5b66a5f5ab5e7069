//! Plugin facade
//!
//! [`RegionTrigger`] wires the policy store, transition engine, enforcement
//! gate and command processor to one host. The host registers the engine's
//! hooks through [`RegionTrigger::initialize`], routes each callback to the
//! matching method, and drives ticks either by calling
//! [`RegionTrigger::on_game_update`] every frame or by starting the
//! background tick task.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::command::{ConfigCommandProcessor, ReplyLine};
use crate::config::Settings;
use crate::engine::transition::TickReport;
use crate::engine::{
    ControlFlags, EnforcementGate, PermissionOverride, TransitionEngine, Verdict,
};
use crate::error::PersistenceError;
use crate::host::{
    GroupResolver, Hook, HookRegistry, ItemResolver, Participant, ParticipantDirectory,
    ParticipantId, SpatialIndex,
};
use crate::observability::EventEmitter;
use crate::store::{PolicyBackend, RegionConfigStore};

/// The host collaborators the engine consumes.
#[derive(Clone)]
pub struct HostServices {
    /// Point-containment queries
    pub index: Arc<dyn SpatialIndex>,
    /// Connected participants
    pub directory: Arc<dyn ParticipantDirectory>,
    /// Permission group lookup
    pub groups: Arc<dyn GroupResolver>,
    /// Item lookup for `itemban`
    pub items: Arc<dyn ItemResolver>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

/// The region trigger engine bound to one host.
pub struct RegionTrigger {
    settings: Settings,
    host: HostServices,
    store: Arc<RegionConfigStore>,
    engine: Arc<TransitionEngine>,
    gate: EnforcementGate,
    commands: ConfigCommandProcessor,
    last_tick: Mutex<Option<Instant>>,
    cancel: CancellationToken,
}

impl RegionTrigger {
    /// Loads every policy from `backend` and builds the engine.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the initial load fails.
    pub fn new(
        settings: Settings,
        host: HostServices,
        backend: Arc<dyn PolicyBackend>,
        events: Arc<EventEmitter>,
    ) -> Result<Self, PersistenceError> {
        let store = Arc::new(RegionConfigStore::open(backend, Arc::clone(&host.index))?);
        let engine = Arc::new(TransitionEngine::new(
            Arc::clone(&store),
            Arc::clone(&host.index),
            Arc::clone(&host.groups),
            settings.selection.tie_break,
            Arc::clone(&events),
        ));
        let gate = EnforcementGate::new(Arc::clone(&engine), Arc::clone(&events));
        let commands = ConfigCommandProcessor::new(
            Arc::clone(&store),
            Arc::clone(&host.index),
            Arc::clone(&host.items),
            settings.limits,
            settings.help.page_size,
            events,
        );

        Ok(Self {
            settings,
            host,
            store,
            engine,
            gate,
            commands,
            last_tick: Mutex::new(None),
            cancel: CancellationToken::new(),
        })
    }

    /// Registers every engine hook with the host.
    pub fn initialize(&self, hooks: &mut dyn HookRegistry) {
        for hook in Hook::ALL {
            hooks.register(hook);
        }
        for participant in self.host.directory.active() {
            self.engine.ensure_participant(participant.id());
        }
        info!(
            policies = self.store.len(),
            tick_interval = ?self.settings.tick_duration(),
            "region trigger initialized"
        );
    }

    /// Deregisters every hook and stops the tick task.
    pub fn dispose(&self, hooks: &mut dyn HookRegistry) {
        for hook in Hook::ALL {
            hooks.deregister(hook);
        }
        self.shutdown();
        info!("region trigger disposed");
    }

    /// The active settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The policy store.
    #[must_use]
    pub const fn store(&self) -> &Arc<RegionConfigStore> {
        &self.store
    }

    /// The transition engine.
    #[must_use]
    pub const fn engine(&self) -> &Arc<TransitionEngine> {
        &self.engine
    }

    /// Runs one transition tick over every active participant.
    pub fn tick(&self) -> TickReport {
        *self.last_tick.lock() = Some(Instant::now());
        self.engine.tick(self.host.directory.as_ref())
    }

    /// Per-frame host update. Runs a tick once at least one tick interval
    /// has passed since the previous one.
    pub fn on_game_update(&self, now: Instant) -> Option<TickReport> {
        {
            let mut last = self.last_tick.lock();
            let due = last.is_none_or(|prev| {
                now.saturating_duration_since(prev) >= self.settings.tick_duration()
            });
            if !due {
                return None;
            }
            *last = Some(now);
        }
        Some(self.engine.tick(self.host.directory.as_ref()))
    }

    /// Spawns a task that ticks at the configured interval until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn start_tick_task(self: &Arc<Self>) -> JoinHandle<()> {
        let plugin = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(plugin.settings.tick_duration());
            loop {
                tokio::select! {
                    () = plugin.cancel.cancelled() => {
                        debug!("tick task cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        plugin.tick();
                    }
                }
            }
        })
    }

    /// Cancels the background tick task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Greet hook: starts a fresh session for a participant.
    pub fn on_participant_join(&self, id: ParticipantId) {
        self.engine.begin_session(id);
        debug!(participant = %id, "participant joined");
    }

    /// Leave hook: drops a participant's state.
    pub fn on_participant_leave(&self, id: ParticipantId) {
        self.engine.remove_participant(id);
        debug!(participant = %id, "participant left");
    }

    /// Region-deleted hook: removes the region's policy.
    ///
    /// Participants inside run their leave effects on the next tick.
    pub fn on_region_deleted(&self, region: &str) {
        match self.store.delete(region) {
            Ok(true) => info!(region, "policy removed with its region"),
            Ok(false) => {}
            Err(e) => error!(region, error = %e, "failed to remove policy of deleted region"),
        }
    }

    /// Tile edit hook.
    pub fn check_tile_placement(
        &self,
        participant: &dyn Participant,
        x: i32,
        y: i32,
        tile: u16,
    ) -> Verdict {
        self.gate.check_tile_placement(participant, x, y, tile)
    }

    /// New projectile hook.
    pub fn check_projectile_create(
        &self,
        owner: &dyn Participant,
        index: i32,
        projectile: u16,
    ) -> Verdict {
        self.gate.check_projectile_create(owner, index, projectile)
    }

    /// Item use check.
    pub fn check_item_use(&self, participant: &dyn Participant, item: &str) -> Verdict {
        self.gate.check_item_use(participant, item)
    }

    /// Player update hook.
    pub fn on_player_update(
        &self,
        participant: &dyn Participant,
        control: &mut ControlFlags,
        held_item: &str,
    ) -> Verdict {
        self.gate.on_player_update(participant, control, held_item)
    }

    /// PvP toggle hook.
    pub fn check_pvp_toggle(&self, participant: &dyn Participant, requested: bool) -> Verdict {
        self.gate.check_pvp_toggle(participant, requested)
    }

    /// Permission hook.
    #[must_use]
    pub fn check_permission_grant(
        &self,
        participant: &dyn Participant,
        permission: &str,
    ) -> PermissionOverride {
        self.gate.check_permission_grant(participant, permission)
    }

    /// Runs a tokenized `/rt` command.
    #[must_use]
    pub fn execute_command(&self, tokens: &[String]) -> Vec<ReplyLine> {
        self.commands.execute(tokens)
    }

    /// Runs a `/rt` command line.
    #[must_use]
    pub fn execute_line(&self, line: &str) -> Vec<ReplyLine> {
        self.commands.execute_line(line)
    }
}

impl std::fmt::Debug for RegionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionTrigger")
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
