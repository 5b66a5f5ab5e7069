//! Region transition engine
//!
//! The [`TransitionEngine`] keeps one [`ParticipantRegionState`] per
//! connected participant. Each tick it resolves every active participant's
//! authoritative region and, when that region changed, runs the leave
//! effects of the old region followed by the enter effects of the new one.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use regiontrigger_core::{Event, RegionPolicy, TilePoint};
use tracing::{debug, error, info, warn};

use super::state::{ForcedPvp, ParticipantRegionState};
use super::{bypass, has_bypass};
use crate::host::{
    GroupResolver, MessageKind, Participant, ParticipantDirectory, ParticipantId, SpatialIndex,
};
use crate::observability::metrics::{self, TransitionKind};
use crate::observability::{EngineEvent, EventEmitter};
use crate::selector::{self, TieBreak};
use crate::store::RegionConfigStore;

/// Outcome counters of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Participants evaluated
    pub participants: usize,
    /// Region changes detected
    pub transitions: usize,
    /// Participants skipped because a host call panicked
    pub faults: usize,
}

/// Per-participant region tracking and enter/leave effects.
pub struct TransitionEngine {
    store: Arc<RegionConfigStore>,
    index: Arc<dyn SpatialIndex>,
    groups: Arc<dyn GroupResolver>,
    tie_break: TieBreak,
    states: DashMap<ParticipantId, ParticipantRegionState>,
    tick_lock: Mutex<()>,
    events: Arc<EventEmitter>,
}

impl TransitionEngine {
    /// Creates an engine with no tracked participants.
    #[must_use]
    pub fn new(
        store: Arc<RegionConfigStore>,
        index: Arc<dyn SpatialIndex>,
        groups: Arc<dyn GroupResolver>,
        tie_break: TieBreak,
        events: Arc<EventEmitter>,
    ) -> Self {
        Self {
            store,
            index,
            groups,
            tie_break,
            states: DashMap::new(),
            tick_lock: Mutex::new(()),
            events,
        }
    }

    /// The policy store this engine reads.
    #[must_use]
    pub const fn store(&self) -> &Arc<RegionConfigStore> {
        &self.store
    }

    /// Starts tracking a participant. Tracking an already known id is a no-op.
    pub fn ensure_participant(&self, id: ParticipantId) {
        self.states.entry(id).or_default();
        metrics::set_participants_tracked(self.states.len());
    }

    /// Starts a new session for `id`, discarding anything tracked under it.
    pub fn begin_session(&self, id: ParticipantId) {
        if self.states.insert(id, ParticipantRegionState::default()).is_some() {
            warn!(participant = %id, "invariant violation: state from a previous session replaced");
        }
        metrics::set_participants_tracked(self.states.len());
    }

    /// Drops all state for a participant.
    pub fn remove_participant(&self, id: ParticipantId) {
        self.states.remove(&id);
        metrics::set_participants_tracked(self.states.len());
    }

    /// A copy of the participant's state.
    #[must_use]
    pub fn state(&self, id: ParticipantId) -> Option<ParticipantRegionState> {
        self.states.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of tracked participants.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    /// The live policy of the participant's cached region.
    ///
    /// A region whose policy has been deleted since the last tick reads as
    /// `None`.
    #[must_use]
    pub fn current_policy(&self, id: ParticipantId) -> Option<Arc<RegionPolicy>> {
        let region = self.states.get(&id)?.current_region.clone()?;
        self.store.get(&region)
    }

    /// The authoritative configured region containing `point`.
    #[must_use]
    pub fn region_at(&self, point: TilePoint) -> Option<Arc<RegionPolicy>> {
        let table = self.store.snapshot();
        let candidates = self.index.regions_at(point);
        let winner = selector::select(
            candidates.iter().filter(|r| table.contains_key(&r.name)),
            self.tie_break,
        )?;
        table.get(&winner.name).cloned()
    }

    /// Evaluates every active participant once.
    ///
    /// A panic raised by one participant's host surface is logged and the
    /// tick moves on to the next participant. Overlapping calls run one
    /// after the other.
    pub fn tick(&self, directory: &dyn ParticipantDirectory) -> TickReport {
        let _guard = self.tick_lock.lock();
        let started = Instant::now();
        let mut report = TickReport::default();

        for participant in directory.active() {
            report.participants += 1;
            let id = participant.id();
            let mut state = self.states.entry(id).or_default().clone();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                self.process(participant.as_ref(), &mut state)
            }));
            // A leave hook that ran meanwhile wins over this update.
            if let Some(mut slot) = self.states.get_mut(&id) {
                *slot = state;
            } else {
                debug!(participant = %id, "participant left during tick; update dropped");
            }

            match outcome {
                Ok(true) => report.transitions += 1,
                Ok(false) => {}
                Err(panic) => {
                    report.faults += 1;
                    let detail = panic
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_default();
                    error!(
                        participant = %id,
                        detail,
                        "invariant violation: participant update panicked; skipping"
                    );
                }
            }
        }

        metrics::set_participants_tracked(self.states.len());
        metrics::record_tick_duration(started.elapsed());
        debug!(
            participants = report.participants,
            transitions = report.transitions,
            "tick complete"
        );
        report
    }

    /// Runs one participant through transition detection and the ambient
    /// message check. Returns whether the region changed.
    ///
    /// `state` is updated before each host call that an effect depends on,
    /// so a panic part way through still leaves a record the next leave can
    /// revert.
    fn process(&self, participant: &dyn Participant, state: &mut ParticipantRegionState) -> bool {
        let next = self.region_at(participant.position());
        let next_name = next.as_ref().map(|p| p.region.clone());
        let changed = state.current_region != next_name;

        if changed {
            if let Some(old) = state.current_region.clone() {
                self.leave(participant, state, &old);
            }
            if let Some(policy) = &next {
                self.enter(participant, state, policy);
            }
            state.message_cooldown = 0;
        }

        if let Some(policy) = &next {
            Self::ambient_message(participant, state, policy);
        }

        if state.current_region != next_name {
            warn!(
                participant = %participant.id(),
                tracked = ?state.current_region,
                selected = ?next_name,
                "invariant violation: tracked region disagrees with selection"
            );
        }
        changed
    }

    fn ambient_message(
        participant: &dyn Participant,
        state: &mut ParticipantRegionState,
        policy: &RegionPolicy,
    ) {
        if !policy.has_event(Event::Message) || policy.message_interval == 0 {
            return;
        }
        let Some(text) = policy.ambient_message() else {
            return;
        };

        state.message_cooldown += 1;
        if state.message_cooldown >= policy.message_interval {
            participant.send_message(MessageKind::Info, text);
            state.message_cooldown = 0;
        }
    }

    fn enter(
        &self,
        participant: &dyn Participant,
        state: &mut ParticipantRegionState,
        policy: &Arc<RegionPolicy>,
    ) {
        let region = policy.region.as_str();
        state.current_region = Some(policy.region.clone());
        state.entered_policy = Some(Arc::clone(policy));

        if policy.has_event(Event::EnterMsg) {
            match policy.enter_message.as_deref().filter(|m| !m.trim().is_empty()) {
                Some(text) => participant.send_message(MessageKind::Plain, text),
                None => participant.send_message(
                    MessageKind::Info,
                    &format!("You have entered region {region}"),
                ),
            }
        }

        if policy.has_event(Event::TempGroup) && !has_bypass(participant, bypass::TEMPGROUP) {
            if let Some(wanted) = policy.temp_group.as_deref() {
                if let Some(group) = self.groups.resolve(wanted) {
                    state.temp_group_applied = Some(group.clone());
                    participant.set_temp_group(Some(&group));
                    participant.send_message(
                        MessageKind::Info,
                        &format!("Your group has been changed to {group} in this region."),
                    );
                } else {
                    error!(region, group = wanted, "temp group of region is not a valid group");
                }
            }
        }

        if policy.has_event(Event::Kill) && !has_bypass(participant, bypass::KILL) {
            participant.kill();
            participant.send_message(MessageKind::Info, "You were killed!");
        }

        if policy.has_event(Event::Godmode) {
            state.god_mode_applied = true;
            participant.set_god_mode(true);
            participant.send_message(MessageKind::Info, "You are now in godmode!");
        }

        if policy.has_event(Event::Pvp) && !has_bypass(participant, bypass::PVP) {
            state.forced_pvp = ForcedPvp::ForcedOn;
            if !participant.pvp() {
                participant.set_pvp(true);
                participant.broadcast_pvp();
                participant.send_message(
                    MessageKind::Info,
                    "Your PvP status is forced enabled in this region!",
                );
            }
        }

        if policy.has_event(Event::NoPvp) && !has_bypass(participant, bypass::NOPVP) {
            state.forced_pvp = ForcedPvp::ForcedOff;
            if participant.pvp() {
                participant.set_pvp(false);
                participant.broadcast_pvp();
                participant.send_message(MessageKind::Info, "You can't enable PvP in this region!");
            }
        }

        if policy.has_event(Event::InvariantPvp) && !has_bypass(participant, bypass::INPVP) {
            state.pvp_toggle_locked = true;
        }

        if policy.has_event(Event::Private) && !has_bypass(participant, bypass::PRIVATE) {
            participant.respawn();
            participant.send_message(
                MessageKind::Error,
                "You don't have permission to enter that region.",
            );
        }

        metrics::record_transition(TransitionKind::Enter);
        info!(participant = %participant.id(), region, "region entered");
        self.events.emit(EngineEvent::RegionEntered {
            timestamp: Utc::now(),
            participant: participant.id().0,
            region: region.to_string(),
        });
    }

    fn leave(&self, participant: &dyn Participant, state: &mut ParticipantRegionState, region: &str) {
        let policy = self.store.get(region).or_else(|| state.entered_policy.clone());
        if policy.is_none() {
            warn!(
                participant = %participant.id(),
                region,
                "invariant violation: no policy snapshot for the region being left"
            );
        }

        if let Some(policy) = policy.as_deref() {
            if policy.has_event(Event::LeaveMsg) {
                match policy.leave_message.as_deref().filter(|m| !m.trim().is_empty()) {
                    Some(text) => participant.send_message(MessageKind::Plain, text),
                    None => participant.send_message(
                        MessageKind::Info,
                        &format!("You have left region {region}"),
                    ),
                }
            }
        }

        if let Some(group) = state.temp_group_applied.take() {
            if participant.temp_group().as_deref() == Some(group.as_str()) {
                participant.set_temp_group(None);
                participant.send_message(
                    MessageKind::Info,
                    &format!("You are no longer in group {group}."),
                );
            }
        }

        if state.god_mode_applied {
            state.god_mode_applied = false;
            participant.set_god_mode(false);
            participant.send_message(MessageKind::Info, "You are no longer in godmode!");
        }

        let carried_pvp = policy.as_deref().is_some_and(|p| {
            p.has_event(Event::Pvp) || p.has_event(Event::NoPvp) || p.has_event(Event::InvariantPvp)
        });
        if carried_pvp || state.pvp_constrained() {
            state.forced_pvp = ForcedPvp::Unconstrained;
            state.pvp_toggle_locked = false;
            participant.send_message(MessageKind::Info, "You can toggle your PvP status now.");
        }

        state.current_region = None;
        state.entered_policy = None;

        metrics::record_transition(TransitionKind::Leave);
        info!(participant = %participant.id(), region, "region left");
        self.events.emit(EngineEvent::RegionLeft {
            timestamp: Utc::now(),
            participant: participant.id().0,
            region: region.to_string(),
        });
    }
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("tracked", &self.states.len())
            .field("tie_break", &self.tie_break)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use regiontrigger_core::EventSet;

    use super::*;
    use crate::sim::{Effect, RectRegion, SimDirectory, SimGroups, SimIndex, SimParticipant};
    use crate::store::MemoryBackend;

    struct Fixture {
        index: Arc<SimIndex>,
        store: Arc<RegionConfigStore>,
        engine: Arc<TransitionEngine>,
        directory: SimDirectory,
    }

    fn fixture() -> Fixture {
        let index = Arc::new(SimIndex::new(vec![
            RectRegion::new("Arena", 1, 0, 0, 0, 10, 10),
            RectRegion::new("Inner", 2, 1, 2, 2, 4, 4),
        ]));
        let store = Arc::new(RegionConfigStore::new(
            Arc::new(MemoryBackend::new()),
            Arc::clone(&index) as Arc<dyn SpatialIndex>,
        ));
        let engine = Arc::new(TransitionEngine::new(
            Arc::clone(&store),
            Arc::clone(&index) as Arc<dyn SpatialIndex>,
            Arc::new(SimGroups::new(["vip"])),
            TieBreak::default(),
            Arc::new(EventEmitter::noop()),
        ));
        Fixture {
            index,
            store,
            engine,
            directory: SimDirectory::new(),
        }
    }

    /// Disconnects itself from the engine the moment the tick reads its
    /// position.
    struct Departing {
        inner: Arc<SimParticipant>,
        engine: Arc<TransitionEngine>,
    }

    impl Participant for Departing {
        fn id(&self) -> ParticipantId {
            self.inner.id()
        }
        fn name(&self) -> String {
            self.inner.name()
        }
        fn position(&self) -> TilePoint {
            self.engine.remove_participant(self.inner.id());
            self.inner.position()
        }
        fn has_permission(&self, permission: &str) -> bool {
            self.inner.has_permission(permission)
        }
        fn send_message(&self, kind: MessageKind, text: &str) {
            self.inner.send_message(kind, text);
        }
        fn pvp(&self) -> bool {
            self.inner.pvp()
        }
        fn set_pvp(&self, enabled: bool) {
            self.inner.set_pvp(enabled);
        }
        fn broadcast_pvp(&self) {
            self.inner.broadcast_pvp();
        }
        fn resync_pvp(&self) {
            self.inner.resync_pvp();
        }
        fn kill(&self) {
            self.inner.kill();
        }
        fn respawn(&self) {
            self.inner.respawn();
        }
        fn set_god_mode(&self, enabled: bool) {
            self.inner.set_god_mode(enabled);
        }
        fn temp_group(&self) -> Option<String> {
            self.inner.temp_group()
        }
        fn set_temp_group(&self, group: Option<&str>) {
            self.inner.set_temp_group(group);
        }
        fn disable(&self, reason: &str) {
            self.inner.disable(reason);
        }
        fn restore_tile(&self, point: TilePoint) {
            self.inner.restore_tile(point);
        }
        fn remove_projectile(&self, index: i32) {
            self.inner.remove_projectile(index);
        }
    }

    struct Only(Arc<dyn Participant>);

    impl ParticipantDirectory for Only {
        fn active(&self) -> Vec<Arc<dyn Participant>> {
            vec![Arc::clone(&self.0)]
        }
        fn get(&self, id: ParticipantId) -> Option<Arc<dyn Participant>> {
            (self.0.id() == id).then(|| Arc::clone(&self.0))
        }
    }

    fn events(list: &[Event]) -> EventSet {
        list.iter().copied().collect()
    }

    fn join(f: &Fixture, id: u32, x: i32, y: i32) -> Arc<SimParticipant> {
        let p = Arc::new(SimParticipant::new(ParticipantId(id), format!("p{id}")));
        p.set_position(TilePoint::new(x, y));
        f.directory.insert(Arc::clone(&p));
        f.engine.ensure_participant(ParticipantId(id));
        p
    }

    #[test]
    fn forced_pvp_enter_and_leave() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Pvp])).unwrap();
        let p = join(&f, 1, 1, 1);

        f.engine.tick(&f.directory);
        let state = f.engine.state(ParticipantId(1)).unwrap();
        assert_eq!(state.forced_pvp, ForcedPvp::ForcedOn);
        assert!(p.pvp());
        assert!(p.effects().contains(&Effect::BroadcastPvp));

        p.take_effects();
        p.set_position(TilePoint::new(50, 50));
        f.engine.tick(&f.directory);
        let state = f.engine.state(ParticipantId(1)).unwrap();
        assert_eq!(state.forced_pvp, ForcedPvp::Unconstrained);
        assert!(state.current_region.is_none());
        assert!(p.pvp(), "leaving does not change live PvP");
        assert!(p.messages().contains(&"You can toggle your PvP status now.".to_string()));
    }

    #[test]
    fn effects_fire_once_per_edge() {
        let f = fixture();
        f.store
            .add_events("Arena", events(&[Event::EnterMsg, Event::Kill]))
            .unwrap();
        let p = join(&f, 1, 1, 1);

        for _ in 0..3 {
            f.engine.tick(&f.directory);
        }
        let kills = p.effects().iter().filter(|e| **e == Effect::Kill).count();
        assert_eq!(kills, 1);
        assert_eq!(p.messages()[0], "You have entered region Arena");
    }

    #[test]
    fn higher_priority_region_wins() {
        let f = fixture();
        f.store.get_or_create("Arena").unwrap();
        f.store.get_or_create("Inner").unwrap();
        join(&f, 1, 3, 3);

        f.engine.tick(&f.directory);
        assert_eq!(
            f.engine.state(ParticipantId(1)).unwrap().current_region.as_deref(),
            Some("Inner")
        );
    }

    #[test]
    fn unconfigured_regions_are_ignored() {
        let f = fixture();
        f.store.get_or_create("Arena").unwrap();
        join(&f, 1, 3, 3);

        f.engine.tick(&f.directory);
        assert_eq!(
            f.engine.state(ParticipantId(1)).unwrap().current_region.as_deref(),
            Some("Arena")
        );
    }

    #[test]
    fn bypass_skips_kill() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Kill])).unwrap();
        let p = join(&f, 1, 1, 1);
        p.grant(bypass::KILL);

        f.engine.tick(&f.directory);
        assert!(!p.effects().contains(&Effect::Kill));
    }

    #[test]
    fn temp_group_applied_and_reverted() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::TempGroup])).unwrap();
        f.store.set_temp_group("Arena", Some("VIP".to_string())).unwrap();
        let p = join(&f, 1, 1, 1);

        f.engine.tick(&f.directory);
        assert_eq!(p.temp_group().as_deref(), Some("vip"));

        p.set_position(TilePoint::new(50, 50));
        f.engine.tick(&f.directory);
        assert_eq!(p.temp_group(), None);
        assert!(p.messages().contains(&"You are no longer in group vip.".to_string()));
    }

    #[test]
    fn unresolved_temp_group_is_skipped() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::TempGroup])).unwrap();
        f.store.set_temp_group("Arena", Some("ghost".to_string())).unwrap();
        let p = join(&f, 1, 1, 1);

        f.engine.tick(&f.directory);
        assert_eq!(p.temp_group(), None);
        assert_eq!(
            f.engine.state(ParticipantId(1)).unwrap().current_region.as_deref(),
            Some("Arena")
        );
    }

    #[test]
    fn ambient_message_repeats_at_interval() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Message])).unwrap();
        f.store.set_message("Arena", Some("Be nice".to_string())).unwrap();
        f.store.set_message_interval("Arena", 2).unwrap();
        let p = join(&f, 1, 1, 1);

        for _ in 0..4 {
            f.engine.tick(&f.directory);
        }
        let count = p.messages().iter().filter(|m| *m == "Be nice").count();
        assert_eq!(count, 2);
    }

    #[test]
    fn zero_interval_never_repeats() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Message])).unwrap();
        f.store.set_message("Arena", Some("Be nice".to_string())).unwrap();
        let p = join(&f, 1, 1, 1);

        for _ in 0..3 {
            f.engine.tick(&f.directory);
        }
        assert!(p.messages().is_empty());
    }

    #[test]
    fn deleted_region_leaves_from_snapshot() {
        let f = fixture();
        f.store
            .add_events("Arena", events(&[Event::Godmode, Event::LeaveMsg, Event::NoPvp]))
            .unwrap();
        let p = join(&f, 1, 1, 1);
        f.engine.tick(&f.directory);
        assert!(p.god_mode());
        assert!(f.engine.current_policy(ParticipantId(1)).is_some());

        f.index.remove("Arena");
        f.store.delete("Arena").unwrap();
        assert!(f.engine.current_policy(ParticipantId(1)).is_none());

        f.engine.tick(&f.directory);
        let state = f.engine.state(ParticipantId(1)).unwrap();
        assert!(state.current_region.is_none());
        assert!(!p.god_mode());
        assert_eq!(state.forced_pvp, ForcedPvp::Unconstrained);
        assert!(p.messages().contains(&"You have left region Arena".to_string()));
    }

    #[test]
    fn panicking_participant_does_not_stop_tick() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::EnterMsg])).unwrap();
        let bad = join(&f, 1, 1, 1);
        bad.fail_message_delivery(true);
        let good = join(&f, 2, 1, 1);

        let report = f.engine.tick(&f.directory);
        assert_eq!(report.participants, 2);
        assert_eq!(report.faults, 1);
        assert_eq!(good.messages(), vec!["You have entered region Arena".to_string()]);
    }

    #[test]
    fn leave_during_tick_is_not_undone() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Pvp])).unwrap();
        let inner = Arc::new(SimParticipant::new(ParticipantId(1), "leaver"));
        inner.set_position(TilePoint::new(1, 1));
        f.engine.ensure_participant(ParticipantId(1));
        let directory = Only(Arc::new(Departing {
            inner: Arc::clone(&inner),
            engine: Arc::clone(&f.engine),
        }));

        let report = f.engine.tick(&directory);
        assert_eq!(report.transitions, 1);
        assert!(f.engine.state(ParticipantId(1)).is_none());
        assert_eq!(f.engine.tracked(), 0);
    }

    #[test]
    fn new_session_starts_unconstrained() {
        let f = fixture();
        f.store
            .add_events("Arena", events(&[Event::Pvp, Event::InvariantPvp]))
            .unwrap();
        join(&f, 1, 1, 1);
        f.engine.tick(&f.directory);
        assert_eq!(
            f.engine.state(ParticipantId(1)).unwrap().forced_pvp,
            ForcedPvp::ForcedOn
        );

        f.engine.begin_session(ParticipantId(1));
        assert_eq!(
            f.engine.state(ParticipantId(1)),
            Some(ParticipantRegionState::default())
        );
    }

    #[test]
    fn partial_enter_is_reverted_on_leave() {
        let f = fixture();
        f.store.add_events("Arena", events(&[Event::Godmode])).unwrap();
        let p = join(&f, 1, 1, 1);
        p.fail_message_delivery(true);

        let report = f.engine.tick(&f.directory);
        assert_eq!(report.faults, 1);
        assert!(p.god_mode());
        let state = f.engine.state(ParticipantId(1)).unwrap();
        assert_eq!(state.current_region.as_deref(), Some("Arena"));
        assert!(state.god_mode_applied);

        p.fail_message_delivery(false);
        p.set_position(TilePoint::new(50, 50));
        let report = f.engine.tick(&f.directory);
        assert_eq!(report.faults, 0);
        assert!(!p.god_mode());
        assert!(f.engine.state(ParticipantId(1)).unwrap().current_region.is_none());
    }

    #[test]
    fn failed_leave_is_retried() {
        let f = fixture();
        f.store
            .add_events("Arena", events(&[Event::LeaveMsg, Event::Godmode]))
            .unwrap();
        let p = join(&f, 1, 1, 1);
        f.engine.tick(&f.directory);
        assert!(p.god_mode());

        p.fail_message_delivery(true);
        p.set_position(TilePoint::new(50, 50));
        assert_eq!(f.engine.tick(&f.directory).faults, 1);
        assert!(p.god_mode());

        p.fail_message_delivery(false);
        assert_eq!(f.engine.tick(&f.directory).transitions, 1);
        assert!(!p.god_mode());
        assert!(p.messages().contains(&"You have left region Arena".to_string()));
    }

    #[test]
    fn tracked_region_follows_selection() {
        let f = fixture();
        f.store.get_or_create("Arena").unwrap();
        f.store.get_or_create("Inner").unwrap();
        let p = join(&f, 1, 1, 1);

        for (x, y) in [(1, 1), (3, 3), (50, 50), (3, 3), (8, 8)] {
            p.set_position(TilePoint::new(x, y));
            f.engine.tick(&f.directory);
            let expected = f.engine.region_at(TilePoint::new(x, y)).map(|r| r.region.clone());
            assert_eq!(f.engine.state(ParticipantId(1)).unwrap().current_region, expected);
        }
    }

    #[test]
    fn remove_participant_drops_state() {
        let f = fixture();
        join(&f, 1, 1, 1);
        assert_eq!(f.engine.tracked(), 1);
        f.engine.remove_participant(ParticipantId(1));
        assert!(f.engine.state(ParticipantId(1)).is_none());
    }
}
