//! The hunter's behavior state machine.
//!
//! One [`HunterController::tick`] per simulation frame runs, in order:
//! timers, buffered noise, the active state's movement routine,
//! perception, the rage meter, and speed selection. Perception and rage
//! run after movement, so a transition they cause shapes the next tick
//! and never rewrites the destination just issued.

use crate::config::BehaviorConfig;
use crate::events::{EventBus, HunterEvent};
use crate::perception::{NoiseEvent, PerceptionResult, PerceptionService};
use crate::planner::NavTargetPlanner;
use crate::profile::{ActiveMovement, MovementProfiles, SpeedController};
use crate::rage::{RageMeter, RageState, RageTransition};
use crate::rng::HunterRng;
use crate::state::AgentState;
use crate::world::{NavigationService, SpatialQuery, TargetProvider};
use hunter_common::{EntityId, Point3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// What the hunter did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// State at the end of the tick
    pub state: AgentState,
    /// Destination requested this tick, if any
    pub destination: Option<Point3>,
    /// Speed handed to the navigation agent
    pub speed: f32,
    /// Sight range for the next perception query
    pub sight_range: f32,
    /// Hearing range for the next noise intake
    pub hearing_range: f32,
    /// Target was seen this tick
    pub visible: bool,
    /// Rage meter value
    pub rage: f32,
    /// Enraged mode is active
    pub enraged: bool,
}

/// Pursuit controller for a single hunter.
///
/// Collaborators are injected at construction: `N` moves the agent and
/// samples the walkable surface, `S` answers occlusion rays, and `T`
/// reports where the target is.
pub struct HunterController<N, S, T>
where
    N: NavigationService,
    S: SpatialQuery,
    T: TargetProvider,
{
    config: BehaviorConfig,
    nav: N,
    perception: PerceptionService<S>,
    target: T,
    planner: NavTargetPlanner,
    rage: RageMeter,
    profiles: MovementProfiles,
    movement: ActiveMovement,
    rng: HunterRng,
    events: EventBus,

    state: AgentState,
    visible: bool,
    last_seen: Option<Point3>,
    destination: Option<Point3>,
    issued: Option<Point3>,
    pending_noise: Vec<NoiseEvent>,

    roam_target: Option<Point3>,
    roam_timer: f32,
    search_waypoint: Option<Point3>,
    search_arrivals: u32,
    investigate_target: Option<Point3>,
    nudge_cooldown: f32,

    captured: bool,
    elapsed: f32,
}

impl<N, S, T> HunterController<N, S, T>
where
    N: NavigationService,
    S: SpatialQuery,
    T: TargetProvider,
{
    /// Creates a controller in the `Roaming` state.
    ///
    /// The configuration is clamped into range first, and the roam point
    /// set is sampled from the navigation service's surface once.
    pub fn new(mut config: BehaviorConfig, mut nav: N, spatial: S, target: T) -> Self {
        config.validate();

        let planner = NavTargetPlanner::precompute(&nav, config.planner.clone());
        let profiles = MovementProfiles::from_config(&config.movement);
        let movement = SpeedController::select(AgentState::Roaming, false, &profiles);
        nav.set_speed(movement.speed);

        info!(
            roam_points = planner.points().len(),
            seed = config.seed,
            "Hunter controller initialized"
        );

        Self {
            perception: PerceptionService::new(spatial, &config.perception),
            rage: RageMeter::new(config.rage.clone()),
            rng: HunterRng::new(config.seed),
            events: EventBus::default(),
            nav,
            target,
            planner,
            profiles,
            movement,
            state: AgentState::Roaming,
            visible: false,
            last_seen: None,
            destination: None,
            issued: None,
            pending_noise: Vec::new(),
            roam_target: None,
            roam_timer: 0.0,
            search_waypoint: None,
            search_arrivals: 0,
            investigate_target: None,
            nudge_cooldown: 0.0,
            captured: false,
            elapsed: 0.0,
            config,
        }
    }

    /// Advances the controller by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.issued = None;

        self.advance_timers(dt);
        self.check_consistency();
        self.consume_noise();
        self.run_state();

        let perception = self.perceive();
        self.apply_perception(perception);
        self.update_rage(dt);

        self.movement =
            SpeedController::select(self.state, self.rage.boost_active(), &self.profiles);
        self.nav.set_speed(self.movement.speed);

        self.check_capture();

        TickReport {
            state: self.state,
            destination: self.issued,
            speed: self.movement.speed,
            sight_range: self.movement.sight_range,
            hearing_range: self.movement.hearing_range,
            visible: self.visible,
            rage: self.rage.state().current,
            enraged: self.rage.is_enraged(),
        }
    }

    /// Reports a sound. Handled at the start of the next tick.
    pub fn on_noise_heard(&mut self, position: Point3, source: Option<EntityId>) {
        self.pending_noise.push(NoiseEvent::new(position, source));
    }

    /// Reports that the hunter's collision volume touched `entity`.
    pub fn notify_contact(&mut self, entity: EntityId) {
        let Some(target) = self.target.target() else {
            return;
        };
        if target.id == entity {
            self.capture(entity);
        }
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Returns whether enraged mode is active.
    #[must_use]
    pub fn is_enraged(&self) -> bool {
        self.rage.is_enraged()
    }

    /// Rage meter values.
    #[must_use]
    pub fn rage(&self) -> &RageState {
        self.rage.state()
    }

    /// Where the target was last seen.
    #[must_use]
    pub fn last_seen_position(&self) -> Option<Point3> {
        self.last_seen
    }

    /// Last destination requested from the navigation agent.
    #[must_use]
    pub fn destination(&self) -> Option<Point3> {
        self.destination
    }

    /// Speed and sensor ranges in effect.
    #[must_use]
    pub fn movement(&self) -> ActiveMovement {
        self.movement
    }

    /// Returns whether the target has been captured.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Simulated seconds since construction.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Active configuration (after clamping).
    #[must_use]
    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Destination planner.
    #[must_use]
    pub fn planner(&self) -> &NavTargetPlanner {
        &self.planner
    }

    /// Navigation agent.
    #[must_use]
    pub fn navigation(&self) -> &N {
        &self.nav
    }

    /// Mutable navigation agent, for drivers that step it.
    pub fn navigation_mut(&mut self) -> &mut N {
        &mut self.nav
    }

    /// Takes every event published since the last call.
    pub fn drain_events(&self) -> Vec<HunterEvent> {
        self.events.drain()
    }

    fn advance_timers(&mut self, dt: f32) {
        self.nudge_cooldown = (self.nudge_cooldown - dt).max(0.0);
        if self.state == AgentState::Roaming {
            self.roam_timer += dt;
        }
    }

    fn check_consistency(&mut self) {
        if self.state == AgentState::Investigating && self.investigate_target.is_none() {
            self.recover();
        }
    }

    fn recover(&mut self) {
        let from = self.state;
        let to = if self.visible {
            AgentState::Chasing
        } else {
            AgentState::Roaming
        };
        warn!(%from, %to, "Inconsistent behavior state, recovering");
        self.events.publish(HunterEvent::Recovered { from, to });
        self.transition(to, "recovery");
    }

    fn consume_noise(&mut self) {
        if self.pending_noise.is_empty() {
            return;
        }
        let pos = self.nav.position();
        let mut chosen = None;
        for noise in std::mem::take(&mut self.pending_noise) {
            if self.visible || !self.state.accepts_noise() {
                trace!(state = %self.state, "Noise ignored");
                continue;
            }
            let hearing = self.movement.hearing_range;
            if !PerceptionService::<S>::hear_noise(noise.position, hearing, pos) {
                continue;
            }
            chosen = Some(self.perception.investigate_point(noise.position, &mut self.rng));
        }

        // Last audible noise of the tick wins.
        if let Some(point) = chosen {
            self.investigate_target = Some(point);
            self.transition(AgentState::Investigating, "noise heard");
            self.events
                .publish(HunterEvent::NoiseInvestigated { position: point });
        }
    }

    fn run_state(&mut self) {
        match self.state {
            AgentState::Roaming => self.roam(),
            AgentState::Chasing => self.chase(),
            AgentState::Investigating => self.investigate(),
            AgentState::Searching => self.search(),
            AgentState::Enraged => self.enraged(),
        }
    }

    fn roam(&mut self) {
        let replan = match self.roam_target {
            None => true,
            Some(goal) => self.arrived(goal) || self.roam_timer >= self.config.roam_interval,
        };
        if replan {
            self.roam_timer = 0.0;
            let pos = self.nav.position();
            let goal = self.planner.roam_target(pos, &mut self.rng);
            self.roam_target = Some(goal);
            self.issue(goal);
        }
    }

    fn chase(&mut self) {
        let Some(target) = self.target.target() else {
            self.transition(AgentState::Searching, "target missing");
            return;
        };
        if self.rage.is_enraged() {
            self.issue(target.position);
            return;
        }
        if !self.nav.calculate_path(target.position).is_complete() {
            self.transition(AgentState::Searching, "path to target infeasible");
            return;
        }

        self.issue(target.position);
    }

    fn investigate(&mut self) {
        let Some(goal) = self.investigate_target else {
            return;
        };
        if self.destination != Some(goal) {
            self.issue(goal);
        }
        if self.arrived(goal) {
            self.investigate_target = None;
            if !self.reacquire("target seen at noise") {
                self.transition(AgentState::Roaming, "investigation done");
            }
        }
    }

    fn search(&mut self) {
        if let Some(waypoint) = self.search_waypoint {
            if !self.arrived(waypoint) {
                return;
            }
            self.search_arrivals += 1;
            self.search_waypoint = None;
            if self.reacquire("target reacquired") {
                return;
            }
            if self.search_arrivals >= self.config.search_waypoints {
                self.transition(AgentState::Roaming, "search exhausted");
                return;
            }
        }

        let pos = self.nav.position();
        let anchor = self.last_seen.unwrap_or(pos);
        let waypoint = self
            .planner
            .search_waypoint(&self.nav, pos, anchor, &mut self.rng);
        self.search_waypoint = Some(waypoint);
        self.issue(waypoint);
    }

    /// Switches to `Chasing` when the target is in sight and a complete path
    /// to where it was seen exists. Returns whether the switch happened.
    fn reacquire(&mut self, reason: &'static str) -> bool {
        let reachable = match self.last_seen {
            Some(seen) if self.visible => self.nav.calculate_path(seen).is_complete(),
            _ => false,
        };
        if reachable {
            self.transition(AgentState::Chasing, reason);
        }
        reachable
    }

    fn enraged(&mut self) {
        if !self.rage.boost_active() {
            let next = if self.visible {
                AgentState::Chasing
            } else {
                AgentState::Searching
            };
            self.transition(next, "rage below threshold");
            return;
        }

        let Some(target) = self.target.target() else {
            return;
        };
        let pos = self.nav.position();
        let sight = self.movement.sight_range;
        if self.perception.can_see_target(pos, sight, target.position) {
            self.issue(target.position);
            return;
        }

        if self.nudge_cooldown <= 0.0 {
            let last_seen = self.last_seen.unwrap_or(target.position);
            let goal = self.planner.nudge_target(
                &self.nav,
                pos,
                target.position,
                last_seen,
                &mut self.rng,
            );
            self.nudge_cooldown = self.config.nudge_cooldown;
            self.issue(goal);
        }
    }

    fn perceive(&self) -> PerceptionResult {
        let pos = self.nav.position();
        self.perception
            .perceive(pos, self.movement.sight_range, self.target.target())
    }

    fn apply_perception(&mut self, result: PerceptionResult) {
        self.visible = result.is_visible();

        if let Some(seen) = result.target_position {
            self.last_seen = Some(seen);
            let pursuing = matches!(self.state, AgentState::Chasing | AgentState::Enraged);
            if pursuing || self.rage.is_enraged() {
                return;
            }
            if self.nav.calculate_path(seen).is_complete() {
                self.transition(AgentState::Chasing, "target sighted");
            } else {
                trace!("Target sighted but unreachable");
            }
        } else if self.state == AgentState::Chasing && !self.rage.is_enraged() {
            self.transition(AgentState::Searching, "lost sight");
        }
    }

    fn update_rage(&mut self, dt: f32) {
        match self.rage.update(self.visible, dt) {
            Some(RageTransition::Enraged) => {
                info!(rage = self.rage.state().current, "Hunter enraged");
                self.events.publish(HunterEvent::Enraged);
                self.transition(AgentState::Enraged, "rage maxed");
            },
            Some(RageTransition::Calmed) => {
                let cooldown = self.rage.state().cooldown_remaining;
                info!(cooldown, "Hunter calmed down");
                self.events.publish(HunterEvent::Calmed { cooldown });
                let next = if self.visible {
                    AgentState::Chasing
                } else {
                    AgentState::Searching
                };
                self.transition(next, "rage below threshold");
            },
            None => {},
        }
    }

    fn check_capture(&mut self) {
        if self.captured {
            return;
        }
        let Some(target) = self.target.target() else {
            return;
        };
        if self.nav.position().distance(target.position) <= self.config.movement.capture_radius {
            self.capture(target.id);
        }
    }

    fn capture(&mut self, target: EntityId) {
        if self.captured {
            return;
        }
        self.captured = true;
        info!(target = target.raw(), "Target captured");
        self.events.publish(HunterEvent::TargetCaptured { target });
    }

    fn arrived(&self, goal: Point3) -> bool {
        let tolerance = self.config.movement.arrival_tolerance;
        if self.nav.position().distance(goal) < tolerance {
            return true;
        }
        let progress = self.nav.progress();
        self.destination == Some(goal)
            && !progress.path_pending
            && progress.remaining_distance <= tolerance
    }

    fn issue(&mut self, point: Point3) {
        self.nav.set_destination(point);
        self.destination = Some(point);
        self.issued = Some(point);
    }

    fn transition(&mut self, to: AgentState, reason: &'static str) {
        let from = self.state;
        if from == to {
            return;
        }
        debug!(%from, %to, reason, "State change");
        self.state = to;

        if from == AgentState::Investigating {
            self.investigate_target = None;
        }
        match to {
            AgentState::Roaming => {
                self.roam_target = None;
                self.roam_timer = 0.0;
            },
            AgentState::Searching => {
                self.search_waypoint = None;
                self.search_arrivals = 0;
            },
            AgentState::Enraged => {
                self.nudge_cooldown = 0.0;
            },
            AgentState::Chasing | AgentState::Investigating => {},
        }

        self.events.publish(HunterEvent::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::testing::{OpenSpace, ScriptedNav};
    use crate::world::{PathStatus, TargetHandle, TargetSnapshot};
    use glam::Vec3;

    type TestController = HunterController<ScriptedNav, OpenSpace, TargetHandle>;

    const DT: f32 = 0.1;
    const TARGET_ID: EntityId = EntityId::from_raw(7);

    fn setup_with(config: BehaviorConfig, target: Option<Point3>) -> (TestController, TargetHandle) {
        let handle = TargetHandle::new();
        if let Some(position) = target {
            handle.set(TargetSnapshot::new(TARGET_ID, position));
        }
        let controller =
            HunterController::new(config, ScriptedNav::new(Vec3::ZERO), OpenSpace, handle.clone());
        (controller, handle)
    }

    fn setup(target: Option<Point3>) -> (TestController, TargetHandle) {
        setup_with(BehaviorConfig::default(), target)
    }

    fn count(events: &[HunterEvent], pred: impl Fn(&HunterEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    /// Ticks with the target in view until the hunter enrages.
    fn enrage(controller: &mut TestController) {
        for _ in 0..40 {
            controller.tick(0.25);
        }
        assert_eq!(controller.state(), AgentState::Enraged);
    }

    #[test]
    fn test_starts_roaming_toward_roam_point() {
        let (mut controller, _) = setup(None);
        assert_eq!(controller.state(), AgentState::Roaming);

        let report = controller.tick(DT);
        let goal = report.destination.expect("roam destination issued");
        assert!(controller.navigation().vertices.contains(&goal));
        assert_eq!(report.state, AgentState::Roaming);
        assert!((report.speed - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_roaming_to_chasing_when_target_visible() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));

        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Chasing);
        assert!(report.visible);
        assert!((report.speed - 6.0).abs() < 1e-6);
        assert_eq!(controller.last_seen_position(), Some(Vec3::new(10.0, 0.0, 0.0)));

        let report = controller.tick(DT);
        assert_eq!(report.destination, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_chasing_to_searching_when_sight_lost() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        handle.move_to(Vec3::new(100.0, 0.0, 0.0));

        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Searching);
        assert!(!report.visible);

        let events = controller.drain_events();
        assert_eq!(
            events,
            vec![
                HunterEvent::StateChanged {
                    from: AgentState::Roaming,
                    to: AgentState::Chasing,
                },
                HunterEvent::StateChanged {
                    from: AgentState::Chasing,
                    to: AgentState::Searching,
                },
            ]
        );
    }

    #[test]
    fn test_infeasible_path_demotes_chase() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        controller.navigation_mut().path_status = PathStatus::Partial;

        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Searching);
        assert!(report.visible);

        // Still unreachable: seeing the target does not restart the chase
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Searching);
    }

    #[test]
    fn test_target_despawn_while_chasing() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        handle.clear();

        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Searching);
        assert_eq!(controller.last_seen_position(), Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_search_waypoint_then_roaming_on_arrival() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        handle.move_to(Vec3::new(100.0, 0.0, 0.0));
        controller.tick(DT);
        assert_eq!(controller.state(), AgentState::Searching);

        let report = controller.tick(DT);
        let waypoint = report.destination.expect("search waypoint issued");
        assert!(waypoint.distance(Vec3::new(10.0, 0.0, 0.0)) <= 15.0 + 1e-3);
        assert_eq!(report.state, AgentState::Searching);

        controller.navigation_mut().arrive();
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Roaming);

        let report = controller.tick(DT);
        assert!(report.destination.is_some());
    }

    #[test]
    fn test_search_visits_configured_waypoints() {
        let config = BehaviorConfig {
            search_waypoints: 3,
            ..BehaviorConfig::default()
        };
        let (mut controller, handle) = setup_with(config, Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        handle.move_to(Vec3::new(100.0, 0.0, 0.0));
        controller.tick(DT);
        controller.tick(DT);

        for _ in 0..2 {
            controller.navigation_mut().arrive();
            let report = controller.tick(DT);
            assert_eq!(report.state, AgentState::Searching);
            assert!(report.destination.is_some());
        }
        controller.navigation_mut().arrive();
        assert_eq!(controller.tick(DT).state, AgentState::Roaming);
    }

    #[test]
    fn test_searching_reacquires_target() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        handle.move_to(Vec3::new(100.0, 0.0, 0.0));
        controller.tick(DT);
        controller.tick(DT);

        handle.move_to(Vec3::new(0.0, 0.0, 8.0));
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Chasing);
    }

    #[test]
    fn test_unreachable_sighting_keeps_searching() {
        let config = BehaviorConfig {
            search_waypoints: 4,
            movement: MovementConfig {
                sight_range: 40.0,
                ..MovementConfig::default()
            },
            ..BehaviorConfig::default()
        };
        let (mut controller, _) = setup_with(config, Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        controller.navigation_mut().path_status = PathStatus::Partial;
        assert_eq!(controller.tick(DT).state, AgentState::Searching);
        controller.tick(DT);
        controller.drain_events();

        for _ in 0..3 {
            controller.navigation_mut().arrive();
            let report = controller.tick(DT);
            assert_eq!(report.state, AgentState::Searching);
            assert!(report.visible);
            assert!(report.destination.is_some());
        }
        let events = controller.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, HunterEvent::StateChanged { .. })),
            0
        );
    }

    #[test]
    fn test_search_without_walkable_ground_returns_to_last_seen() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        controller.navigation_mut().walkable = false;
        handle.move_to(Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(controller.tick(DT).state, AgentState::Searching);

        let report = controller.tick(DT);
        assert_eq!(report.destination, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_enraged_fires_once() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        enrage(&mut controller);
        assert!(controller.is_enraged());

        for _ in 0..40 {
            let report = controller.tick(0.25);
            assert_eq!(report.state, AgentState::Enraged);
            assert!((report.speed - 9.0).abs() < 1e-5);
        }

        let events = controller.drain_events();
        assert_eq!(count(&events, |e| *e == HunterEvent::Enraged), 1);
    }

    #[test]
    fn test_enraged_chases_visible_target() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        enrage(&mut controller);

        let report = controller.tick(0.25);
        assert_eq!(report.destination, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_enraged_nudges_on_cooldown() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        enrage(&mut controller);

        let target = Vec3::new(30.0, 0.0, 0.0);
        handle.move_to(target);
        let report = controller.tick(0.25);
        assert_eq!(report.state, AgentState::Enraged);
        let nudge = report.destination.expect("nudge issued");
        assert!(nudge.distance(target) < 30.0);

        for _ in 0..7 {
            let report = controller.tick(0.25);
            assert_eq!(report.state, AgentState::Enraged);
            assert_eq!(report.destination, None);
        }
        assert!(controller.tick(0.25).destination.is_some());
    }

    #[test]
    fn test_enraged_nudge_off_ground_heads_to_last_seen() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        enrage(&mut controller);
        controller.navigation_mut().walkable = false;

        handle.move_to(Vec3::new(30.0, 0.0, 0.0));
        let report = controller.tick(0.25);
        assert_eq!(report.state, AgentState::Enraged);
        assert_eq!(report.destination, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_calm_down_hands_off_to_search() {
        let (mut controller, handle) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        enrage(&mut controller);
        handle.move_to(Vec3::new(200.0, 0.0, 0.0));

        let mut ticks = 0;
        while controller.state() == AgentState::Enraged {
            controller.tick(0.25);
            ticks += 1;
            assert!(ticks < 200, "rage never decayed");
        }

        assert_eq!(controller.state(), AgentState::Searching);
        assert!(!controller.is_enraged());
        assert!(controller.rage().in_cooldown);
        let events = controller.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, HunterEvent::Calmed { .. })),
            1
        );
    }

    #[test]
    fn test_noise_starts_investigation() {
        let (mut controller, _) = setup(None);
        controller.tick(DT);
        controller.drain_events();

        let noise = Vec3::new(8.0, 0.0, 0.0);
        controller.on_noise_heard(noise, None);
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Investigating);

        let point = report.destination.expect("investigation destination");
        assert!(point.distance(noise) <= 2.0 + 1e-4);
        let events = controller.drain_events();
        assert!(events.contains(&HunterEvent::NoiseInvestigated { position: point }));

        controller.navigation_mut().arrive();
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Roaming);
    }

    #[test]
    fn test_several_noises_publish_one_investigation() {
        let (mut controller, _) = setup(None);
        controller.tick(DT);
        controller.drain_events();

        let last = Vec3::new(0.0, 0.0, -6.0);
        controller.on_noise_heard(Vec3::new(8.0, 0.0, 0.0), None);
        controller.on_noise_heard(last, None);
        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Investigating);

        let point = report.destination.expect("investigation destination");
        assert!(point.distance(last) <= 2.0 + 1e-4);
        let events = controller.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, HunterEvent::NoiseInvestigated { .. })),
            1
        );
        assert!(events.contains(&HunterEvent::NoiseInvestigated { position: point }));
    }

    #[test]
    fn test_noise_out_of_range_ignored() {
        let (mut controller, _) = setup(None);
        controller.on_noise_heard(Vec3::new(100.0, 0.0, 0.0), None);
        assert_eq!(controller.tick(DT).state, AgentState::Roaming);
    }

    #[test]
    fn test_noise_ignored_while_chasing() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.tick(DT);
        controller.on_noise_heard(Vec3::new(-5.0, 0.0, 0.0), Some(EntityId::from_raw(3)));
        assert_eq!(controller.tick(DT).state, AgentState::Chasing);
    }

    #[test]
    fn test_missing_target_is_tolerated() {
        let (mut controller, _) = setup(None);
        for _ in 0..100 {
            let report = controller.tick(DT);
            assert_eq!(report.state, AgentState::Roaming);
            assert!(!report.visible);
        }
        assert!(controller.rage().current.abs() < f32::EPSILON);
        assert!(controller.last_seen_position().is_none());
    }

    #[test]
    fn test_roam_arrival_picks_new_target() {
        let (mut controller, _) = setup(None);
        let mut previous = controller.tick(DT).destination.expect("first roam target");
        for _ in 0..10 {
            controller.navigation_mut().arrive();
            let next = controller.tick(DT).destination.expect("regenerated roam target");
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_roam_interval_replans() {
        let config = BehaviorConfig {
            roam_interval: 1.0,
            ..BehaviorConfig::default()
        };
        let (mut controller, _) = setup_with(config, None);
        assert!(controller.tick(0.25).destination.is_some());
        for _ in 0..3 {
            assert!(controller.tick(0.25).destination.is_none());
        }
        assert!(controller.tick(0.25).destination.is_some());
    }

    #[test]
    fn test_capture_published_once() {
        let (mut controller, _) = setup(Some(Vec3::new(1.0, 0.0, 0.0)));
        controller.tick(DT);
        controller.tick(DT);
        assert!(controller.is_captured());

        let events = controller.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, HunterEvent::TargetCaptured { .. })),
            1
        );
    }

    #[test]
    fn test_contact_signal_checks_entity() {
        let (mut controller, _) = setup(Some(Vec3::new(10.0, 0.0, 0.0)));
        controller.notify_contact(EntityId::from_raw(99));
        assert!(!controller.is_captured());

        controller.notify_contact(TARGET_ID);
        assert!(controller.is_captured());
        assert_eq!(
            controller.drain_events(),
            vec![HunterEvent::TargetCaptured { target: TARGET_ID }]
        );
    }

    #[test]
    fn test_inconsistent_investigation_recovers() {
        let (mut controller, _) = setup(None);
        controller.state = AgentState::Investigating;
        controller.investigate_target = None;

        let report = controller.tick(DT);
        assert_eq!(report.state, AgentState::Roaming);
        let events = controller.drain_events();
        assert!(events.contains(&HunterEvent::Recovered {
            from: AgentState::Investigating,
            to: AgentState::Roaming,
        }));
    }

    #[test]
    fn test_same_seed_same_destinations() {
        let run = || {
            let (mut controller, handle) = setup(Some(Vec3::new(40.0, 0.0, 0.0)));
            let mut destinations = Vec::new();
            for step in 0..60 {
                if step % 5 == 0 {
                    controller.navigation_mut().arrive();
                }
                if step == 30 {
                    handle.move_to(Vec3::new(12.0, 0.0, 0.0));
                }
                destinations.push(controller.tick(DT).destination);
            }
            destinations
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let (mut controller, _) = setup(None);
        controller.tick(-1.0);
        controller.tick(f32::NAN);
        assert!(controller.elapsed().abs() < f32::EPSILON);
    }
}
