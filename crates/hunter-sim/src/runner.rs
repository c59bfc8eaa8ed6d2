//! Fixed-step driver loop.
//!
//! Each step moves the scripted player, reports its footsteps, ticks the
//! hunter, then lets the hunter's navigation agent move. The run ends on
//! capture or when the configured duration elapses.

use crate::arena::{Arena, ArenaNav};
use crate::config::{PlayerConfig, SimConfig};
use glam::Vec3;
use hunter_ai::{
    AgentState, HunterController, HunterEvent, TargetHandle, TargetSnapshot, TickReport,
};
use hunter_common::{planar_distance, EntityId, HunterError, HunterResult, Point3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

fn floor_point(xz: [f32; 2]) -> Point3 {
    Vec3::new(xz[0], 0.0, xz[1])
}

/// Player walking a waypoint loop and making noise as it goes.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    position: Point3,
    speed: f32,
    waypoints: Vec<Point3>,
    next: usize,
    noise_interval: f32,
    noise_timer: f32,
}

impl ScriptedPlayer {
    /// Creates the player at its spawn point.
    #[must_use]
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            position: floor_point(config.spawn),
            speed: config.speed,
            waypoints: config.waypoints.iter().copied().map(floor_point).collect(),
            next: 0,
            noise_interval: config.noise_interval,
            noise_timer: 0.0,
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Walks for `dt` seconds. Returns whether a footstep was made.
    pub fn step(&mut self, arena: &Arena, dt: f32) -> bool {
        if let Some(&goal) = self.waypoints.get(self.next) {
            let offset = goal - self.position;
            let distance = planar_distance(self.position, goal);
            let reach = self.speed * dt;
            let next = if distance <= reach {
                self.next = (self.next + 1) % self.waypoints.len();
                goal
            } else {
                self.position + Vec3::new(offset.x, 0.0, offset.z) / distance * reach
            };
            self.position = arena.slide(self.position, next);
        }

        if self.noise_interval <= 0.0 {
            return false;
        }
        self.noise_timer += dt;
        if self.noise_timer >= self.noise_interval {
            self.noise_timer = 0.0;
            return true;
        }
        false
    }
}

/// One traced tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// Simulated time at the end of the tick
    pub time: f32,
    /// Hunter position after moving
    pub hunter: [f32; 3],
    /// Player position, when spawned
    pub player: Option<[f32; 3]>,
    /// What the controller reported
    pub report: TickReport,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSummary {
    /// Ticks executed
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    /// Time of capture, if it happened
    pub captured_at: Option<f32>,
    /// State when the run ended
    pub final_state: AgentState,
    /// State changes observed
    pub state_changes: u32,
    /// Times the hunter became enraged
    pub enraged_count: u32,
    /// Footstep noises emitted
    pub noises_emitted: u32,
    /// Noises the hunter went to investigate
    pub investigations: u32,
    /// Defensive recoveries
    pub recoveries: u32,
    /// Seconds spent per state
    pub time_in_state: BTreeMap<String, f32>,
}

impl SimSummary {
    fn new() -> Self {
        Self {
            ticks: 0,
            elapsed: 0.0,
            captured_at: None,
            final_state: AgentState::default(),
            state_changes: 0,
            enraged_count: 0,
            noises_emitted: 0,
            investigations: 0,
            recoveries: 0,
            time_in_state: AgentState::all()
                .iter()
                .map(|s| (s.display_name().to_string(), 0.0))
                .collect(),
        }
    }
}

/// A hunter chasing a scripted player around an arena.
pub struct Simulation {
    config: SimConfig,
    arena: Arc<Arena>,
    controller: HunterController<ArenaNav, Arc<Arena>, TargetHandle>,
    target: TargetHandle,
    player: ScriptedPlayer,
    player_id: EntityId,
    spawned: bool,
    time: f32,
    summary: SimSummary,
    trace: Vec<TraceFrame>,
}

impl Simulation {
    /// Builds the arena, the hunter and the player.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let arena = Arc::new(Arena::from_config(&config.arena));
        let nav = ArenaNav::new(Arc::clone(&arena), floor_point(config.hunter_spawn));
        let target = TargetHandle::new();
        let controller = HunterController::new(
            config.behavior.clone(),
            nav,
            Arc::clone(&arena),
            target.clone(),
        );
        let player = ScriptedPlayer::new(&config.player);

        Self {
            arena,
            controller,
            target,
            player,
            player_id: EntityId::new(),
            spawned: false,
            time: 0.0,
            summary: SimSummary::new(),
            trace: Vec::new(),
            config,
        }
    }

    /// The hunter's controller.
    #[must_use]
    pub fn controller(&self) -> &HunterController<ArenaNav, Arc<Arena>, TargetHandle> {
        &self.controller
    }

    /// Recorded frames (empty unless tracing is enabled).
    #[must_use]
    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }

    /// Runs until capture or timeout.
    pub fn run(&mut self) -> SimSummary {
        let dt = self.config.dt;
        let steps = (self.config.duration / dt).ceil() as u64;
        info!(steps, dt, "Starting simulation");

        for _ in 0..steps {
            self.step(dt);
            if self.controller.is_captured() {
                break;
            }
        }

        self.summary.final_state = self.controller.state();
        info!(
            ticks = self.summary.ticks,
            captured = self.summary.captured_at.is_some(),
            final_state = %self.summary.final_state,
            "Simulation finished"
        );
        self.summary.clone()
    }

    /// Advances the world by one fixed step.
    pub fn step(&mut self, dt: f32) -> TickReport {
        self.time += dt;
        self.step_player(dt);

        let report = self.controller.tick(dt);
        let hunter = self.controller.navigation_mut().step(dt);

        if self.spawned {
            let contact = self.arena.agent_radius() * 2.0;
            if planar_distance(hunter, self.player.position()) <= contact {
                self.controller.notify_contact(self.player_id);
            }
        }

        self.record(report, dt);
        if self.config.trace_path.is_some() {
            self.trace.push(TraceFrame {
                time: self.time,
                hunter: hunter.to_array(),
                player: self.spawned.then(|| self.player.position().to_array()),
                report,
            });
        }
        report
    }

    /// Writes the recorded trace as JSON.
    pub fn write_trace<P: AsRef<Path>>(&self, path: P) -> HunterResult<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, &self.trace)
            .map_err(|e| HunterError::Serialization(e.to_string()))?;
        info!("Wrote {} trace frames to {}", self.trace.len(), path.as_ref().display());
        Ok(())
    }

    fn step_player(&mut self, dt: f32) {
        if !self.spawned {
            if self.time < self.config.player.spawn_delay {
                return;
            }
            self.spawned = true;
            self.target
                .set(TargetSnapshot::new(self.player_id, self.player.position()));
            info!(at = self.time, "Player spawned");
        }

        let footstep = self.player.step(&self.arena, dt);
        self.target.move_to(self.player.position());
        if footstep {
            self.summary.noises_emitted += 1;
            self.controller
                .on_noise_heard(self.player.position(), Some(self.player_id));
        }
    }

    fn record(&mut self, report: TickReport, dt: f32) {
        let s = &mut self.summary;
        s.ticks += 1;
        s.elapsed = self.time;
        *s.time_in_state
            .entry(report.state.display_name().to_string())
            .or_insert(0.0) += dt;

        for event in self.controller.drain_events() {
            match event {
                HunterEvent::StateChanged { from, to } => {
                    debug!(t = self.time, %from, %to, "State changed");
                    s.state_changes += 1;
                },
                HunterEvent::Enraged => {
                    info!(t = self.time, "Hunter is enraged");
                    s.enraged_count += 1;
                },
                HunterEvent::Calmed { cooldown } => {
                    info!(t = self.time, cooldown, "Hunter calmed");
                },
                HunterEvent::NoiseInvestigated { position } => {
                    debug!(t = self.time, ?position, "Investigating noise");
                    s.investigations += 1;
                },
                HunterEvent::TargetCaptured { target } => {
                    info!(t = self.time, target = target.raw(), "Player caught");
                    s.captured_at.get_or_insert(self.time);
                },
                HunterEvent::Recovered { from, to } => {
                    info!(t = self.time, %from, %to, "Hunter recovered");
                    s.recoveries += 1;
                },
            }
        }
    }
}
