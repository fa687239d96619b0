//! Per-team decision loop and the registry that owns one bot per team

use std::collections::HashMap;
use std::f32::consts::PI;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec3;

use crate::error::{SnapshotError, TelemetryError};
use crate::intercept::calculator::aerial_launch_countdown;
use crate::intercept::{
    BOOST_NEEDED_FOR_AERIAL, Intercept, NEEDS_AERIAL_THRESHOLD, boost_budget,
    find_filtered_intercept, is_vertically_accessible,
};
use crate::output::ControlOutput;
use crate::planning::steer::correction_angle_to;
use crate::planning::{
    BlindStep, ChaseStep, InterceptStep, LandGracefullyStep, MidairStrikeStep, Plan, Posture,
    SaveStep, TickContext, measure_threat,
};
use crate::settings::Settings;
use crate::sim::{Arena, CarState, Team, WorldSnapshot, simulate_ball};
use crate::telemetry::{LogTelemetry, TelemetrySink};

/// Threat score above which the bot drops everything to get goal-side
const DEFENSIVE_THREAT: f32 = 5.0;
/// How far goal-side of the ball a defensive intercept aims
const GOAL_SIDE_DISTANCE: f32 = 4.0;

/// Aerial launch checklist
const LINED_UP_ANGLE: f32 = PI / 30.0;
const UPRIGHT_ROOF_Z: f32 = 0.99;
const IGNITION_LEAD: f32 = 0.1;
const MAX_AERIAL_SECONDS: f32 = 4.0;
const LAUNCH_JUMP_SECONDS: f32 = 0.2;
const LAUNCH_TILT_SECONDS: f32 = 0.1;

/// One team's agent: owns the active plan and decides every tick
pub struct Bot {
    team: Team,
    settings: Arc<Settings>,
    arena: Arc<Arena>,
    current_plan: Option<Plan>,
    previous_situation: Option<String>,
    telemetry: Box<dyn TelemetrySink + Send>,
}

impl Bot {
    pub fn new(team: Team, settings: Settings) -> Self {
        Self {
            team,
            arena: Arc::new(settings.arena()),
            settings: Arc::new(settings),
            current_plan: None,
            previous_situation: None,
            telemetry: Box::new(LogTelemetry),
        }
    }

    pub fn with_telemetry(mut self, sink: Box<dyn TelemetrySink + Send>) -> Self {
        self.telemetry = sink;
        self
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.current_plan.as_ref()
    }

    pub fn posture(&self) -> Posture {
        self.current_plan
            .as_ref()
            .map(Plan::posture)
            .unwrap_or_default()
    }

    pub fn situation(&self) -> String {
        self.current_plan
            .as_ref()
            .map(Plan::situation)
            .unwrap_or_default()
    }

    /// Drop the active plan, e.g. after a panic left it in an unknown state
    pub fn reset(&mut self) {
        self.current_plan = None;
        self.previous_situation = None;
    }

    fn plan_is_idle(&self) -> bool {
        self.current_plan.as_ref().is_none_or(Plan::is_complete)
    }

    /// A candidate may replace the active plan only if the active one is strictly less
    /// urgent and currently interruptible. No plan, or a finished one, always yields.
    pub fn can_interrupt_plan_for(&self, posture: Posture) -> bool {
        match &self.current_plan {
            None => true,
            Some(plan) if plan.is_complete() => true,
            Some(plan) => plan.posture().less_urgent_than(posture) && plan.can_interrupt(),
        }
    }

    /// Install `candidate` if the interruption rule allows it
    pub fn try_replace_plan(&mut self, mut candidate: Plan) -> bool {
        if !self.can_interrupt_plan_for(candidate.posture()) {
            return false;
        }
        log::debug!(
            "[{}] Switching to {} plan",
            self.team.as_str(),
            candidate.posture().as_str()
        );
        candidate.begin();
        self.current_plan = Some(candidate);
        true
    }

    /// Run one decision tick
    pub fn process_snapshot(&mut self, snapshot: &WorldSnapshot) -> Result<ControlOutput, SnapshotError> {
        snapshot.validate()?;
        let arena = Arc::clone(&self.arena);
        let settings = Arc::clone(&self.settings);
        let team = self.team;

        let path = simulate_ball(&arena, snapshot.ball_state(), settings.horizon, settings.step());
        self.report(|sink| sink.path(team, &path));
        if let Some(bounce) = path.motion_after_wall_bounce(1, &settings.bounce) {
            log::trace!("[{}] Next wall bounce at t={:.2}", team.as_str(), bounce.time);
        }

        let ctx = TickContext::new(snapshot, &path, &arena, &settings)?;
        if ctx.team != team {
            log::debug!(
                "[{}] Driving a {} car",
                team.as_str(),
                ctx.team.as_str()
            );
        }

        let output = self.decide(&ctx);
        self.note_situation();
        Ok(output)
    }

    fn decide(&mut self, ctx: &TickContext) -> ControlOutput {
        let car = &ctx.car;
        let team = self.team;

        let plot = ctx.reach_plot(boost_budget(car).max(0.0), 0.0);
        let intercept = find_filtered_intercept(car, ctx.path, &plot, Vec3::ZERO, is_vertically_accessible);
        if let Some(intercept) = &intercept {
            self.report(|sink| sink.intercept(team, intercept));
        }

        // Most urgent candidates first so a less urgent one cannot claim the slot
        let own_goal = ctx.arena.own_goal(ctx.team);
        let threat = measure_threat(car, &ctx.ball, &own_goal, ctx.nearest_enemy());
        if threat > DEFENSIVE_THREAT {
            let goal_side = (own_goal.center - ctx.ball.space).truncate().normalize_or_zero() * GOAL_SIDE_DISTANCE;
            self.try_replace_plan(
                Plan::new(Posture::Defensive).with_step(InterceptStep::new(goal_side.extend(0.0))),
            );
        }

        if own_goal.predict_goal_event(ctx.path, ctx.arena.ball_radius).is_some() {
            self.try_replace_plan(Plan::new(Posture::Save).with_step(SaveStep::new()));
        }

        if let Some(intercept) = intercept.filter(|i| ready_for_aerial(car, i, ctx.time)) {
            log::debug!(
                "[{}] Launching aerial at height {:.1}",
                team.as_str(),
                intercept.space.z
            );
            self.try_replace_plan(aerial_plan());
        }

        if self.plan_is_idle() {
            self.try_replace_plan(idle_plan(car));
        }

        if let Some(output) = self.poll_current_plan(ctx) {
            return output;
        }

        // Plan ran out this tick; fall back to the idle behavior right away
        self.try_replace_plan(idle_plan(car));
        self.poll_current_plan(ctx).unwrap_or_default()
    }

    fn poll_current_plan(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        self.current_plan.as_mut().and_then(|plan| plan.next_output(ctx))
    }

    fn note_situation(&mut self) {
        let situation = self.situation();
        if self.previous_situation.as_deref() == Some(situation.as_str()) {
            return;
        }
        if self.settings.log_situations {
            let team = self.team;
            self.report(|sink| sink.situation(team, &situation));
        }
        self.previous_situation = Some(situation);
    }

    fn report(&mut self, send: impl FnOnce(&mut (dyn TelemetrySink + Send)) -> Result<(), TelemetryError>) {
        if let Err(e) = send(self.telemetry.as_mut()) {
            log::debug!("[{}] Telemetry dropped: {}", self.team.as_str(), e);
        }
    }
}

fn idle_plan(car: &CarState) -> Plan {
    if car.has_wheel_contact {
        Plan::new(Posture::Neutral).with_step(ChaseStep::new())
    } else {
        Plan::new(Posture::Neutral).with_step(LandGracefullyStep::new())
    }
}

fn aerial_plan() -> Plan {
    let jump = ControlOutput::new().with_jump();
    let tilt = ControlOutput::new().with_jump().with_pitch(1.0).with_boost();
    Plan::new(Posture::Offensive)
        .with_step(BlindStep::new(jump, LAUNCH_JUMP_SECONDS))
        .with_step(BlindStep::new(tilt, LAUNCH_TILT_SECONDS))
        .with_step(MidairStrikeStep::new(LAUNCH_JUMP_SECONDS + LAUNCH_TILT_SECONDS))
}

fn ready_for_aerial(car: &CarState, intercept: &Intercept, now: f32) -> bool {
    let seconds_till_intercept = intercept.time - now;
    intercept.space.z > NEEDS_AERIAL_THRESHOLD
        && car.has_wheel_contact
        && car.orientation.roof.z > UPRIGHT_ROOF_Z
        && car.boost >= BOOST_NEEDED_FOR_AERIAL
        && seconds_till_intercept < MAX_AERIAL_SECONDS
        && correction_angle_to(car, intercept.space).is_some_and(|a| a.abs() < LINED_UP_ANGLE)
        && aerial_launch_countdown(intercept.space.z, seconds_till_intercept) < IGNITION_LEAD
}

type SinkFactory = dyn Fn(Team) -> Box<dyn TelemetrySink + Send> + Send + Sync;

/// Owns one bot per team, created on first use
pub struct AgentRegistry {
    bots: Mutex<HashMap<Team, Arc<Mutex<Bot>>>>,
    settings: Settings,
    sink_factory: Box<SinkFactory>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AgentRegistry {
    pub fn new(settings: Settings) -> Self {
        Self {
            bots: Mutex::new(HashMap::new()),
            settings,
            sink_factory: Box::new(|_| Box::new(LogTelemetry)),
        }
    }

    /// Telemetry sink handed to each bot when it is created
    pub fn with_sink_factory(
        mut self,
        factory: impl Fn(Team) -> Box<dyn TelemetrySink + Send> + Send + Sync + 'static,
    ) -> Self {
        self.sink_factory = Box::new(factory);
        self
    }

    /// The bot for `team`. Concurrent first calls create exactly one.
    pub fn get_or_create(&self, team: Team) -> Arc<Mutex<Bot>> {
        let mut bots = self.bots.lock().unwrap_or_else(PoisonError::into_inner);
        let bot = bots.entry(team).or_insert_with(|| {
            log::info!("Creating bot for team {}", team.as_str());
            let bot = Bot::new(team, self.settings.clone()).with_telemetry((self.sink_factory)(team));
            Arc::new(Mutex::new(bot))
        });
        Arc::clone(bot)
    }

    pub fn len(&self) -> usize {
        self.bots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decide for `team`. A panic inside the bot is contained and answered neutrally.
    pub fn output_for_snapshot(
        &self,
        snapshot: &WorldSnapshot,
        team: Team,
    ) -> Result<ControlOutput, SnapshotError> {
        let bot = self.get_or_create(team);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = bot.lock().unwrap_or_else(|poisoned| {
                log::warn!("Recovering bot for team {} after a panic", team.as_str());
                let mut guard = poisoned.into_inner();
                guard.reset();
                guard
            });
            guard.process_snapshot(snapshot)
        }));

        match result {
            Ok(output) => output,
            Err(_) => {
                log::error!("Bot for team {} panicked; answering neutral", team.as_str());
                // The plan may be half advanced; start clean next tick
                bot.lock().unwrap_or_else(PoisonError::into_inner).reset();
                bot.clear_poison();
                Ok(ControlOutput::default())
            }
        }
    }

    fn try_output_for(&self, json: &str, team_name: &str) -> Result<ControlOutput, SnapshotError> {
        let team =
            Team::from_str(team_name).ok_or_else(|| SnapshotError::UnknownTeam(team_name.to_string()))?;
        let snapshot = WorldSnapshot::from_json(json)?;
        self.output_for_snapshot(&snapshot, team)
    }

    /// Decide from raw JSON. Malformed input gets a neutral output.
    pub fn output_for(&self, json: &str, team_name: &str) -> ControlOutput {
        match self.try_output_for(json, team_name) {
            Ok(output) => output,
            Err(e) if e.is_transient() => {
                log::warn!("Answering neutral: {e}");
                ControlOutput::default()
            }
            Err(e) => {
                log::error!("Answering neutral, input will not recover: {e}");
                ControlOutput::default()
            }
        }
    }

    /// `output_for` in the host's integer encoding
    pub fn output_vector(&self, json: &str, team_name: &str) -> [i32; 8] {
        self.output_for(json, team_name).to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::TapStep;
    use crate::telemetry::BufferedTelemetry;
    use std::thread;

    /// Snapshot with an idle enemy parked in our half, out of the ball's line
    fn snapshot_json(car: &str, ball: &str) -> String {
        format!(
            r#"{{
                "time": 20.0,
                "ball": {ball},
                "cars": [
                    {car},
                    {{ "team": "orange", "position": [0.0, -90.0, 0.34], "velocity": [0.0, 0.0, 0.0],
                       "rotation": {{ "pitch": 0.0, "yaw": 1.5707964, "roll": 0.0 }} }}
                ],
                "player_index": 0
            }}"#
        )
    }

    const RESTING_BALL: &str = r#"{ "position": [0.0, 0.0, 1.8555], "velocity": [0.0, 0.0, 0.0] }"#;
    const BLUE_CAR: &str = r#"{ "team": "blue", "position": [0.0, -40.0, 0.34], "velocity": [0.0, 0.0, 0.0],
        "rotation": { "pitch": 0.0, "yaw": 1.5707964, "roll": 0.0 }, "boost": 100.0 }"#;

    fn snapshot(car: &str, ball: &str) -> WorldSnapshot {
        WorldSnapshot::from_json(&snapshot_json(car, ball)).unwrap()
    }

    #[test]
    fn test_interruption_gating() {
        let mut bot = Bot::new(Team::Blue, Settings::default());
        assert!(bot.can_interrupt_plan_for(Posture::Neutral));

        let locked = Plan::new(Posture::Defensive).with_step(MidairStrikeStep::new(0.0));
        assert!(bot.try_replace_plan(locked));
        assert!(!bot.can_interrupt_plan_for(Posture::Offensive));
        assert!(!bot.try_replace_plan(Plan::new(Posture::Offensive)));
        assert_eq!(bot.posture(), Posture::Defensive);
    }

    #[test]
    fn test_interruption_needs_strictly_more_urgent() {
        let mut bot = Bot::new(Team::Blue, Settings::default());
        let tap = || TapStep::new(5, ControlOutput::new());
        bot.try_replace_plan(Plan::new(Posture::Save).with_step(tap()));

        assert!(!bot.can_interrupt_plan_for(Posture::Offensive));
        assert!(!bot.can_interrupt_plan_for(Posture::Save));
        assert!(bot.can_interrupt_plan_for(Posture::Defensive));
        assert!(bot.try_replace_plan(Plan::new(Posture::Defensive).with_step(tap())));
        assert_eq!(bot.posture(), Posture::Defensive);
    }

    #[test]
    fn test_chases_resting_ball() {
        let buffer = BufferedTelemetry::default();
        let mut bot = Bot::new(Team::Blue, Settings::default()).with_telemetry(Box::new(buffer.clone()));
        let output = bot.process_snapshot(&snapshot(BLUE_CAR, RESTING_BALL)).unwrap();

        assert_eq!(output.throttle, 1.0);
        assert!(output.steer.abs() < 1e-3);
        assert_eq!(bot.posture(), Posture::Neutral);
        assert_eq!(bot.situation(), "Chasing ball");

        let lines = buffer.collect(Team::Blue);
        assert!(lines.iter().any(|l| l == "[Sitch] Chasing ball"));
        assert!(lines.iter().any(|l| l.starts_with("[Path]")));
        assert!(lines.iter().any(|l| l.starts_with("[Intercept]")));

        // Situation lines only on change
        bot.process_snapshot(&snapshot(BLUE_CAR, RESTING_BALL)).unwrap();
        assert!(!buffer.collect(Team::Blue).iter().any(|l| l.starts_with("[Sitch]")));
    }

    #[test]
    fn test_saves_ball_heading_into_goal() {
        let ball = r#"{ "position": [0.0, -60.0, 1.8555], "velocity": [0.0, -30.0, 0.0] }"#;
        let car = r#"{ "team": "blue", "position": [50.0, -70.0, 0.34], "velocity": [0.0, 0.0, 0.0],
            "rotation": { "pitch": 0.0, "yaw": 1.5707964, "roll": 0.0 }, "boost": 50.0 }"#;
        let mut bot = Bot::new(Team::Blue, Settings::default());
        bot.process_snapshot(&snapshot(car, ball)).unwrap();
        assert_eq!(bot.posture(), Posture::Save);
        assert!(bot.situation().starts_with("Making a save"));
    }

    #[test]
    fn test_defends_when_wrong_side() {
        let ball = r#"{ "position": [0.0, 0.0, 1.8555], "velocity": [0.0, -20.0, 0.0] }"#;
        let car = r#"{ "team": "blue", "position": [0.0, 40.0, 0.34], "velocity": [0.0, 0.0, 0.0],
            "rotation": { "pitch": 0.0, "yaw": -1.5707964, "roll": 0.0 }, "boost": 100.0 }"#;
        let mut bot = Bot::new(Team::Blue, Settings::default());
        bot.process_snapshot(&snapshot(car, ball)).unwrap();
        assert_eq!(bot.posture(), Posture::Defensive);
    }

    #[test]
    fn test_lands_when_airborne() {
        let car = r#"{ "team": "blue", "position": [0.0, -40.0, 10.0], "velocity": [0.0, 0.0, 0.0],
            "rotation": { "pitch": 0.0, "yaw": 1.5707964, "roll": 0.5 }, "has_wheel_contact": false }"#;
        let mut bot = Bot::new(Team::Blue, Settings::default());
        let output = bot.process_snapshot(&snapshot(car, RESTING_BALL)).unwrap();
        assert_eq!(bot.situation(), "Landing gracefully");
        assert!(output.roll != 0.0);
    }

    #[test]
    fn test_registry_answers_neutral_on_bad_input() {
        let registry = AgentRegistry::default();
        assert_eq!(registry.output_for("{ nope", "blue"), ControlOutput::default());
        let json = snapshot_json(BLUE_CAR, RESTING_BALL);
        assert_eq!(registry.output_for(&json, "purple"), ControlOutput::default());
        assert!(registry.is_empty());

        let output = registry.output_for(&json, "BLUE");
        assert_eq!(output.throttle, 1.0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.output_vector(&json, "blue")[0], 32766);
    }

    #[test]
    fn test_registry_creates_one_bot_per_team() {
        let registry = AgentRegistry::default();
        let bots: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.get_or_create(Team::Orange)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(bots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);

        registry.get_or_create(Team::Blue);
        assert_eq!(registry.len(), 2);
    }

    /// Panics whenever the situation changes
    struct PanickingSink;

    impl TelemetrySink for PanickingSink {
        fn situation(&mut self, _team: Team, _situation: &str) -> Result<(), TelemetryError> {
            panic!("sink exploded");
        }

        fn path(&mut self, _team: Team, _path: &crate::sim::BallPath) -> Result<(), TelemetryError> {
            Ok(())
        }

        fn intercept(&mut self, _team: Team, _intercept: &Intercept) -> Result<(), TelemetryError> {
            Ok(())
        }
    }

    #[test]
    fn test_panicking_tick_resets_plan() {
        let registry = AgentRegistry::default().with_sink_factory(|_| Box::new(PanickingSink));
        let json = snapshot_json(BLUE_CAR, RESTING_BALL);

        assert_eq!(registry.output_for(&json, "blue"), ControlOutput::default());
        let bot = registry.get_or_create(Team::Blue);
        assert!(!bot.is_poisoned());
        let guard = bot.lock().unwrap();
        assert!(guard.current_plan().is_none());
        assert_eq!(guard.situation(), "");
    }

    #[test]
    fn test_registry_recovers_poisoned_bot() {
        let buffer = BufferedTelemetry::default();
        let sink = buffer.clone();
        let registry = AgentRegistry::default().with_sink_factory(move |_| Box::new(sink.clone()));
        let bot = registry.get_or_create(Team::Blue);

        let poisoner = Arc::clone(&bot);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the bot");
        })
        .join();
        assert!(bot.is_poisoned());

        let json = snapshot_json(BLUE_CAR, RESTING_BALL);
        assert_eq!(registry.output_for(&json, "blue").throttle, 1.0);
        assert!(!bot.is_poisoned());
        assert!(!buffer.collect(Team::Blue).is_empty());
    }
}
