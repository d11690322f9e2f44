use std::env;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::input::InputSource;
use super::rendering::DrawTarget;
use super::scene::{Scene, SceneCommand, SceneWorld};

const SLOW_FRAME_ENV_VAR: &str = "PLATFORMER_SLOW_FRAME_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPacing {
    /// Ticks follow wall-clock time at `target_tps`.
    Realtime,
    /// One tick and one draw per loop iteration, no sleeping.
    Unpaced,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub max_ticks: Option<u64>,
    pub pacing: LoopPacing,
    pub simulated_slow_frame_ms: u64,
    pub summary_log_interval_ticks: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            max_ticks: None,
            pacing: LoopPacing::Realtime,
            simulated_slow_frame_ms: 0,
            summary_log_interval_ticks: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TickLimit,
    SceneQuit,
    InputQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub frames: u64,
    pub restarts: u32,
    pub stop_reason: StopReason,
}

/// Drives one scene with a fixed simulation step: load, then per frame run
/// the planned ticks (update, then apply deferred spawns/despawns) and draw
/// once, until the tick limit or a quit request. Unloads before returning.
pub fn run_app<T>(
    config: &LoopConfig,
    scene: &mut dyn Scene<T>,
    input: &mut dyn InputSource,
    target: &mut dyn DrawTarget,
) -> LoopSummary {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let summary_interval = config.summary_log_interval_ticks.max(1);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        max_ticks = ?config.max_ticks,
        pacing = ?config.pacing,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let mut world = SceneWorld::<T>::default();
    scene.load(&mut world);
    world.apply_pending();
    let title = scene
        .debug_title(&world)
        .unwrap_or_else(|| "<untitled>".to_string());
    info!(
        title = title.as_str(),
        entity_count = world.entity_count(),
        "scene_loaded"
    );

    let mut ticks = 0u64;
    let mut frames = 0u64;
    let mut restarts = 0u32;
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    let stop_reason = 'frames: loop {
        let ticks_to_run = match config.pacing {
            LoopPacing::Unpaced => 1,
            LoopPacing::Realtime => {
                let now = Instant::now();
                let frame_dt =
                    clamp_frame_delta(now.duration_since(last_frame_instant), max_frame_delta);
                last_frame_instant = now;
                let plan = plan_sim_steps(accumulator + frame_dt, fixed_dt, max_ticks_per_frame);
                accumulator = plan.remaining_accumulator;
                if !plan.dropped_backlog.is_zero() {
                    warn!(
                        dropped_ms = plan.dropped_backlog.as_millis() as u64,
                        "simulation_backlog_dropped"
                    );
                }
                if plan.ticks_to_run == 0 {
                    thread::sleep(fixed_dt.saturating_sub(accumulator));
                    continue;
                }
                plan.ticks_to_run
            }
        };

        for _ in 0..ticks_to_run {
            if config.max_ticks.is_some_and(|limit| ticks >= limit) {
                break 'frames StopReason::TickLimit;
            }
            let snapshot = input.snapshot_for_tick(ticks);
            if snapshot.quit_requested() {
                info!(tick = ticks, reason = "input", "shutdown_requested");
                break 'frames StopReason::InputQuit;
            }

            let command = scene.update(fixed_dt_seconds, &snapshot, &mut world);
            world.apply_pending();
            ticks = ticks.saturating_add(1);
            if ticks % summary_interval == 0 {
                debug!(tick = ticks, entity_count = world.entity_count(), "tick_summary");
            }

            match command {
                SceneCommand::None => {}
                SceneCommand::Restart => {
                    scene.unload(&mut world);
                    world.clear();
                    scene.load(&mut world);
                    world.apply_pending();
                    restarts = restarts.saturating_add(1);
                    info!(
                        tick = ticks,
                        restarts,
                        entity_count = world.entity_count(),
                        "scene_restarted"
                    );
                }
                SceneCommand::Quit => {
                    info!(tick = ticks, reason = "scene", "shutdown_requested");
                    break 'frames StopReason::SceneQuit;
                }
            }
        }

        target.begin_frame();
        scene.render(&world, target);
        frames = frames.saturating_add(1);

        if config.pacing == LoopPacing::Realtime && !slow_frame_delay.is_zero() {
            thread::sleep(slow_frame_delay);
        }
    };

    scene.unload(&mut world);
    let summary = LoopSummary {
        ticks,
        frames,
        restarts,
        stop_reason,
    };
    info!(
        ticks = summary.ticks,
        frames = summary.frames,
        restarts = summary.restarts,
        stop_reason = ?summary.stop_reason,
        "loop_summary"
    );
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::{IdleInput, InputSnapshot};
    use crate::app::physics::RectangleCollider;
    use crate::app::rendering::DrawList;
    use crate::app::scene::{EntityId, SpawnDesc, Transform, Vec2};

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn normalize_non_zero_duration_uses_fallback_for_zero() {
        let fallback = Duration::from_millis(7);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(3), fallback),
            Duration::from_millis(3)
        );
    }

    #[derive(Default)]
    struct CountingScene {
        loads: u32,
        unloads: u32,
        updates: u64,
        renders: u64,
        restart_at_update: Option<u64>,
        quit_at_update: Option<u64>,
        despawn_first_at_update: Option<u64>,
        entity_counts_seen: Vec<usize>,
    }

    impl Scene<u8> for CountingScene {
        fn load(&mut self, world: &mut SceneWorld<u8>) {
            self.loads += 1;
            for index in 0..2 {
                world.spawn(
                    SpawnDesc {
                        debug_name: "dummy",
                        transform: Transform::at(Vec2::new(index as f32, 0.0)),
                        collider: Some(RectangleCollider::new(Vec2::new(1.0, 1.0))),
                    },
                    index,
                );
            }
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            world: &mut SceneWorld<u8>,
        ) -> SceneCommand {
            self.updates += 1;
            self.entity_counts_seen.push(world.entity_count());
            if self.despawn_first_at_update == Some(self.updates) {
                let first: Option<EntityId> = world.entity_ids().first().copied();
                if let Some(id) = first {
                    world.despawn(id);
                }
                // Despawn is deferred, the entity is still visible this tick.
                self.entity_counts_seen.push(world.entity_count());
            }
            if self.restart_at_update == Some(self.updates) {
                return SceneCommand::Restart;
            }
            if self.quit_at_update == Some(self.updates) {
                return SceneCommand::Quit;
            }
            SceneCommand::None
        }

        fn render(&mut self, _world: &SceneWorld<u8>, _target: &mut dyn DrawTarget) {
            self.renders += 1;
        }

        fn unload(&mut self, _world: &mut SceneWorld<u8>) {
            self.unloads += 1;
        }
    }

    fn unpaced(max_ticks: u64) -> LoopConfig {
        LoopConfig {
            max_ticks: Some(max_ticks),
            pacing: LoopPacing::Unpaced,
            ..LoopConfig::default()
        }
    }

    #[test]
    fn unpaced_loop_runs_one_update_and_draw_per_frame_until_limit() {
        let mut scene = CountingScene::default();
        let mut draw_list = DrawList::default();
        let summary = run_app(&unpaced(10), &mut scene, &mut IdleInput, &mut draw_list);

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.stop_reason, StopReason::TickLimit);
        assert_eq!(scene.updates, 10);
        assert_eq!(scene.renders, 10);
        assert_eq!(draw_list.frames_begun(), 10);
        assert_eq!((scene.loads, scene.unloads), (1, 1));
    }

    #[test]
    fn despawn_requested_mid_tick_applies_after_update() {
        let mut scene = CountingScene {
            despawn_first_at_update: Some(2),
            ..CountingScene::default()
        };
        run_app(&unpaced(3), &mut scene, &mut IdleInput, &mut DrawList::default());

        assert_eq!(scene.entity_counts_seen, vec![2, 2, 2, 1]);
    }

    #[test]
    fn restart_reloads_scene_into_cleared_world() {
        let mut scene = CountingScene {
            restart_at_update: Some(3),
            ..CountingScene::default()
        };
        let summary = run_app(&unpaced(5), &mut scene, &mut IdleInput, &mut DrawList::default());

        assert_eq!(summary.restarts, 1);
        assert_eq!(scene.loads, 2);
        assert_eq!(scene.unloads, 2);
        assert!(scene.entity_counts_seen.iter().all(|count| *count == 2));
    }

    #[test]
    fn scene_quit_stops_without_drawing_that_frame() {
        let mut scene = CountingScene {
            quit_at_update: Some(4),
            ..CountingScene::default()
        };
        let summary = run_app(&unpaced(100), &mut scene, &mut IdleInput, &mut DrawList::default());

        assert_eq!(summary.stop_reason, StopReason::SceneQuit);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.frames, 3);
    }

    struct QuitAt(u64);

    impl InputSource for QuitAt {
        fn snapshot_for_tick(&mut self, tick: u64) -> InputSnapshot {
            InputSnapshot::empty().with_quit_requested(tick == self.0)
        }
    }

    #[test]
    fn input_quit_stops_before_update() {
        let mut scene = CountingScene::default();
        let summary = run_app(&unpaced(100), &mut scene, &mut QuitAt(2), &mut DrawList::default());

        assert_eq!(summary.stop_reason, StopReason::InputQuit);
        assert_eq!(summary.ticks, 2);
        assert_eq!(scene.updates, 2);
    }
}
