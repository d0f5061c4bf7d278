//! Simulation loop runner with user controls.
//!
//! [`run_simulation`] owns the periodic tick. It waits on two things at
//! once: the next command from the user and, while running, the next
//! interval tick. Only one of them is handled at a time, so ticks never
//! overlap and commands always land between ticks:
//!
//! - **start** schedules a fresh interval; the first tick fires one full
//!   interval later.
//! - **stop** drops the interval, so no further tick fires.
//! - **toggle-hotspot-cooling** flips the flag read by the next cool step.
//! - **quit** ends the loop.
//!
//! The loop also ends when a configured tick limit is reached, when the
//! command input closes while the simulation is stopped (nothing could ever
//! start it again), or when the shutdown future given to
//! [`run_simulation_until`] completes.

use std::future::Future;
use std::time::Duration;

use heatgrid_types::Command;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::control::ControlEffect;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// A quit command was received.
    Quit,
    /// The command input closed while the simulation was stopped.
    InputClosed,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// The shutdown future completed (Ctrl-C in the engine).
    Interrupted,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Timing and boundary settings for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Time between ticks while running.
    pub tick_interval: Duration,
    /// Stop after this many ticks (0 = unlimited).
    pub max_ticks: u64,
}

impl RunnerOptions {
    /// Take the interval and tick limit from configuration.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.world.tick_interval_ms),
            max_ticks: config.simulation.max_ticks,
        }
    }

    /// Whether `total_ticks` has hit the limit.
    pub const fn tick_limit_reached(&self, total_ticks: u64) -> bool {
        self.max_ticks > 0 && total_ticks >= self.max_ticks
    }
}

/// Callback invoked by the runner.
///
/// Implementations render frames, publish snapshots, and so on. Callbacks
/// receive the state by shared reference and cannot mutate the grid.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);

    /// Called after a command has been applied.
    fn on_control(&mut self, _effect: ControlEffect, _state: &SimulationState) {}
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// If `state.control` is already running (autostart), ticking begins
/// immediately.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    commands: &mut mpsc::Receiver<Command>,
    options: &RunnerOptions,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    run_simulation_until(
        state,
        commands,
        options,
        callback,
        std::future::pending::<()>(),
    )
    .await
}

/// Like [`run_simulation`], but also ends when `shutdown` completes.
///
/// The shutdown source is kept apart from the command channel so it does
/// not hold a sender: once every command sender is dropped, the input
/// counts as closed.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation_until<F>(
    state: &mut SimulationState,
    commands: &mut mpsc::Receiver<Command>,
    options: &RunnerOptions,
    callback: &mut dyn TickCallback,
    shutdown: F,
) -> Result<SimulationResult, RunnerError>
where
    F: Future<Output = ()>,
{
    let mut shutdown = std::pin::pin!(shutdown);
    let mut ticker = state
        .control
        .is_running()
        .then(|| new_ticker(options.tick_interval));
    let mut input_open = true;
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        tick_interval = ?options.tick_interval,
        max_ticks = options.max_ticks,
        running = state.control.is_running(),
        "Simulation loop starting"
    );

    loop {
        if !input_open && ticker.is_none() {
            info!("Command input closed while stopped");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::InputClosed,
                final_summary: last_summary,
                total_ticks,
            });
        }

        tokio::select! {
            // Commands win ties so a stop lands before a due tick.
            biased;

            command = commands.recv(), if input_open => {
                let Some(command) = command else {
                    input_open = false;
                    continue;
                };

                let effect = state.control.apply(command);
                match effect {
                    ControlEffect::Started => {
                        ticker = Some(new_ticker(options.tick_interval));
                        info!(tick = state.clock.tick(), "Simulation started");
                    }
                    ControlEffect::Stopped => {
                        ticker = None;
                        info!(tick = state.clock.tick(), "Simulation stopped");
                    }
                    ControlEffect::CoolingToggled { active } => {
                        info!(active, "Hotspot cooling toggled");
                    }
                    ControlEffect::Unchanged => {
                        warn!(%command, "Command had no effect");
                    }
                    ControlEffect::QuitRequested => {
                        info!(tick = state.clock.tick(), "Quit requested");
                        return Ok(SimulationResult {
                            end_reason: SimulationEndReason::Quit,
                            final_summary: last_summary,
                            total_ticks,
                        });
                    }
                }
                callback.on_control(effect, state);
            }

            () = &mut shutdown => {
                info!(tick = state.clock.tick(), "Shutdown requested");
                return Ok(SimulationResult {
                    end_reason: SimulationEndReason::Interrupted,
                    final_summary: last_summary,
                    total_ticks,
                });
            }

            () = next_tick(ticker.as_mut()) => {
                let summary = tick::run_tick(state)?;
                total_ticks = total_ticks.saturating_add(1);

                callback.on_tick(&summary, state);

                if options.tick_limit_reached(total_ticks) {
                    info!(
                        tick = summary.tick,
                        max_ticks = options.max_ticks,
                        "Tick limit reached"
                    );
                    return Ok(SimulationResult {
                        end_reason: SimulationEndReason::MaxTicksReached,
                        final_summary: Some(summary),
                        total_ticks,
                    });
                }

                last_summary = Some(summary);
            }
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_max_temp = result.final_summary.as_ref().map(|s| s.max_temp),
        "Simulation ended"
    );

    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}

/// A repeating timer whose first tick is one full period away.
fn new_ticker(period: Duration) -> Interval {
    let now = Instant::now();
    let first = now.checked_add(period).unwrap_or(now);
    let mut ticker = tokio::time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Wait for the next tick, or forever when stopped.
async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::GridConfig;
    use crate::grid::TemperatureGrid;

    const INTERVAL: Duration = Duration::from_millis(800);

    fn options(max_ticks: u64) -> RunnerOptions {
        RunnerOptions {
            tick_interval: INTERVAL,
            max_ticks,
        }
    }

    fn quiet_state(value: f64) -> SimulationState {
        let config = GridConfig {
            spike_chance: 0.0,
            ..GridConfig::default()
        };
        let grid = TemperatureGrid::filled(2, 2, value).unwrap();
        SimulationState::with_grid(grid, config, SmallRng::seed_from_u64(42)).unwrap()
    }

    /// Counts callbacks and records when each tick happened.
    #[derive(Default)]
    struct Recorder {
        tick_times: Vec<Instant>,
        effects: Vec<ControlEffect>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
            self.tick_times.push(Instant::now());
        }

        fn on_control(&mut self, effect: ControlEffect, _state: &SimulationState) {
            self.effects.push(effect);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn quit_ends_loop_without_ticking() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Quit).await.unwrap();

        let result = run_simulation(&mut state, &mut rx, &options(0), &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Quit);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_while_stopped_ends_loop() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel::<Command>(8);
        drop(tx);

        let result = run_simulation(&mut state, &mut rx, &options(0), &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::InputClosed);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_by_max_ticks() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start).await.unwrap();

        let mut recorder = Recorder::default();
        let result = run_simulation(&mut state, &mut rx, &options(5), &mut recorder)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert_eq!(recorder.tick_times.len(), 5);
        assert_eq!(recorder.effects, vec![ControlEffect::Started]);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn running_simulation_outlives_closed_input() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start).await.unwrap();
        drop(tx);

        let result = run_simulation(&mut state, &mut rx, &options(3), &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn autostart_ticks_without_command() {
        let mut state = quiet_state(75.0);
        let _ = state.control.start();
        let (_tx, mut rx) = mpsc::channel::<Command>(8);

        let result = run_simulation(&mut state, &mut rx, &options(2), &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.total_ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_interval() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start).await.unwrap();

        let began = Instant::now();
        let mut recorder = Recorder::default();
        let _ = run_simulation(&mut state, &mut rx, &options(3), &mut recorder)
            .await
            .unwrap();

        let times = recorder.tick_times;
        assert_eq!(times.len(), 3);
        assert!(times[0].duration_since(began) >= INTERVAL);
        assert!(times[1].duration_since(times[0]) >= INTERVAL);
        assert!(times[2].duration_since(times[1]) >= INTERVAL);
        drop(tx);
    }

    /// Sends stop after a number of ticks, then quit once stopped.
    struct StopAfter {
        ticks_before_stop: u64,
        ticks_seen: u64,
        commands: mpsc::Sender<Command>,
    }

    impl TickCallback for StopAfter {
        fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
            self.ticks_seen = self.ticks_seen.saturating_add(1);
            if self.ticks_seen == self.ticks_before_stop {
                self.commands.try_send(Command::Stop).unwrap();
            }
        }

        fn on_control(&mut self, effect: ControlEffect, _state: &SimulationState) {
            if effect == ControlEffect::Stopped {
                self.commands.try_send(Command::Quit).unwrap();
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_ticks() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start).await.unwrap();

        let mut callback = StopAfter {
            ticks_before_stop: 2,
            ticks_seen: 0,
            commands: tx,
        };
        let result = run_simulation(&mut state, &mut rx, &options(0), &mut callback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Quit);
        assert_eq!(result.total_ticks, 2);
        assert_eq!(callback.ticks_seen, 2);
        assert!(!state.control.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_applies_to_next_cool_step() {
        let mut state = quiet_state(95.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::ToggleHotspotCooling).await.unwrap();
        tx.send(Command::Start).await.unwrap();

        let result = run_simulation(&mut state, &mut rx, &options(1), &mut NoOpCallback)
            .await
            .unwrap();

        let summary = result.final_summary.unwrap();
        assert!(summary.hotspot_cooling_active);
        assert_eq!(summary.hotspots_cooled, 4);
        assert!(state.grid.cells().iter().all(|&t| t == 89.0));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn redundant_commands_are_reported_unchanged() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        for command in [Command::Stop, Command::Start, Command::Start, Command::Quit] {
            tx.send(command).await.unwrap();
        }

        let mut recorder = Recorder::default();
        let result = run_simulation(&mut state, &mut rx, &options(0), &mut recorder)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Quit);
        assert_eq!(
            recorder.effects,
            vec![
                ControlEffect::Unchanged,
                ControlEffect::Started,
                ControlEffect::Unchanged,
            ]
        );
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_a_running_loop() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start).await.unwrap();
        drop(tx);

        let shutdown = tokio::time::sleep(Duration::from_millis(2_000));
        let result =
            run_simulation_until(&mut state, &mut rx, &options(0), &mut NoOpCallback, shutdown)
                .await
                .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Interrupted);
        // Ticks at 800 and 1600 ms; shutdown at 2000 ms.
        assert_eq!(result.total_ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_shutdown_does_not_mask_closed_input() {
        let mut state = quiet_state(75.0);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Stop).await.unwrap();
        drop(tx);

        let result = run_simulation_until(
            &mut state,
            &mut rx,
            &options(0),
            &mut NoOpCallback,
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::InputClosed);
    }

    #[test]
    fn options_follow_config() {
        let mut config = SimulationConfig::default();
        config.simulation.max_ticks = 9;
        let opts = RunnerOptions::from_config(&config);
        assert_eq!(opts.tick_interval, Duration::from_millis(800));
        assert!(!opts.tick_limit_reached(8));
        assert!(opts.tick_limit_reached(9));
        assert!(!RunnerOptions::from_config(&SimulationConfig::default()).tick_limit_reached(1_000));
    }
}
