//! Terminal engine for the Heatgrid simulation.
//!
//! Wires configuration, logging, the tick runner, stdin commands, and the
//! terminal renderer together, then runs until the user quits, input
//! closes while stopped, the configured tick limit is reached, or Ctrl-C
//! arrives.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `heatgrid-config.yaml` (or `HEATGRID_CONFIG`)
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Build the grid and control state
//! 4. Render the initial frame
//! 5. Spawn the stdin command reader
//! 6. Run the simulation loop until quit, closed input, the tick limit, or
//!    Ctrl-C
//! 7. Log the result

mod error;
mod input;
mod render;

use std::future::Future;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use heatgrid_core::config::{LogFormat, LoggingConfig, SimulationConfig};
use heatgrid_core::runner::{self, RunnerOptions, SimulationResult, TickCallback};
use heatgrid_core::tick::SimulationState;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::render::TerminalRenderer;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "heatgrid-config.yaml";

/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "HEATGRID_CONFIG";

/// Queued commands between the stdin reader and the runner.
const COMMAND_BUFFER: usize = 32;

/// How long shutdown waits for the blocking stdin read to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Application entry point.
///
/// The runtime is built by hand instead of with `#[tokio::main]` so that
/// shutdown can abandon the blocking stdin read rather than wait for
/// another line of input.
///
/// # Errors
///
/// Returns an error if configuration, logging, grid setup, or the
/// simulation itself fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        world_name = config.world.name,
        config_path = ?config_path,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        rows = config.grid.rows,
        cols = config.grid.cols,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(&config));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Build the simulation and drive it to completion.
async fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    // 3. Build the grid and control state.
    let mut state = SimulationState::from_config(config)?;
    if config.world.autostart {
        let _ = state.control.start();
    }
    info!(
        cells = state.grid.cells().len(),
        autostart = config.world.autostart,
        "Grid initialized"
    );

    // 4. Render the initial frame.
    let stdout = std::io::stdout();
    let clear_screen = stdout.is_terminal();
    let color = std::env::var_os("NO_COLOR").is_none();
    let mut renderer = TerminalRenderer::new(stdout, color, clear_screen);
    renderer.draw(&state);

    // 5-6. Read stdin and run the simulation loop.
    let options = RunnerOptions::from_config(config);
    let result = drive(
        &mut state,
        BufReader::new(tokio::io::stdin()),
        input::interrupted(),
        &options,
        &mut renderer,
    )
    .await?;

    // 7. Log the result.
    runner::log_simulation_end(&result);
    Ok(())
}

/// Feed commands from `reader` to the runner until the run ends.
///
/// The reader task owns the only command sender, so end of input closes
/// the channel; `shutdown` ends the run separately.
async fn drive<R, F>(
    state: &mut SimulationState,
    reader: R,
    shutdown: F,
    options: &RunnerOptions,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, EngineError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
    let _reader = input::spawn_command_reader(reader, tx);
    let result = runner::run_simulation_until(state, &mut rx, options, callback, shutdown).await?;
    Ok(result)
}

/// Load configuration from `HEATGRID_CONFIG` or `heatgrid-config.yaml`.
///
/// A missing file means defaults; the returned path is `None` in that case.
/// An explicitly configured path must exist.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`. Output goes to stderr so it never
/// interleaves with frames on stdout.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter: {e}"),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use heatgrid_core::runner::{NoOpCallback, SimulationEndReason};

    use super::*;

    fn seeded_state() -> SimulationState {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(8);
        SimulationState::from_config(&config).unwrap()
    }

    fn options() -> RunnerOptions {
        RunnerOptions::from_config(&SimulationConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_input_while_stopped_ends_the_run() {
        let mut state = seeded_state();
        let script: &'static [u8] = b"toggle\nstop\n";

        let result = drive(
            &mut state,
            script,
            input::interrupted(),
            &options(),
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::InputClosed);
        assert_eq!(result.total_ticks, 0);
        assert!(state.control.hotspot_cooling_active());
    }

    #[tokio::test(start_paused = true)]
    async fn running_simulation_survives_end_of_input_until_shutdown() {
        let mut state = seeded_state();
        let script: &'static [u8] = b"start\n";
        let shutdown = tokio::time::sleep(Duration::from_millis(3_000));

        let result = drive(&mut state, script, shutdown, &options(), &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Interrupted);
        assert!(result.total_ticks > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_ends_the_run_before_shutdown() {
        let mut state = seeded_state();
        let script: &'static [u8] = b"start\nquit\n";

        let result = drive(
            &mut state,
            script,
            std::future::pending::<()>(),
            &options(),
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Quit);
    }
}
