use log::info;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};

use buttonpipe::{
    AppConfig, AppError, Cli, Clock, ClockGuard, GpioBackend, Output, RunMode, ShutdownSignal,
    SysfsBackend, SystemClock, monitor, open_pipe, run_one_shot,
};

#[cfg(feature = "chardev")]
use buttonpipe::LibgpiodBackend;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let prog = env!("CARGO_PKG_NAME");
    let (config, mode, output) = match Cli::parse().into_config() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{prog}: {e}");
            if e.is_usage() {
                eprintln!("{}", Cli::command().render_usage());
            }
            return ExitCode::from(e.exit_code());
        }
    };

    let clock = Arc::new(SystemClock);
    let guard = ClockGuard::new(clock.wall_ms(), config.clock_jump_secs);

    let result = match config.chip.clone() {
        #[cfg(feature = "chardev")]
        Some(chip) => run(&LibgpiodBackend::new(chip), &config, mode, output, clock, guard),
        #[cfg(not(feature = "chardev"))]
        Some(_) => Err(AppError::Config(
            "--chip requires a build with the `chardev` feature".into(),
        )),
        None => run(
            &SysfsBackend::new(config.sysfs_root.clone()),
            &config,
            mode,
            output,
            clock,
            guard,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{prog}: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run<B: GpioBackend>(
    backend: &B,
    config: &AppConfig,
    mode: RunMode,
    output: Output,
    clock: Arc<SystemClock>,
    guard: ClockGuard,
) -> Result<(), AppError> {
    if run_one_shot(backend, config, mode)? {
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    shutdown.install()?;
    info!("starting with pins {:?}", config.pins);

    monitor(backend, config, clock, guard, &shutdown, |shutdown| {
        let out: Option<Box<dyn Write>> = match &output {
            Output::Console => Some(Box::new(io::stdout())),
            Output::Pipe(path) => {
                open_pipe(path, shutdown)?.map(|f| Box::new(f) as Box<dyn Write>)
            }
        };
        Ok(out)
    })?;
    Ok(())
}
