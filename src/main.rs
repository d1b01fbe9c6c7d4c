mod demo;

use anyhow::{Context, Result};
use break_tracer::debugger::{DebuggerState, LineConsole};
use break_tracer::executor::Controller;
use break_tracer::host::Lifecycle;
use break_tracer::{TraceMode, TracerConfig};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Breakpoint tracer demo: runs a scripted toy program and drops into a
/// console whenever a breakpoint is reached.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON tracer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Breakpoint spec, e.g. `Scene_Base#update` (repeatable)
    #[arg(short, long = "break")]
    breakpoints: Vec<String>,

    /// Lines of source shown around a hit
    #[arg(short, long)]
    wrap: Option<usize>,

    /// Trace in source-unit mode instead of owner mode
    #[arg(long)]
    source_unit: bool,

    /// Frames to run
    #[arg(short, long, default_value = "3")]
    frames: u32,

    /// Frames on which tracing is toggled
    #[arg(short, long, default_values_t = [0u32])]
    toggle: Vec<u32>,
}

fn load_config(args: &Args) -> Result<TracerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            TracerConfig::from_json(&text)
                .with_context(|| format!("cannot parse config {}", path.display()))?
        }
        None => TracerConfig::default(),
    };

    if let Some(wrap) = args.wrap {
        config.wrap = wrap;
    }
    if args.source_unit {
        config.mode = TraceMode::SourceUnit;
    }
    config.breakpoints.extend(args.breakpoints.iter().cloned());
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(version = env!("CARGO_PKG_VERSION"), mode = ?config.mode, "starting tracer demo");

    let (host, namespace, sources) = demo::DemoHost::build();
    let host = Rc::new(host);
    let console = Rc::new(LineConsole::stdio());

    let state = DebuggerState::init(config, Rc::new(namespace), console.clone());
    console.attach(&state);
    let controller = Controller::new(state, host.clone(), Rc::new(sources));

    controller.on_data_init();

    let input = demo::ScheduledToggle::new(args.toggle.clone());
    for frame in 0..args.frames {
        controller.on_frame_tick(&input);
        info!(frame, tracing = controller.is_enabled(), "frame");
        host.run_frame();
        input.advance();
    }

    if controller.is_enabled() && !controller.stop() {
        anyhow::bail!("could not uninstall the trace hook");
    }
    Ok(())
}
