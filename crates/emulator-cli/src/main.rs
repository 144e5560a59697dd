//! QProc emulator binary: runs a program image against stdin/stdout.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use qproc_core::{
    EmulatorConfig, Frame, FrameCapture, Host, Machine, RunBoundary, StdConsole, TraceEvent,
    TraceSink, FRAME_HEIGHT, FRAME_WIDTH,
};

#[cfg(test)]
use tempfile as _;

/// QProc emulator
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Program image to load and execute
    rom: PathBuf,

    /// Stop after this many instructions
    #[clap(long)]
    max_steps: Option<u64>,

    /// Enable video and save the last presented frame as a PNG
    #[clap(long)]
    frame: Option<PathBuf>,

    /// Write the final machine state as JSON
    #[clap(long)]
    dump_state: Option<PathBuf>,

    /// Log every instruction at debug level
    #[clap(long)]
    trace: bool,
}

/// Forwards trace events to the logger.
struct LogTrace;

impl TraceSink for LogTrace {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionStart {
                ip,
                opcode,
                operand: Some(value),
            } => debug!("{ip:05}: {} {value}", opcode.mnemonic()),
            TraceEvent::InstructionStart { ip, opcode, .. } => {
                debug!("{ip:05}: {}", opcode.mnemonic());
            }
            TraceEvent::InstructionRetired {
                next_ip,
                data_depth,
                ..
            } => debug!("       -> {next_ip:05} (DS depth {data_depth})"),
            TraceEvent::FaultRaised { cause, ip } => debug!("{ip:05}: fault: {cause}"),
        }
    }
}

/// Default log filter when `QPROC_LOG` is unset.
const fn default_filter(trace: bool) -> &'static str {
    if trace {
        "info,qproc_emu=debug"
    } else {
        "info"
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let env = env_logger::Env::default()
        .filter_or("QPROC_LOG", default_filter(args.trace))
        .write_style_or("QPROC_LOG", "always");
    env_logger::init_from_env(env);

    match run(&args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = EmulatorConfig {
        max_steps: args.max_steps,
        ..EmulatorConfig::default()
    };
    let mut machine = Machine::load(&args.rom, config)?;

    let mut console = StdConsole::new(io::stdin().lock(), io::stdout().lock());
    let mut capture = FrameCapture::default();
    let mut tracer = LogTrace;

    let mut host = Host::new(&mut console);
    if args.frame.is_some() {
        host = host.with_frame(&mut capture);
    }
    if args.trace {
        host = host.with_trace(&mut tracer);
    }
    let result = machine.run(&mut host);

    if let Some(path) = &args.frame {
        let last = capture
            .last_frame()
            .or_else(|| Frame::new(machine.memory().frame_buffer()));
        save_frame(last.as_ref(), path)?;
    }
    if let Some(path) = &args.dump_state {
        dump_state(&machine, path)?;
    }

    match result {
        Ok(outcome) => {
            match outcome.boundary {
                RunBoundary::Halted => info!("halted after {} steps", outcome.steps),
                RunBoundary::EndOfMemory => {
                    info!("ran off the end of memory after {} steps", outcome.steps);
                }
                RunBoundary::StepLimit => {
                    info!("stopped at step limit after {} steps", outcome.steps);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(fault) => {
            eprintln!("error: {} fault: {fault}", fault.code.class());
            eprintln!("{}", fault.snapshot);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn save_frame(frame: Option<&Frame<'_>>, path: &Path) -> Result<()> {
    let frame = frame.context("frame buffer is unavailable")?;
    let image = image::RgbImage::from_raw(
        u32::try_from(FRAME_WIDTH)?,
        u32::try_from(FRAME_HEIGHT)?,
        frame.to_rgb_bytes(),
    )
    .context("frame buffer has the wrong size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!("saved frame to {}", path.display());
    Ok(())
}

fn dump_state(machine: &Machine, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &machine.snapshot())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
