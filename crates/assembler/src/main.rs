//! CLI entry point for the QProc assembler binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use qproc_asm::{assemble_file, format_listing};
use qproc_core::{disassemble, render_listing, ProgramImage};
use thiserror as _;

#[cfg(test)]
use {proptest as _, rstest as _, tempfile as _};

/// QProc assembler
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble source into a ROM image
    Build {
        /// Assembly source file
        input: PathBuf,

        /// Output ROM path (default: input stem + .rom, next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the listing to stderr
        #[arg(short, long)]
        verbose: bool,
    },
    /// Disassemble a ROM image back into source
    Disasm {
        /// ROM image
        rom: PathBuf,

        /// Output source path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let env = env_logger::Env::default()
        .filter_or("QPROC_LOG", "info")
        .write_style_or("QPROC_LOG", "always");
    env_logger::init_from_env(env);

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Build {
            input,
            output,
            verbose,
        } => build(&input, output, verbose),
        Command::Disasm { rom, output } => disasm(&rom, output.as_deref()),
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{stem}.rom"))
}

fn build(input: &Path, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let output = output.unwrap_or_else(|| default_output_path(input));
    let result = assemble_file(input, &output)
        .with_context(|| format!("failed to assemble {}", input.display()))?;

    if verbose {
        eprint!("{}", format_listing(&result.listing));
    }
    info!(
        "assembled {} ({} bytes) -> {}",
        input.display(),
        result.image.len(),
        output.display()
    );
    Ok(())
}

fn disasm(rom: &Path, output: Option<&Path>) -> Result<()> {
    let image = ProgramImage::load(rom)?;
    let rows = disassemble(image.as_bytes())
        .with_context(|| format!("failed to disassemble {}", rom.display()))?;
    let text = render_listing(&rows);

    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}
