//! Decode, generate, and emit or build.

use crate::cli::{self, Args};
use crate::scratch::ScratchDir;
use crate::toolchain;
use anyhow::{Context, Result};
use len_core::{Platform, Preset, Target, ToolchainConfig};
use len_ir::{decode_bytes, Compiler, CompilerConfig, Decoded, Instruction, InstructionSet, Program};
use len_runtime::{ExecutionContext, Machine, RuntimeConfig};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the intermediate source inside the scratch directory
const INTERMEDIATE_SOURCE: &str = "file.cpp";

pub fn run(args: &Args) -> Result<()> {
    run_with(args, &ToolchainConfig::from_env(), Platform::current())
}

pub fn run_with(args: &Args, toolchains: &ToolchainConfig, platform: Platform) -> Result<()> {
    let input = cli::select_input(&args.inputs)?;
    let bytes = fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
    let decoded = decode_bytes(&bytes);
    info!(
        "Decoded {} slots from {}",
        decoded.program.len(),
        input.display()
    );

    let target = Target::new(args.preset, platform);

    if args.dump_ir {
        return dump_ir(&decoded);
    }
    if args.run {
        return interpret(&decoded, &target);
    }

    let source = Compiler::new(CompilerConfig { target }).generate_decoded(&decoded);
    let output = cli::output_path(&input, args.output.as_deref(), args.preset.is_some(), platform);

    match args.preset {
        None => {
            fs::write(&output, source)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Wrote {}", output.display());
            Ok(())
        }
        Some(preset) => build(preset, toolchains, &source, &output),
    }
}

fn build(preset: Preset, toolchains: &ToolchainConfig, source: &str, output: &Path) -> Result<()> {
    let scratch = ScratchDir::create()?;
    let source_path = scratch.write(INTERMEDIATE_SOURCE, source)?;
    let output = absolute(output)?;

    let request = toolchain::plan(preset, toolchains, scratch.path(), &source_path, &output)?;
    toolchain::invoke(&request)?;

    info!("Built {} with {}", output.display(), preset);
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn interpret(decoded: &Decoded, target: &Target) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let mut ctx = ExecutionContext::new(&mut input, &mut output, target.input_mode());
    let report = Machine::new(RuntimeConfig::default()).run(&decoded.program, &mut ctx)?;
    if target.trailing_newline() {
        ctx.write_newline()?;
        ctx.flush()?;
    }

    debug!(steps = report.steps, stack = ?report.stack, "Interpretation finished");
    Ok(())
}

#[derive(Serialize)]
struct IrDump<'a> {
    program: &'a Program,
    instruction_set: &'a InstructionSet,
    listing: Vec<ListingEntry>,
}

#[derive(Serialize)]
struct ListingEntry {
    pc: usize,
    #[serde(flatten)]
    instruction: Instruction,
    mnemonic: String,
}

fn ir_json(decoded: &Decoded) -> Result<String> {
    let listing = decoded
        .program
        .listing()
        .into_iter()
        .map(|(pc, instruction)| ListingEntry {
            pc,
            instruction,
            mnemonic: instruction.to_string(),
        })
        .collect();

    let dump = IrDump {
        program: &decoded.program,
        instruction_set: &decoded.instruction_set,
        listing,
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

fn dump_ir(decoded: &Decoded) -> Result<()> {
    println!("{}", ir_json(decoded)?);
    Ok(())
}
