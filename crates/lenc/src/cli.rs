//! Command line arguments and input/output selection.

use clap::Parser;
use len_core::{Error, Platform, Preset, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extension that marks source files
pub const SOURCE_EXTENSION: &str = "len";

#[derive(Parser, Debug)]
#[command(name = "lenc")]
#[command(about = "Compile line-length programs to C++")]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Source file; exactly one `.len` file is required
    #[arg(value_name = "file")]
    pub inputs: Vec<PathBuf>,

    /// Place the output into <file>
    #[arg(short = 'o', value_name = "file")]
    pub output: Option<PathBuf>,

    /// Build a binary with an external toolchain. Values: vs2010, g++
    #[arg(long, value_name = "preset", value_parser = parse_preset)]
    pub preset: Option<Preset>,

    /// Interpret the program instead of emitting source
    #[arg(long, conflicts_with_all = ["output", "dump_ir"])]
    pub run: bool,

    /// Print the decoded program as JSON
    #[arg(long = "dump-ir", conflicts_with = "output")]
    pub dump_ir: bool,

    /// Display compiler version information
    #[arg(long)]
    pub version: bool,
}

/// Requests answered before the rest of the command line is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyRequest {
    Help,
    Version,
}

/// Look for `--help` or `--version` ahead of full parsing; help wins.
/// `args` includes the program name. Scanning stops at `--`.
pub fn early_request<I, T>(args: I) -> Option<EarlyRequest>
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let mut request = None;
    for arg in args.into_iter().skip(1) {
        let arg = arg.as_ref();
        if arg == "--" {
            break;
        }
        if arg == "--help" || arg == "-h" {
            return Some(EarlyRequest::Help);
        }
        if arg == "--version" {
            request = Some(EarlyRequest::Version);
        }
    }
    request
}

fn parse_preset(value: &str) -> std::result::Result<Preset, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

/// Pick the single existing `.len` input; other arguments are ignored
pub fn select_input(inputs: &[PathBuf]) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for input in inputs {
        if input.extension() == Some(OsStr::new(SOURCE_EXTENSION)) {
            candidates.push(input);
        } else {
            warn!("Ignoring {}: not a .{} file", input.display(), SOURCE_EXTENSION);
        }
    }

    match candidates.as_slice() {
        [input] if input.is_file() => Ok(input.to_path_buf()),
        [_, _, ..] => Err(Error::Input("multiple input files".to_string())),
        _ => Err(Error::Input("no input files".to_string())),
    }
}

/// Output path: the override, or the input stem in the current directory
pub fn output_path(input: &Path, output: Option<&Path>, compiling: bool, platform: Platform) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "a".to_string());
    let suffix = if compiling {
        platform.executable_suffix()
    } else {
        ".cpp"
    };
    PathBuf::from(format!("{}{}", stem, suffix))
}
