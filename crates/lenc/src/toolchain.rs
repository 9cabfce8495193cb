//! Planning and invoking external C++ toolchains.

use len_core::{Error, Preset, Result, ToolchainConfig};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// A fully resolved toolchain invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables set on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

/// Build `source` into `output` with the preset's toolchain.
///
/// `scratch` receives the object files; `output` should be absolute.
pub fn plan(
    preset: Preset,
    config: &ToolchainConfig,
    scratch: &Path,
    source: &Path,
    output: &Path,
) -> Result<BuildRequest> {
    match preset {
        Preset::Gxx => Ok(plan_gxx(config, source, output)),
        Preset::Vs2010 => plan_vs2010(config, scratch, source, output),
    }
}

fn plan_gxx(config: &ToolchainConfig, source: &Path, output: &Path) -> BuildRequest {
    BuildRequest {
        program: config.gxx_program.clone(),
        args: vec![
            OsString::from("-o"),
            output.as_os_str().to_owned(),
            source.as_os_str().to_owned(),
        ],
        env: Vec::new(),
    }
}

fn plan_vs2010(config: &ToolchainConfig, scratch: &Path, source: &Path, output: &Path) -> Result<BuildRequest> {
    let vs = &config.vs2010_root;
    let ide = vs.join("Common7").join("IDE");
    let vc_include = vs.join("VC").join("include");
    let vc_lib = vs.join("VC").join("lib");
    let compiler = vs.join("VC").join("bin").join("cl.exe");

    if !vs.is_dir() || !ide.is_dir() || !vc_lib.is_dir() || !compiler.is_file() {
        return Err(Error::Toolchain("Visual Studio 2010".to_string()));
    }

    let sdk = &config.windows_sdk_root;
    let sdk_include = sdk.join("Include");
    let sdk_lib = sdk.join("Lib");

    if !sdk.is_dir() || !sdk_include.is_dir() || !sdk_lib.is_dir() {
        return Err(Error::Toolchain("Windows SDK".to_string()));
    }

    let mut object_dir = OsString::from("/Fo");
    object_dir.push(scratch.as_os_str());
    object_dir.push(MAIN_SEPARATOR_STR);

    let mut executable = OsString::from("/Fe");
    executable.push(output.as_os_str());

    Ok(BuildRequest {
        program: compiler,
        args: vec![
            OsString::from("/EHsc"),
            object_dir,
            executable,
            source.as_os_str().to_owned(),
            OsString::from("/MT"),
        ],
        env: vec![
            ("INCLUDE".to_string(), join_paths(&[vc_include.as_path(), sdk_include.as_path()])),
            ("PATH".to_string(), ide.into_os_string()),
            ("LIB".to_string(), join_paths(&[vc_lib.as_path(), sdk_lib.as_path()])),
        ],
    })
}

/// `;`-separated list, the convention of the MSVC environment variables
fn join_paths(paths: &[&Path]) -> OsString {
    let mut joined = OsString::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            joined.push(";");
        }
        joined.push(path.as_os_str());
    }
    joined
}

/// Run the request to completion; a non-zero exit is a build failure
pub fn invoke(request: &BuildRequest) -> Result<()> {
    info!("Running {}", request.program.display());
    debug!(args = ?request.args, env = ?request.env, "Toolchain invocation");

    let result = Command::new(&request.program)
        .args(&request.args)
        .envs(request.env.iter().map(|(key, value)| (key, value)))
        .stdin(Stdio::null())
        .output();

    let output = match result {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::Toolchain(request.program.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!("{}", stdout.trim_end());
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("{}", stderr.trim_end());
        }
        return Err(Error::Build(format!(
            "{} exited with {}",
            request.program.display(),
            output.status
        )));
    }

    Ok(())
}
