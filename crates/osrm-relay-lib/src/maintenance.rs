//! Offline data maintenance: fetching the OSM extract and running the OSRM
//! preprocessing tools.
//!
//! Nothing here is used on the request path. Tool invocations are planned as
//! plain values first so callers can print them (`--dry-run`) or hand them to
//! a [`CommandRunner`].

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use reqwest::Client;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{Algorithm, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};

/// Geofabrik extract covering the deployment region.
pub const DEFAULT_EXTRACT_URL: &str =
    "https://download.geofabrik.de/europe/ukraine/odessa-oblast-latest.osm.pbf";

/// Where the extract is stored, relative to the working directory.
pub const DEFAULT_EXTRACT_PATH: &str = "data/odessa_oblast.osm.pbf";

/// Car profile shipped in the engine image.
pub const DEFAULT_PROFILE_LUA: &str = "/opt/car.lua";

/// Prepared graph inside the engine container.
pub const DEFAULT_GRAPH_PATH: &str = "/data/odessa_oblast.osrm";

/// Stream `url` to `destination`.
///
/// The body is written to a temporary file next to `destination` and moved
/// into place only once complete, so an interrupted download never leaves a
/// truncated extract behind.
pub async fn download_extract(url: &str, destination: &Path) -> Result<PathBuf> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let client = Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(concat!("osrm-relay/", env!("CARGO_PKG_VERSION")))
        .build()?;

    info!(url, destination = %destination.display(), "downloading extract");
    let mut response = client.get(url).send().await?.error_for_status()?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        tmp.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    tmp.flush()?;

    tmp.persist(destination)
        .map_err(|err| Error::PersistDownload {
            path: destination.to_path_buf(),
            message: err.error.to_string(),
        })?;

    info!(bytes = written, destination = %destination.display(), "extract saved");
    Ok(destination.to_path_buf())
}

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Graph path the OSRM tools derive from an extract path
/// (`foo.osm.pbf` becomes `foo.osrm`).
pub fn graph_path_for(pbf: &Path) -> PathBuf {
    let text = pbf.to_string_lossy();
    match text.strip_suffix(".osm.pbf") {
        Some(stem) => PathBuf::from(format!("{}.osrm", stem)),
        None => pbf.with_extension("osrm"),
    }
}

/// Full preprocessing pipeline for a fresh extract.
pub fn prepare_plan(pbf: &Path, profile_lua: &Path, algorithm: Algorithm) -> Vec<ToolInvocation> {
    let pbf_arg = pbf.to_string_lossy().into_owned();
    let graph = graph_path_for(pbf).to_string_lossy().into_owned();

    let mut plan = vec![ToolInvocation::new(
        "osrm-extract",
        ["-p".to_string(), profile_lua.to_string_lossy().into_owned(), pbf_arg],
    )];
    match algorithm {
        Algorithm::Mld => {
            plan.push(ToolInvocation::new("osrm-partition", [graph.clone()]));
            plan.push(ToolInvocation::new("osrm-customize", [graph]));
        }
        Algorithm::Ch => plan.push(ToolInvocation::new("osrm-contract", [graph])),
    }
    plan
}

/// Refresh edge weights of an already prepared graph.
pub fn rebuild_plan(graph: &Path, algorithm: Algorithm) -> Vec<ToolInvocation> {
    let program = match algorithm {
        Algorithm::Mld => "osrm-customize",
        Algorithm::Ch => "osrm-contract",
    };
    vec![ToolInvocation::new(
        program,
        [graph.to_string_lossy().into_owned()],
    )]
}

/// Runs tool invocations. Abstracted so plans can be exercised without the
/// OSRM binaries installed.
pub trait CommandRunner {
    /// Run one invocation, returning its exit code (`None` if killed by a signal).
    fn run(&mut self, invocation: &ToolInvocation) -> Result<Option<i32>>;
}

/// Runs invocations as child processes, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &ToolInvocation) -> Result<Option<i32>> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()?;
        Ok(status.code())
    }
}

/// Run `plan` in order, stopping at the first invocation that does not exit 0.
pub fn run_plan<R: CommandRunner + ?Sized>(plan: &[ToolInvocation], runner: &mut R) -> Result<()> {
    for invocation in plan {
        info!(command = %invocation, "running");
        let code = runner.run(invocation)?;
        if code != Some(0) {
            return Err(Error::CommandFailed {
                program: invocation.program.clone(),
                code,
            });
        }
        debug!(program = %invocation.program, "finished");
    }
    Ok(())
}
