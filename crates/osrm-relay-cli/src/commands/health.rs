//! Health-check command: data files on disk plus a sample engine query.

use std::path::Path;

use anyhow::{bail, Result};

use osrm_relay_lib::{run_checks, EngineConfig};

use crate::output::{render_health_text, to_json, OutputFormat};
use crate::terminal::ColorPalette;

/// Handle the health-check subcommand.
///
/// The report is always printed. With `strict`, an unhealthy report also
/// fails the command.
pub async fn handle_health_check(
    config: &EngineConfig,
    data_root: &Path,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = run_checks(config, data_root).await;

    let rendered = match format {
        OutputFormat::Json => to_json(&report)?,
        OutputFormat::Text => render_health_text(&report, ColorPalette::detect()),
    };
    println!("{}", rendered);

    if strict && !report.is_healthy() {
        bail!("deployment is unhealthy");
    }
    Ok(())
}
