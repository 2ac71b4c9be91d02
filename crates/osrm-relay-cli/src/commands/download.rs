//! Download command: fetch the OSM extract the engine graph is built from.

use std::path::Path;

use anyhow::{Context, Result};

use osrm_relay_lib::maintenance::download_extract;

use crate::output::{to_json, DownloadOutput, OutputFormat};

/// Handle the download subcommand.
pub async fn handle_download(url: &str, destination: &Path, format: OutputFormat) -> Result<()> {
    let path = download_extract(url, destination)
        .await
        .with_context(|| format!("failed to download {}", url))?;

    let output = DownloadOutput {
        url: url.to_string(),
        path: path.display().to_string(),
    };
    match format {
        OutputFormat::Json => println!("{}", to_json(&output)?),
        OutputFormat::Text => println!("Extract saved to {}", output.path),
    }
    Ok(())
}
