//! Query command: raw `table`, `nearest`, `match` or `trip` requests.

use anyhow::{Context, Result};

use osrm_relay_lib::{CoordinateSequence, Operation, QueryParams, RoutingClient};

use crate::output::to_json;

#[derive(Debug, Clone)]
pub struct QueryCommandArgs {
    pub operation: Operation,
    /// `;`-joined `lon,lat` pairs.
    pub points: String,
    pub params: Vec<(String, String)>,
}

impl QueryCommandArgs {
    pub fn coordinates(&self) -> Result<CoordinateSequence> {
        let coordinates: CoordinateSequence =
            self.points.parse().context("invalid --points")?;
        self.operation
            .check_coordinates(coordinates.len())
            .with_context(|| format!("wrong number of points for {}", self.operation))?;
        Ok(coordinates)
    }
}

/// Handle the query subcommand.
///
/// Engine documents are always printed as JSON; they have no useful text form.
pub async fn handle_query(client: &RoutingClient, args: &QueryCommandArgs) -> Result<()> {
    let coordinates = args.coordinates()?;
    let params: QueryParams = args.params.iter().cloned().collect();

    let response = client
        .query(args.operation, &coordinates, &params)
        .await
        .with_context(|| format!("{} request failed", args.operation))?;

    println!("{}", to_json(&response)?);
    Ok(())
}
