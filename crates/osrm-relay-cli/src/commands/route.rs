//! Route command: one route through the snap fallback, optionally summarized.

use anyhow::{Context, Result};

use osrm_relay_lib::{
    summarize, Coordinate, CoordinateSequence, Locale, QueryParams, RoutingClient, SnapFallback,
};

use crate::output::{render_route_text, render_summary_text, to_json, OutputFormat, SummaryOutput};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub start: String,
    pub end: String,
    /// Intermediate points, in order.
    pub via: Vec<String>,
    /// Extra engine parameters.
    pub params: Vec<(String, String)>,
    /// Print a readable summary instead of the raw route.
    pub summary: bool,
    pub locale: Locale,
    /// Skip the snap fallback and report the direct attempt.
    pub no_fallback: bool,
}

impl RouteCommandArgs {
    /// Engine parameters; summaries ask for steps unless told otherwise.
    pub fn query_params(&self) -> QueryParams {
        let mut params: QueryParams = self.params.iter().cloned().collect();
        if self.summary {
            params.set_default("steps", "true");
        }
        params
    }

    fn coordinates(&self) -> Result<(Coordinate, Coordinate, Vec<Coordinate>)> {
        let start: Coordinate = self.start.parse().context("invalid --start")?;
        let end: Coordinate = self.end.parse().context("invalid --end")?;
        let via = self
            .via
            .iter()
            .map(|v| v.parse::<Coordinate>())
            .collect::<osrm_relay_lib::Result<Vec<_>>>()
            .context("invalid --via")?;
        Ok((start, end, via))
    }
}

/// Handle the route subcommand.
pub async fn handle_route(
    client: &RoutingClient,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let (start, end, via) = args.coordinates()?;
    let params = args.query_params();

    let result = if args.no_fallback {
        let sequence = CoordinateSequence::route(&start, &via, &end);
        client.route(&sequence, &params).await
    } else {
        match SnapFallback::new(client)
            .resolve(&start, &end, &via, &params)
            .await
        {
            Ok(resolution) => {
                tracing::info!(
                    outcome = resolution.outcome.as_str(),
                    engine_calls = resolution.engine_calls,
                    "route resolved"
                );
                resolution.response
            }
            Err(err) => Err(err),
        }
    };
    let response = result.context("route request failed")?;

    if args.summary {
        let summary = summarize(&response, args.locale);
        let rendered = match format {
            OutputFormat::Json => to_json(&SummaryOutput {
                route: &response,
                summary: &summary,
            })?,
            OutputFormat::Text => render_summary_text(&summary, ColorPalette::detect()),
        };
        println!("{}", rendered);
        return Ok(());
    }

    let response = response.into_successful()?;
    let rendered = match format {
        OutputFormat::Json => to_json(&response)?,
        OutputFormat::Text => render_route_text(&response, ColorPalette::detect()),
    };
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RouteCommandArgs {
        RouteCommandArgs {
            start: "30.72,46.48".to_string(),
            end: "30.74,46.50".to_string(),
            via: vec!["30.73,46.49".to_string()],
            params: vec![("alternatives".to_string(), "true".to_string())],
            summary: false,
            locale: Locale::Ru,
            no_fallback: false,
        }
    }

    #[test]
    fn summary_requests_steps_by_default() {
        let mut args = args();
        assert!(!args.query_params().contains("steps"));

        args.summary = true;
        let params = args.query_params();
        assert_eq!(params.get("steps"), Some("true"));
        assert_eq!(params.get("alternatives"), Some("true"));

        args.params.push(("steps".to_string(), "false".to_string()));
        assert_eq!(args.query_params().get("steps"), Some("false"));
    }

    #[test]
    fn coordinates_are_validated() {
        let (start, end, via) = args().coordinates().unwrap();
        assert_eq!(start.as_str(), "30.72,46.48");
        assert_eq!(end.as_str(), "30.74,46.50");
        assert_eq!(via.len(), 1);

        let mut bad = args();
        bad.via.push("north".to_string());
        let err = bad.coordinates().unwrap_err();
        assert!(err.to_string().contains("--via"));
    }
}
