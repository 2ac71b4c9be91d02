//! Output formatting for command results.
//!
//! Every command can print either human-readable text or JSON. Renderers
//! return strings so they can be tested without capturing stdout.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use osrm_relay_lib::health::{EngineCheck, FileStatus};
use osrm_relay_lib::maintenance::ToolInvocation;
use osrm_relay_lib::summary::{meters_to_km, seconds_to_minutes};
use osrm_relay_lib::{EngineResponse, HealthReport, RouteSummary};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Route document together with its summary, as printed by `route --summary`.
#[derive(Debug, Serialize)]
pub struct SummaryOutput<'a> {
    pub route: &'a EngineResponse,
    pub summary: &'a RouteSummary,
}

/// Result of a `prepare` or `rebuild` run.
#[derive(Debug, Serialize)]
pub struct PlanOutput<'a> {
    pub dry_run: bool,
    pub commands: &'a [ToolInvocation],
}

#[derive(Debug, Serialize)]
pub struct DownloadOutput {
    pub url: String,
    pub path: String,
}

/// Serialize `value` as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output as JSON")
}

/// Text view of a route response: totals per route and leg, then waypoints.
pub fn render_route_text(response: &EngineResponse, palette: ColorPalette) -> String {
    let mut lines = Vec::new();

    for (index, route) in response.routes().iter().enumerate() {
        lines.push(format!(
            "{}Route {}{}: {:.2} km, {:.1} min",
            palette.bold,
            index + 1,
            palette.reset,
            meters_to_km(route.distance),
            seconds_to_minutes(route.duration)
        ));
        for (leg_index, leg) in route.legs.iter().enumerate() {
            let via = leg
                .summary
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!(" {}via {}{}", palette.muted, s, palette.reset))
                .unwrap_or_default();
            lines.push(format!(
                "  leg {}: {:.2} km, {:.1} min{}",
                leg_index + 1,
                meters_to_km(leg.distance),
                seconds_to_minutes(leg.duration),
                via
            ));
        }
    }

    if !response.waypoints().is_empty() {
        lines.push("Waypoints:".to_string());
        for (index, waypoint) in response.waypoints().iter().enumerate() {
            let name = waypoint
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or("-");
            let location = match waypoint.location.as_slice() {
                [lon, lat, ..] => format!("{:.6},{:.6}", lon, lat),
                _ => "?".to_string(),
            };
            lines.push(format!(
                "  {}. {} {}[{}]{}",
                index + 1,
                name,
                palette.muted,
                location,
                palette.reset
            ));
        }
    }

    lines.join("\n")
}

/// Text view of a summary: the message, then the steps of each leg.
pub fn render_summary_text(summary: &RouteSummary, palette: ColorPalette) -> String {
    let mut lines = vec![summary.message.clone()];

    for (index, leg) in summary.legs.iter().enumerate() {
        if leg.steps.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!(
            "{}{}) {} → {}{}",
            palette.bold,
            index + 1,
            leg.origin,
            leg.destination,
            palette.reset
        ));
        for step in &leg.steps {
            lines.push(format!(
                "   - {} {}({:.2} km){}",
                step.instruction, palette.muted, step.distance_km, palette.reset
            ));
        }
    }

    lines.join("\n")
}

/// Text view of a tool plan.
pub fn render_plan_text(plan: &[ToolInvocation], dry_run: bool, palette: ColorPalette) -> String {
    let mut lines = Vec::with_capacity(plan.len() + 1);
    lines.push(if dry_run {
        "Planned commands (dry run):".to_string()
    } else {
        "Completed commands:".to_string()
    });
    for invocation in plan {
        lines.push(format!("  {}${} {}", palette.muted, palette.reset, invocation));
    }
    lines.join("\n")
}

/// Text view of a health report.
pub fn render_health_text(report: &HealthReport, palette: ColorPalette) -> String {
    let engine = match &report.osrm {
        EngineCheck::Ok { status_code, .. } => {
            format!("{}ok{} (HTTP {})", palette.ok, palette.reset, status_code)
        }
        EngineCheck::Error { status_code, .. } => {
            format!("{}error{} (HTTP {})", palette.warn, palette.reset, status_code)
        }
        EngineCheck::Unreachable { error } => {
            format!("{}unreachable{}: {}", palette.error, palette.reset, error)
        }
    };

    let mut lines = vec![format!("OSRM {}: {}", report.osrm_url, engine)];
    for file in &report.data {
        let status = match file.status {
            FileStatus::Ok => format!("{}ok{}", palette.ok, palette.reset),
            FileStatus::Missing => format!("{}missing{}", palette.error, palette.reset),
        };
        lines.push(format!("  {}: {}", file.path.display(), status));
    }
    lines.join("\n")
}
