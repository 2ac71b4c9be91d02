//! Prepare and rebuild commands: run the OSRM preprocessing tools.

use std::path::Path;

use anyhow::{Context, Result};

use osrm_relay_lib::maintenance::{
    prepare_plan, rebuild_plan, run_plan, CommandRunner, SystemRunner, ToolInvocation,
};
use osrm_relay_lib::Algorithm;

use crate::output::{render_plan_text, to_json, OutputFormat, PlanOutput};
use crate::terminal::ColorPalette;

/// Handle the prepare subcommand (full pipeline for a fresh extract).
pub fn handle_prepare(
    pbf: &Path,
    profile_lua: &Path,
    algorithm: Algorithm,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let plan = prepare_plan(pbf, profile_lua, algorithm);
    execute(&plan, dry_run, &mut SystemRunner)
        .with_context(|| format!("failed to prepare {} graph from {}", algorithm, pbf.display()))?;
    print_plan(&plan, dry_run, format)
}

/// Handle the rebuild subcommand (refresh weights of a prepared graph).
pub fn handle_rebuild(
    graph: &Path,
    algorithm: Algorithm,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let plan = rebuild_plan(graph, algorithm);
    execute(&plan, dry_run, &mut SystemRunner)
        .with_context(|| format!("failed to rebuild {}", graph.display()))?;
    print_plan(&plan, dry_run, format)
}

/// Run `plan` unless this is a dry run.
pub fn execute(
    plan: &[ToolInvocation],
    dry_run: bool,
    runner: &mut dyn CommandRunner,
) -> osrm_relay_lib::Result<()> {
    if dry_run {
        return Ok(());
    }
    // The tools run for minutes; keep them off the async worker.
    tokio::task::block_in_place(|| run_plan(plan, runner))
}

fn print_plan(plan: &[ToolInvocation], dry_run: bool, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => to_json(&PlanOutput {
            dry_run,
            commands: plan,
        })?,
        OutputFormat::Text => render_plan_text(plan, dry_run, ColorPalette::detect()),
    };
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use osrm_relay_lib::Error as LibError;

    use super::*;

    #[derive(Default)]
    struct CountingRunner {
        calls: usize,
        exit_code: i32,
    }

    impl CommandRunner for CountingRunner {
        fn run(&mut self, _invocation: &ToolInvocation) -> osrm_relay_lib::Result<Option<i32>> {
            self.calls += 1;
            Ok(Some(self.exit_code))
        }
    }

    fn plan() -> Vec<ToolInvocation> {
        rebuild_plan(Path::new("/data/odessa_oblast.osrm"), Algorithm::Mld)
    }

    #[test]
    fn dry_run_runs_nothing() {
        let mut runner = CountingRunner::default();
        execute(&plan(), true, &mut runner).unwrap();
        assert_eq!(runner.calls, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failing_tool_is_reported() {
        let mut runner = CountingRunner {
            calls: 0,
            exit_code: 3,
        };
        let err = execute(&plan(), false, &mut runner).unwrap_err();
        assert!(matches!(
            err,
            LibError::CommandFailed { ref program, code: Some(3) } if program == "osrm-customize"
        ));
        assert_eq!(runner.calls, 1);
    }
}
