//! CLI output formatting

use crate::{
    core::{Action, ActionKind, PipelineTopology, Stage, StageMode},
    persistence::PlanSummary,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static GATE: Emoji<'_, '_> = Emoji("✋ ", "? ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format an action kind for display
pub fn format_kind(kind: ActionKind) -> String {
    match kind {
        ActionKind::Source => style("SOURCE").blue().to_string(),
        ActionKind::ManualApproval => style("APPROVAL").yellow().to_string(),
        ActionKind::Build => style("BUILD").cyan().to_string(),
        ActionKind::Deploy => style("DEPLOY").green().to_string(),
    }
}

/// Format a stage mode for display
pub fn format_mode(mode: StageMode) -> String {
    match mode {
        StageMode::Sequential => style("sequential").dim().to_string(),
        StageMode::Parallel => style("parallel").magenta().to_string(),
    }
}

/// One action line: run order, kind, name and artifact flow
pub fn format_action(action: &Action) -> String {
    let icon = if action.is_approval() { GATE } else { ROCKET };
    let mut line = format!(
        "{}[{}] {} {}",
        icon,
        action.run_order,
        format_kind(action.kind),
        style(&action.name).bold()
    );

    match (&action.input, &action.output) {
        (Some(input), Some(output)) => {
            line.push_str(&format!(" {} → {}", style(input).dim(), style(output).cyan()));
        }
        (None, Some(output)) => line.push_str(&format!(" → {}", style(output).cyan())),
        (Some(input), None) => line.push_str(&format!(" {}", style(input).dim())),
        (None, None) => {}
    }

    if let Some(project) = &action.project {
        line.push_str(&format!(" ({})", style(&project.buildspec).dim()));
    }
    line
}

/// A stage header followed by its actions, grouped by lane when parallel
pub fn format_stage(index: usize, stage: &Stage) -> String {
    let mut out = format!(
        "{}. {} ({}, {} action(s))",
        index + 1,
        style(&stage.name).bold(),
        format_mode(stage.mode),
        stage.actions.len()
    );

    match stage.mode {
        StageMode::Sequential => {
            for action in &stage.actions {
                out.push_str(&format!("\n     {}", format_action(action)));
            }
        }
        StageMode::Parallel => {
            for lane in 0..stage.lanes() {
                out.push_str(&format!("\n     {}", style(format!("lane {}", lane + 1)).dim()));
                for action in stage.lane(lane) {
                    out.push_str(&format!("\n       {}", format_action(action)));
                }
            }
        }
    }
    out
}

/// Full topology for terminal display
pub fn format_topology(topology: &PipelineTopology) -> String {
    let mut out = format!(
        "{} Pipeline {} ({} stages, {} actions, {} approval gate(s))",
        INFO,
        style(&topology.name).bold(),
        style(topology.stages.len()).cyan(),
        style(topology.action_count()).cyan(),
        style(topology.approval_count()).yellow()
    );
    for (index, stage) in topology.stages.iter().enumerate() {
        out.push_str(&format!("\n  {}", format_stage(index, stage)));
    }
    out
}

/// Format plan summary for display
pub fn format_plan_summary(summary: &PlanSummary) -> String {
    format!(
        "{} {} - {} - {} stages, {} actions, {} approvals - {}",
        CHECK,
        style(&summary.plan_id.to_string()[..8]).dim(),
        style(&summary.pipeline_name).bold(),
        summary.stage_count,
        summary.action_count,
        summary.approval_count,
        style(summary.generated_at.format("%Y-%m-%d %H:%M:%S")).dim()
    )
}
