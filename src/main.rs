use anyhow::{Context, Result};
use pipeline_plan::cli::commands::{HistoryCommand, ListCommand, OutputFormat, PlanCommand, ValidateCommand};
use pipeline_plan::cli::output::*;
use pipeline_plan::cli::{Cli, Command};
use pipeline_plan::persistence::{create_summary, PlanSummary, SqlitePlanStore};
use pipeline_plan::{InMemoryPersistence, PersistenceBackend, PipelineConfig, StackManifest};
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Plan(cmd) => plan_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::List(cmd) => list_pipelines(cmd).await?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

async fn plan_pipeline(cmd: &PlanCommand) -> Result<()> {
    let config = PipelineConfig::from_file(&cmd.file).context("Failed to load pipeline config")?;
    let topology = config
        .to_topology()
        .with_context(|| format!("Failed to plan pipeline for {}", config.project))?;

    // Set up persistence
    let store: Arc<dyn PersistenceBackend> = if cmd.no_history {
        Arc::new(InMemoryPersistence::new())
    } else {
        Arc::new(SqlitePlanStore::with_default_path().await?)
    };

    let summary = create_summary(&topology, &config.project);
    store.save_plan(&summary).await?;
    debug!("Saved plan {} for {}", summary.plan_id, summary.pipeline_name);

    if cmd.manifest {
        let manifest = StackManifest::from_topology(&config, &topology)?;
        match cmd.format {
            OutputFormat::Json => println!("{}", manifest.to_json()?),
            // Text has no richer rendering for the manifest than YAML
            OutputFormat::Yaml | OutputFormat::Text => print!("{}", manifest.to_yaml()?),
        }
        return Ok(());
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&topology)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&topology)?),
        OutputFormat::Text => {
            println!("{}", format_topology(&topology));
            if !cmd.no_history {
                println!(
                    "\n{} Plan saved to history (ID: {})",
                    INFO,
                    style(&summary.plan_id.to_string()[..8]).dim()
                );
            }
        }
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file)
        .and_then(|config| config.to_topology().map(|topology| (config, topology)).map_err(Into::into));

    match result {
        Ok((config, topology)) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Project: {}", style(&config.project).bold());
            println!("  Pipeline: {}", style(&topology.name).bold());
            println!("  Stages: {}", style(topology.stages.len()).cyan());
            println!("  Environments: {}", style(config.environments().join(", ")).cyan());
            println!("  Approval gates: {}", style(topology.approval_count()).yellow());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    let store = SqlitePlanStore::with_default_path().await?;
    let pipelines = store.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{} No pipelines found in history", INFO);
        return Ok(());
    }

    if cmd.json {
        let mut json_data = Vec::new();
        for pipeline in &pipelines {
            let plans = store.list_plans(pipeline).await?;
            json_data.push(serde_json::json!({
                "name": pipeline,
                "plan_count": plans.len(),
                "latest": plans.first().map(|p| p.generated_at),
            }));
        }
        let data = serde_json::json!({ "pipelines": json_data });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Pipelines in history:", INFO);
    for pipeline_name in &pipelines {
        if cmd.with_counts {
            let plans = store.list_plans(pipeline_name).await?;
            println!(
                "  {} ({} plans)",
                style(pipeline_name).bold(),
                style(plans.len()).cyan()
            );
        } else {
            println!("  {}", style(pipeline_name).bold());
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = SqlitePlanStore::with_default_path().await?;

    // If specific plan ID is requested
    if let Some(plan_id) = &cmd.plan_id {
        let plan_id = uuid::Uuid::parse_str(plan_id).context("Invalid plan ID format")?;
        match store.load_plan(plan_id).await? {
            Some(summary) => print_plan_details(&summary, cmd.json)?,
            None => println!("{} Plan not found", WARN),
        }
        return Ok(());
    }

    let mut plans = if let Some(pipeline_name) = &cmd.pipeline {
        store.list_plans(pipeline_name).await?
    } else {
        let mut all_plans = Vec::new();
        for pipeline in store.list_pipelines().await? {
            all_plans.extend(store.list_plans(&pipeline).await?);
        }
        all_plans.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        all_plans
    };
    plans.truncate(cmd.limit);

    if plans.is_empty() {
        println!("{} No plans found", INFO);
        return Ok(());
    }

    if cmd.json {
        let data = serde_json::json!({ "plans": plans });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{} Plan history (showing latest {}):", INFO, cmd.limit);
        for summary in &plans {
            println!("  {}", format_plan_summary(summary));
        }
    }

    Ok(())
}

fn print_plan_details(summary: &PlanSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{} Plan Details", INFO);
    println!("  ID: {}", style(summary.plan_id).cyan());
    println!("  Pipeline: {}", style(&summary.pipeline_name).bold());
    println!("  Project: {}", summary.project);
    println!("  Generated: {}", style(summary.generated_at.to_rfc3339()).dim());
    println!("  Stages: {}", style(summary.stage_count).cyan());
    println!("  Actions: {}", style(summary.action_count).cyan());
    println!("  Approval gates: {}", style(summary.approval_count).yellow());

    Ok(())
}
