//! Test: Full pipeline - source, build, deploys and final deploy

use crate::helpers::*;
use pipeline_plan::core::{ActionKind, PipelineTopology, StageMode};
use pipeline_plan::PlanError;
use std::collections::HashSet;

#[test]
fn test_stage_order() {
    let topology = foo_pipeline();

    assert_eq!(topology.name, "FooPipeline");
    assert_eq!(
        topology.stage_names(),
        vec!["Foo_Source_Code", "Build", "Deploy_Dev", "Deploy_Uat", "Deploy_Prod"]
    );
    assert_eq!(topology.stage("Deploy_Uat").unwrap().mode, StageMode::Parallel);

    let source = topology.source_stage().unwrap();
    assert!(source.actions.iter().all(|a| a.kind == ActionKind::Source));
    let settings = source.actions[0].source.as_ref().unwrap();
    assert_eq!(settings.repository, "FooRepository");
    assert_eq!(settings.branch, "dev");

    let prod = topology.final_stage().unwrap();
    assert_eq!(prod.name, "Deploy_Prod");
    assert_eq!(prod.actions.last().unwrap().name, "Deploy_To_Prod");
}

#[test]
fn test_counts() {
    let topology = foo_pipeline();

    // source + build + dev + 2x(approval, deploy) + approval + deploy
    assert_eq!(topology.action_count(), 9);
    assert_eq!(topology.approval_count(), 3);
    assert_run_orders(&topology);
}

/// Build reads the source output; every deploy reads the build output
#[test]
fn test_artifact_chain() {
    let topology = foo_pipeline();

    let source_out = topology.stages[0].outputs()[0].clone();
    let build_out = topology.stages[1].outputs()[0].clone();
    assert_eq!(source_out.name(), "foo-source-artifacts");
    assert_eq!(build_out.name(), "foo-build-artifacts");

    assert_eq!(inputs(&topology, "Build"), vec![source_out]);
    for stage in &topology.stages[2..] {
        let stage_inputs = inputs(&topology, &stage.name);
        assert!(!stage_inputs.is_empty());
        assert!(stage_inputs.iter().all(|a| *a == build_out), "stage {}", stage.name);
    }
}

#[test]
fn test_names_are_unique() {
    let topology = foo_pipeline();

    let stages: HashSet<_> = topology.stage_names().into_iter().collect();
    assert_eq!(stages.len(), topology.stages.len());

    for stage in &topology.stages {
        let actions: HashSet<_> = stage.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(actions.len(), stage.actions.len(), "stage {}", stage.name);
    }

    let artifacts: Vec<_> = topology.stages.iter().flat_map(|s| s.outputs()).collect();
    let unique: HashSet<_> = artifacts.iter().collect();
    assert_eq!(unique.len(), artifacts.len());
}

/// One failure notification per build/deploy action, all distinct
#[test]
fn test_failure_notifications() {
    let topology = foo_pipeline();

    let code_build_actions = topology
        .stages
        .iter()
        .flat_map(|s| s.actions.iter())
        .filter(|a| a.kind.runs_build_project())
        .count();
    let rules: Vec<&str> = topology
        .failure_notifications()
        .iter()
        .map(|n| n.rule_name.as_str())
        .collect();

    assert_eq!(rules.len(), code_build_actions);
    assert_eq!(
        rules,
        vec![
            "FooBuildFailedEvent",
            "FooDevDeploymentFailedEvent",
            "FooUat1DeploymentFailedEvent",
            "FooUat2DeploymentFailedEvent",
            "FooProdDeploymentFailedEvent",
        ]
    );
    assert!(topology
        .failure_notifications()
        .iter()
        .all(|n| n.topic == "FooPipelineTopic"));
}

/// A deploy fed from the source checkout breaks the chain
#[test]
fn test_deploy_must_follow_build() {
    let mut fx = Fixture::new();
    let bypass = pipeline_plan::planning::ActionRequest::deploy(
        fx.composer.project(),
        fx.source.artifact.clone(),
        "prod",
        "deploy.prod.yml",
    );
    let prod = fx.composer.single_run("deploy prod", &bypass).unwrap();

    let err = fx
        .composer
        .build_pipeline(fx.source, fx.build, vec![], prod.stage)
        .unwrap_err();
    assert!(matches!(err, PlanError::BrokenChain { ref found, .. } if found == "foo-source-artifacts"));
}

/// The topology is plain data the engine can load back
#[test]
fn test_serializes() {
    let topology = foo_pipeline();

    let json = serde_json::to_string(&topology).unwrap();
    let parsed: PipelineTopology = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, topology);
    assert!(parsed.validate().is_ok());

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["stages"][3]["mode"], "parallel");
}
