//! Test: Config - YAML descriptions planned end to end

use crate::helpers::*;
use pipeline_plan::core::{ActionKind, StageMode};
use pipeline_plan::PipelineConfig;

/// Build, two sequential deploys and production, no approvals at all
#[test]
fn test_ungated_pipeline() {
    let yaml = r#"
project: "Shop Front"
repository: "ShopFrontRepository"
branch: main
build:
  buildspec: "build.yml"
deploys:
  - stage: "deploy dev"
    targets:
      - environment: dev
        buildspec: "deploy.dev.yml"
  - stage: "deploy staging"
    targets:
      - environment: staging
        action: "ship staging"
        buildspec: "deploy.staging.yml"
production:
  stage: "deploy prod"
  environment: prod
  buildspec: "deploy.prod.yml"
"#;

    let topology = PipelineConfig::from_yaml(yaml).unwrap().to_topology().unwrap();

    assert_eq!(topology.name, "ShopFrontPipeline");
    assert_eq!(
        topology.stage_names(),
        vec!["Shop_Front_Source_Code", "Build", "Deploy_Dev", "Deploy_Staging", "Deploy_Prod"]
    );
    assert_eq!(topology.approval_count(), 0);
    assert!(topology.stages.iter().all(|s| s.mode == StageMode::Sequential));
    assert_eq!(topology.source_stage().unwrap().actions[0].name, "Main_Updated");
    assert_eq!(topology.stages[1].actions[0].name, "Build_Shop_Front");
    assert_eq!(topology.stages[3].actions[0].name, "Ship_Staging");
    assert_run_orders(&topology);
}

/// A gated build gets its approval ahead of the build action
#[test]
fn test_gated_build() {
    let yaml = r#"
project: "Foo"
repository: "FooRepository"
build:
  stage: "compile"
  buildspec: "build.yml"
  manual_approval: true
production:
  stage: "release"
  environment: prod
  buildspec: "deploy.prod.yml"
"#;

    let topology = PipelineConfig::from_yaml(yaml).unwrap().to_topology().unwrap();
    let build = topology.stage("Compile").unwrap();

    assert_eq!(build.actions[0].kind, ActionKind::ManualApproval);
    assert_eq!(build.actions[0].name, "Approve_Build");
    assert_eq!(build.actions[1].kind, ActionKind::Build);
    assert_eq!(topology.final_stage().unwrap().name, "Release");
    assert_run_orders(&topology);
}

/// Multi-target groups become parallel stages
#[test]
fn test_parallel_group() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/hello-world.yaml");
    let config = PipelineConfig::from_file(path).unwrap();
    let topology = config.to_topology().unwrap();

    let uat = topology.stage("Deploy_Uat_Websites").unwrap();
    assert_eq!(uat.mode, StageMode::Parallel);
    assert_eq!(uat.lanes(), 2);
    assert_eq!(uat.approval_count(), 2);
    assert_eq!(topology.stage("Deploy_Dev_Website").unwrap().mode, StageMode::Sequential);
    assert_eq!(config.environments(), vec!["dev", "uat1", "uat2", "prod"]);
}

/// A stage label that collides with the generated source stage
#[test]
fn test_label_colliding_with_source_stage() {
    let yaml = r#"
project: "Foo"
repository: "FooRepository"
build:
  stage: "foo source code"
  buildspec: "build.yml"
production:
  stage: "deploy prod"
  environment: prod
  buildspec: "deploy.prod.yml"
"#;

    let err = PipelineConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate stage name: Foo_Source_Code"));
}

#[test]
fn test_empty_buildspec_rejected() {
    let yaml = r#"
project: "Foo"
repository: "FooRepository"
build:
  buildspec: "build.yml"
production:
  stage: "deploy prod"
  environment: prod
  buildspec: ""
"#;

    let err = PipelineConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("empty buildspec"));
}

#[test]
fn test_missing_build_rejected() {
    let yaml = r#"
project: "Foo"
repository: "FooRepository"
production:
  stage: "deploy prod"
  environment: prod
  buildspec: "deploy.prod.yml"
"#;
    assert!(PipelineConfig::from_yaml(yaml).is_err());
}
