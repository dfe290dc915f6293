//! Test: Single run - one request becomes one sequential stage

use crate::helpers::*;
use pipeline_plan::core::{ActionKind, StageMode};
use pipeline_plan::planning::ActionRequest;
use pipeline_plan::PlanError;

/// A build without approval is a single action at run order 1
#[test]
fn test_build_stage() {
    let fx = Fixture::new();
    let stage = &fx.build.stage;

    assert_eq!(stage.name, "Build");
    assert_eq!(stage.mode, StageMode::Sequential);
    assert_eq!(stage.actions.len(), 1);
    assert_eq!(stage.actions[0].run_order, 1);
    assert_eq!(stage.actions[0].kind, ActionKind::Build);
    assert_eq!(stage.approval_count(), 0);
    assert_eq!(stage.inputs(), vec![&fx.source.artifact]);
    assert_eq!(fx.build.artifact.name(), "foo-build-artifacts");
}

/// A gated deploy puts the approval first and the deploy second
#[test]
fn test_deploy_with_approval() {
    let mut fx = Fixture::new();
    let request = fx.deploy("prod", true).with_label("deploy");

    let prod = fx.composer.single_run("deploy prod", &request).unwrap();
    let actions = &prod.stage.actions;

    assert_eq!(prod.stage.name, "Deploy_Prod");
    assert_eq!(actions.len(), 2);

    assert_eq!(actions[0].run_order, 1);
    assert_eq!(actions[0].kind, ActionKind::ManualApproval);
    assert_eq!(actions[0].name, "Approve_Deployment");
    assert_eq!(actions[0].notify_topic.as_deref(), Some("FooPipelineTopic"));

    assert_eq!(actions[1].run_order, 2);
    assert_eq!(actions[1].kind, ActionKind::Deploy);
    assert_eq!(actions[1].name, "Deploy");
    assert_eq!(actions[1].input.as_ref(), Some(&fx.build.artifact));
    assert_eq!(prod.artifact.name(), "foo-prod-deploy-artifacts");
}

/// A gated build is named after the build, not a deployment
#[test]
fn test_build_with_approval() {
    let mut fx = Fixture::new();
    let request = ActionRequest::build(fx.composer.project(), fx.build.artifact.clone(), "rebuild.yml")
        .with_environment("qa")
        .with_manual_approval(true);

    let stage = fx.composer.single_run("rebuild", &request).unwrap().stage;

    assert_eq!(stage.actions[0].name, "Approve_Build");
    assert_eq!(stage.actions[1].kind, ActionKind::Build);
    let project = stage.actions[1].project.as_ref().unwrap();
    assert_eq!(project.name, "FooQaBuildProject");
    assert_eq!(project.failure_notification.rule_name, "FooQaBuildFailedEvent");
}

/// Deploy projects and failure rules are specific to the environment
#[test]
fn test_deployment_project_names() {
    let mut fx = Fixture::new();
    let request = fx.deploy("uat1", false);

    let stage = fx.composer.single_run("deploy uat", &request).unwrap().stage;
    let project = stage.actions[0].project.as_ref().unwrap();

    assert_eq!(stage.actions[0].name, "Deploy_To_Uat1");
    assert_eq!(project.name, "FooUat1DeploymentProject");
    assert_eq!(project.buildspec, "deploy.uat1.yml");
    assert_eq!(project.failure_notification.rule_name, "FooUat1DeploymentFailedEvent");
    assert_eq!(
        project.failure_notification.description,
        "Notify Developers of Failed Deployments"
    );
}

/// Empty buildspec and environment are rejected before assembly
#[test]
fn test_invalid_requests_rejected() {
    let mut fx = Fixture::new();
    let before = fx.composer.artifacts().len();

    let no_buildspec = fx.deploy("prod", false).with_label("deploy prod");
    let no_buildspec = ActionRequest { buildspec: " ".into(), ..no_buildspec };
    let err = fx.composer.single_run("deploy prod", &no_buildspec).unwrap_err();
    assert!(err.is_input_error(), "{}", err);

    let no_env = fx.deploy("", false).with_label("deploy");
    let err = fx.composer.single_run("deploy prod", &no_env).unwrap_err();
    assert!(err.is_input_error(), "{}", err);

    assert_eq!(fx.composer.artifacts().len(), before, "no artifact allocated");
}

/// An input that no stage produced is a configuration error
#[test]
fn test_unknown_input_rejected() {
    let mut fx = Fixture::new();
    let mut other = Fixture::new();
    let other_request = other.deploy("dev", false);
    let foreign = other.composer.single_run("deploy dev", &other_request).unwrap();

    let request = ActionRequest::deploy(fx.composer.project(), foreign.artifact, "dev", "deploy.dev.yml");
    let err = fx.composer.single_run("deploy dev", &request).unwrap_err();

    assert!(matches!(err, PlanError::UnresolvedArtifact { ref artifact, .. } if artifact == "foo-dev-deploy-artifacts"));
    assert!(err.is_configuration_error());
}

/// Deploying the same environment twice would reuse its artifact name
#[test]
fn test_duplicate_environment_rejected() {
    let mut fx = Fixture::new();
    let request = fx.deploy("dev", false);
    fx.composer.single_run("deploy dev", &request).unwrap();

    let err = fx.composer.single_run("deploy dev again", &request).unwrap_err();
    assert_eq!(err, PlanError::DuplicateArtifact("foo-dev-deploy-artifacts".to_string()));
}
