//! Test: Parallel run - several requests fanned out inside one stage

use crate::helpers::*;
use pipeline_plan::core::{ActionKind, StageMode};
use pipeline_plan::PlanError;
use std::collections::HashSet;

/// Two gated deploys give four actions and two distinct artifacts
#[test]
fn test_parallel_deploys_with_approval() {
    let mut fx = Fixture::new();
    let requests = vec![fx.deploy("uat1", true), fx.deploy("uat2", true)];

    let uat = fx.composer.parallel_run("deploy uat", &requests).unwrap();

    assert_eq!(uat.stage.name, "Deploy_Uat");
    assert_eq!(uat.stage.mode, StageMode::Parallel);
    assert_eq!(uat.stage.actions.len(), 4);
    assert_eq!(uat.stage.lanes(), 2);
    assert_eq!(uat.artifacts.len(), 2);
    assert_ne!(uat.artifacts[0], uat.artifacts[1]);

    let names: Vec<&str> = uat.stage.actions.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Approve_Uat1_Deployment",
            "Deploy_To_Uat1",
            "Approve_Uat2_Deployment",
            "Deploy_To_Uat2",
        ]
    );

    let orders: Vec<u32> = uat.stage.actions.iter().map(|a| a.run_order).collect();
    assert_eq!(orders, vec![1, 2, 1, 2]);
}

/// Without approvals each lane is a single action
#[test]
fn test_parallel_deploys_without_approval() {
    let mut fx = Fixture::new();
    let requests = vec![fx.deploy("uat1", false), fx.deploy("uat2", false)];

    let uat = fx.composer.parallel_run("deploy uat", &requests).unwrap();

    assert_eq!(uat.stage.actions.len(), 2);
    assert!(uat.stage.actions.iter().all(|a| a.kind == ActionKind::Deploy && a.run_order == 1));
    assert_eq!(uat.stage.approval_count(), 0);
}

/// N requests give N artifacts, in request order, each from its own lane
#[test]
fn test_lanes_follow_request_order() {
    let mut fx = Fixture::new();
    let envs = ["qa", "uat1", "uat2", "perf"];
    let requests: Vec<_> = envs
        .iter()
        .enumerate()
        .map(|(i, env)| fx.deploy(env, i % 2 == 0))
        .collect();

    let stage = fx.composer.parallel_run("deploy test envs", &requests).unwrap();

    assert_eq!(stage.artifacts.len(), envs.len());
    let unique: HashSet<_> = stage.artifacts.iter().collect();
    assert_eq!(unique.len(), envs.len());

    for (lane, env) in envs.iter().enumerate() {
        let actions: Vec<_> = stage.stage.lane(lane).collect();
        let deploy = actions.last().unwrap();
        assert_eq!(deploy.output.as_ref(), Some(&stage.artifacts[lane]));
        assert_eq!(stage.artifacts[lane].name(), format!("foo-{}-deploy-artifacts", env));
        assert_eq!(actions.len(), if lane % 2 == 0 { 2 } else { 1 });
    }

    // Concatenation of the lanes in request order
    let lanes: Vec<usize> = stage.stage.actions.iter().map(|a| a.lane).collect();
    assert_eq!(lanes, vec![0, 0, 1, 2, 2, 3]);
}

/// Every lane reads the shared build output
#[test]
fn test_all_lanes_consume_build_output() {
    let mut fx = Fixture::new();
    let requests = vec![fx.deploy("uat1", true), fx.deploy("uat2", false)];

    let uat = fx.composer.parallel_run("deploy uat", &requests).unwrap();

    let inputs = uat.stage.inputs();
    assert_eq!(inputs.len(), 2);
    assert!(inputs.iter().all(|a| **a == fx.build.artifact));
}

#[test]
fn test_empty_parallel_run_rejected() {
    let mut fx = Fixture::new();
    let err = fx.composer.parallel_run("deploy uat", &[]).unwrap_err();
    assert!(err.is_input_error());
}

/// A single request still yields a parallel stage
#[test]
fn test_single_request_parallel_run() {
    let mut fx = Fixture::new();
    let requests = vec![fx.deploy("uat1", true)];

    let uat = fx.composer.parallel_run("deploy uat", &requests).unwrap();

    assert_eq!(uat.stage.mode, StageMode::Parallel);
    assert_eq!(uat.artifacts.len(), 1);
    assert_eq!(uat.stage.actions[0].name, "Approve_Uat1_Deployment");
}

/// A lane failing after earlier lanes assembled leaves the registry as it was,
/// so the corrected stage can be composed afterwards
#[test]
fn test_failed_lane_allocates_nothing() {
    let mut fx = Fixture::new();
    let before = fx.composer.artifacts().len();
    let broken = vec![
        fx.deploy("uat1", true),
        fx.deploy("uat2", true).with_label("  "),
    ];

    let err = fx.composer.parallel_run("deploy uat", &broken).unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(fx.composer.artifacts().len(), before);

    let fixed = vec![fx.deploy("uat1", true), fx.deploy("uat2", true)];
    let uat = fx.composer.parallel_run("deploy uat", &fixed).unwrap();
    assert_eq!(uat.artifacts[0].name(), "foo-uat1-deploy-artifacts");
    assert_eq!(fx.composer.artifacts().len(), before + 2);
}

/// Lanes sharing a custom action label would give the stage two equal names
#[test]
fn test_shared_action_label_rejected() {
    let mut fx = Fixture::new();
    let before = fx.composer.artifacts().len();
    let requests = vec![
        fx.deploy("uat1", false).with_label("deploy website"),
        fx.deploy("uat2", false).with_label("deploy website"),
    ];

    let err = fx.composer.parallel_run("deploy uat", &requests).unwrap_err();

    assert!(matches!(err, PlanError::DuplicateAction { ref action, .. } if action == "Deploy_Website"));
    assert!(err.is_configuration_error());
    assert_eq!(fx.composer.artifacts().len(), before);
}
