//! Test utility functions for pipeline-plan

use pipeline_plan::core::{Artifact, PipelineTopology, StageMode};
use pipeline_plan::planning::{ActionRequest, StageComposer, StageOutput};
use pipeline_plan::ProjectIdentity;

/// Composer for project "Foo" with its source and build stages already composed
pub struct Fixture {
    pub composer: StageComposer,
    pub source: StageOutput,
    pub build: StageOutput,
}

impl Fixture {
    pub fn new() -> Self {
        let mut composer = StageComposer::new(ProjectIdentity::new("Foo").unwrap());
        let source = composer.source_stage("FooRepository", "dev").unwrap();
        let request = ActionRequest::build(composer.project(), source.artifact.clone(), "build.yml");
        let build = composer.single_run("build", &request).unwrap();
        Self { composer, source, build }
    }

    /// Deploy request for `env` consuming the build output
    pub fn deploy(&self, env: &str, approval: bool) -> ActionRequest {
        ActionRequest::deploy(
            self.composer.project(),
            self.build.artifact.clone(),
            env,
            format!("deploy.{}.yml", env),
        )
        .with_manual_approval(approval)
    }
}

/// Source, build, dev, parallel uat1/uat2 and prod, all gated except dev
pub fn foo_pipeline() -> PipelineTopology {
    let mut fx = Fixture::new();

    let dev_request = fx.deploy("dev", false);
    let uat_requests = vec![fx.deploy("uat1", true), fx.deploy("uat2", true)];
    let prod_request = fx.deploy("prod", true);

    let dev = fx.composer.single_run("deploy dev", &dev_request).unwrap();
    let uat = fx.composer.parallel_run("deploy uat", &uat_requests).unwrap();
    let prod = fx.composer.single_run("deploy prod", &prod_request).unwrap();

    fx.composer
        .build_pipeline(fx.source, fx.build, vec![dev.stage, uat.stage], prod.stage)
        .unwrap()
}

/// Assert run orders count up from 1 per lane with approvals first
pub fn assert_run_orders(topology: &PipelineTopology) {
    for stage in &topology.stages {
        for lane in 0..stage.lanes() {
            let orders: Vec<u32> = stage.lane(lane).map(|a| a.run_order).collect();
            let expected: Vec<u32> = (1..=orders.len() as u32).collect();
            assert_eq!(orders, expected, "stage {} lane {}", stage.name, lane);

            for action in stage.lane(lane).filter(|a| a.is_approval()) {
                assert_eq!(action.run_order, 1, "approval {} in {}", action.name, stage.name);
            }
        }
        if stage.mode == StageMode::Sequential {
            assert_eq!(stage.lanes(), 1, "sequential stage {}", stage.name);
        }
    }
}

/// Input artifacts of every action in a stage
pub fn inputs(topology: &PipelineTopology, stage: &str) -> Vec<Artifact> {
    topology
        .stage(stage)
        .unwrap()
        .inputs()
        .into_iter()
        .cloned()
        .collect()
}
