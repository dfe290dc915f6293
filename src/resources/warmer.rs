//! Warmer stack: a scheduled rule invoking an existing function
//!
//! The function is imported by ARN, never created. During office hours the
//! rule sends it a fixed payload every five minutes.

use crate::core::{
    config::StackEnvironment,
    error::PlanError,
    identity::ProjectIdentity,
    naming::{self, IdentifierKind},
};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Every 5 minutes, Monday to Friday, 08:00 to 17:55
pub const OFFICE_HOURS_SCHEDULE: &str = "cron(0/5 8-17 ? * MON-FRI *)";

pub const OFFICE_HOURS_DESCRIPTION: &str = "Lambda warmer; Runs every 5 mins, Mon-Fri between 8:00-17:55";

static FUNCTION_ARN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:lambda:[a-z0-9-]+:\d{12}:function:([A-Za-z0-9_-]{1,64})(:[A-Za-z0-9$_-]+)?$")
        .expect("valid pattern")
});

static SCHEDULE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(cron|rate)\(.+\)$").expect("valid pattern"));

/// Imported function invoked by the rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTarget {
    /// Logical id of the import, `{Function}Lambda`
    pub logical_id: String,
    pub arn: String,
    /// Event body sent on every invocation
    pub input: serde_json::Value,
}

/// Scheduled rule with its single target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRuleDeclaration {
    pub rule_name: String,
    pub schedule: String,
    pub description: String,
    pub target: FunctionTarget,
}

/// Every resource the warmer stack declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmerManifest {
    pub stack_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<StackEnvironment>,

    pub rule: ScheduleRuleDeclaration,
}

impl WarmerManifest {
    /// Warm `function_arn` on the office hours schedule with `{"string": "value1"}`
    pub fn new(project: &ProjectIdentity, function_arn: &str) -> Result<Self, PlanError> {
        let arn = function_arn.trim();
        let function = FUNCTION_ARN_PATTERN
            .captures(arn)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| PlanError::InvalidInput(format!("'{}' is not a function ARN", function_arn)))?;

        let rule_name = project.resource_name("rule");
        let logical_id = naming::pascal(&format!("{} lambda", function));
        naming::validate_identifier(IdentifierKind::Resource, &rule_name)?;
        naming::validate_identifier(IdentifierKind::Resource, &logical_id)?;

        Ok(Self {
            stack_id: project.resource_name("stack"),
            environment: None,
            rule: ScheduleRuleDeclaration {
                rule_name,
                schedule: OFFICE_HOURS_SCHEDULE.to_string(),
                description: OFFICE_HOURS_DESCRIPTION.to_string(),
                target: FunctionTarget {
                    logical_id,
                    arn: arn.to_string(),
                    input: serde_json::json!({ "string": "value1" }),
                },
            },
        })
    }

    /// Replace the schedule; `expression` must be a `cron(..)` or `rate(..)` expression
    pub fn with_schedule(mut self, expression: &str, description: &str) -> Result<Self, PlanError> {
        let expression = expression.trim();
        if !SCHEDULE_PATTERN.is_match(expression) {
            return Err(PlanError::InvalidInput(format!(
                "'{}' is not a cron or rate expression",
                expression
            )));
        }
        self.rule.schedule = expression.to_string();
        self.rule.description = description.trim().to_string();
        Ok(self)
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.rule.target.input = input;
        self
    }

    pub fn with_environment(mut self, environment: StackEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
