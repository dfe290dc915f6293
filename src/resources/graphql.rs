//! GraphQL API stack: an API and the schema attached to it

use super::StackOutput;
use crate::core::{config::StackEnvironment, error::PlanError, identity::ProjectIdentity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How clients authenticate against the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    #[default]
    ApiKey,
    AwsIam,
    AmazonCognitoUserPools,
    OpenidConnect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlApiDeclaration {
    pub logical_id: String,
    pub name: String,
    pub authentication_type: AuthenticationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub logical_id: String,
    /// Reference to the id the provider assigns the API
    pub api_id: String,
    /// SDL source of the schema
    pub definition: String,
}

/// Every resource the GraphQL API stack declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlApiManifest {
    pub stack_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<StackEnvironment>,

    pub api: GraphqlApiDeclaration,
    pub schema: SchemaDeclaration,
    pub outputs: Vec<StackOutput>,
}

impl GraphqlApiManifest {
    /// Declare `{Project}Api` with `definition` as its schema
    pub fn new(project: &ProjectIdentity, definition: impl Into<String>) -> Result<Self, PlanError> {
        let definition = definition.into();
        if definition.trim().is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "schema for '{}' has an empty definition",
                project.name
            )));
        }

        let api_logical_id = project.resource_name("api");
        let api = GraphqlApiDeclaration {
            name: api_logical_id.clone(),
            logical_id: api_logical_id,
            authentication_type: AuthenticationType::default(),
        };
        let schema = SchemaDeclaration {
            logical_id: project.resource_name("schema"),
            api_id: attribute(&api.logical_id, "ApiId"),
            definition,
        };

        let mut manifest = Self {
            stack_id: project.resource_name("stack"),
            environment: None,
            api,
            schema,
            outputs: Vec::new(),
        };
        manifest.outputs = manifest.collect_outputs();
        Ok(manifest)
    }

    /// Declare the API with the schema read from a `.graphql` file
    pub fn from_schema_file<P: AsRef<Path>>(project: &ProjectIdentity, path: P) -> Result<Self> {
        let path = path.as_ref();
        let definition = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display()))?;
        Ok(Self::new(project, definition)?)
    }

    pub fn with_authentication(mut self, authentication_type: AuthenticationType) -> Self {
        self.api.authentication_type = authentication_type;
        self
    }

    pub fn with_environment(mut self, environment: StackEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    fn collect_outputs(&self) -> Vec<StackOutput> {
        [
            ("ApiAttrApiId", attribute(&self.api.logical_id, "ApiId")),
            ("ApiLogicalId", self.api.logical_id.clone()),
            ("ApiName", self.api.name.clone()),
            ("SchemaApiId", self.schema.api_id.clone()),
            ("SchemaLogicalId", self.schema.logical_id.clone()),
        ]
        .into_iter()
        .map(|(key, value)| StackOutput {
            key: key.to_string(),
            value,
        })
        .collect()
    }

    /// Look up an output by key
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.iter().find(|o| o.key == key).map(|o| o.value.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `Logical.Attribute`, resolved by the provider at deploy time
fn attribute(logical_id: &str, name: &str) -> String {
    format!("{}.{}", logical_id, name)
}
