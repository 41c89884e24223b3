//! Built-in plugins
//!
//! Every environment gets an `exec` and a `container` provider. Neither
//! touches the machine during resolution; both report ready.

use crate::Result;
use crate::plugin::{EnvironmentStatus, EnvironmentStatusParams, Plugin};
use async_trait::async_trait;
use orca_config::{ConfigSchema, Field};
use serde_json::Value;
use std::sync::Arc;

/// Runs local commands.
pub struct ExecPlugin {
    schema: ConfigSchema,
}

impl ExecPlugin {
    pub fn new() -> Self {
        Self {
            schema: ConfigSchema::provider().field("initScript", Field::string()),
        }
    }
}

impl Default for ExecPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ExecPlugin {
    fn name(&self) -> &str {
        "exec"
    }

    fn config_schema(&self) -> Option<&ConfigSchema> {
        Some(&self.schema)
    }
}

/// Builds container images, optionally pushing to a deployment registry.
pub struct ContainerPlugin {
    schema: ConfigSchema,
}

impl ContainerPlugin {
    pub fn new() -> Self {
        let registry = ConfigSchema::new()
            .field("hostname", Field::string().required())
            .field("namespace", Field::string().default_value(Value::from("_")));
        Self {
            schema: ConfigSchema::provider().field("deploymentRegistry", Field::object(registry)),
        }
    }
}

impl Default for ContainerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ContainerPlugin {
    fn name(&self) -> &str {
        "container"
    }

    fn config_schema(&self) -> Option<&ConfigSchema> {
        Some(&self.schema)
    }

    async fn get_environment_status(
        &self,
        params: EnvironmentStatusParams<'_>,
    ) -> Result<EnvironmentStatus> {
        let mut status = EnvironmentStatus::ready();
        if let Some(registry) = params.config.get("deploymentRegistry") {
            status = status.with_output("deploymentRegistry", registry.clone());
        }
        Ok(status)
    }
}

/// The built-in plugins, in the order their providers are prepended.
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![Arc::new(ExecPlugin::new()), Arc::new(ContainerPlugin::new())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_config::BUILTIN_PROVIDERS;
    use serde_json::json;

    #[test]
    fn test_builtin_names_match_prepended_providers() {
        let names: Vec<String> = builtin_plugins()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, BUILTIN_PROVIDERS);
    }

    #[test]
    fn test_container_schema_defaults_namespace() {
        let plugin = ContainerPlugin::new();
        let validated = plugin
            .config_schema()
            .unwrap()
            .validate(
                &json!({"name": "container", "deploymentRegistry": {"hostname": "r.io"}}),
                "provider container",
                false,
            )
            .unwrap();
        assert_eq!(validated["deploymentRegistry"]["namespace"], json!("_"));
    }

    #[test]
    fn test_exec_rejects_unknown_keys() {
        let plugin = ExecPlugin::new();
        let err = plugin
            .config_schema()
            .unwrap()
            .validate(&json!({"name": "exec", "bogus": 1}), "provider exec", false)
            .unwrap_err();
        assert!(err.to_string().contains("key .bogus is not allowed"), "{err}");
    }

    #[tokio::test]
    async fn test_container_exposes_registry_output() {
        let plugin = ContainerPlugin::new();
        let config = json!({"name": "container", "deploymentRegistry": {"hostname": "r.io", "namespace": "x"}});
        let status = plugin
            .get_environment_status(EnvironmentStatusParams {
                provider_name: "container",
                config: &config,
                environment_name: "dev",
                namespace: None,
            })
            .await
            .unwrap();
        assert!(status.ready);
        assert_eq!(status.outputs["deploymentRegistry"]["hostname"], json!("r.io"));
    }
}
