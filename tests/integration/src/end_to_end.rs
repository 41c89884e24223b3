//! End-to-end tests: project on disk -> environment -> resolved providers.

use async_trait::async_trait;
use orca_config::{
    ConfigSchema, Field, LocalContext, ProjectConfig, pick_environment, resolve_project_config,
};
use orca_fs::{ConfigStore, NormalizedPath};
use orca_providers::{
    ConfigureProviderParams, ConfigureProviderResult, EnvironmentStatus, EnvironmentStatusParams,
    ErrorKind, Plugin, PluginRegistry, ProviderResolver, ResolutionContext, Result,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const PROJECT: &str = r#"
name = "shop"
defaultEnvironment = "dev"
varfile = "shared.yml"

[variables]
region = "${local.env.REGION}"
tier = "base"

[[environments]]
name = "dev"

[environments.variables]
tier = "dev"

[[environments.providers]]
name = "gke"
cluster = "dev-cluster"

[[environments]]
name = "prod"
namespacing = "disabled"
production = true
varfile = "prod.yml"

[[environments.providers]]
name = "gke"
cluster = "prod-cluster"

[[providers]]
name = "app"
endpoint = "${providers.gke.outputs.endpoint}"
region = "${var.region}"
"#;

/// Base plugin describing the keys every cloud cluster provider shares.
struct CloudPlugin {
    schema: ConfigSchema,
}

#[async_trait]
impl Plugin for CloudPlugin {
    fn name(&self) -> &str {
        "cloud"
    }

    fn config_schema(&self) -> Option<&ConfigSchema> {
        Some(&self.schema)
    }
}

/// Concrete cluster provider built on `cloud`.
struct GkePlugin;

#[async_trait]
impl Plugin for GkePlugin {
    fn name(&self) -> &str {
        "gke"
    }

    fn base(&self) -> Option<&str> {
        Some("cloud")
    }

    async fn get_environment_status(
        &self,
        params: EnvironmentStatusParams<'_>,
    ) -> Result<EnvironmentStatus> {
        let cluster = params.config["cluster"].as_str().unwrap_or_default();
        Ok(EnvironmentStatus::ready()
            .with_output("endpoint", json!(format!("https://{cluster}.example.com")))
            .with_dashboard_page("Console", format!("https://console.example.com/{cluster}")))
    }
}

/// Application provider requiring some cloud cluster.
struct AppPlugin;

#[async_trait]
impl Plugin for AppPlugin {
    fn name(&self) -> &str {
        "app"
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["cloud".to_string()]
    }

    async fn configure_provider(
        &self,
        params: ConfigureProviderParams<'_>,
    ) -> Result<ConfigureProviderResult> {
        let mut config = params.config.clone();
        config["deployedBy"] = json!(params.project_name);
        Ok(ConfigureProviderResult {
            config,
            module_configs: vec![json!({"name": "app-module", "environment": params.environment_name})],
        })
    }
}

fn plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(CloudPlugin {
            schema: ConfigSchema::provider()
                .field("cluster", Field::string().required())
                .field("zone", Field::string().default_value(json!("europe-west1-b"))),
        }),
        Arc::new(GkePlugin),
        Arc::new(AppPlugin),
    ]
}

fn write_project(temp: &TempDir) {
    fs::write(temp.path().join("orca.toml"), PROJECT).unwrap();
    fs::write(temp.path().join("shared.yml"), "owner: platform\ntier: shared\n").unwrap();
    fs::write(temp.path().join("orca.dev.env"), "DEBUG=true\n").unwrap();
    fs::write(temp.path().join("prod.yml"), "replicas: 3\n").unwrap();
}

fn load(temp: &TempDir) -> ProjectConfig {
    let root = NormalizedPath::new(temp.path());
    let raw: Value = ConfigStore::new()
        .load_value(&root.join("orca.toml"))
        .unwrap();
    let local = LocalContext::new(
        BTreeMap::from([("REGION".to_string(), "eu".to_string())]),
        "linux",
    );
    resolve_project_config(&raw, &root, &local).unwrap()
}

#[test]
fn test_project_config_normalized() {
    let temp = TempDir::new().unwrap();
    write_project(&temp);
    let project = load(&temp);

    assert_eq!(project.default_environment, "dev");
    assert_eq!(project.variables["region"], json!("eu"));

    let providers: Vec<(&str, Option<Vec<String>>)> = project
        .providers
        .iter()
        .map(|p| (p.name.as_str(), p.environments.clone()))
        .collect();
    assert_eq!(
        providers,
        vec![
            ("app", None),
            ("gke", Some(vec!["dev".to_string()])),
            ("gke", Some(vec!["prod".to_string()])),
        ]
    );
}

#[test]
fn test_environment_variables_layered() {
    let temp = TempDir::new().unwrap();
    write_project(&temp);
    let project = load(&temp);

    let dev = pick_environment(&project, "alice.dev").unwrap();
    assert_eq!(
        Value::Object(dev.variables),
        json!({"region": "eu", "tier": "dev", "owner": "platform", "DEBUG": "true"})
    );

    let prod = pick_environment(&project, "prod").unwrap();
    assert!(prod.production);
    assert_eq!(prod.variables["replicas"], json!(3));
    assert_eq!(prod.variables["tier"], json!("shared"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_providers_resolved_end_to_end() {
    let temp = TempDir::new().unwrap();
    write_project(&temp);
    let project = load(&temp);
    let environment = pick_environment(&project, "prod").unwrap();
    let registry = Arc::new(PluginRegistry::with_builtins(plugins()).unwrap());

    let resolver = ProviderResolver::new(ResolutionContext::new(&project, environment, registry));
    let providers = resolver.resolve_all().await.unwrap();

    let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["exec", "container", "app", "gke"]);

    let gke = &providers[3];
    assert_eq!(gke.config["cluster"], json!("prod-cluster"));
    assert_eq!(gke.config["zone"], json!("europe-west1-b"));
    assert_eq!(gke.status.dashboard_pages[0].title, "Console");

    let app = &providers[2];
    assert_eq!(app.config["endpoint"], json!("https://prod-cluster.example.com"));
    assert_eq!(app.config["region"], json!("eu"));
    assert_eq!(app.config["deployedBy"], json!("shop"));
    assert_eq!(app.module_configs[0]["environment"], json!("prod"));
    assert!(Arc::ptr_eq(&app.dependencies[0], gke));
}

#[tokio::test]
async fn test_missing_cluster_provider_fails() {
    let temp = TempDir::new().unwrap();
    write_project(&temp);
    let mut project = load(&temp);
    project.providers.retain(|p| p.name != "gke");

    let environment = pick_environment(&project, "dev").unwrap();
    let registry = Arc::new(PluginRegistry::with_builtins(plugins()).unwrap());
    let resolver = ProviderResolver::new(ResolutionContext::new(&project, environment, registry));

    let err = resolver.resolve("app").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("'cloud'"), "{err}");
    assert!(err.to_string().contains("'app'"), "{err}");
}

#[test]
fn test_explicit_varfile_missing() {
    let temp = TempDir::new().unwrap();
    write_project(&temp);
    fs::remove_file(temp.path().join("prod.yml")).unwrap();
    let project = load(&temp);

    let err = pick_environment(&project, "prod").unwrap_err();
    assert!(err.to_string().starts_with("Could not find varfile at path '"));
    assert!(err.to_string().ends_with("prod.yml'"));
}
