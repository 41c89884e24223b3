//! Provider patch merging
//!
//! Fragments sharing a provider name patch one another in declaration order
//! using JSON Merge Patch. The output holds one config per provider name,
//! ordered by first appearance, with the built-in providers in front.

use crate::project::ProviderConfig;
use crate::value::merge_patch;
use crate::Result;
use serde_json::{Map, Value};

/// Providers every environment gets, in this order.
pub const BUILTIN_PROVIDERS: &[&str] = &["exec", "container"];

/// Merge the project's provider fragments for `environment`.
///
/// Built-ins are prepended as bare `{name}` entries unless the project
/// declares a provider of the same name, in which case the declared config
/// keeps its own position. Built-ins are never patched.
pub fn merge_provider_configs(
    fragments: &[ProviderConfig],
    environment: &str,
) -> Result<Vec<ProviderConfig>> {
    let mut groups: Vec<(String, Value)> = Vec::new();

    for fragment in fragments.iter().filter(|f| f.applies_to(environment)) {
        match groups.iter_mut().find(|(name, _)| *name == fragment.name) {
            Some((_, accumulated)) => {
                let current = std::mem::take(accumulated);
                *accumulated = merge_patch(current, fragment.to_value());
            }
            None => groups.push((
                fragment.name.clone(),
                merge_patch(Value::Object(Map::new()), fragment.to_value()),
            )),
        }
    }

    let mut merged: Vec<ProviderConfig> = BUILTIN_PROVIDERS
        .iter()
        .filter(|builtin| !groups.iter().any(|(name, _)| name == *builtin))
        .map(|builtin| ProviderConfig::new(*builtin))
        .collect();

    for (name, value) in groups {
        let config = ProviderConfig::from_value(value)?;
        tracing::debug!(provider = %name, environment, "Merged provider config");
        merged.push(config);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fragment(value: Value) -> ProviderConfig {
        ProviderConfig::from_value(value).unwrap()
    }

    fn names(configs: &[ProviderConfig]) -> Vec<&str> {
        configs.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_same_name_fragments_patch_each_other() {
        let fragments = vec![
            fragment(json!({"name": "p", "a": "a"})),
            fragment(json!({"name": "p", "b": "b"})),
            fragment(json!({"name": "p", "a": null})),
        ];
        let merged = merge_provider_configs(&fragments, "dev").unwrap();
        let p = merged.iter().find(|c| c.name == "p").unwrap();
        assert_eq!(p.to_value(), json!({"name": "p", "b": "b"}));
    }

    #[test]
    fn test_null_in_single_fragment_removes_key() {
        let fragments = vec![fragment(json!({"name": "p", "a": null, "b": {"c": null, "d": 1}}))];
        let merged = merge_provider_configs(&fragments, "dev").unwrap();
        assert_eq!(merged[2].to_value(), json!({"name": "p", "b": {"d": 1}}));
    }

    #[test]
    fn test_environment_filter() {
        let fragments = vec![
            fragment(json!({"name": "kube", "context": "local"})),
            fragment(json!({"name": "kube", "environments": ["prod"], "context": "gke"})),
            fragment(json!({"name": "dns", "environments": ["prod"]})),
        ];

        let dev = merge_provider_configs(&fragments, "dev").unwrap();
        assert_eq!(names(&dev), vec!["exec", "container", "kube"]);
        assert_eq!(dev[2].settings["context"], json!("local"));

        let prod = merge_provider_configs(&fragments, "prod").unwrap();
        assert_eq!(names(&prod), vec!["exec", "container", "kube", "dns"]);
        assert_eq!(prod[2].settings["context"], json!("gke"));
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let fragments = vec![
            fragment(json!({"name": "b"})),
            fragment(json!({"name": "a"})),
            fragment(json!({"name": "b", "x": 1})),
        ];
        let merged = merge_provider_configs(&fragments, "dev").unwrap();
        assert_eq!(names(&merged), vec!["exec", "container", "b", "a"]);
    }

    #[test]
    fn test_declared_builtin_is_not_duplicated() {
        let fragments = vec![
            fragment(json!({"name": "kube"})),
            fragment(json!({"name": "container", "registry": "r.example.com"})),
        ];
        let merged = merge_provider_configs(&fragments, "dev").unwrap();
        assert_eq!(names(&merged), vec!["exec", "kube", "container"]);
        assert_eq!(merged[2].settings["registry"], json!("r.example.com"));
    }

    #[test]
    fn test_inputs_untouched() {
        let fragments = vec![
            fragment(json!({"name": "p", "a": {"x": 1}})),
            fragment(json!({"name": "p", "a": {"y": 2}})),
        ];
        let before = fragments.clone();
        let merged = merge_provider_configs(&fragments, "dev").unwrap();
        assert_eq!(fragments, before);
        assert_eq!(merged[2].settings["a"], json!({"x": 1, "y": 2}));
    }
}
