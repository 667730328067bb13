//! Immutable component lookup table
//!
//! The set of known components is fixed at startup: built through the
//! builder, or loaded from a TOML manifest. Composition never mutates it, so
//! a registry can be shared freely across documents and threads.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Namespace prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "pl";

/// Errors that can occur while building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate component '{name}'")]
    DuplicateComponent { name: String },

    #[error("'{name}' is reserved and cannot be a component name")]
    ReservedName { name: String },

    #[error("failed to read component manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse component manifest: {0}")]
    Manifest(#[from] toml::de::Error),
}

/// Immutable mapping from component names to fragment template paths.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    prefix: String,
    components: IndexMap<String, Option<String>>,
}

impl ComponentRegistry {
    pub fn builder() -> ComponentRegistryBuilder {
        ComponentRegistryBuilder::default()
    }

    /// Load a registry from a TOML manifest file.
    ///
    /// ```toml
    /// prefix = "pl"
    /// components = ["button", "collapsible"]
    ///
    /// [templates]
    /// alert = "components/alert"
    /// ```
    ///
    /// Names under `components` use the derived template path; entries under
    /// `templates` override it (and register the component if not listed).
    pub fn from_manifest_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_manifest_str(&text)
    }

    pub fn from_manifest_str(text: &str) -> Result<Self, RegistryError> {
        let manifest: TomlManifest = toml::from_str(text)?;

        let mut builder = Self::builder();
        if let Some(prefix) = manifest.prefix {
            builder = builder.prefix(prefix);
        }
        for name in manifest.components.unwrap_or_default() {
            builder = builder.component(name);
        }
        for (name, template) in manifest.templates.unwrap_or_default() {
            builder = builder.component_with_template(name, template);
        }
        builder.build()
    }

    /// The directive namespace prefix, e.g. `pl` in `<pl:alert>`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|name| name.as_str())
    }

    /// Template path for a registered component: the explicit override if one
    /// was given, else the derived default `{prefix}/{name}/{name}`.
    pub fn template_path(&self, name: &str) -> Option<String> {
        let template = self.components.get(name)?;
        Some(match template {
            Some(path) => path.clone(),
            None => format!("{0}/{1}/{1}", self.prefix, name),
        })
    }

    /// The registered component a strictly valid invocation tag addresses.
    ///
    /// Only the exact `prefix:name` form qualifies; the lookalike
    /// `prefix-name` convention used by web components does not.
    pub fn component_for_tag(&self, tag: &str) -> Option<&str> {
        let local = tag.strip_prefix(&self.prefix)?.strip_prefix(':')?;
        self.components.get_key_value(local).map(|(name, _)| name.as_str())
    }

    /// Whether a tag name superficially addresses a registered component.
    ///
    /// Matches both `prefix:name` and `prefix-name`: the latter must still be
    /// picked up by the scan so strict validation can pass it through
    /// untouched instead of treating it as plain markup to descend into.
    pub fn matches_invocation(&self, tag: &str) -> bool {
        let Some(rest) = tag.strip_prefix(&self.prefix) else {
            return false;
        };
        match rest.as_bytes().first() {
            Some(b':') | Some(b'-') => self.is_registered(&rest[1..]),
            _ => false,
        }
    }
}

/// Collects components before freezing them into a registry.
#[derive(Debug, Default)]
pub struct ComponentRegistryBuilder {
    prefix: Option<String>,
    components: Vec<(String, Option<String>)>,
}

impl ComponentRegistryBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Register a component under the derived template path.
    pub fn component(mut self, name: impl Into<String>) -> Self {
        self.components.push((name.into(), None));
        self
    }

    /// Register a component with an explicit template path.
    pub fn component_with_template(
        mut self,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.components.push((name.into(), Some(template.into())));
        self
    }

    pub fn build(self) -> Result<ComponentRegistry, RegistryError> {
        let mut components = IndexMap::new();
        for (name, template) in self.components {
            // `slot` is the placeholder element and `block` the inert
            // wrapper; registering either would shadow the engine's own tags.
            if name == "slot" || name == "block" {
                return Err(RegistryError::ReservedName { name });
            }
            if components.contains_key(&name) {
                return Err(RegistryError::DuplicateComponent { name });
            }
            components.insert(name, template);
        }
        Ok(ComponentRegistry {
            prefix: self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            components,
        })
    }
}

#[derive(Deserialize)]
struct TomlManifest {
    prefix: Option<String>,
    components: Option<Vec<String>>,
    templates: Option<IndexMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = ComponentRegistry::builder()
            .component("alert")
            .build()
            .expect("should build");
        assert!(registry.is_registered("alert"));
        assert!(!registry.is_registered("button"));
    }

    #[test]
    fn test_duplicate_component_error() {
        let result = ComponentRegistry::builder()
            .component("alert")
            .component_with_template("alert", "x/alert")
            .build();
        assert!(matches!(result, Err(RegistryError::DuplicateComponent { name }) if name == "alert"));
    }

    #[test]
    fn test_derived_template_path() {
        let registry = ComponentRegistry::builder().component("alert").build().unwrap();
        assert_eq!(registry.template_path("alert").as_deref(), Some("pl/alert/alert"));
    }

    #[test]
    fn test_explicit_template_path_override() {
        let registry = ComponentRegistry::builder()
            .component_with_template("alert", "shared/alert")
            .build()
            .unwrap();
        assert_eq!(registry.template_path("alert").as_deref(), Some("shared/alert"));
    }

    #[test]
    fn test_component_for_tag_requires_exact_namespace_form() {
        let registry = ComponentRegistry::builder().component("alert").build().unwrap();
        assert_eq!(registry.component_for_tag("pl:alert"), Some("alert"));
        assert_eq!(registry.component_for_tag("pl-alert"), None);
        assert_eq!(registry.component_for_tag("pl:button"), None);
        assert_eq!(registry.component_for_tag("div"), None);
    }

    #[test]
    fn test_matches_invocation_covers_the_lookalike_form() {
        let registry = ComponentRegistry::builder().component("alert").build().unwrap();
        assert!(registry.matches_invocation("pl:alert"));
        assert!(registry.matches_invocation("pl-alert"));
        assert!(!registry.matches_invocation("pl:button"));
        assert!(!registry.matches_invocation("plain"));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let result = ComponentRegistry::builder().component("slot").build();
        assert!(matches!(result, Err(RegistryError::ReservedName { name }) if name == "slot"));
        let result = ComponentRegistry::builder().component("block").build();
        assert!(matches!(result, Err(RegistryError::ReservedName { .. })));
    }

    #[test]
    fn test_custom_prefix() {
        let registry = ComponentRegistry::builder()
            .prefix("ui")
            .component("card")
            .build()
            .unwrap();
        assert_eq!(registry.template_path("card").as_deref(), Some("ui/card/card"));
        assert!(registry.matches_invocation("ui:card"));
        assert!(!registry.matches_invocation("pl:card"));
    }

    #[test]
    fn test_manifest_round_trip() {
        let manifest = r#"
            prefix = "pl"
            components = ["button", "collapsible"]

            [templates]
            alert = "components/alert"
        "#;
        let registry = ComponentRegistry::from_manifest_str(manifest).expect("should load");
        assert!(registry.is_registered("button"));
        assert!(registry.is_registered("collapsible"));
        assert_eq!(registry.template_path("alert").as_deref(), Some("components/alert"));
        assert_eq!(registry.template_path("button").as_deref(), Some("pl/button/button"));
    }

    #[test]
    fn test_manifest_duplicate_is_an_error() {
        let manifest = r#"
            components = ["alert"]

            [templates]
            alert = "components/alert"
        "#;
        let result = ComponentRegistry::from_manifest_str(manifest);
        assert!(matches!(result, Err(RegistryError::DuplicateComponent { .. })));
    }
}
