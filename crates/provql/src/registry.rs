//! Static registry of named query plugins.
//!
//! Query capabilities are registered once at process start as
//! [`Resolver`] handlers keyed by name; duplicate names are rejected and
//! there is no runtime code injection. Hosts resolve a plugin by name and
//! hand the JSON result to their transport layer.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::config::ApiConfig;
use crate::filter::FILTER_GRAMMAR;
use crate::schema::closest_match;

/// An error produced by a plugin handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PluginError {
    /// Human-readable failure description.
    pub message: String,
}

impl PluginError {
    /// Creates a plugin error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        PluginError {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the registry itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A plugin with this name is already registered.
    #[error("duplicate plugin name '{name}'")]
    DuplicateName {
        /// The contested name.
        name: String,
    },

    /// The empty string is not a valid plugin name.
    #[error("plugin name must not be empty")]
    EmptyName,

    /// No plugin is registered under this name.
    #[error("unknown plugin '{name}'{}", .suggestion.as_ref().map(|s| format!(". Did you mean '{s}'?")).unwrap_or_default())]
    UnknownPlugin {
        /// The requested name.
        name: String,
        /// Closest registered name, if one is within edit distance.
        suggestion: Option<String>,
    },

    /// The plugin handler failed.
    #[error("plugin '{name}': {source}")]
    Plugin {
        /// The plugin that failed.
        name: String,
        /// The handler's error.
        source: PluginError,
    },
}

/// A named query capability.
///
/// Blanket-implemented for any matching `Fn`, so plain functions and
/// closures register directly.
pub trait Resolver: Send + Sync {
    /// Resolves the capability against the given configuration and
    /// request arguments.
    fn resolve(
        &self,
        config: &ApiConfig,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, PluginError>;
}

impl<F> Resolver for F
where
    F: Fn(&ApiConfig, &serde_json::Value) -> Result<serde_json::Value, PluginError>
        + Send
        + Sync,
{
    fn resolve(
        &self,
        config: &ApiConfig,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, PluginError> {
        self(config, args)
    }
}

/// Resolves the configured row-count ceiling.
fn resolve_row_limit_max(
    config: &ApiConfig,
    _args: &serde_json::Value,
) -> Result<serde_json::Value, PluginError> {
    Ok(serde_json::json!(config.entity_limit))
}

/// Resolves the crate version.
fn resolve_api_version(
    _config: &ApiConfig,
    _args: &serde_json::Value,
) -> Result<serde_json::Value, PluginError> {
    Ok(serde_json::json!(env!("CARGO_PKG_VERSION")))
}

/// Resolves the canonical filter grammar text.
fn resolve_filter_grammar(
    _config: &ApiConfig,
    _args: &serde_json::Value,
) -> Result<serde_json::Value, PluginError> {
    Ok(serde_json::Value::String(FILTER_GRAMMAR.to_string()))
}

/// Name → handler mapping, populated at process start.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Resolver>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in diagnostic
    /// plugins:
    ///
    /// - `row_limit_max`: the configured row-count ceiling
    /// - `api_version`: the crate version
    /// - `filter_grammar`: the canonical filter grammar text
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert("row_limit_max", resolve_row_limit_max);
        registry.insert("api_version", resolve_api_version);
        registry.insert("filter_grammar", resolve_filter_grammar);
        registry
    }

    /// Inserts a built-in without the duplicate check; the fixed names
    /// cannot collide.
    fn insert(&mut self, name: &str, resolver: impl Resolver + 'static) {
        self.plugins.insert(name.to_string(), Box::new(resolver));
    }

    /// Registers a plugin under a unique name.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is empty or already taken; the
    /// existing handler is left untouched.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        resolver: impl Resolver + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        self.plugins.insert(name, Box::new(resolver));
        Ok(())
    }

    /// Resolves a plugin by name.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown name (with a closest-match
    /// suggestion) or when the handler itself fails.
    pub fn resolve(
        &self,
        name: &str,
        config: &ApiConfig,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, RegistryError> {
        let resolver = self
            .plugins
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPlugin {
                name: name.to_string(),
                suggestion: closest_match(name, self.plugins.keys().map(String::as_str)),
            })?;
        resolver
            .resolve(config, args)
            .map_err(|source| RegistryError::Plugin {
                name: name.to_string(),
                source,
            })
    }

    /// The registered plugin names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Whether a plugin is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// The number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
