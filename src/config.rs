//! Container configuration.
//!
//! With the `config` feature the settings can be loaded from JSON, e.g. as
//! part of an application's bootstrap configuration file.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::internal::circular::MAX_DEPTH;

/// Which nested failures an optional class-typed parameter may absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum OptionalFallback {
    /// Only a failure of the dependency itself: it is not instantiable, or
    /// one of its own primitive parameters is unresolvable. Failures raised
    /// further down its build chain propagate.
    #[default]
    DirectFailure,
    /// Any `NotInstantiable` or `UnresolvableDependency` raised anywhere
    /// while building the dependency.
    AnyFailure,
}

/// Tunables applied by [`Container::with_config`](crate::Container::with_config).
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{ContainerConfig, OptionalFallback};
///
/// let config = ContainerConfig::default();
/// assert_eq!(config.max_depth, 1024);
/// assert_eq!(config.optional_fallback, OptionalFallback::DirectFailure);
///
/// let broad = ContainerConfig::default().with_optional_fallback(OptionalFallback::AnyFailure);
/// assert_eq!(broad.optional_fallback, OptionalFallback::AnyFailure);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerConfig {
    /// Deepest chain of nested resolutions before `DepthExceeded`.
    pub max_depth: usize,
    pub optional_fallback: OptionalFallback,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            optional_fallback: OptionalFallback::default(),
        }
    }
}

impl ContainerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_optional_fallback(mut self, policy: OptionalFallback) -> Self {
        self.optional_fallback = policy;
        self
    }

    /// Parses a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(input: &str) -> crate::DiResult<Self> {
        serde_json::from_str(input).map_err(|e| crate::DiError::Config(e.to_string()))
    }
}
