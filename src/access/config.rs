//! Naming configuration for dispatcher units.
//!
//! # Example
//!
//! ```rust
//! use methodaccess::access::AccessConfig;
//!
//! let config = AccessConfig::default()
//!     .with_reserved_prefix("sys.")
//!     .with_private_namespace("accessors.");
//! assert!(config.is_reserved("sys.Clock"));
//! assert!(config.is_reserved("core.String"));
//! ```

use crate::runtime::ClassDef;

/// Default unit name suffix
pub const DEFAULT_SUFFIX: &str = "MethodAccess";
/// Default private namespace reserved names are moved into
pub const DEFAULT_PRIVATE_NAMESPACE: &str = "methodaccess.";
/// Default reserved namespace prefix
pub const DEFAULT_RESERVED_PREFIX: &str = "core.";

/// Controls how dispatcher units are named.
///
/// The unit name of a class is `<namespace>.<Name><suffix>`. Names that fall into a reserved
/// namespace (by default `core.`) are moved under the private namespace (by default
/// `methodaccess.`), so `core.String` is served by `methodaccess.core.StringMethodAccess`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessConfig {
    /// Namespace prefixes that units may not be defined in
    pub reserved_prefixes: Vec<String>,
    /// Prefix prepended to unit names falling into a reserved namespace
    pub private_namespace: String,
    /// Suffix appended to the class name
    pub suffix: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            reserved_prefixes: vec![DEFAULT_RESERVED_PREFIX.to_string()],
            private_namespace: DEFAULT_PRIVATE_NAMESPACE.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl AccessConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reserved namespace prefix.
    #[must_use]
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefixes.push(prefix.into());
        self
    }

    /// Sets the private namespace prefix.
    #[must_use]
    pub fn with_private_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.private_namespace = namespace.into();
        self
    }

    /// Sets the unit name suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Checks whether `name` falls into a reserved namespace
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Unit name of the dispatcher serving `class`
    #[must_use]
    pub fn unit_name(&self, class: &ClassDef) -> String {
        let name = format!("{}{}", class.fullname(), self.suffix);
        if self.is_reserved(&name) {
            format!("{}{}", self.private_namespace, name)
        } else {
            name
        }
    }
}
