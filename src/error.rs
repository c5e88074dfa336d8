//! Error types for the service container.

use thiserror::Error;

/// Container errors
///
/// Every resolution failure surfaces synchronously to the caller of `make`,
/// `call` or `get`. Errors raised while constructing a type carry the build
/// chain that was active at the point of failure so the message can name
/// every enclosing concrete.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, DiError};
///
/// let container = Container::new();
/// match container.get("mailer") {
///     Err(DiError::NotFound(key)) => assert_eq!(key, "mailer"),
///     _ => unreachable!(),
/// }
///
/// let err = DiError::NotInstantiable {
///     target: "Cache".to_string(),
///     chain: vec!["Controller".to_string(), "Repository".to_string()],
/// };
/// assert_eq!(
///     err.to_string(),
///     "Target [Cache] is not instantiable while building [Controller, Repository]."
/// );
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Target cannot be constructed: an interface or unknown name with no
    /// binding, or a type that declares no construct function.
    #[error("{}", not_instantiable_message(.target, .chain))]
    NotInstantiable {
        target: String,
        chain: Vec<String>,
    },
    /// A parameter has no class type, no contextual override and no default.
    #[error("Unresolvable dependency resolving [${parameter}] in class {declaring}")]
    UnresolvableDependency {
        parameter: String,
        declaring: String,
        chain: Vec<String>,
    },
    /// Construction code asked for an argument that was never declared.
    #[error("Argument [${argument}] was not resolved for {owner}")]
    MissingArgument {
        argument: String,
        owner: String,
    },
    /// An alias resolves back onto itself.
    #[error("[{0}] is aliased to itself.")]
    SelfAlias(String),
    /// Entry accessor found no binding, instance or alias for the key.
    #[error("Service not found: {0}")]
    NotFound(String),
    /// A resolved value could not be downcast to the requested type.
    #[error("Type mismatch for [{target}]: expected {expected}")]
    TypeMismatch {
        target: String,
        expected: &'static str,
    },
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A `Class` call target had neither `@method` nor a default method.
    #[error("Method not provided for [{0}].")]
    MethodNotProvided(String),
    /// The class descriptor declares no such method.
    #[error("Method [{class}@{method}] does not exist.")]
    UnknownMethod {
        class: String,
        method: String,
    },
    /// A user factory or construct function reported a failure.
    #[error("Factory failed: {0}")]
    Factory(String),
    /// Container configuration could not be loaded.
    #[error("Invalid container configuration: {0}")]
    Config(String),
}

fn not_instantiable_message(target: &str, chain: &[String]) -> String {
    if chain.is_empty() {
        format!("Target [{}] is not instantiable.", target)
    } else {
        format!(
            "Target [{}] is not instantiable while building [{}].",
            target,
            chain.join(", ")
        )
    }
}

impl DiError {
    /// Wraps an arbitrary failure raised by user construction code.
    pub fn factory(message: impl std::fmt::Display) -> Self {
        DiError::Factory(message.to_string())
    }

    /// Shorthand for a failed downcast to `T`.
    pub fn type_mismatch<T: ?Sized>(target: impl Into<String>) -> Self {
        DiError::TypeMismatch {
            target: target.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Build chain active when a construction failure was raised.
    pub fn chain(&self) -> Option<&[String]> {
        match self {
            DiError::NotInstantiable { chain, .. } => Some(chain),
            DiError::UnresolvableDependency { chain, .. } => Some(chain),
            _ => None,
        }
    }

    /// True for the two errors optional dependencies may absorb.
    pub fn is_binding_failure(&self) -> bool {
        matches!(
            self,
            DiError::NotInstantiable { .. } | DiError::UnresolvableDependency { .. }
        )
    }

    /// Re-roots a binding failure raised by user code running for `frame`,
    /// so its chain reads as nested below `stack` and `frame`.
    pub(crate) fn nested_under(self, stack: &[String], frame: &str) -> Self {
        let reroot = |chain: Vec<String>| {
            let mut rooted = stack.to_vec();
            rooted.push(frame.to_string());
            rooted.extend(chain.strip_prefix(stack).unwrap_or(&chain[..]).iter().cloned());
            rooted
        };
        match self {
            DiError::NotInstantiable { target, chain } => DiError::NotInstantiable {
                target,
                chain: reroot(chain),
            },
            DiError::UnresolvableDependency {
                parameter,
                declaring,
                chain,
            } => DiError::UnresolvableDependency {
                parameter,
                declaring,
                chain: reroot(chain),
            },
            other => other,
        }
    }

    /// Build-stack depth of the frame that actually failed.
    ///
    /// A non-instantiable target would have been pushed one frame above the
    /// recorded chain; an unresolvable parameter belongs to the top frame.
    pub(crate) fn failure_depth(&self) -> Option<usize> {
        match self {
            DiError::NotInstantiable { chain, .. } => Some(chain.len() + 1),
            DiError::UnresolvableDependency { chain, .. } => Some(chain.len()),
            _ => None,
        }
    }
}

/// Result type for container operations
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{DiResult, DiError};
///
/// fn lookup() -> DiResult<()> {
///     Err(DiError::NotFound("router".to_string()))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
