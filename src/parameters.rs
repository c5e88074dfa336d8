//! Named parameter overrides and resolved argument lists.

use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// Marker stored as the default of a nullable class parameter.
///
/// [`Arguments::get_optional`] maps it to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Null;

/// Caller-supplied named arguments for one resolution.
///
/// Each `make_with` / `call` pushes one frame; only the innermost frame is
/// visible while parameters are resolved. A matching entry is used verbatim,
/// without further resolution or type checks.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::Parameters;
///
/// let params = Parameters::new()
///     .with("timeout", 30u64)
///     .with("host", "localhost".to_string());
///
/// assert_eq!(params.len(), 2);
/// assert!(params.contains("timeout"));
/// assert_eq!(params.get_as::<u64>("timeout").map(|v| *v), Some(30));
/// ```
#[derive(Clone, Default)]
pub struct Parameters {
    values: Vec<(String, AnyArc)>,
}

impl Parameters {
    /// Creates an empty parameter frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, wrapping it in an `Arc`.
    pub fn with<T: Send + Sync + 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_arc(name, Arc::new(value))
    }

    /// Adds an already type-erased value, e.g. a previously resolved service.
    pub fn with_arc(mut self, name: impl Into<String>, value: AnyArc) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: AnyArc) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnyArc> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Typed lookup; `None` when missing or of another type.
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).cloned().and_then(|v| v.downcast::<T>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyArc)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter().map(|(n, _)| n)).finish()
    }
}

/// Resolved argument list handed to a construct function or method.
///
/// Values are stored in declaration order and addressed by parameter name.
/// Call-site parameters that matched no declared parameter are kept as
/// extras, in the order they were supplied.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Constructor, Parameter};
/// use std::sync::Arc;
///
/// struct Pool { size: u32 }
///
/// let container = Container::new();
/// container.register_type(
///     Constructor::of::<Pool>()
///         .param(Parameter::primitive("size").default(8u32))
///         .construct(|args| Ok(Pool { size: args.get_cloned::<u32>("size")? })),
/// );
///
/// let pool: Arc<Pool> = container.make_as(&ferrous_container::key_of::<Pool>()).unwrap();
/// assert_eq!(pool.size, 8);
/// ```
#[derive(Clone)]
pub struct Arguments {
    owner: String,
    values: Vec<(String, AnyArc)>,
    extra: Vec<(String, AnyArc)>,
}

impl Arguments {
    pub(crate) fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            values: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: AnyArc) {
        self.values.push((name.into(), value));
    }

    pub(crate) fn push_extra(&mut self, name: impl Into<String>, value: AnyArc) {
        self.extra.push((name.into(), value));
    }

    /// Name of the type or callable these arguments were resolved for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Raw type-erased value.
    pub fn raw(&self, name: &str) -> Option<&AnyArc> {
        self.values
            .iter()
            .chain(self.extra.iter())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn require(&self, name: &str) -> DiResult<&AnyArc> {
        self.raw(name).ok_or_else(|| DiError::MissingArgument {
            argument: name.to_string(),
            owner: self.owner.clone(),
        })
    }

    /// Downcasts the named argument to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.require(name)?
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(format!("{}::${}", self.owner, name)))
    }

    /// Clones the named argument out of its `Arc`.
    pub fn get_cloned<T: Clone + Send + Sync + 'static>(&self, name: &str) -> DiResult<T> {
        self.get::<T>(name).map(|v| (*v).clone())
    }

    /// Resolves a trait-object argument stored as `Arc<Arc<dyn Trait>>`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.require(name)?
            .clone()
            .downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::type_mismatch::<T>(format!("{}::${}", self.owner, name)))
    }

    /// Like [`get`](Self::get), but yields `None` for a [`Null`] default.
    pub fn get_optional<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        let value = self.require(name)?;
        if value.is::<Null>() {
            return Ok(None);
        }
        self.get::<T>(name).map(Some)
    }

    /// Call-site parameters that matched no declared parameter.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &AnyArc)> {
        self.extra.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of declared arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyArc)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("values", &self.values.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("extra", &self.extra.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

/// Downcasts a resolved service.
pub(crate) fn downcast<T: Send + Sync + 'static>(key: &str, value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::type_mismatch::<T>(key))
}

/// Downcasts a trait-object service stored as `Arc<Arc<dyn Trait>>`.
pub(crate) fn downcast_trait<T: ?Sized + Send + Sync + 'static>(
    key: &str,
    value: AnyArc,
) -> DiResult<Arc<T>> {
    value
        .downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::type_mismatch::<T>(key))
}
