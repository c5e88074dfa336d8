//! Construction recipes.

use std::fmt;
use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::DiResult;
use crate::parameters::Parameters;
use crate::registration::{AnyArc, FactoryFn};

/// What a binding or contextual override produces an instance from.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, ConcreteKind};
///
/// let by_name: Concrete = "FileCache".into();
/// assert_eq!(by_name.kind(), ConcreteKind::Type);
///
/// let by_value = Concrete::value(42u32);
/// assert_eq!(by_value.kind(), ConcreteKind::Instance);
///
/// let by_factory = Concrete::factory(|_, _| Ok("built".to_string()));
/// assert_eq!(by_factory.kind(), ConcreteKind::Factory);
/// ```
#[derive(Clone)]
pub enum Concrete {
    /// Invoked with the active resolution context and parameter frame.
    Factory(FactoryFn),
    /// A type to build from its registered constructor, or another key to
    /// resolve when the name differs from the key being bound.
    Type(String),
    /// A prebuilt value handed out as is.
    Instance(AnyArc),
}

/// Discriminant of [`Concrete`], kept for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcreteKind {
    Factory,
    Type,
    Instance,
}

impl Concrete {
    /// Factory returning a typed value; the container wraps it in an `Arc`.
    pub fn factory<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ResolverContext<'_>, &Parameters) -> DiResult<T> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(move |ctx: &mut ResolverContext<'_>, params: &Parameters| {
            Ok(Arc::new(f(ctx, params)?) as AnyArc)
        }))
    }

    /// Factory returning an already type-erased instance.
    pub fn factory_any<F>(f: F) -> Self
    where
        F: Fn(&mut ResolverContext<'_>, &Parameters) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(f))
    }

    /// Prebuilt value.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Concrete::Instance(Arc::new(value))
    }

    /// Type named by a Rust type.
    pub fn type_of<T: ?Sized + 'static>() -> Self {
        Concrete::Type(crate::key::key_of::<T>())
    }

    pub fn kind(&self) -> ConcreteKind {
        match self {
            Concrete::Factory(_) => ConcreteKind::Factory,
            Concrete::Type(_) => ConcreteKind::Type,
            Concrete::Instance(_) => ConcreteKind::Instance,
        }
    }
}

impl From<&str> for Concrete {
    fn from(name: &str) -> Self {
        Concrete::Type(name.to_string())
    }
}

impl From<String> for Concrete {
    fn from(name: String) -> Self {
        Concrete::Type(name)
    }
}

impl From<&String> for Concrete {
    fn from(name: &String) -> Self {
        Concrete::Type(name.clone())
    }
}

impl From<AnyArc> for Concrete {
    fn from(value: AnyArc) -> Self {
        Concrete::Instance(value)
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Factory(_) => f.write_str("Factory(..)"),
            Concrete::Type(name) => f.debug_tuple("Type").field(name).finish(),
            Concrete::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}
