//! Binding lifetime definitions.

/// Sharing policy of a binding
///
/// Sharing only controls caching. Contextual overrides, extenders and
/// resolution callbacks apply to both lifetimes alike.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Lifetime};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.bind("clock", ferrous_container::Concrete::factory(|_, _| Ok(0u64)), false).unwrap();
/// container.singleton("config", ferrous_container::Concrete::value("prod".to_string())).unwrap();
///
/// let a = container.make("clock").unwrap();
/// let b = container.make("clock").unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
///
/// let c = container.make("config").unwrap();
/// let d = container.make("config").unwrap();
/// assert!(Arc::ptr_eq(&c, &d));
///
/// assert_eq!(Lifetime::from(true), Lifetime::Shared);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Built once, cached by the container and handed out on every
    /// resolution that carries no parameter or contextual override.
    Shared,
    /// Built fresh on every resolution, owned by the requester.
    Transient,
}

impl Lifetime {
    /// True for [`Lifetime::Shared`].
    #[inline]
    pub fn is_shared(self) -> bool {
        matches!(self, Lifetime::Shared)
    }
}

impl From<bool> for Lifetime {
    fn from(shared: bool) -> Self {
        if shared {
            Lifetime::Shared
        } else {
            Lifetime::Transient
        }
    }
}
