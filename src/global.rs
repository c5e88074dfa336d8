//! Process-wide container accessor.
//!
//! A convenience layer for code that cannot have a container handle passed
//! to it. The resolution engine never consults it.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::container::Container;

static GLOBAL: Lazy<RwLock<Option<Container>>> = Lazy::new(|| RwLock::new(None));

/// The globally available container, created on first access.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::global;
///
/// let a = global::instance();
/// a.set("app.name", "demo".to_string()).unwrap();
///
/// let b = global::instance();
/// assert_eq!(*b.make_as::<String>("app.name").unwrap(), "demo");
/// ```
pub fn instance() -> Container {
    if let Some(container) = GLOBAL.read().as_ref() {
        return container.clone();
    }
    GLOBAL.write().get_or_insert_with(Container::new).clone()
}

/// Replaces the global container; `None` clears it so the next
/// [`instance`] call creates a fresh one. Returns the previous container.
pub fn set_instance(container: Option<Container>) -> Option<Container> {
    std::mem::replace(&mut *GLOBAL.write(), container)
}

/// True if a global container currently exists.
pub fn has_instance() -> bool {
    GLOBAL.read().is_some()
}
