//! Abstract keys for the service container.
//!
//! Services are identified by plain strings: an interface name, a type name
//! or any arbitrary key. Identity is exact string equality after alias
//! resolution. The helpers here derive keys from Rust types and build the
//! synthetic `$name` keys used for contextual primitive overrides.

/// Key naming a Rust type, as reported by `std::any::type_name`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::key_of;
///
/// assert_eq!(key_of::<String>(), "alloc::string::String");
/// assert_eq!(key_of::<u32>(), "u32");
/// ```
#[inline]
pub fn key_of<T: ?Sized + 'static>() -> String {
    std::any::type_name::<T>().to_string()
}

/// Synthetic key for a primitive constructor parameter.
///
/// Contextual bindings keyed by `$name` supply values for parameters that
/// have no class type.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::parameter_key;
///
/// assert_eq!(parameter_key("timeout"), "$timeout");
/// assert_eq!(parameter_key("$timeout"), "$timeout");
/// ```
pub fn parameter_key(name: &str) -> String {
    if is_parameter_key(name) {
        name.to_string()
    } else {
        format!("${}", name)
    }
}

/// True if `key` is a `$name` primitive key.
#[inline]
pub fn is_parameter_key(key: &str) -> bool {
    key.starts_with('$')
}

/// Splits a `Class@method` call target.
pub(crate) fn split_method_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('@') {
        Some((class, method)) if !method.is_empty() => (class, Some(method)),
        Some((class, _)) => (class, None),
        None => (target, None),
    }
}
