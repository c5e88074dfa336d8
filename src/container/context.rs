//! Per-call-tree resolution state.

use crate::container::Container;
use crate::error::DiResult;
use crate::internal::{BuildStack, ResolutionChain};
use crate::parameters::Parameters;
use crate::registration::AnyArc;
use crate::traits::{Resolver, ResolverCore};

/// Resolution context threaded through one top-level `make` or `call`.
///
/// Holds the build stack (concrete types under construction), the
/// parameter-override frames and the chain of abstracts being resolved.
/// Factories, extenders and resolving callbacks receive it so that nested
/// resolutions observe the enclosing build frame, which is what contextual
/// bindings are keyed on.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, Container, Resolver};
/// use std::sync::Arc;
///
/// struct Settings { url: String }
/// struct Client { url: String }
///
/// let container = Container::new();
/// container.singleton("settings", Concrete::value(Settings { url: "https://api".into() })).unwrap();
/// container
///     .bind(
///         "client",
///         Concrete::factory(|ctx, _| {
///             let settings: Arc<Settings> = ctx.make_as("settings")?;
///             Ok(Client { url: settings.url.clone() })
///         }),
///         false,
///     )
///     .unwrap();
///
/// let client: Arc<Client> = container.make_as("client").unwrap();
/// assert_eq!(client.url, "https://api");
/// ```
pub struct ResolverContext<'a> {
    pub(crate) container: &'a Container,
    pub(crate) build_stack: BuildStack,
    pub(crate) with: Vec<Parameters>,
    pub(crate) chain: ResolutionChain,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self {
            container,
            build_stack: BuildStack::new(),
            with: Vec::new(),
            chain: ResolutionChain::new(container.config().max_depth),
        }
    }

    /// Container this resolution runs against.
    pub fn container(&self) -> &'a Container {
        self.container
    }

    /// Concrete types currently under construction, outermost first.
    pub fn build_stack(&self) -> &[String] {
        &self.build_stack
    }

    /// Innermost concrete under construction.
    pub fn current_concrete(&self) -> Option<&str> {
        self.build_stack.last().map(String::as_str)
    }

    /// Innermost parameter-override frame.
    pub fn parameter_overrides(&self) -> Option<&Parameters> {
        self.with.last()
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        self.resolve(key, parameters)
    }

    fn container(&self) -> &Container {
        self.container
    }
}

impl Resolver for ResolverContext<'_> {}

impl std::fmt::Debug for ResolverContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("build_stack", &self.build_stack)
            .field("frames", &self.with.len())
            .field("depth", &self.chain.depth())
            .finish()
    }
}
