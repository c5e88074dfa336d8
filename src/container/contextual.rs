//! Fluent builder for contextual bindings.

use crate::concrete::Concrete;
use crate::container::Container;
use crate::error::DiResult;

/// First step of `when(concrete).needs(key).give(recipe)`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, Constructor, Container, Parameter};
/// use std::sync::Arc;
///
/// struct Report { disk: Arc<String>, limit: Arc<u32> }
///
/// let container = Container::new();
/// container.bind("Disk", Concrete::value("local".to_string()), false).unwrap();
/// container.register_type(
///     Constructor::named("Report")
///         .param(Parameter::class("disk", "Disk"))
///         .param(Parameter::primitive("limit"))
///         .construct(|args| Ok(Report { disk: args.get("disk")?, limit: args.get("limit")? })),
/// );
///
/// container.when("Report").needs("Disk").give(Concrete::value("s3".to_string())).unwrap();
/// container.when("Report").needs("$limit").give_value(50u32).unwrap();
///
/// let report: Arc<Report> = container.make_as("Report").unwrap();
/// assert_eq!(*report.disk, "s3");
/// assert_eq!(*report.limit, 50);
///
/// // Outside of Report the regular binding applies
/// assert_eq!(*container.make_as::<String>("Disk").unwrap(), "local");
/// ```
#[must_use = "a contextual binding is only recorded by `give`"]
pub struct ContextualBindingBuilder<'c> {
    container: &'c Container,
    concrete: String,
}

/// Second step: the abstract or `$parameter` being overridden.
#[must_use = "a contextual binding is only recorded by `give`"]
pub struct ContextualNeeds<'c> {
    container: &'c Container,
    concrete: String,
    needs: String,
}

impl<'c> ContextualBindingBuilder<'c> {
    pub(crate) fn new(container: &'c Container, concrete: impl Into<String>) -> Self {
        Self {
            container,
            concrete: concrete.into(),
        }
    }

    /// Abstract, or `$name` for a primitive parameter, to override.
    pub fn needs(self, key: impl Into<String>) -> ContextualNeeds<'c> {
        ContextualNeeds {
            container: self.container,
            concrete: self.concrete,
            needs: key.into(),
        }
    }
}

impl ContextualNeeds<'_> {
    /// Records the override.
    pub fn give(self, implementation: impl Into<Concrete>) -> DiResult<()> {
        self.container
            .add_contextual_binding(&self.concrete, &self.needs, implementation)
    }

    /// Records a prebuilt value as the override.
    pub fn give_value<T: Send + Sync + 'static>(self, value: T) -> DiResult<()> {
        self.give(Concrete::value(value))
    }
}

impl Container {
    /// Starts a contextual binding scoped to `concrete` being built.
    pub fn when(&self, concrete: impl Into<String>) -> ContextualBindingBuilder<'_> {
        ContextualBindingBuilder::new(self, concrete)
    }

    /// Records that `concrete` receives `implementation` whenever it needs
    /// `needs`. Both names are canonicalised through the alias table.
    pub fn add_contextual_binding(
        &self,
        concrete: &str,
        needs: &str,
        implementation: impl Into<Concrete>,
    ) -> DiResult<()> {
        let implementation = implementation.into();
        let mut registry = self.inner.registry.write();
        let concrete = registry.get_alias(concrete)?;
        let needs = registry.get_alias(needs)?;
        tracing::debug!(concrete = %concrete, needs = %needs, kind = ?implementation.kind(), "contextual binding");

        registry
            .contextual
            .entry(concrete)
            .or_default()
            .insert(needs, implementation);
        Ok(())
    }
}
