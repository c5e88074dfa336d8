//! Invocation helper: call functions and methods with injected arguments.

use std::sync::Arc;

use crate::constructor::{Callable, Parameter};
use crate::container::{Container, ResolverContext};
use crate::error::{DiError, DiResult};
use crate::key::split_method_target;
use crate::parameters::{downcast, Arguments, Parameters};
use crate::registration::{AnyArc, MethodBindingFn};

/// What `call` invokes.
#[derive(Clone)]
pub enum CallTarget {
    /// A free function with declared parameters.
    Function(Callable),
    /// `"Class@method"`, or `"Class"` paired with a default method. The
    /// class is resolved through the container first.
    Class(String),
    /// A method on an already-built instance.
    Bound {
        instance: AnyArc,
        class: String,
        method: String,
    },
}

impl CallTarget {
    pub fn bound(instance: AnyArc, class: impl Into<String>, method: impl Into<String>) -> Self {
        CallTarget::Bound {
            instance,
            class: class.into(),
            method: method.into(),
        }
    }

    fn describe(&self) -> String {
        match self {
            CallTarget::Function(callable) => callable.name().to_string(),
            CallTarget::Class(target) => target.clone(),
            CallTarget::Bound { class, method, .. } => format!("{}@{}", class, method),
        }
    }
}

impl From<&str> for CallTarget {
    fn from(target: &str) -> Self {
        CallTarget::Class(target.to_string())
    }
}

impl From<String> for CallTarget {
    fn from(target: String) -> Self {
        CallTarget::Class(target)
    }
}

impl From<Callable> for CallTarget {
    fn from(callable: Callable) -> Self {
        CallTarget::Function(callable)
    }
}

impl std::fmt::Debug for CallTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CallTarget").field(&self.describe()).finish()
    }
}

impl Container {
    /// Calls `target`, injecting its declared parameters.
    ///
    /// `parameters` act as the override frame for the call; entries that
    /// match no declared parameter are forwarded as extra arguments. A
    /// method binding registered for `Class@method` takes precedence over
    /// the method declared in the class constructor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_container::{Concrete, Constructor, Container, Parameter, Parameters};
    ///
    /// struct Greeter;
    ///
    /// let container = Container::new();
    /// container.singleton("prefix", Concrete::value("Hello".to_string())).unwrap();
    /// container.register_type(
    ///     Constructor::named("Greeter")
    ///         .construct(|_| Ok(Greeter))
    ///         .method("greet", vec![
    ///             Parameter::class("prefix", "prefix"),
    ///             Parameter::primitive("name"),
    ///         ], |_: &Greeter, args| {
    ///             Ok(format!("{} {}", args.get::<String>("prefix")?, args.get::<String>("name")?))
    ///         }),
    /// );
    ///
    /// let params = Parameters::new().with("name", "Ada".to_string());
    /// let out = container.call_as::<String>("Greeter@greet", params.clone(), None).unwrap();
    /// assert_eq!(*out, "Hello Ada");
    ///
    /// let out = container.call_as::<String>("Greeter", params, Some("greet")).unwrap();
    /// assert_eq!(*out, "Hello Ada");
    /// ```
    pub fn call(
        &self,
        target: impl Into<CallTarget>,
        parameters: Parameters,
        default_method: Option<&str>,
    ) -> DiResult<AnyArc> {
        match target.into() {
            CallTarget::Function(callable) => {
                tracing::trace!(function = %callable.name(), "calling function");
                let args = self.context().call_arguments(
                    callable.name(),
                    callable.parameters(),
                    parameters,
                )?;
                callable.invoke(&args)
            }
            CallTarget::Class(target) => {
                let (class, method) = split_method_target(&target);
                let method = method
                    .or(default_method)
                    .ok_or_else(|| DiError::MethodNotProvided(target.clone()))?;
                let instance = self.make(class)?;
                self.call_bound(&instance, class, method, parameters)
            }
            CallTarget::Bound {
                instance,
                class,
                method,
            } => self.call_bound(&instance, &class, &method, parameters),
        }
    }

    /// [`call`](Self::call) with the result downcast to `T`.
    pub fn call_as<T: Send + Sync + 'static>(
        &self,
        target: impl Into<CallTarget>,
        parameters: Parameters,
        default_method: Option<&str>,
    ) -> DiResult<Arc<T>> {
        let target = target.into();
        let name = target.describe();
        downcast(&name, self.call(target, parameters, default_method)?)
    }

    /// Closure that calls `target` with `parameters` each time it runs.
    pub fn wrap(
        &self,
        target: impl Into<CallTarget>,
        parameters: Parameters,
    ) -> impl Fn() -> DiResult<AnyArc> + Send + Sync + 'static {
        let container = self.clone();
        let target = target.into();
        move || container.call(target.clone(), parameters.clone(), None)
    }

    fn call_bound(
        &self,
        instance: &AnyArc,
        class: &str,
        method: &str,
        parameters: Parameters,
    ) -> DiResult<AnyArc> {
        let ctor = {
            let types = self.inner.types.read();
            types.for_instance(instance).or_else(|| types.get(class))
        };
        let class_name = ctor
            .as_ref()
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| class.to_string());

        let binding_key = format!("{}@{}", class_name, method);
        if self.has_method_binding(&binding_key) {
            return self.call_method_binding(&binding_key, instance);
        }

        let found = ctor.as_ref().and_then(|c| c.find_method(method)).cloned();
        let Some(found) = found else {
            return Err(DiError::UnknownMethod {
                class: class_name,
                method: method.to_string(),
            });
        };

        tracing::trace!(class = %class_name, method = %method, "calling method");
        let args = self
            .context()
            .call_arguments(&class_name, found.parameters(), parameters)?;
        found.invoke(instance, &args)
    }

    // ----- Method bindings -----

    /// Replaces `Class@method` calls with `callback`.
    pub fn bind_method<R, F>(&self, method: &str, callback: F)
    where
        R: Send + Sync + 'static,
        F: Fn(&AnyArc, &Container) -> DiResult<R> + Send + Sync + 'static,
    {
        tracing::debug!(method = %method, "binding method");
        let callback: MethodBindingFn = Arc::new(move |instance: &AnyArc, container: &Container| {
            Ok(Arc::new(callback(instance, container)?) as AnyArc)
        });
        self.inner
            .registry
            .write()
            .method_bindings
            .insert(method.to_string(), callback);
    }

    pub fn has_method_binding(&self, method: &str) -> bool {
        self.inner.registry.read().method_bindings.contains_key(method)
    }

    /// Runs the method binding registered for `method` against `instance`.
    pub fn call_method_binding(&self, method: &str, instance: &AnyArc) -> DiResult<AnyArc> {
        let callback = self.inner.registry.read().method_bindings.get(method).cloned();
        match callback {
            Some(callback) => callback(instance, self),
            None => {
                let (class, name) = split_method_target(method);
                Err(DiError::UnknownMethod {
                    class: class.to_string(),
                    method: name.unwrap_or_default().to_string(),
                })
            }
        }
    }
}

impl ResolverContext<'_> {
    /// Resolves call arguments with `overrides` as the innermost frame.
    pub(crate) fn call_arguments(
        &mut self,
        declaring: &str,
        params: &[Parameter],
        overrides: Parameters,
    ) -> DiResult<Arguments> {
        let extra: Vec<(String, AnyArc)> = overrides
            .iter()
            .filter(|(name, _)| !params.iter().any(|p| p.name() == *name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        self.with.push(overrides);
        let args = self.resolve_dependencies(declaring, params);
        self.with.pop();

        let mut args = args?;
        for (name, value) in extra {
            args.push_extra(name, value);
        }
        Ok(args)
    }
}
