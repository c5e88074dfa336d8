//! The dependency resolver: resolve, build and parameter resolution.

use std::sync::Arc;

use crate::concrete::{Concrete, ConcreteKind};
use crate::config::OptionalFallback;
use crate::constructor::{ParamKind, Parameter};
use crate::container::ResolverContext;
use crate::error::{DiError, DiResult};
use crate::key::parameter_key;
use crate::parameters::{Arguments, Parameters};
use crate::registration::AnyArc;

impl<'a> ResolverContext<'a> {
    /// Resolves `key` to an instance within this call tree.
    pub(crate) fn resolve(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        let container = self.container;
        let inner = &container.inner;
        let key = inner.registry.read().get_alias(key)?;

        let contextual = self.contextual_concrete(&key);
        let fresh = !parameters.is_empty() || contextual.is_some();

        if !fresh {
            let cached = inner.registry.read().instances.get(&key).cloned();
            if let Some(instance) = cached {
                tracing::trace!(key = %key, "shared instance cache hit");
                return Ok(instance);
            }
        }

        self.chain.enter(&key)?;
        let shared = !fresh && inner.registry.read().is_shared(&key);
        let result = if shared {
            self.produce_shared(&key, parameters)
        } else {
            self.produce(&key, parameters, contextual, fresh)
        };
        self.chain.exit(&key);
        result
    }

    /// At-most-once construction of a shared instance.
    fn produce_shared(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        let lock = self.container.build_lock(key);
        let Some(_guard) = lock.acquire() else {
            // This thread is already building `key` from an outer context
            return Err(DiError::Circular(vec![key.to_string(), key.to_string()]));
        };

        // Another thread may have finished the build while we waited
        let cached = self.container.inner.registry.read().instances.get(key).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }
        self.produce(key, parameters, None, false)
    }

    fn produce(
        &mut self,
        key: &str,
        parameters: Parameters,
        contextual: Option<Concrete>,
        fresh: bool,
    ) -> DiResult<AnyArc> {
        let frame = parameters.clone();
        self.with.push(parameters);
        let result = self.produce_in_frame(key, &frame, contextual, fresh);
        self.with.pop();
        result
    }

    fn produce_in_frame(
        &mut self,
        key: &str,
        frame: &Parameters,
        contextual: Option<Concrete>,
        fresh: bool,
    ) -> DiResult<AnyArc> {
        let container = self.container;
        let inner = &container.inner;

        // User factories are opaque; their failures count as nested below `key`
        let (concrete, user_factory) = match contextual {
            Some(concrete) => {
                let user_factory = matches!(concrete, Concrete::Factory(_));
                (concrete, user_factory)
            }
            None => match inner.registry.read().bindings.get(key) {
                Some(binding) => (
                    Concrete::Factory(binding.factory.clone()),
                    binding.kind == ConcreteKind::Factory,
                ),
                None => (Concrete::Type(key.to_string()), false),
            },
        };

        let mut instance = match &concrete {
            Concrete::Type(name) if name != key => self.resolve(name, Parameters::new())?,
            buildable => match self.build(buildable, frame) {
                Ok(instance) => instance,
                Err(err) if user_factory => {
                    return Err(err.nested_under(&self.build_stack, key));
                }
                Err(err) => return Err(err),
            },
        };

        let extenders = inner.registry.read().extenders(key);
        for extender in extenders {
            tracing::trace!(key = %key, "applying extender");
            instance = extender(instance, self)?;
        }

        if !fresh && inner.registry.read().is_shared(key) {
            inner
                .registry
                .write()
                .instances
                .insert(key.to_string(), instance.clone());
        }

        self.fire_resolving_callbacks(key, &instance);

        inner.registry.write().resolved.insert(key.to_string());
        Ok(instance)
    }

    /// Produces an instance from a buildable recipe.
    pub(crate) fn build(&mut self, concrete: &Concrete, frame: &Parameters) -> DiResult<AnyArc> {
        match concrete {
            Concrete::Factory(factory) => factory(self, frame),
            Concrete::Type(name) => self.build_type(name),
            Concrete::Instance(value) => Ok(value.clone()),
        }
    }

    /// Builds `name` from its registered constructor.
    pub(crate) fn build_type(&mut self, name: &str) -> DiResult<AnyArc> {
        let ctor = self.container.inner.types.read().get(name);
        let ctor = match ctor {
            Some(ctor) if ctor.is_instantiable() => ctor,
            _ => {
                return Err(DiError::NotInstantiable {
                    target: name.to_string(),
                    chain: self.build_stack.to_vec(),
                })
            }
        };

        if self.build_stack.iter().any(|frame| frame == name) {
            let mut path = self.build_stack.to_vec();
            path.push(name.to_string());
            return Err(DiError::Circular(path));
        }

        tracing::trace!(concrete = %name, depth = self.build_stack.len(), "building");
        self.build_stack.push(name.to_string());
        let args = self.resolve_dependencies(ctor.name(), ctor.parameters());
        self.build_stack.pop();

        ctor.instantiate(&args?)
            .map_err(|err| err.nested_under(&self.build_stack, name))
    }

    /// Resolves declared parameters in order against the innermost frame.
    pub(crate) fn resolve_dependencies(
        &mut self,
        declaring: &str,
        params: &[Parameter],
    ) -> DiResult<Arguments> {
        let frame = self.with.last().cloned().unwrap_or_default();
        let mut args = Arguments::new(declaring);

        for param in params {
            if let Some(value) = frame.get(param.name()) {
                args.push(param.name(), value.clone());
                continue;
            }

            let value = match param.kind() {
                ParamKind::Primitive => self.resolve_primitive(param, declaring)?,
                ParamKind::Class(key) => self.resolve_class(param, key)?,
            };
            args.push(param.name(), value);
        }

        Ok(args)
    }

    fn resolve_primitive(&mut self, param: &Parameter, declaring: &str) -> DiResult<AnyArc> {
        if let Some(concrete) = self.contextual_concrete(&parameter_key(param.name())) {
            return match concrete {
                Concrete::Factory(factory) => factory(self, &Parameters::new()),
                Concrete::Instance(value) => Ok(value),
                Concrete::Type(literal) => Ok(Arc::new(literal) as AnyArc),
            };
        }

        if let Some(default) = param.default_value() {
            return Ok(default.clone());
        }

        Err(DiError::UnresolvableDependency {
            parameter: param.name().to_string(),
            declaring: declaring.to_string(),
            chain: self.build_stack.to_vec(),
        })
    }

    fn resolve_class(&mut self, param: &Parameter, key: &str) -> DiResult<AnyArc> {
        match self.resolve(key, Parameters::new()) {
            Ok(instance) => Ok(instance),
            Err(err) => match param.default_value() {
                Some(default) if self.may_fall_back(&err) => {
                    tracing::warn!(
                        parameter = %param.name(),
                        dependency = %key,
                        error = %err,
                        "optional dependency unavailable, using default"
                    );
                    Ok(default.clone())
                }
                _ => Err(err),
            },
        }
    }

    /// Whether an optional parameter may absorb `err`.
    ///
    /// The dependency would occupy the frame right above the current build
    /// stack; failures recorded deeper than that belong to its own
    /// dependencies.
    fn may_fall_back(&self, err: &DiError) -> bool {
        if !err.is_binding_failure() {
            return false;
        }
        match self.container.config().optional_fallback {
            OptionalFallback::AnyFailure => true,
            OptionalFallback::DirectFailure => err
                .failure_depth()
                .map(|depth| depth <= self.build_stack.len() + 1)
                .unwrap_or(false),
        }
    }

    /// Contextual override for `key` scoped to the innermost build frame.
    fn contextual_concrete(&self, key: &str) -> Option<Concrete> {
        let concrete = self.build_stack.last()?;
        self.container
            .inner
            .registry
            .read()
            .contextual_for(concrete, key)
    }

    fn fire_resolving_callbacks(&mut self, key: &str, instance: &AnyArc) {
        let container = self.container;
        let inner = &container.inner;
        let callbacks = {
            let registry = inner.callbacks.read();
            if registry.is_empty() {
                return;
            }
            let types = inner.types.read();
            registry.matching(key, instance, &types)
        };

        tracing::trace!(key = %key, count = callbacks.len(), "firing resolving callbacks");
        for callback in callbacks {
            callback(instance, self);
        }
    }
}
