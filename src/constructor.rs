//! Constructor descriptors: the declared dependency lists the container builds
//! types from.
//!
//! Rust offers no runtime introspection of constructor signatures, so each
//! constructible type registers a [`Constructor`] once, describing its
//! parameters in declaration order, how to assemble an instance from the
//! resolved [`Arguments`], the interfaces it satisfies and the methods the
//! invocation helper may call on it.

use std::any::TypeId;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::{Map, Set};
use crate::key::key_of;
use crate::parameters::{Arguments, Null};
use crate::registration::AnyArc;

pub type ConstructFn = Arc<dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync>;
pub type MethodFn = Arc<dyn Fn(&AnyArc, &Arguments) -> DiResult<AnyArc> + Send + Sync>;
pub type CallableFn = Arc<dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync>;

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Resolved recursively through the container under this key.
    Class(String),
    /// Scalar or collection value: contextual `$name` override or default.
    Primitive,
}

/// One declared constructor or method parameter.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Parameter, ParamKind};
///
/// struct Mailer;
///
/// let db = Parameter::class("db", "Database");
/// assert_eq!(db.kind(), &ParamKind::Class("Database".to_string()));
///
/// let mailer = Parameter::of::<Mailer>("mailer").nullable();
/// assert!(mailer.has_default());
///
/// let retries = Parameter::primitive("retries").default(3u8);
/// assert_eq!(retries.kind(), &ParamKind::Primitive);
/// ```
#[derive(Clone)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<AnyArc>,
}

impl Parameter {
    /// Parameter typed by an abstract key.
    pub fn class(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Class(key.into()),
            default: None,
        }
    }

    /// Parameter typed by a Rust type.
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::class(name, key_of::<T>())
    }

    /// Parameter without a class type.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Primitive,
            default: None,
        }
    }

    /// Default used when nothing else supplies the parameter.
    pub fn default<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.default_arc(Arc::new(value))
    }

    pub fn default_arc(mut self, value: AnyArc) -> Self {
        self.default = Some(value);
        self
    }

    /// Defaults to [`Null`], read back with [`Arguments::get_optional`].
    pub fn nullable(self) -> Self {
        self.default(Null)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<&AnyArc> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// A method the invocation helper may call on a built instance.
#[derive(Clone)]
pub struct Method {
    name: String,
    params: Vec<Parameter>,
    invoke: MethodFn,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn invoke(&self, receiver: &AnyArc, args: &Arguments) -> DiResult<AnyArc> {
        (self.invoke)(receiver, args)
    }
}

/// A free function with declared parameters, invocable through `call`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Callable, Container, Parameter, Parameters};
///
/// let container = Container::new();
/// let greet = Callable::new("greet", |args| {
///     Ok(format!("hello {}", args.get::<String>("name")?))
/// })
/// .param(Parameter::primitive("name"));
///
/// let out = container
///     .call_as::<String>(greet, Parameters::new().with("name", "ada".to_string()), None)
///     .unwrap();
/// assert_eq!(*out, "hello ada");
/// ```
#[derive(Clone)]
pub struct Callable {
    name: String,
    params: Vec<Parameter>,
    invoke: CallableFn,
}

impl Callable {
    pub fn new<R, F>(name: impl Into<String>, f: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            invoke: Arc::new(move |args: &Arguments| Ok(Arc::new(f(args)?) as AnyArc)),
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn invoke(&self, args: &Arguments) -> DiResult<AnyArc> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Declared construction recipe of a type.
///
/// A constructor without a construct function, or one declared with
/// [`interface`](Constructor::interface), is not instantiable: resolving it
/// without a binding fails with `NotInstantiable`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Constructor, Parameter, Resolver};
/// use std::sync::Arc;
///
/// struct Database { dsn: String }
/// struct Repository { db: Arc<Database> }
///
/// let container = Container::new();
/// container.register_type(
///     Constructor::of::<Database>()
///         .param(Parameter::primitive("dsn").default("sqlite::memory:".to_string()))
///         .construct(|args| Ok(Database { dsn: args.get_cloned("dsn")? })),
/// );
/// container.register_type(
///     Constructor::of::<Repository>()
///         .param(Parameter::of::<Database>("db"))
///         .construct(|args| Ok(Repository { db: args.get("db")? })),
/// );
///
/// let repo: Arc<Repository> = container.make_as(&ferrous_container::key_of::<Repository>()).unwrap();
/// assert_eq!(repo.db.dsn, "sqlite::memory:");
/// ```
#[derive(Clone)]
pub struct Constructor {
    name: String,
    type_id: Option<TypeId>,
    instantiable: bool,
    implements: Vec<String>,
    params: Vec<Parameter>,
    construct: Option<ConstructFn>,
    methods: Vec<Method>,
}

impl Constructor {
    /// Descriptor for a Rust type, keyed by its type name.
    pub fn of<T: Send + Sync + 'static>() -> Self {
        let mut ctor = Self::named(key_of::<T>());
        ctor.type_id = Some(TypeId::of::<T>());
        ctor
    }

    /// Descriptor for a Rust type built with `T::default()`.
    pub fn default_of<T: Default + Send + Sync + 'static>() -> Self {
        Self::of::<T>().construct(|_| Ok(T::default()))
    }

    /// Descriptor keyed by an arbitrary name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
            instantiable: true,
            implements: Vec::new(),
            params: Vec::new(),
            construct: None,
            methods: Vec::new(),
        }
    }

    /// Descriptor of a name that can never be built directly.
    pub fn interface(name: impl Into<String>) -> Self {
        let mut ctor = Self::named(name);
        ctor.instantiable = false;
        ctor
    }

    /// Declares that instances of this type are also instances of `name`.
    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.implements.push(name.into());
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn construct<T, F>(mut self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.construct = Some(Arc::new(move |args: &Arguments| {
            Ok(Arc::new(f(args)?) as AnyArc)
        }));
        self
    }

    /// Construct function returning an already type-erased value.
    pub fn construct_any<F>(mut self, f: F) -> Self
    where
        F: Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.construct = Some(Arc::new(f));
        self
    }

    /// Declares a method callable as `Type@name`.
    pub fn method<T, R, F>(mut self, name: impl Into<String>, params: Vec<Parameter>, f: F) -> Self
    where
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(&T, &Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let owner = format!("{}@{}", self.name, name);
        let invoke: MethodFn = Arc::new(move |receiver: &AnyArc, args: &Arguments| {
            let this = receiver
                .downcast_ref::<T>()
                .ok_or_else(|| DiError::type_mismatch::<T>(owner.clone()))?;
            Ok(Arc::new(f(this, args)?) as AnyArc)
        });
        self.methods.push(Method {
            name,
            params,
            invoke,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn interfaces(&self) -> &[String] {
        &self.implements
    }

    /// Interface flag set and a construct function present.
    pub fn is_instantiable(&self) -> bool {
        self.instantiable && self.construct.is_some()
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub(crate) fn instantiate(&self, args: &Arguments) -> DiResult<AnyArc> {
        match &self.construct {
            Some(construct) => construct(args),
            None => Err(DiError::NotInstantiable {
                target: self.name.clone(),
                chain: Vec::new(),
            }),
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("instantiable", &self.is_instantiable())
            .field("implements", &self.implements)
            .field("params", &self.params)
            .field("methods", &self.methods.iter().map(|m| &m.name).collect::<Vec<_>>())
            .finish()
    }
}

/// A Rust type that describes its own constructor.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Constructor, Injectable, Parameter};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Arc<Clock> }
///
/// impl Injectable for Clock {
///     fn constructor() -> Constructor {
///         Constructor::of::<Self>().construct(|_| Ok(Clock))
///     }
/// }
///
/// impl Injectable for Scheduler {
///     fn constructor() -> Constructor {
///         Constructor::of::<Self>()
///             .param(Parameter::of::<Clock>("clock"))
///             .construct(|args| Ok(Scheduler { clock: args.get("clock")? }))
///     }
/// }
///
/// let container = Container::new();
/// container.register::<Clock>();
/// let scheduler = container.make_type::<Scheduler>().unwrap();
/// let _clock: &Arc<Clock> = &scheduler.clock;
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    fn constructor() -> Constructor;
}

/// Registered constructors, addressed by name and by Rust type.
#[derive(Default)]
pub(crate) struct TypeTable {
    by_name: Map<String, Arc<Constructor>>,
    by_type: Map<TypeId, String>,
}

impl TypeTable {
    pub(crate) fn register(&mut self, ctor: Constructor) {
        if let Some(id) = ctor.type_id {
            self.by_type.insert(id, ctor.name.clone());
        }
        self.by_name.insert(ctor.name.clone(), Arc::new(ctor));
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<Constructor>> {
        self.by_name.get(name).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Constructor registered for the instance's concrete Rust type.
    pub(crate) fn for_instance(&self, instance: &AnyArc) -> Option<Arc<Constructor>> {
        let id = (**instance).type_id();
        self.by_type.get(&id).and_then(|name| self.get(name))
    }

    /// Instance-of check against a type or interface name.
    ///
    /// Walks the declared interfaces transitively, so an interface descriptor
    /// may itself declare the interfaces it extends.
    pub(crate) fn is_instance_of(&self, instance: &AnyArc, type_name: &str) -> bool {
        let Some(ctor) = self.for_instance(instance) else {
            return false;
        };

        let mut queue: VecDeque<&str> = VecDeque::from([ctor.name.as_str()]);
        let mut seen: Set<&str> = Set::default();
        while let Some(name) = queue.pop_front() {
            if name == type_name {
                return true;
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(found) = self.by_name.get(name) {
                queue.extend(found.implements.iter().map(String::as_str));
            }
        }
        false
    }
}
