//! # ferrous-container
//!
//! A dependency-resolution container: maps abstract service identifiers to
//! construction recipes, builds object graphs by satisfying declared
//! constructor dependencies, and manages shared versus transient lifetimes.
//!
//! ## Features
//!
//! - **Bindings**: factories, type names or prebuilt instances, shared or transient
//! - **Auto-wiring**: types describe their constructor once; dependencies are resolved recursively
//! - **Aliases and tags**: alternate names and bulk resolution
//! - **Contextual bindings**: `when(A).needs(B).give(C)` overrides scoped to the type being built
//! - **Extenders and callbacks**: post-construction hooks, resolving and rebound listeners
//! - **Invocation**: call functions and `Class@method` targets with injected arguments
//! - **Thread-safe**: at-most-once construction of shared instances, cycle detection
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_container::{Concrete, Constructor, Container, Parameter};
//! use std::sync::Arc;
//!
//! struct Database {
//!     dsn: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//!
//! container.register_type(
//!     Constructor::named("UserService")
//!         .param(Parameter::class("db", "db"))
//!         .construct(|args| Ok(UserService { db: args.get("db")? })),
//! );
//! container
//!     .singleton("db", Concrete::value(Database { dsn: "postgres://localhost".into() }))
//!     .unwrap();
//!
//! let users: Arc<UserService> = container.make_as("UserService").unwrap();
//! assert_eq!(users.db.dsn, "postgres://localhost");
//! ```
//!
//! ## Interfaces and Contextual Bindings
//!
//! ```rust
//! use ferrous_container::{Constructor, Container, Parameter};
//! use std::sync::Arc;
//!
//! trait Cache: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//! struct MemoryCache;
//! struct RedisCache;
//! impl Cache for MemoryCache { fn name(&self) -> &'static str { "memory" } }
//! impl Cache for RedisCache { fn name(&self) -> &'static str { "redis" } }
//!
//! struct Sessions { cache: Arc<dyn Cache> }
//!
//! let container = Container::new();
//! container.register_type(
//!     Constructor::named("MemoryCache").construct(|_| Ok(Arc::new(MemoryCache) as Arc<dyn Cache>)),
//! );
//! container.register_type(
//!     Constructor::named("RedisCache").construct(|_| Ok(Arc::new(RedisCache) as Arc<dyn Cache>)),
//! );
//! container.register_type(
//!     Constructor::named("Sessions")
//!         .param(Parameter::class("cache", "Cache"))
//!         .construct(|args| Ok(Sessions { cache: args.get_trait::<dyn Cache>("cache")? })),
//! );
//!
//! container.bind("Cache", "MemoryCache", false).unwrap();
//! container.when("Sessions").needs("Cache").give("RedisCache").unwrap();
//!
//! let sessions: Arc<Sessions> = container.make_as("Sessions").unwrap();
//! assert_eq!(sessions.cache.name(), "redis");
//! assert_eq!(container.make_trait::<dyn Cache>("Cache").unwrap().name(), "memory");
//! ```
//!
//! ## Lifetimes
//!
//! - **Shared**: built once, cached, and returned to every resolution without overrides
//! - **Transient**: built fresh on every resolution

pub mod callbacks;
pub mod concrete;
pub mod config;
pub mod constructor;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod global;
pub mod key;
pub mod lifetime;
pub mod parameters;
pub mod traits;

mod internal;
mod registration;

pub use callbacks::{CallbackFn, ReboundFn};
pub use concrete::{Concrete, ConcreteKind};
pub use config::{ContainerConfig, OptionalFallback};
pub use constructor::{Callable, Constructor, Injectable, Method, ParamKind, Parameter};
pub use container::{CallTarget, Container, ContextualBindingBuilder, ContextualNeeds, ResolverContext};
pub use descriptors::BindingDescriptor;
pub use error::{DiError, DiResult};
pub use key::{is_parameter_key, key_of, parameter_key};
pub use lifetime::Lifetime;
pub use parameters::{Arguments, Null, Parameters};
pub use registration::{AnyArc, ExtenderFn, FactoryFn, MethodBindingFn};
pub use traits::{Resolver, ResolverCore};
