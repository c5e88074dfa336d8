use ferrous_container::{
    key_of, Concrete, ConcreteKind, Constructor, Container, DiError, Injectable, Lifetime,
    Parameter, Parameters,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Config {
    url: String,
}

struct Repository {
    config: Arc<Config>,
}

impl Injectable for Repository {
    fn constructor() -> Constructor {
        Constructor::of::<Self>()
            .param(Parameter::class("config", "config"))
            .construct(|args| Ok(Repository { config: args.get("config")? }))
    }
}

fn counting_factory(counter: Arc<AtomicUsize>) -> Concrete {
    Concrete::factory(move |_, _| Ok(counter.fetch_add(1, Ordering::SeqCst)))
}

#[test]
fn transient_bindings_build_every_time() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container.bind("counter", counting_factory(builds.clone()), false).unwrap();

    let a = container.make_as::<usize>("counter").unwrap();
    let b = container.make_as::<usize>("counter").unwrap();

    assert_eq!((*a, *b), (0, 1));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn shared_bindings_are_cached_until_parameters_are_given() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container.singleton("counter", counting_factory(builds.clone())).unwrap();

    let first = container.make("counter").unwrap();
    let second = container.make("counter").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let with_params = container
        .make_with("counter", Parameters::new().with("seed", 7u8))
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &with_params));

    // The one-off build did not replace the cached instance
    let third = container.make("counter").unwrap();
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn factories_receive_parameter_overrides() {
    let container = Container::new();
    container
        .bind(
            "greeting",
            Concrete::factory(|_, params| {
                let name = params
                    .get_as::<String>("name")
                    .map(|n| (*n).clone())
                    .unwrap_or_else(|| "world".to_string());
                Ok(format!("hello {}", name))
            }),
            false,
        )
        .unwrap();

    assert_eq!(*container.make_as::<String>("greeting").unwrap(), "hello world");
    let custom = container
        .make_with("greeting", Parameters::new().with("name", "ada".to_string()))
        .unwrap();
    assert_eq!(custom.downcast_ref::<String>().unwrap(), "hello ada");
}

#[test]
fn abstract_chains_resolve_to_the_last_concrete() {
    let container = Container::new();
    container.register_type(
        Constructor::named("C").construct(|_| Ok("built C".to_string())),
    );
    container.bind("A", "B", false).unwrap();
    container.bind("B", "C", false).unwrap();

    assert_eq!(*container.make_as::<String>("A").unwrap(), "built C");
}

#[test]
fn unbound_types_are_auto_resolved_from_their_constructor() {
    let container = Container::new();
    container
        .instance("config", Config { url: "sqlite://".to_string() })
        .unwrap();

    let repo = container.make_type::<Repository>().unwrap();
    assert_eq!(repo.config.url, "sqlite://");
    assert!(container.resolved(&key_of::<Repository>()));
    assert!(!container.bound(&key_of::<Repository>()));
}

#[test]
fn constructor_parameters_use_overrides_then_defaults() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Pool")
            .param(Parameter::primitive("size").default(4u32))
            .param(Parameter::primitive("name").default("main".to_string()))
            .construct(|args| {
                Ok((args.get_cloned::<u32>("size")?, args.get_cloned::<String>("name")?))
            }),
    );

    let default = container.make_as::<(u32, String)>("Pool").unwrap();
    assert_eq!(*default, (4, "main".to_string()));

    let sized = container
        .make_with("Pool", Parameters::new().with("size", 16u32))
        .unwrap()
        .downcast::<(u32, String)>()
        .unwrap();
    assert_eq!(*sized, (16, "main".to_string()));
}

#[test]
fn bind_if_keeps_the_first_binding() {
    let container = Container::new();
    container.bind_if("driver", Concrete::value("mysql".to_string()), false).unwrap();
    container.bind_if("driver", Concrete::value("pgsql".to_string()), false).unwrap();

    assert_eq!(*container.make_as::<String>("driver").unwrap(), "mysql");
}

#[test]
fn instances_are_shared_and_returned() {
    let container = Container::new();
    let stored = container.instance("config", Config { url: "x".into() }).unwrap();
    let resolved = container.make_as::<Config>("config").unwrap();

    assert!(Arc::ptr_eq(&stored, &resolved));
    assert!(container.is_shared("config"));
    assert!(container.resolved("config"));
}

#[test]
fn extenders_apply_in_registration_order() {
    let container = Container::new();
    container.bind("log", Concrete::value(Vec::<&'static str>::new()), false).unwrap();
    container
        .extend_typed::<Vec<&'static str>, _, _>("log", |v, _| {
            let mut v = (*v).clone();
            v.push("first");
            Ok(v)
        })
        .unwrap();
    container
        .extend_typed::<Vec<&'static str>, _, _>("log", |v, _| {
            let mut v = (*v).clone();
            v.push("second");
            Ok(v)
        })
        .unwrap();

    let log = container.make_as::<Vec<&'static str>>("log").unwrap();
    assert_eq!(*log, vec!["first", "second"]);
}

#[test]
fn extending_a_cached_instance_applies_immediately() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container.singleton("counter", counting_factory(builds.clone())).unwrap();
    container.make("counter").unwrap();

    container
        .extend_typed::<usize, _, _>("counter", |n, _| Ok(*n + 100))
        .unwrap();

    assert_eq!(*container.make_as::<usize>("counter").unwrap(), 100);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn forget_extenders_stops_future_transformations() {
    let container = Container::new();
    container.bind("n", Concrete::value(1u32), false).unwrap();
    container.extend_typed::<u32, _, _>("n", |n, _| Ok(*n * 10)).unwrap();
    assert_eq!(*container.make_as::<u32>("n").unwrap(), 10);

    container.forget_extenders("n").unwrap();
    assert_eq!(*container.make_as::<u32>("n").unwrap(), 1);
}

#[test]
fn tagged_resolves_every_tagged_abstract_in_order() {
    let container = Container::new();
    container.bind("cpu", Concrete::value("cpu report".to_string()), false).unwrap();
    container.bind("memory", Concrete::value("memory report".to_string()), false).unwrap();
    container.tag(&["cpu", "memory"], &["reports"]);

    let reports: Vec<String> = container
        .tagged("reports")
        .unwrap()
        .into_iter()
        .map(|r| r.downcast_ref::<String>().unwrap().clone())
        .collect();
    assert_eq!(reports, vec!["cpu report", "memory report"]);
    assert!(container.tagged("unknown").unwrap().is_empty());
}

#[test]
fn entry_accessor_distinguishes_missing_services() {
    let container = Container::new();
    container.register_type(Constructor::named("Auto").construct(|_| Ok(1u8)));

    // Buildable, but not registered in the container
    assert!(matches!(container.get("Auto"), Err(DiError::NotFound(_))));
    assert!(container.make("Auto").is_ok());

    container.set("Auto", 2u8).unwrap();
    assert_eq!(*container.get("Auto").unwrap().downcast::<u8>().unwrap(), 2);
}

#[test]
fn set_binds_a_non_shared_value() {
    let container = Container::new();
    container.set("name", "taylor".to_string()).unwrap();

    assert!(!container.is_shared("name"));
    let a = container.make("name").unwrap();
    let b = container.make("name").unwrap();
    // The recipe hands out the stored value itself
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn forget_instance_rebuilds_shared_bindings() {
    let container = Container::new();
    let builds = Arc::new(AtomicUsize::new(0));
    container.singleton("counter", counting_factory(builds.clone())).unwrap();

    container.make("counter").unwrap();
    container.forget_instance("counter");
    container.make("counter").unwrap();
    container.forget_instances();
    container.make("counter").unwrap();

    assert_eq!(builds.load(Ordering::SeqCst), 3);
}

#[test]
fn get_bindings_describes_registrations() {
    let container = Container::new();
    container.singleton("b", Concrete::value(1u8)).unwrap();
    container.bind("a", "Impl", false).unwrap();

    let bindings = container.get_bindings();
    let keys: Vec<&str> = bindings.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(bindings[0].lifetime, Lifetime::Transient);
    assert_eq!(bindings[0].target.as_deref(), Some("Impl"));
    assert_eq!(bindings[1].kind, ConcreteKind::Instance);
}

#[test]
fn factory_closure_resolves_lazily() {
    let container = Container::new();
    let make_port = container.factory("port");

    assert!(make_port().is_err());
    container.bind("port", Concrete::value(8080u16), false).unwrap();
    assert_eq!(*make_port().unwrap().downcast::<u16>().unwrap(), 8080);
}

#[test]
fn trait_objects_round_trip_through_make_trait() {
    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }
    struct Fixed;
    impl Clock for Fixed {
        fn now(&self) -> u64 {
            42
        }
    }

    let container = Container::new();
    container
        .singleton("clock", Concrete::value(Arc::new(Fixed) as Arc<dyn Clock>))
        .unwrap();

    assert_eq!(container.make_trait::<dyn Clock>("clock").unwrap().now(), 42);
    assert!(matches!(
        container.make_as::<u64>("clock"),
        Err(DiError::TypeMismatch { .. })
    ));
}

#[test]
fn optional_dependency_does_not_hide_construct_bugs() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Dep").construct(|args| args.get_cloned::<u8>("typo")),
    );
    container.register_type(
        Constructor::named("Outer")
            .param(Parameter::class("d", "Dep").default(0u8))
            .construct(|args| args.get_cloned::<u8>("d")),
    );

    match container.make_as::<u8>("Outer") {
        Err(DiError::MissingArgument { argument, owner }) => {
            assert_eq!(argument, "typo");
            assert_eq!(owner, "Dep");
        }
        other => panic!("expected missing argument, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn optional_dependency_does_not_hide_failures_inside_its_factory() {
    let container = Container::new();
    // A fresh resolution inside the factory fails on an unrelated name
    container
        .bind(
            "Dep",
            Concrete::factory(|ctx, _| ctx.container().make("Missing").map(|_| 1u8)),
            false,
        )
        .unwrap();
    container.register_type(
        Constructor::named("Outer")
            .param(Parameter::class("d", "Dep").default(0u8))
            .construct(|args| args.get_cloned::<u8>("d")),
    );

    match container.make_as::<u8>("Outer") {
        Err(DiError::NotInstantiable { target, chain }) => {
            assert_eq!(target, "Missing");
            assert_eq!(chain, vec!["Outer", "Dep"]);
        }
        other => panic!("expected nested failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn optional_dependency_still_covers_its_own_absence() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Outer")
            .param(Parameter::class("d", "Unbound").default(7u8))
            .construct(|args| args.get_cloned::<u8>("d")),
    );

    assert_eq!(*container.make_as::<u8>("Outer").unwrap(), 7);
}
