use ferrous_container::{
    Concrete, Constructor, Container, ContainerConfig, DiError, OptionalFallback, Parameter,
    Resolver,
};

fn needs(name: &str, dep: &str) -> Constructor {
    Constructor::named(name)
        .param(Parameter::class("dep", dep))
        .construct(|_| Ok(()))
}

#[test]
fn test_self_circular_dependency() {
    let container = Container::new();
    container.register_type(needs("SelfReferencing", "SelfReferencing"));

    match container.make("SelfReferencing") {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, vec!["SelfReferencing", "SelfReferencing"]);
        }
        other => panic!("expected circular error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_two_service_cycle_reports_full_path() {
    let container = Container::new();
    container.register_type(needs("A", "B"));
    container.register_type(needs("B", "A"));

    match container.make("A") {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["A", "B", "A"]),
        other => panic!("expected circular error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_factory_cycle_through_the_context() {
    let container = Container::new();
    container
        .bind("ping", Concrete::factory(|ctx, _| ctx.make("pong").map(|_| ())), false)
        .unwrap();
    container
        .bind("pong", Concrete::factory(|ctx, _| ctx.make("ping").map(|_| ())), false)
        .unwrap();

    assert!(matches!(container.make("ping"), Err(DiError::Circular(_))));
}

#[test]
fn test_absorbed_failure_pops_its_build_frames() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Broken")
            .param(Parameter::primitive("dsn"))
            .construct(|_| Ok(())),
    );
    container.register_type(Constructor::named("MemoryStore").construct(|_| Ok("memory".to_string())));
    container.register_type(Constructor::named("RedisStore").construct(|_| Ok("redis".to_string())));
    container.bind("Store", "MemoryStore", false).unwrap();
    container.register_type(
        Constructor::named("Outer")
            .param(Parameter::class("broken", "Broken").default(0u8))
            .param(Parameter::class("store", "Store"))
            .construct(|args| Ok((*args.get::<u8>("broken")?, args.get_cloned::<String>("store")?))),
    );
    container.when("Outer").needs("Store").give("RedisStore").unwrap();

    // "Broken" fails inside its own frame; "store" must still see "Outer" as
    // the innermost concrete
    let outer = container.make_as::<(u8, String)>("Outer").unwrap();
    assert_eq!(*outer, (0, "redis".to_string()));
}

#[test]
fn test_absorbed_nested_failure_pops_every_frame() {
    let container = Container::with_config(
        ContainerConfig::default().with_optional_fallback(OptionalFallback::AnyFailure),
    );
    container.register_type(needs("Broken", "Middle"));
    container.register_type(needs("Middle", "Missing"));
    container.register_type(Constructor::named("RedisStore").construct(|_| Ok("redis".to_string())));
    container.register_type(
        Constructor::named("Outer")
            .param(Parameter::class("broken", "Broken").nullable())
            .param(Parameter::class("store", "Store"))
            .construct(|args| args.get_cloned::<String>("store")),
    );
    container.when("Outer").needs("Store").give("RedisStore").unwrap();

    assert_eq!(*container.make_as::<String>("Outer").unwrap(), "redis");
}

#[test]
fn test_shared_reentry_through_the_container_handle() {
    let container = Container::new();
    container
        .singleton(
            "a",
            Concrete::factory(|ctx, _| ctx.container().make("a").map(|_| ())),
        )
        .unwrap();

    match container.make("a") {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["a", "a"]),
        other => panic!("expected circular error, got {:?}", other.map(|_| ())),
    }
    // The build lock was released on the error path
    assert!(matches!(container.make("a"), Err(DiError::Circular(_))));
    assert!(!container.resolved("a"));
}

#[test]
fn test_shared_two_key_reentry_through_the_container_handle() {
    let container = Container::new();
    container
        .singleton("a", Concrete::factory(|ctx, _| ctx.container().make("b").map(|_| ())))
        .unwrap();
    container
        .singleton("b", Concrete::factory(|ctx, _| ctx.container().make("a").map(|_| ())))
        .unwrap();

    assert!(matches!(container.make("a"), Err(DiError::Circular(_))));
    assert!(matches!(container.make("b"), Err(DiError::Circular(_))));
}

#[test]
fn test_depth_limit() {
    let container = Container::with_config(ContainerConfig::default().with_max_depth(8));
    for i in 0..20 {
        container.register_type(needs(&format!("L{}", i), &format!("L{}", i + 1)));
    }
    container.register_type(Constructor::named("L20").construct(|_| Ok(())));

    assert!(matches!(container.make("L0"), Err(DiError::DepthExceeded(8))));
    assert!(container.make("L15").is_ok());
}

#[test]
fn test_optional_dependency_never_absorbs_cycles() {
    let container = Container::with_config(
        ContainerConfig::default().with_optional_fallback(OptionalFallback::AnyFailure),
    );
    container.register_type(
        Constructor::named("A")
            .param(Parameter::class("b", "B").nullable())
            .construct(|_| Ok(())),
    );
    container.register_type(needs("B", "A"));

    assert!(matches!(container.make("A"), Err(DiError::Circular(_))));
}
