use ferrous_container::{
    parameter_key, Concrete, Constructor, Container, DiError, Parameter, Parameters, Resolver,
};
use std::sync::Arc;

trait Filesystem: Send + Sync {
    fn name(&self) -> &'static str;
}

struct LocalDisk;
struct S3Disk;

impl Filesystem for LocalDisk {
    fn name(&self) -> &'static str {
        "local"
    }
}

impl Filesystem for S3Disk {
    fn name(&self) -> &'static str {
        "s3"
    }
}

struct PhotoController {
    disk: Arc<dyn Filesystem>,
}

struct VideoController {
    disk: Arc<dyn Filesystem>,
}

fn disk_container() -> Container {
    let container = Container::new();
    container.register_type(Constructor::interface("Filesystem"));
    container.register_type(
        Constructor::named("LocalDisk").construct(|_| Ok(Arc::new(LocalDisk) as Arc<dyn Filesystem>)),
    );
    container.register_type(
        Constructor::named("S3Disk").construct(|_| Ok(Arc::new(S3Disk) as Arc<dyn Filesystem>)),
    );
    container.register_type(
        Constructor::named("PhotoController")
            .param(Parameter::class("disk", "Filesystem"))
            .construct(|args| Ok(PhotoController { disk: args.get_trait("disk")? })),
    );
    container.register_type(
        Constructor::named("VideoController")
            .param(Parameter::class("disk", "Filesystem"))
            .construct(|args| Ok(VideoController { disk: args.get_trait("disk")? })),
    );
    container.singleton("Filesystem", "LocalDisk").unwrap();
    container
}

#[test]
fn contextual_binding_overrides_only_inside_its_consumer() {
    let container = disk_container();
    container.when("VideoController").needs("Filesystem").give("S3Disk").unwrap();

    let photos: Arc<PhotoController> = container.make_as("PhotoController").unwrap();
    let videos: Arc<VideoController> = container.make_as("VideoController").unwrap();

    assert_eq!(photos.disk.name(), "local");
    assert_eq!(videos.disk.name(), "s3");
    assert_eq!(container.make_trait::<dyn Filesystem>("Filesystem").unwrap().name(), "local");
}

#[test]
fn contextual_builds_do_not_touch_the_shared_cache() {
    let container = disk_container();
    container.when("VideoController").needs("Filesystem").give("S3Disk").unwrap();

    container.make("VideoController").unwrap();

    let shared = container.make_trait::<dyn Filesystem>("Filesystem").unwrap();
    let again = container.make_trait::<dyn Filesystem>("Filesystem").unwrap();
    assert_eq!(shared.name(), "local");
    assert!(Arc::ptr_eq(&shared, &again));
}

#[test]
fn contextual_binding_matches_aliases_of_the_needed_abstract() {
    let container = disk_container();
    container.alias("Filesystem", "files").unwrap();
    container.when("VideoController").needs("files").give("S3Disk").unwrap();

    let videos: Arc<VideoController> = container.make_as("VideoController").unwrap();
    assert_eq!(videos.disk.name(), "s3");
}

#[test]
fn contextual_binding_accepts_factories() {
    let container = disk_container();
    container
        .when("PhotoController")
        .needs("Filesystem")
        .give(Concrete::factory(|ctx, _| {
            // The factory runs while PhotoController is on the build stack
            assert_eq!(ctx.current_concrete(), Some("PhotoController"));
            Ok(Arc::new(S3Disk) as Arc<dyn Filesystem>)
        }))
        .unwrap();

    let photos: Arc<PhotoController> = container.make_as("PhotoController").unwrap();
    assert_eq!(photos.disk.name(), "s3");
}

#[test]
fn only_the_innermost_build_frame_is_consulted() {
    let container = disk_container();
    container.register_type(
        Constructor::named("Gallery")
            .param(Parameter::class("photos", "PhotoController"))
            .construct(|args| Ok(args.get::<PhotoController>("photos")?.disk.name())),
    );
    // Keyed to Gallery, but the disk is needed by PhotoController
    container.when("Gallery").needs("Filesystem").give("S3Disk").unwrap();

    assert_eq!(*container.make_as::<&'static str>("Gallery").unwrap(), "local");
}

#[test]
fn primitive_parameters_take_contextual_values() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Mailer")
            .param(Parameter::primitive("host"))
            .param(Parameter::primitive("port").default(25u16))
            .construct(|args| {
                Ok(format!("{}:{}", args.get::<String>("host")?, args.get::<u16>("port")?))
            }),
    );

    container
        .when("Mailer")
        .needs(parameter_key("host"))
        .give_value("smtp.example.com".to_string())
        .unwrap();
    container
        .when("Mailer")
        .needs("$port")
        .give(Concrete::factory(|_, _| Ok(587u16)))
        .unwrap();

    assert_eq!(*container.make_as::<String>("Mailer").unwrap(), "smtp.example.com:587");
}

#[test]
fn primitive_contextual_type_names_are_literal_values() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Queue")
            .param(Parameter::primitive("connection"))
            .construct(|args| args.get_cloned::<String>("connection")),
    );
    container.when("Queue").needs("$connection").give("redis").unwrap();

    assert_eq!(*container.make_as::<String>("Queue").unwrap(), "redis");
}

#[test]
fn missing_primitive_is_unresolvable() {
    let container = Container::new();
    container.register_type(
        Constructor::named("Mailer")
            .param(Parameter::primitive("host"))
            .construct(|args| args.get_cloned::<String>("host")),
    );

    match container.make("Mailer") {
        Err(DiError::UnresolvableDependency { parameter, declaring, chain }) => {
            assert_eq!(parameter, "host");
            assert_eq!(declaring, "Mailer");
            assert_eq!(chain, vec!["Mailer"]);
        }
        other => panic!("expected unresolvable dependency, got {:?}", other.map(|_| ())),
    }

    // Caller overrides satisfy it
    let built = container
        .make_with("Mailer", Parameters::new().with("host", "localhost".to_string()))
        .unwrap();
    assert_eq!(built.downcast_ref::<String>().unwrap(), "localhost");
}

#[test]
fn nested_make_from_a_factory_sees_the_enclosing_frame() {
    let container = disk_container();
    container
        .bind(
            "disk.name",
            Concrete::factory(|ctx, _| {
                let disk = ctx.make_trait::<dyn Filesystem>("Filesystem")?;
                Ok(disk.name())
            }),
            false,
        )
        .unwrap();
    container.register_type(
        Constructor::named("Uploader")
            .param(Parameter::class("disk", "disk.name"))
            .construct(|args| Ok(*args.get::<&'static str>("disk")?)),
    );
    container.when("Uploader").needs("Filesystem").give("S3Disk").unwrap();

    // The factory runs with Uploader on top of the build stack
    assert_eq!(*container.make_as::<&'static str>("Uploader").unwrap(), "s3");
    assert_eq!(*container.make_as::<&'static str>("disk.name").unwrap(), "local");
}
