//! Unit tests for BindingDescriptor snapshots.

use bindery::{Lifetime, Resolver, ServiceContainer};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn hello(&self) -> String;
}

struct English;

impl Greeter for English {
    fn hello(&self) -> String {
        "hello".to_string()
    }
}

#[test]
fn test_descriptor_unnamed_binding() {
    let container = ServiceContainer::new();
    container.bind_instance(42u32);

    let descriptors = container.binding_descriptors();
    assert_eq!(descriptors.len(), 1);

    let descriptor = &descriptors[0];
    assert_eq!(descriptor.name, None);
    assert!(!descriptor.is_named());
    assert_eq!(descriptor.type_name(), "u32");
    assert_ne!(descriptor.type_name(), "xyzzy");
}

#[test]
fn test_descriptor_named_binding() {
    let container = ServiceContainer::new();
    container
        .bind::<u32>()
        .named("database_port")
        .to_instance(5432);

    let descriptor = &container.binding_descriptors()[0];
    assert_eq!(descriptor.name, Some("database_port"));
    assert!(descriptor.is_named());

    // Exact value, not a placeholder
    assert_ne!(descriptor.name, Some(""));
    assert_ne!(descriptor.name, Some("xyzzy"));
}

#[test]
fn test_descriptor_trait_binding() {
    let container = ServiceContainer::new();
    container.bind_trait_instance::<dyn Greeter>(Arc::new(English));

    let descriptor = &container.binding_descriptors()[0];
    assert!(descriptor.type_name().contains("Greeter"));
    assert!(!descriptor.is_named());
    assert_eq!(descriptor.lifetime, Lifetime::Singleton);
}

#[test]
fn test_descriptor_lifetimes_per_bind_flavor() {
    let container = ServiceContainer::new();
    container.bind_instance("constant".to_string());
    container.bind_singleton(|_| 9u64);
    container.bind_transient(|_| 1u8);

    let descriptors = container.binding_descriptors();
    assert_eq!(descriptors.len(), 3);

    let constant = descriptors
        .iter()
        .find(|d| d.type_name().contains("String"))
        .unwrap();
    assert_eq!(constant.lifetime, Lifetime::Singleton);
    assert!(constant.realized);

    let lazy = descriptors.iter().find(|d| d.type_name() == "u64").unwrap();
    assert_eq!(lazy.lifetime, Lifetime::Singleton);
    assert!(!lazy.realized);

    let transient = descriptors.iter().find(|d| d.type_name() == "u8").unwrap();
    assert_eq!(transient.lifetime, Lifetime::Transient);
    assert!(!transient.realized);
}

#[test]
fn test_descriptor_realization_tracks_first_resolution() {
    let container = ServiceContainer::new();
    container.bind_singleton(|_| 9u64);

    assert!(!container.binding_descriptors()[0].realized);
    let _ = container.get::<u64>().unwrap();
    assert!(container.binding_descriptors()[0].realized);

    // Transients never report realized, however often they run.
    container.bind_transient(|_| 1u8);
    let _ = container.get::<u8>().unwrap();
    let transient = container
        .binding_descriptors()
        .into_iter()
        .find(|d| d.type_name() == "u8")
        .unwrap();
    assert!(!transient.realized);
}

#[test]
fn test_descriptor_conditional_flag() {
    let container = ServiceContainer::new();
    container.bind_instance(1u32);
    container
        .bind::<u32>()
        .named("alt")
        .when(|req| req.name() == Some("alt"))
        .to_instance(2);

    let descriptors = container.binding_descriptors();
    let plain = descriptors.iter().find(|d| !d.is_named()).unwrap();
    let guarded = descriptors.iter().find(|d| d.is_named()).unwrap();

    assert!(!plain.conditional);
    assert!(guarded.conditional);
}

#[test]
fn test_descriptor_metadata_round_trip() {
    #[derive(Debug, PartialEq)]
    struct Owner(&'static str);

    let container = ServiceContainer::new();
    container.bind_instance(1u32);
    container
        .bind::<u64>()
        .with_metadata(Owner("billing"))
        .to_instance(2);

    let descriptors = container.binding_descriptors();
    let bare = descriptors.iter().find(|d| d.type_name() == "u32").unwrap();
    let tagged = descriptors.iter().find(|d| d.type_name() == "u64").unwrap();

    assert!(!bare.has_metadata());
    assert!(tagged.has_metadata());
    assert_eq!(*tagged.metadata::<Owner>().unwrap(), Owner("billing"));

    // Downcasting to the wrong type yields nothing.
    assert!(tagged.metadata::<String>().is_none());
}

#[test]
fn test_descriptors_sorted_by_type_then_registration() {
    let container = ServiceContainer::new();
    container.bind_instance(7u32);
    container.bind_instance("text".to_string());
    container.bind::<u32>().named("alt").to_instance(8);

    let descriptors = container.binding_descriptors();
    let names: Vec<&str> = descriptors.iter().map(|d| d.type_name()).collect();
    assert_eq!(names, vec!["alloc::string::String", "u32", "u32"]);

    // Within one type, registration order is preserved.
    assert_eq!(descriptors[1].name, None);
    assert_eq!(descriptors[2].name, Some("alt"));
}

#[test]
fn test_descriptors_cover_only_this_container() {
    let parent = ServiceContainer::new();
    parent.bind_instance(7u32);

    let child = parent.create_child();
    child.bind_instance("local".to_string());

    let child_descriptors = child.binding_descriptors();
    assert_eq!(child_descriptors.len(), 1);
    assert!(child_descriptors[0].type_name().contains("String"));

    let parent_descriptors = parent.binding_descriptors();
    assert_eq!(parent_descriptors.len(), 1);
    assert_eq!(parent_descriptors[0].type_name(), "u32");
}

#[test]
fn test_descriptor_debug_format() {
    let container = ServiceContainer::new();
    container.bind_instance(1u32);

    let debug_str = format!("{:?}", container.binding_descriptors()[0]);
    assert!(debug_str.contains("BindingDescriptor"));
    assert!(debug_str.contains("key"));
    assert!(debug_str.contains("lifetime"));
    assert!(debug_str.contains("realized"));
}

#[test]
fn test_descriptor_clone() {
    let container = ServiceContainer::new();
    container
        .bind::<u32>()
        .named("port")
        .to_instance(8080);

    let descriptor = container.binding_descriptors().remove(0);
    let cloned = descriptor.clone();

    assert_eq!(descriptor.name, cloned.name);
    assert_eq!(descriptor.type_name(), cloned.type_name());
    assert_eq!(descriptor.is_named(), cloned.is_named());
    assert_eq!(descriptor.lifetime, cloned.lifetime);
    assert_eq!(descriptor.has_metadata(), cloned.has_metadata());
}
