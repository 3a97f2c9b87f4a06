use bindery::{BindError, Resolver, ServiceContainer};
use std::sync::{Arc, Mutex};

#[test]
fn test_concrete_singleton() {
    let container = ServiceContainer::new();
    container.bind_instance(42usize);
    container.bind_instance("hello".to_string());

    let num1 = container.get_required::<usize>();
    let num2 = container.get_required::<usize>();
    let str1 = container.get_required::<String>();
    let str2 = container.get_required::<String>();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2)); // Same instance
    assert!(Arc::ptr_eq(&str1, &str2)); // Same instance
}

#[test]
fn test_factory_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let container = ServiceContainer::new();
    container.bind_instance(Config { port: 8080 });
    container.bind_singleton(|ctx| Server {
        config: ctx.get_required::<Config>(),
        name: "MyServer".to_string(),
    });

    let server = container.get_required::<Server>();

    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_singleton_factory_runs_once() {
    let calls = Arc::new(Mutex::new(0));
    let calls_clone = calls.clone();

    let container = ServiceContainer::new();
    container.bind_singleton(move |_| {
        *calls_clone.lock().unwrap() += 1;
        "built".to_string()
    });

    let a = container.get_required::<String>();
    let b = container.get_required::<String>();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn test_transient_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let container = ServiceContainer::new();
    container.bind_transient(move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        format!("instance-{}", *c)
    });

    let a = container.get_required::<String>();
    let b = container.get_required::<String>();
    let c = container.get_required::<String>();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");

    // All different instances
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn test_not_found_error() {
    struct UnregisteredType;

    let container = ServiceContainer::new();

    let result = container.get::<UnregisteredType>();
    assert!(matches!(result, Err(BindError::BindingNotFound(_))));
}

#[test]
fn test_duplicate_unnamed_bindings_are_ambiguous() {
    let container = ServiceContainer::new();
    container.bind_instance(1usize);
    container.bind_instance(2usize);

    // Bindings append rather than replace; a single-result request
    // with two live candidates must fail loudly.
    match container.get::<usize>() {
        Err(BindError::AmbiguousBinding(_, count)) => assert_eq!(count, 2),
        other => panic!("expected ambiguity error, got {:?}", other),
    }

    // Collection access still sees both, in registration order.
    let all = container.get_all::<usize>().unwrap();
    let values: Vec<usize> = all.iter().map(|v| **v).collect();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn test_unbind_removes_binding_list() {
    let container = ServiceContainer::new();
    container.bind_instance(7u32);

    assert!(container.can_resolve::<u32>());
    assert!(container.unbind::<u32>());
    assert!(!container.unbind::<u32>());
    assert!(container.get::<u32>().is_err());
}

#[test]
fn test_unbind_then_rebind_resolves_fresh_value() {
    let container = ServiceContainer::new();
    container.bind_instance("first".to_string());
    assert_eq!(container.get_required::<String>().as_str(), "first");

    container.unbind::<String>();
    container.bind_instance("second".to_string());
    assert_eq!(container.get_required::<String>().as_str(), "second");
}

#[test]
fn test_complex_dependency_graph() {
    struct A {
        value: i32,
    }

    struct B {
        a: Arc<A>,
    }

    struct C {
        a: Arc<A>,
        b: Arc<B>,
    }

    let container = ServiceContainer::new();

    container.bind_instance(A { value: 100 });
    container.bind_singleton(|ctx| B {
        a: ctx.get_required::<A>(),
    });
    container.bind_singleton(|ctx| C {
        a: ctx.get_required::<A>(),
        b: ctx.get_required::<B>(),
    });

    let c = container.get_required::<C>();

    assert_eq!(c.a.value, 100);
    assert_eq!(c.b.a.value, 100);
    // A is a singleton, so both paths see the same instance
    assert!(Arc::ptr_eq(&c.a, &c.b.a));
}

#[test]
fn test_can_resolve_does_not_build() {
    let built = Arc::new(Mutex::new(false));
    let built_clone = built.clone();

    let container = ServiceContainer::new();
    container.bind_singleton(move |_| {
        *built_clone.lock().unwrap() = true;
        3u64
    });

    assert!(container.can_resolve::<u64>());
    assert!(!*built.lock().unwrap());

    let _ = container.get_required::<u64>();
    assert!(*built.lock().unwrap());
}

#[test]
fn test_injectable_fallback_construction() {
    use bindery::{ActivationContext, BindResult, Injectable};

    struct Settings {
        limit: usize,
    }

    struct Worker {
        settings: Arc<Settings>,
    }

    impl Injectable for Worker {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            Ok(Worker {
                settings: ctx.dep::<Settings>()?,
            })
        }
    }

    let container = ServiceContainer::new();
    container.bind_instance(Settings { limit: 16 });

    // No Worker binding; the constructor fallback builds it.
    let first = container.resolve::<Worker>().unwrap();
    let second = container.resolve::<Worker>().unwrap();
    assert_eq!(first.settings.limit, 16);
    // Fallback construction is transient
    assert!(!Arc::ptr_eq(&first, &second));

    // An explicit binding takes precedence over the constructor.
    container.bind_singleton(|ctx| Worker {
        settings: ctx.get_required::<Settings>(),
    });
    let bound_a = container.resolve::<Worker>().unwrap();
    let bound_b = container.resolve::<Worker>().unwrap();
    assert!(Arc::ptr_eq(&bound_a, &bound_b));
}
