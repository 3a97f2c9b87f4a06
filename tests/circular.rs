use bindery::{
    ActivationContext, BindError, BindResult, ContainerOptions, Injectable, Resolver,
    ServiceContainer,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Helper: assert that `f()` panics and the message names every element of
/// `expected_path`. Factories are infallible, so a cycle reached through
/// `get_required` surfaces as a panic whose message carries the cycle path.
fn assert_circular_panics<F>(f: F, expected_path: &[&'static str])
where
    F: FnOnce(),
{
    let res = catch_unwind(AssertUnwindSafe(f));
    let err = match res {
        Ok(()) => panic!("expected panic due to circular dependency"),
        Err(payload) => payload,
    };

    let message = if let Some(msg) = err.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = err.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else {
        panic!("panic payload was not a message");
    };

    for element in expected_path {
        assert!(
            message.contains(element),
            "panic message missing path element '{}'; got: {}",
            element,
            message
        );
    }
}

#[test]
fn test_self_circular_dependency() {
    #[derive(Debug)]
    struct SelfReferencing;

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| {
        let _ = ctx.get::<SelfReferencing>();
        SelfReferencing
    });

    // The repeat entry is detected below the top-level catch, so the
    // caller sees a clean error carrying the two-element path.
    match container.get::<SelfReferencing>() {
        Err(BindError::CircularDependency(path)) => {
            assert_eq!(path.len(), 2);
            assert!(path[0].contains("SelfReferencing"));
            assert!(path[1].contains("SelfReferencing"));
        }
        other => panic!("expected circular error, got {:?}", other),
    }
}

#[test]
fn test_two_level_circular() {
    struct A {
        #[allow(dead_code)]
        b: Arc<B>,
    }

    struct B {
        #[allow(dead_code)]
        a: Arc<A>,
    }

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| A {
        b: ctx.get_required::<B>(),
    });
    container.bind_transient(|ctx| B {
        a: ctx.get_required::<A>(),
    });

    assert_circular_panics(
        || {
            let _ = container.get::<A>();
        },
        &[
            "circular::test_two_level_circular::A",
            "circular::test_two_level_circular::B",
        ],
    );
}

#[test]
fn test_circular_with_traits() {
    trait ServiceA: Send + Sync {}
    trait ServiceB: Send + Sync {}

    struct ImplA {
        #[allow(dead_code)]
        b: Arc<dyn ServiceB>,
    }
    impl ServiceA for ImplA {}

    struct ImplB {
        #[allow(dead_code)]
        a: Arc<dyn ServiceA>,
    }
    impl ServiceB for ImplB {}

    let container = ServiceContainer::new();
    container.bind_singleton_trait::<dyn ServiceA, _>(|ctx| {
        Arc::new(ImplA {
            b: ctx.get_required_trait::<dyn ServiceB>(),
        })
    });
    container.bind_singleton_trait::<dyn ServiceB, _>(|ctx| {
        Arc::new(ImplB {
            a: ctx.get_required_trait::<dyn ServiceA>(),
        })
    });

    assert_circular_panics(
        || {
            let _ = container.get_trait::<dyn ServiceA>();
        },
        &[
            "circular::test_circular_with_traits::ServiceA",
            "circular::test_circular_with_traits::ServiceB",
        ],
    );
}

#[test]
fn test_circular_injectable_chain_reports_full_path() {
    #[derive(Debug)]
    struct Ping {
        #[allow(dead_code)]
        pong: Arc<Pong>,
    }
    #[derive(Debug)]
    struct Pong {
        #[allow(dead_code)]
        ping: Arc<Ping>,
    }

    impl Injectable for Ping {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            Ok(Ping {
                pong: ctx.activate::<Pong>()?,
            })
        }
    }
    impl Injectable for Pong {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            Ok(Pong {
                ping: ctx.activate::<Ping>()?,
            })
        }
    }

    let container = ServiceContainer::new();

    // Constructor fallbacks propagate errors instead of panicking, so the
    // whole cycle path arrives as an error value.
    match container.resolve::<Ping>() {
        Err(BindError::CircularDependency(path)) => {
            assert_eq!(path.len(), 3);
            assert!(path[0].contains("Ping"));
            assert!(path[1].contains("Pong"));
            assert!(path[2].contains("Ping"));
        }
        other => panic!("expected circular error, got {:?}", other),
    }
}

#[test]
fn test_named_dependency_on_same_type_is_not_a_cycle() {
    let container = ServiceContainer::new();
    container
        .bind::<String>()
        .named("base")
        .to_instance("plain".to_string());
    // Decorator: the unnamed binding wraps the named one of the same type.
    // Name participates in cycle tracking, so this chain is legal.
    container.bind_singleton(|ctx| {
        let base = ctx.get_named::<String>("base").expect("named binding");
        format!("{}+decorated", base)
    });

    let value = container.get_required::<String>();
    assert_eq!(value.as_str(), "plain+decorated");
}

#[test]
fn test_container_recovers_after_cycle() {
    struct Loopy;

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| {
        let _ = ctx.get::<Loopy>();
        Loopy
    });
    container.bind_instance(5u8);

    assert!(matches!(
        container.get::<Loopy>(),
        Err(BindError::CircularDependency(_))
    ));

    // The thread-local stack unwound cleanly: other resolutions work, and
    // rebinding clears the cycle.
    assert_eq!(*container.get_required::<u8>(), 5);
    container.unbind::<Loopy>();
    container.bind_instance(Loopy);
    assert!(container.get::<Loopy>().is_ok());
}

#[test]
fn test_depth_limit_cuts_deep_acyclic_chain() {
    #[derive(Debug)]
    struct D0;
    struct D1;
    struct D2;
    struct D3;

    impl Injectable for D0 {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            ctx.activate::<D1>()?;
            Ok(D0)
        }
    }
    impl Injectable for D1 {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            ctx.activate::<D2>()?;
            Ok(D1)
        }
    }
    impl Injectable for D2 {
        fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
            ctx.activate::<D3>()?;
            Ok(D2)
        }
    }
    impl Injectable for D3 {
        fn build(_: &ActivationContext<'_>) -> BindResult<Self> {
            Ok(D3)
        }
    }

    let container =
        ServiceContainer::with_options(ContainerOptions::new().with_max_resolve_depth(3));

    match container.resolve::<D0>() {
        Err(BindError::DepthExceeded(depth)) => assert_eq!(depth, 3),
        other => panic!("expected depth error, got {:?}", other),
    }

    // A generous limit lets the same chain build.
    let roomy = ServiceContainer::new();
    assert!(roomy.resolve::<D0>().is_ok());
}
