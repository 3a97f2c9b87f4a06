use bindery::{ActivationParams, BindError, Resolver, ServiceContainer};
use std::sync::Arc;

#[test]
fn test_named_bindings_are_isolated_from_unnamed() {
    let container = ServiceContainer::new();
    container.bind::<u32>().named("port").to_instance(8080);
    container.bind::<u32>().named("retries").to_instance(3);

    assert_eq!(*container.get_named::<u32>("port").unwrap(), 8080);
    assert_eq!(*container.get_named::<u32>("retries").unwrap(), 3);

    // No unnamed binding exists.
    assert!(matches!(
        container.get::<u32>(),
        Err(BindError::BindingNotFound(_))
    ));
    // And an unknown name finds nothing.
    assert!(container.get_named::<u32>("timeout").is_err());
}

#[test]
fn test_unnamed_binding_never_matches_named_request() {
    let container = ServiceContainer::new();
    container.bind_instance(42u32);

    assert_eq!(*container.get::<u32>().unwrap(), 42);
    assert!(container.get_named::<u32>("port").is_err());
    assert!(!container.can_resolve_named::<u32>("port"));
}

#[test]
fn test_conditional_binding_applies_per_request() {
    let container = ServiceContainer::new();
    container
        .bind::<String>()
        .when(|req| req.params().is_some())
        .to_instance("parameterized".to_string());
    container
        .bind::<String>()
        .when(|req| req.params().is_none())
        .to_instance("plain".to_string());

    let plain = container.get::<String>().unwrap();
    assert_eq!(plain.as_str(), "plain");

    let with_params = container
        .get_with::<String>(ActivationParams::new().with("anything", 1u8))
        .unwrap();
    assert_eq!(with_params.as_str(), "parameterized");
}

#[test]
fn test_overlapping_conditions_are_ambiguous() {
    let container = ServiceContainer::new();
    container
        .bind::<String>()
        .when(|_| true)
        .to_instance("first".to_string());
    container
        .bind::<String>()
        .when(|_| true)
        .to_instance("second".to_string());

    match container.get::<String>() {
        Err(BindError::AmbiguousBinding(_, count)) => assert_eq!(count, 2),
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_condition_and_name_compose() {
    let container = ServiceContainer::new();
    container
        .bind::<u64>()
        .named("budget")
        .when(|req| {
            req.params()
                .and_then(|p| p.get::<bool>("premium"))
                .map(|premium| *premium)
                .unwrap_or(false)
        })
        .to_instance(1000);
    container.bind::<u64>().named("budget").to_instance(100);

    // Without the premium flag only the unconditional named binding matches.
    assert_eq!(*container.get_named::<u64>("budget").unwrap(), 100);

    // With it, both match: ambiguous.
    let premium = ActivationParams::new().with("premium", true);
    assert!(container.get_named_with::<u64>("budget", premium).is_err());
}

#[test]
fn test_factory_reads_activation_params() {
    struct Session {
        user: String,
    }

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| Session {
        user: ctx
            .param::<String>("user")
            .map(|u| (*u).clone())
            .unwrap_or_else(|| "anonymous".to_string()),
    });

    let anon = container.get::<Session>().unwrap();
    assert_eq!(anon.user, "anonymous");

    let named = container
        .get_with::<Session>(ActivationParams::new().with("user", "ada".to_string()))
        .unwrap();
    assert_eq!(named.user, "ada");
}

#[test]
fn test_params_do_not_leak_into_dependencies() {
    struct Inner {
        saw_param: bool,
    }
    struct Outer {
        inner: Arc<Inner>,
        saw_param: bool,
    }

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| Inner {
        saw_param: ctx.param::<u8>("flag").is_some(),
    });
    container.bind_transient(|ctx| Outer {
        inner: ctx.get_required::<Inner>(),
        saw_param: ctx.param::<u8>("flag").is_some(),
    });

    let outer = container
        .get_with::<Outer>(ActivationParams::new().with("flag", 1u8))
        .unwrap();

    assert!(outer.saw_param);
    // The nested resolution is a fresh request without parameters.
    assert!(!outer.inner.saw_param);
}

#[test]
fn test_required_param_errors_when_absent() {
    struct Job {
        priority: u8,
    }

    let container = ServiceContainer::new();
    container.bind_transient(|ctx| Job {
        priority: ctx
            .required_param::<u8>("priority")
            .map(|p| *p)
            .unwrap_or(0),
    });

    let with = container
        .get_with::<Job>(ActivationParams::new().with("priority", 7u8))
        .unwrap();
    assert_eq!(with.priority, 7);

    let without = container.get::<Job>().unwrap();
    assert_eq!(without.priority, 0);
}

#[test]
fn test_singleton_memoizes_ahead_of_conditions() {
    // A singleton selected once under a condition keeps its memoized value
    // even if later requests arrive with different parameters.
    let container = ServiceContainer::new();
    container.bind_singleton(|ctx| {
        ctx.param::<u32>("seed").map(|s| *s).unwrap_or(0)
    });

    let seeded = container
        .get_with::<u32>(ActivationParams::new().with("seed", 11u32))
        .unwrap();
    assert_eq!(*seeded, 11);

    let plain = container.get::<u32>().unwrap();
    assert_eq!(*plain, 11);
    assert!(Arc::ptr_eq(&seeded, &plain));
}
