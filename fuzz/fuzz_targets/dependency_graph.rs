#![no_main]

use bindery::{ActivationContext, BindError, Resolver, ServiceContainer};
use libfuzzer_sys::fuzz_target;

// Fixed node universe; the input bytes wire the edges between them.
struct Node0;
struct Node1;
struct Node2;
struct Node3;
struct Node4;
struct Node5;
struct Node6;
struct Node7;

fn resolve_edge(ctx: &ActivationContext<'_>, edge: u8) {
    // A cyclic edge fails the nested lookup. The factory ignores the error
    // and still builds its node; the harness only requires that the failure
    // arrives as a value instead of unwinding.
    match edge % 9 {
        0 => drop(ctx.dep::<Node0>()),
        1 => drop(ctx.dep::<Node1>()),
        2 => drop(ctx.dep::<Node2>()),
        3 => drop(ctx.dep::<Node3>()),
        4 => drop(ctx.dep::<Node4>()),
        5 => drop(ctx.dep::<Node5>()),
        6 => drop(ctx.dep::<Node6>()),
        7 => drop(ctx.dep::<Node7>()),
        // 8 = leaf, no dependency
        _ => {}
    }
}

fn assert_structured<T: Send + Sync + 'static>(container: &ServiceContainer) {
    match container.get::<T>() {
        Ok(_) => {}
        // A reported cycle carries the offending path, and detection never
        // degenerates into a crash or stack overflow.
        Err(BindError::CircularDependency(path)) => assert!(!path.is_empty()),
        Err(other) => panic!("unexpected failure: {:?}", other),
    }
}

macro_rules! bind_node {
    ($container:expr, $singleton:expr, $edge:expr, $ty:ident) => {
        let edge = $edge;
        if $singleton {
            $container.bind_singleton::<$ty, _>(move |ctx| {
                resolve_edge(ctx, edge);
                $ty
            });
        } else {
            $container.bind_transient::<$ty, _>(move |ctx| {
                resolve_edge(ctx, edge);
                $ty
            });
        }
    };
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }

    let singleton = data[8] & 1 == 1;
    let container = ServiceContainer::new();

    bind_node!(container, singleton, data[0], Node0);
    bind_node!(container, singleton, data[1], Node1);
    bind_node!(container, singleton, data[2], Node2);
    bind_node!(container, singleton, data[3], Node3);
    bind_node!(container, singleton, data[4], Node4);
    bind_node!(container, singleton, data[5], Node5);
    bind_node!(container, singleton, data[6], Node6);
    bind_node!(container, singleton, data[7], Node7);

    assert_structured::<Node0>(&container);
    assert_structured::<Node1>(&container);
    assert_structured::<Node2>(&container);
    assert_structured::<Node3>(&container);
    assert_structured::<Node4>(&container);
    assert_structured::<Node5>(&container);
    assert_structured::<Node6>(&container);
    assert_structured::<Node7>(&container);
});
