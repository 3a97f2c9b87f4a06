use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use bindery::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("singleton_hit");

    let locked = ServiceContainer::new();
    locked.bind_instance(42u64);
    let _ = locked.get::<u64>().unwrap();

    group.bench_function("locked", |b| {
        b.iter(|| {
            let v = locked.get::<u64>().unwrap();
            black_box(v);
        })
    });

    let lock_free =
        ServiceContainer::with_options(ContainerOptions::new().with_lock_free_reads(true));
    lock_free.bind_instance(42u64);
    let _ = lock_free.get::<u64>().unwrap();

    group.bench_function("lock_free", |b| {
        b.iter(|| {
            let v = lock_free.get::<u64>().unwrap();
            black_box(v);
        })
    });

    group.finish();
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let container = ServiceContainer::new();
                container.bind_singleton::<ExpensiveToCreate, _>(|_| ExpensiveToCreate {
                    data: (0..1000).collect(),
                });
                container
            },
            |container| {
                let v = container.get::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_transient(c: &mut Criterion) {
    #[derive(Clone)]
    struct Service {
        data: [u8; 64],
    }

    let container = ServiceContainer::new();
    container.bind_transient::<Service, _>(|_| Service { data: [0; 64] });

    c.bench_function("transient", |b| {
        b.iter(|| {
            let v = container.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    trait MyTrait: Send + Sync {
        fn value(&self) -> u64;
    }

    struct ConcreteImpl {
        val: u64,
    }

    impl MyTrait for ConcreteImpl {
        fn value(&self) -> u64 {
            self.val
        }
    }

    let mut group = c.benchmark_group("concrete_vs_trait");

    let concrete = ServiceContainer::new();
    concrete.bind_instance(ConcreteImpl { val: 42 });

    group.bench_function("concrete", |b| {
        b.iter(|| {
            let v = concrete.get::<ConcreteImpl>().unwrap();
            black_box(v.val);
        })
    });

    let with_trait = ServiceContainer::new();
    with_trait.bind_trait_instance::<dyn MyTrait>(Arc::new(ConcreteImpl { val: 42 }));

    group.bench_function("trait_single", |b| {
        b.iter(|| {
            let v = with_trait.get_trait::<dyn MyTrait>().unwrap();
            black_box(v.value());
        })
    });

    group.finish();
}

fn bench_multi_binding_scaling(c: &mut Criterion) {
    trait Handler: Send + Sync {
        fn id(&self) -> usize;
    }

    struct HandlerImpl(usize);
    impl Handler for HandlerImpl {
        fn id(&self) -> usize {
            self.0
        }
    }

    let mut group = c.benchmark_group("multi_binding");

    for &count in &[1usize, 4, 16, 64] {
        let container = ServiceContainer::new();
        for i in 0..count {
            container.bind_trait_instance::<dyn Handler>(Arc::new(HandlerImpl(i)));
        }

        group.bench_with_input(BenchmarkId::new("get_all", count), &count, |b, _| {
            b.iter(|| {
                let handlers = container.get_all_trait::<dyn Handler>().unwrap();
                black_box(handlers.len());
            })
        });
    }

    group.finish();
}

fn bench_parent_chain_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("parent_chain");

    for &depth in &[1, 4, 8] {
        let root = ServiceContainer::new();
        root.bind_instance(42u64);

        let mut chain = vec![root];
        for _ in 0..depth {
            let next = chain.last().unwrap().create_child();
            chain.push(next);
        }
        let leaf = chain.last().unwrap().clone();

        group.bench_with_input(BenchmarkId::new("resolve_root", depth), &depth, |b, _| {
            b.iter(|| {
                let v = leaf.get::<u64>().unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_dependency_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_tracking");

    // Non-circular chain of depth 8; every hop pays the stack guard.
    struct Service1;
    struct Service2 { _s1: Arc<Service1> }
    struct Service3 { _s2: Arc<Service2> }
    struct Service4 { _s3: Arc<Service3> }
    struct Service5 { _s4: Arc<Service4> }
    struct Service6 { _s5: Arc<Service5> }
    struct Service7 { _s6: Arc<Service6> }
    struct Service8 { _s7: Arc<Service7> }

    let container = ServiceContainer::new();
    container.bind_instance(Service1);
    container.bind_transient::<Service2, _>(|ctx| Service2 { _s1: ctx.get_required() });
    container.bind_transient::<Service3, _>(|ctx| Service3 { _s2: ctx.get_required() });
    container.bind_transient::<Service4, _>(|ctx| Service4 { _s3: ctx.get_required() });
    container.bind_transient::<Service5, _>(|ctx| Service5 { _s4: ctx.get_required() });
    container.bind_transient::<Service6, _>(|ctx| Service6 { _s5: ctx.get_required() });
    container.bind_transient::<Service7, _>(|ctx| Service7 { _s6: ctx.get_required() });
    container.bind_transient::<Service8, _>(|ctx| Service8 { _s7: ctx.get_required() });

    group.bench_function("chain_depth_8", |b| {
        b.iter(|| {
            let service = container.get::<Service8>().unwrap();
            black_box(&service);
        })
    });

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    for (label, options) in [
        ("locked", ContainerOptions::new()),
        ("lock_free", ContainerOptions::new().with_lock_free_reads(true)),
    ] {
        let container = ServiceContainer::with_options(options);
        container.bind_instance(42u64);
        let _ = container.get::<u64>().unwrap();

        for &thread_count in &[1, 4, 8] {
            group.bench_with_input(
                BenchmarkId::new(label, thread_count),
                &thread_count,
                |b, &threads| {
                    b.iter_custom(|iters| {
                        let start = std::time::Instant::now();
                        crossbeam_utils::thread::scope(|s| {
                            for _ in 0..threads {
                                let container_ref = &container;
                                s.spawn(move |_| {
                                    for _ in 0..iters / threads as u64 {
                                        let v = container_ref.get::<u64>().unwrap();
                                        black_box(v);
                                    }
                                });
                            }
                        })
                        .unwrap();
                        start.elapsed()
                    })
                },
            );
        }
    }

    group.finish();
}

// ===== Expression Benchmarks =====

struct Payload {
    total: f64,
}

fn payload_env() -> EvalEnv {
    let registry = TypeRegistry::new();
    registry.register::<Payload>(|t| {
        t.property("total", StaticType::Float, |p| Value::Float(p.total));
        t.method("scaled", &[ParamType::Int], StaticType::Float, |p, args| {
            Ok(Value::Float(p.total * args[0].as_i64().unwrap_or(1) as f64))
        });
        t.method("scaled", &[ParamType::Float], StaticType::Float, |p, args| {
            Ok(Value::Float(p.total * args[0].as_f64().unwrap_or(1.0)))
        });
        t.method("scaled", &[ParamType::Any], StaticType::Float, |p, _| {
            Ok(Value::Float(p.total))
        });
    });
    EvalEnv::new(Arc::new(registry))
}

fn arithmetic_ast() -> ExprNode {
    ExprNode::binary(
        BinaryOp::Add,
        ExprNode::binary(BinaryOp::Mul, ExprNode::source(0), ExprNode::constant(2i64)),
        ExprNode::constant(1i64),
    )
}

fn bench_expression_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression");

    group.bench_function("first_compile", |b| {
        b.iter_batched(
            || CompiledExpression::new(arithmetic_ast(), EvalEnv::default()),
            |expr| {
                let v = expr.invoke(&[Value::Int(20)]).unwrap();
                black_box(v);
            },
            criterion::BatchSize::SmallInput,
        )
    });

    let cached = CompiledExpression::new(arithmetic_ast(), EvalEnv::default());
    let _ = cached.invoke(&[Value::Int(20)]).unwrap();

    group.bench_function("cached_invoke", |b| {
        b.iter(|| {
            let v = cached.invoke(&[Value::Int(20)]).unwrap();
            black_box(v);
        })
    });

    // Two delegates stay cached; each call pays only the signature lookup.
    let alternating = CompiledExpression::new(arithmetic_ast(), EvalEnv::default());
    let _ = alternating.invoke(&[Value::Int(20)]).unwrap();
    let _ = alternating.invoke(&[Value::Float(20.0)]).unwrap();

    group.bench_function("signature_switch", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let arg = if flip { Value::Int(20) } else { Value::Float(20.0) };
            let v = alternating.invoke(&[arg]).unwrap();
            black_box(v);
        })
    });

    group.finish();
}

fn bench_overload_dispatch(c: &mut Criterion) {
    let ast = ExprNode::call(
        ExprNode::source(0),
        "scaled",
        vec![ExprNode::constant(3i64)],
    );
    let expr = CompiledExpression::new(ast, payload_env());
    let payload = Value::obj(Payload { total: 12.5 });
    let _ = expr.invoke(&[payload.clone()]).unwrap();

    c.bench_function("overload_dispatch_cached", |b| {
        b.iter(|| {
            let v = expr.invoke(&[payload.clone()]).unwrap();
            black_box(v);
        })
    });
}

// ===== Macro Benchmarks =====

fn bench_mixed_workload(c: &mut Criterion) {
    // Realistic mix: 70% singleton hits, 20% cached expression calls,
    // 10% transient activations.
    struct SingletonService(u64);
    struct TransientService(u64);

    let container = ServiceContainer::new();
    container.bind_instance(SingletonService(1));
    container.bind_transient::<TransientService, _>(|_| TransientService(3));
    let _ = container.get::<SingletonService>().unwrap();

    let expr = CompiledExpression::new(arithmetic_ast(), EvalEnv::default());
    let _ = expr.invoke(&[Value::Int(7)]).unwrap();

    c.bench_function("mixed_workload_realistic", |b| {
        b.iter(|| {
            for _ in 0..7 {
                let v = container.get::<SingletonService>().unwrap();
                black_box(v.0);
            }

            for _ in 0..2 {
                let v = expr.invoke(&[Value::Int(7)]).unwrap();
                black_box(v);
            }

            let v = container.get::<TransientService>().unwrap();
            black_box(v.0);
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_transient,
    bench_concrete_vs_trait,
    bench_multi_binding_scaling,
    bench_parent_chain_walk,
    bench_dependency_chain_depth,
    bench_contention
);

criterion_group!(expression_benches, bench_expression_compile, bench_overload_dispatch);

criterion_group!(macro_benches, bench_mixed_workload);

criterion_main!(micro_benches, expression_benches, macro_benches);
