#![no_main]

use bindery::{BindError, Resolver, ServiceContainer};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct TestService {
    value: i32,
}

trait TestTrait: Send + Sync {
    fn get_value(&self) -> i32;
}

#[derive(Debug)]
struct TestServiceImpl {
    value: i32,
}

impl TestTrait for TestServiceImpl {
    fn get_value(&self) -> i32 {
        self.value
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let container = ServiceContainer::new();

    // First 4 bytes pick the binding pattern, next 4 the service value.
    let pattern = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let value = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    match pattern % 8 {
        0 => {
            container.bind_instance(TestService { value });

            let service = container.get::<TestService>().unwrap();
            assert_eq!(service.value, value);
        }
        1 => {
            container.bind_singleton::<TestService, _>(move |_| TestService { value });

            let first = container.get::<TestService>().unwrap();
            let second = container.get::<TestService>().unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.value, value);
        }
        2 => {
            container.bind_transient::<TestService, _>(move |_| TestService { value });

            let first = container.get::<TestService>().unwrap();
            let second = container.get::<TestService>().unwrap();
            assert!(!Arc::ptr_eq(&first, &second));
            assert_eq!(first.value, value);
            assert_eq!(second.value, value);
        }
        3 => {
            // Binding twice appends; a plain get must report the ambiguity
            // and get_all must keep registration order.
            container.bind_instance(TestService { value: value.wrapping_div(2) });
            container.bind_instance(TestService { value });

            match container.get::<TestService>() {
                Err(BindError::AmbiguousBinding(_, 2)) => {}
                other => panic!("expected ambiguity, got {:?}", other.map(|_| ())),
            }

            let all = container.get_all::<TestService>().unwrap();
            assert_eq!(all.len(), 2);
            assert_eq!(all[0].value, value.wrapping_div(2));
            assert_eq!(all[1].value, value);
        }
        4 => {
            container
                .bind::<TestService>()
                .named("primary")
                .to_instance(TestService { value });

            let named = container.get_named::<TestService>("primary").unwrap();
            assert_eq!(named.value, value);

            // The named binding is invisible to unnamed requests.
            assert!(container.get::<TestService>().is_err());
            assert!(container.get_named::<TestService>("secondary").is_err());
        }
        5 => {
            container.bind_trait_instance::<dyn TestTrait>(Arc::new(TestServiceImpl { value }));

            let service = container.get_required_trait::<dyn TestTrait>();
            assert_eq!(service.get_value(), value);
        }
        6 => {
            container.bind_instance(TestService { value });
            assert!(container.can_resolve::<TestService>());

            assert!(container.unbind::<TestService>());
            assert!(container.get::<TestService>().is_err());
            assert!(!container.unbind::<TestService>());
        }
        7 => {
            container.bind_instance(TestService { value });

            let child = container.create_child();
            assert_eq!(child.get::<TestService>().unwrap().value, value);

            child.bind_instance(TestService {
                value: value.wrapping_add(1),
            });
            assert_eq!(child.get::<TestService>().unwrap().value, value.wrapping_add(1));
            assert_eq!(container.get::<TestService>().unwrap().value, value);
        }
        _ => unreachable!(),
    }
});
