use std::sync::Arc;

use parking_lot::Mutex;
use wasil::{Container, Injectable, Lifetime, WasilError, capability};

pub trait Counter: Send + Sync {
    fn increment(&self) -> u32;
    fn value(&self) -> u32;
}

capability!(Counter);

#[derive(Debug, Default, Clone, Injectable)]
#[inject(provides(Counter))]
struct SimpleCounter {
    hits: Arc<Mutex<u32>>,
}

impl Counter for SimpleCounter {
    fn increment(&self) -> u32 {
        let mut hits = self.hits.lock();
        *hits += 1;
        *hits
    }

    fn value(&self) -> u32 {
        *self.hits.lock()
    }
}

#[derive(Debug, Default, Injectable)]
struct Unrelated;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn capability_resolves_to_implementation() {
    init_tracing();
    let container = Container::new();
    container.add::<Arc<dyn Counter>, SimpleCounter>().unwrap();

    let counter: Arc<dyn Counter> = container.get().unwrap();
    assert_eq!(counter.increment(), 1);
}

#[test]
fn singleton_is_shared() {
    let container = Container::new();
    container.add::<Arc<dyn Counter>, SimpleCounter>().unwrap();

    let first: Arc<dyn Counter> = container.get().unwrap();
    let second: Arc<dyn Counter> = container.get().unwrap();
    first.increment();
    first.increment();

    assert_eq!(second.value(), 2);
}

#[test]
fn transient_is_independent() {
    let container = Container::new();
    container.add_transient::<Arc<dyn Counter>, SimpleCounter>().unwrap();

    let first: Arc<dyn Counter> = container.get().unwrap();
    let second: Arc<dyn Counter> = container.get().unwrap();
    first.increment();

    assert_eq!(first.value(), 1);
    assert_eq!(second.value(), 0);
}

#[test]
fn instance_by_reference_is_shared() {
    let container = Container::new();
    let original = Arc::new(SimpleCounter::default());
    container.add_instance::<Arc<dyn Counter>, _>(original.clone()).unwrap();

    let resolved: Arc<dyn Counter> = container.get().unwrap();
    original.increment();

    assert_eq!(resolved.value(), 1);
}

#[test]
fn instance_by_value_is_copied() {
    #[derive(Debug, Default, Clone, Injectable)]
    struct Config {
        level: u8,
    }

    let container = Container::new();
    container.add_instance::<Arc<Config>, _>(Config { level: 3 }).unwrap();

    let mut first: Arc<Config> = container.get().unwrap();
    Arc::get_mut(&mut first).unwrap().level = 7;
    let second: Arc<Config> = container.get().unwrap();

    assert_eq!(first.level, 7);
    assert_eq!(second.level, 3);
}

#[test]
fn unregistered_key_is_binding_missing() {
    let container = Container::new();
    container.add_named::<Arc<dyn Counter>, SimpleCounter>("primary").unwrap();

    let err = container.get::<Arc<dyn Counter>>().err().unwrap();
    assert!(err.is_binding_missing());

    let err = container.get_named::<Arc<Unrelated>>("primary").unwrap_err();
    assert!(matches!(err, WasilError::BindingMissing(_)));
}

#[test]
fn overwrite_keeps_only_newest_binding() {
    let container = Container::new();
    container.add_transient::<Arc<dyn Counter>, SimpleCounter>().unwrap();

    let pinned = Arc::new(SimpleCounter::default());
    pinned.increment();
    container.add_instance::<Arc<dyn Counter>, _>(pinned).unwrap();

    let resolved: Arc<dyn Counter> = container.get().unwrap();
    assert_eq!(resolved.value(), 1);

    container.add::<Arc<dyn Counter>, SimpleCounter>().unwrap();
    let resolved: Arc<dyn Counter> = container.get().unwrap();
    assert_eq!(resolved.value(), 0);

    let registrations = container.registrations();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].lifetime, Lifetime::Singleton);
}

#[test]
fn registration_errors() {
    let container = Container::new();

    assert!(matches!(
        container.add::<Arc<dyn Counter>, Unrelated>(),
        Err(WasilError::NotImplements(_))
    ));
    assert!(matches!(
        container.add::<Arc<SimpleCounter>, Unrelated>(),
        Err(WasilError::BadPointer(_))
    ));
    assert!(matches!(
        container.add::<Arc<dyn Counter>, Arc<SimpleCounter>>(),
        Err(WasilError::ImplNotStruct(_))
    ));
    assert!(matches!(
        container.add_transient::<SimpleCounter, SimpleCounter>(),
        Err(WasilError::InvalidServiceType(_))
    ));
    assert!(matches!(
        container.add_transient::<Arc<String>, SimpleCounter>(),
        Err(WasilError::InvalidServiceType(_))
    ));
    assert!(container.is_empty());
}

#[test]
fn resolution_across_threads() {
    let container = Arc::new(Container::new());
    container.add::<Arc<dyn Counter>, SimpleCounter>().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let container = Arc::clone(&container);
            std::thread::spawn(move || {
                let counter: Arc<dyn Counter> = container.get().unwrap();
                for _ in 0..25 {
                    counter.increment();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let counter: Arc<dyn Counter> = container.get().unwrap();
    assert_eq!(counter.value(), 100);
}
