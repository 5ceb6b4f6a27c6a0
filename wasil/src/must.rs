//! Panicking variants of the container operations.
//!
//! Meant for start-up code where a broken registration is a programming
//! error. Each method panics with the message of the error the fallible
//! operation would have returned.

use wasil_container::{Container, Reflect, Result};

/// Panicking registration and resolution.
pub trait Must {
    /// [`Container::add`], panicking on error.
    fn must_add<T: Reflect, TImpl: Reflect>(&self);

    /// [`Container::add_named`], panicking on error.
    fn must_add_named<T: Reflect, TImpl: Reflect>(&self, name: &str);

    /// [`Container::add_transient`], panicking on error.
    fn must_add_transient<T: Reflect, TImpl: Reflect>(&self);

    /// [`Container::add_transient_named`], panicking on error.
    fn must_add_transient_named<T: Reflect, TImpl: Reflect>(&self, name: &str);

    /// [`Container::add_instance`], panicking on error.
    fn must_add_instance<T, I>(&self, instance: I)
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync;

    /// [`Container::add_instance_named`], panicking on error.
    fn must_add_instance_named<T, I>(&self, name: &str, instance: I)
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync;

    /// [`Container::get`], panicking on error.
    fn must_get<T: Reflect>(&self) -> T;

    /// [`Container::get_named`], panicking on error.
    fn must_get_named<T: Reflect>(&self, name: &str) -> T;
}

#[track_caller]
fn must<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

impl Must for Container {
    #[track_caller]
    fn must_add<T: Reflect, TImpl: Reflect>(&self) {
        must(self.add::<T, TImpl>())
    }

    #[track_caller]
    fn must_add_named<T: Reflect, TImpl: Reflect>(&self, name: &str) {
        must(self.add_named::<T, TImpl>(name))
    }

    #[track_caller]
    fn must_add_transient<T: Reflect, TImpl: Reflect>(&self) {
        must(self.add_transient::<T, TImpl>())
    }

    #[track_caller]
    fn must_add_transient_named<T: Reflect, TImpl: Reflect>(&self, name: &str) {
        must(self.add_transient_named::<T, TImpl>(name))
    }

    #[track_caller]
    fn must_add_instance<T, I>(&self, instance: I)
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync,
    {
        must(self.add_instance::<T, I>(instance))
    }

    #[track_caller]
    fn must_add_instance_named<T, I>(&self, name: &str, instance: I)
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync,
    {
        must(self.add_instance_named::<T, I>(name, instance))
    }

    #[track_caller]
    fn must_get<T: Reflect>(&self) -> T {
        must(self.get::<T>())
    }

    #[track_caller]
    fn must_get_named<T: Reflect>(&self, name: &str) -> T {
        must(self.get_named::<T>(name))
    }
}
