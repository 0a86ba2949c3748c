use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

/// Owned target instance under construction.
pub type Instance = Box<dyn Any + Send>;

/// Source of fresh target instances, installed through the constructor call.
///
/// Returning `None` signals that no instance could be produced; the build then
/// fails with an instantiation error.
pub trait InstanceProvider: Send + Sync {
    fn instantiate(&self) -> Option<Instance>;
}

pub type SharedInstanceProvider = Arc<dyn InstanceProvider>;

/// Instance provider backed by a closure producing a concrete `T`.
pub struct InstanceFn<F, T> {
    function: F,
    _instance: PhantomData<fn() -> T>,
}

impl<F, T> fmt::Debug for InstanceFn<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFn")
            .field("instance", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<F, T> InstanceProvider for InstanceFn<F, T>
where
    F: Fn() -> Option<T> + Send + Sync,
    T: Any + Send,
{
    fn instantiate(&self) -> Option<Instance> {
        (self.function)().map(|instance| Box::new(instance) as Instance)
    }
}

/// Builds a shared instance provider from a closure.
pub fn instances<T, F>(function: F) -> SharedInstanceProvider
where
    F: Fn() -> Option<T> + Send + Sync + 'static,
    T: Any + Send,
{
    Arc::new(InstanceFn {
        function,
        _instance: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Person {
        name: String,
    }

    #[test]
    fn instances_are_boxed_as_their_concrete_type() {
        let provider = instances(|| Some(Person { name: "Ana".into() }));
        let instance = provider.instantiate().expect("instance");
        let person = instance.downcast::<Person>().expect("person");
        assert_eq!(person.name, "Ana");
    }

    #[test]
    fn absent_instances_are_reported_as_none() {
        let provider = instances(|| None::<Person>);
        assert!(provider.instantiate().is_none());
    }
}
