//! Bus - Per-Flow Typed Context
//!
//! Each consent flow gets its own Bus carrying the values that belong to that
//! one invocation (host, flow context, timeline). Nothing on a Bus outlives
//! the flow.
//!
//! The Bus does NOT use string keys: the type is the key.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-keyed value container (TypeMap pattern).
#[derive(Default)]
pub struct Bus {
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            resources: HashMap::new(),
        }
    }

    /// Insert a value, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, resource: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(resource));
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("resource_count", &self.resources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut bus = Bus::new();
        bus.insert(42i32);
        bus.insert("hello".to_string());

        assert_eq!(bus.get::<i32>(), Some(&42));
        assert_eq!(bus.get::<String>(), Some(&"hello".to_string()));
        assert_eq!(bus.get::<f64>(), None);
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut bus = Bus::new();
        bus.insert(vec![4]);
        if let Some(v) = bus.get_mut::<Vec<i32>>() {
            v.push(5);
        }

        assert!(bus.contains::<Vec<i32>>());
        assert_eq!(bus.remove::<Vec<i32>>(), Some(vec![4, 5]));
        assert!(!bus.contains::<Vec<i32>>());
    }
}
