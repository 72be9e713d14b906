use crate::TypeRegistry;
use gesher_types::{Operation, RuleWithOperations, TypeResource};
use std::sync::{Arc, RwLock};

/// Same single-writer, many-reader swap-the-`Arc` shape as
/// [`gesher_rule_index::RuleIndexHandle`], fronting a [`TypeRegistry`]
/// instead of a `RuleIndex`.
#[derive(Debug, Clone)]
pub struct TypeRegistryHandle {
    inner: Arc<RwLock<Arc<TypeRegistry>>>,
}

impl Default for TypeRegistryHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistryHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(TypeRegistry::new()))),
        }
    }

    pub fn snapshot(&self) -> Arc<TypeRegistry> {
        self.inner
            .read()
            .expect("type registry lock poisoned")
            .clone()
    }

    pub fn exist(&self, group: &str, version: &str, resource: &str, operation: Operation) -> bool {
        self.snapshot().exist(group, version, resource, operation)
    }

    pub fn enumerate_rules(&self) -> Vec<RuleWithOperations> {
        self.snapshot().enumerate_rules()
    }

    pub fn add(&self, resource: &TypeResource) {
        self.replace(|reg| reg.add(resource));
    }

    pub fn delete(&self, resource: &TypeResource) {
        self.replace(|reg| reg.delete(resource));
    }

    pub fn update(&self, resource: &TypeResource) {
        self.replace(|reg| reg.update(resource));
    }

    fn replace(&self, f: impl FnOnce(&TypeRegistry) -> TypeRegistry) {
        let mut guard = self.inner.write().expect("type registry lock poisoned");
        let next = f(&guard);
        *guard = Arc::new(next);
    }
}
