//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Result;

use crate::asset::EngineType;
use crate::builder::Builder;
use crate::builder::BuilderTypeId;

/// Produces fresh [`Builder`] instances for one [`EngineType`].
///
/// A factory, not a singleton builder, because some builders (per spec
/// §4.2) are not safe to reuse across concurrent jobs for the same
/// asset class and the orchestrator allocates one per job; factories
/// that *are* safe to share can simply clone an `Arc` internally.
pub trait BuilderFactory: Send + Sync {
    fn engine_type(&self) -> EngineType;

    fn builder_type_id(&self) -> BuilderTypeId;

    fn create(&self) -> Arc<dyn Builder>;
}

/// Maps [`EngineType`] to the factory responsible for building assets of
/// that type (spec §4.5: "registry keyed by `EngineType`").
#[derive(Default)]
pub struct BuilderRegistry {
    factories: HashMap<EngineType, Arc<dyn BuilderFactory>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        BuilderRegistry::default()
    }

    pub fn register(&mut self, factory: Arc<dyn BuilderFactory>) {
        self.factories.insert(factory.engine_type(), factory);
    }

    pub fn allocate(&self, engine_type: &EngineType) -> Result<Arc<dyn Builder>> {
        self.factories
            .get(engine_type)
            .map(|factory| factory.create())
            .ok_or_else(|| anyhow!("No builder registered for engine type '{}'", engine_type))
    }

    pub fn builder_type_id(&self, engine_type: &EngineType) -> Result<BuilderTypeId> {
        self.factories
            .get(engine_type)
            .map(|factory| factory.builder_type_id())
            .ok_or_else(|| anyhow!("No builder registered for engine type '{}'", engine_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::demo::PassthroughBuilderFactory;

    #[test]
    fn allocate_fails_for_unregistered_engine_type() {
        let registry = BuilderRegistry::new();
        let result = registry.allocate(&EngineType::new("unknown"));
        assert!(result.is_err());
    }

    #[test]
    fn allocate_succeeds_once_registered() {
        let mut registry = BuilderRegistry::new();
        registry.register(Arc::new(PassthroughBuilderFactory));
        let builder = registry.allocate(&EngineType::new("demo.passthrough"));
        assert!(builder.is_ok());
    }
}
