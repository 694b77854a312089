use std::sync::Arc;

use crate::{
    core::{config::ServiceConfig, gate::ReleaseGate, service::DeferredKeyedService},
    events::Bus,
    items::{Key, TransformRef},
};

/// Builder for constructing a [`DeferredKeyedService`] with optional wiring.
pub struct ServiceBuilder<K, P> {
    gate: ReleaseGate,
    transform: TransformRef<P>,
    config: ServiceConfig,
    bus: Option<Bus>,
    _key: std::marker::PhantomData<fn() -> K>,
}

impl<K, P> ServiceBuilder<K, P>
where
    K: Key,
    P: Send + 'static,
{
    /// Creates a builder with the default configuration.
    pub fn new(gate: ReleaseGate, transform: TransformRef<P>) -> Self {
        Self {
            gate,
            transform,
            config: ServiceConfig::default(),
            bus: None,
            _key: std::marker::PhantomData,
        }
    }

    /// Sets the service configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the transform with an already shared one.
    pub fn with_transform(mut self, transform: TransformRef<P>) -> Self {
        self.transform = transform;
        self
    }

    /// Publishes lifecycle events on an existing bus (e.g. one shared by several services).
    ///
    /// Without it, the service creates its own bus sized by `ServiceConfig::bus_capacity`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the service.
    pub fn build(self) -> DeferredKeyedService<K, P> {
        let bus = self
            .bus
            .unwrap_or_else(|| Bus::new(self.config.bus_capacity_clamped()));
        DeferredKeyedService::from_parts(self.gate, self.transform, self.config, bus)
    }

    /// Builds the service behind an `Arc`, ready to be shared with submitting tasks.
    pub fn build_shared(self) -> Arc<DeferredKeyedService<K, P>> {
        Arc::new(self.build())
    }
}
