//! Device resolver port and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::DeviceId;

use super::ResolverError;

/// Immutable snapshot of a registered vending device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Device identifier.
    pub device_id: DeviceId,
    /// The machine id printed on the physical unit (e.g. "DEVICE-001").
    pub machine_id: String,
    /// Whether the device currently accepts sessions.
    pub is_active: bool,
}

/// Read-only lookup into the device registry.
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Resolves a machine id to its device snapshot.
    async fn resolve_by_machine_id(
        &self,
        machine_id: &str,
    ) -> Result<Option<DeviceSnapshot>, ResolverError>;
}

#[derive(Debug, Default)]
struct DeviceState {
    devices: HashMap<String, DeviceSnapshot>,
    fail_on_resolve: bool,
}

/// In-memory device resolver for testing and default wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceResolver {
    state: Arc<RwLock<DeviceState>>,
}

impl InMemoryDeviceResolver {
    /// Creates a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device snapshot under its machine id.
    pub fn insert(&self, device: DeviceSnapshot) {
        self.state
            .write()
            .unwrap()
            .devices
            .insert(device.machine_id.clone(), device);
    }

    /// Configures the resolver to fail all lookups.
    pub fn set_fail_on_resolve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_resolve = fail;
    }
}

#[async_trait]
impl DeviceResolver for InMemoryDeviceResolver {
    async fn resolve_by_machine_id(
        &self,
        machine_id: &str,
    ) -> Result<Option<DeviceSnapshot>, ResolverError> {
        let state = self.state.read().unwrap();
        if state.fail_on_resolve {
            return Err(ResolverError::Unavailable(
                "device registry offline".to_string(),
            ));
        }
        Ok(state.devices.get(machine_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_registered_devices() {
        let resolver = InMemoryDeviceResolver::new();
        resolver.insert(DeviceSnapshot {
            device_id: DeviceId::new(),
            machine_id: "DEVICE-001".to_string(),
            is_active: true,
        });

        let found = resolver.resolve_by_machine_id("DEVICE-001").await.unwrap();
        assert!(found.unwrap().is_active);

        let missing = resolver.resolve_by_machine_id("DEVICE-999").await.unwrap();
        assert!(missing.is_none());
    }
}
