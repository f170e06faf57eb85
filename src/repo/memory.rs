use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::DeviceRepository;
use crate::error::DatabaseError;
use crate::shared::{Device, DevicePatch, DeviceStatus, IdGenerator, NewDevice, RandomIdGenerator};

/// In-process device store
///
/// Mirrors the PostgreSQL repository: MAC addresses are unique by exact
/// string, listing follows insertion order, and missing ids yield `NotFound`.
pub struct MemoryDeviceRepository {
    devices: RwLock<Vec<Device>>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for MemoryDeviceRepository {
    fn default() -> Self {
        Self::new(Arc::new(RandomIdGenerator::new()))
    }
}

impl MemoryDeviceRepository {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
            ids,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Device>>, DatabaseError> {
        self.devices
            .read()
            .map_err(|_| DatabaseError::Storage("device store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Device>>, DatabaseError> {
        self.devices
            .write()
            .map_err(|_| DatabaseError::Storage("device store lock poisoned".to_string()))
    }
}

fn mac_taken(devices: &[Device], mac: &str, except: Option<Uuid>) -> bool {
    devices
        .iter()
        .any(|d| d.attributes.mac_address == mac && Some(d.id) != except)
}

fn duplicate_mac(mac: &str) -> DatabaseError {
    DatabaseError::ConstraintViolation(format!("mac_address {} already exists", mac))
}

#[async_trait]
impl DeviceRepository for MemoryDeviceRepository {
    async fn create_device(&self, device: &NewDevice) -> Result<Device, DatabaseError> {
        let mut devices = self.write()?;

        if mac_taken(&devices, &device.mac_address, None) {
            return Err(duplicate_mac(&device.mac_address));
        }

        let created = Device::new(self.ids.uuid_v4(), device.clone());
        debug!(device_id = %created.id, "Stored device in memory");
        devices.push(created.clone());
        Ok(created)
    }

    async fn get_all_devices(&self) -> Result<Vec<Device>, DatabaseError> {
        Ok(self.read()?.clone())
    }

    async fn get_device_by_id(&self, id: Uuid) -> Result<Option<Device>, DatabaseError> {
        Ok(self.read()?.iter().find(|d| d.id == id).cloned())
    }

    async fn update_device(&self, id: Uuid, patch: &DevicePatch) -> Result<Device, DatabaseError> {
        let mut devices = self.write()?;
        let index = devices
            .iter()
            .position(|d| d.id == id)
            .ok_or(DatabaseError::NotFound)?;

        // Variant mismatch wins over a MAC collision, as in the PostgreSQL filter
        let mut updated = devices[index].clone();
        updated
            .apply_patch(patch)
            .map_err(|stored| DatabaseError::DeviceTypeMismatch { stored })?;

        if let Some(mac) = &patch.mac_address {
            if mac_taken(&devices, mac, Some(id)) {
                return Err(duplicate_mac(mac));
            }
        }

        devices[index] = updated.clone();
        Ok(updated)
    }

    async fn update_device_status(
        &self,
        id: Uuid,
        status: DeviceStatus,
    ) -> Result<Device, DatabaseError> {
        let mut devices = self.write()?;
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DatabaseError::NotFound)?;

        device.attributes.device_status = status;
        Ok(device.clone())
    }

    async fn delete_device(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut devices = self.write()?;
        let before = devices.len();
        devices.retain(|d| d.id != id);

        if devices.len() == before {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}
