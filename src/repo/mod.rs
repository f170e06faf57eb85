//! Device persistence
//!
//! [`DeviceRepository`] is the seam between request handlers and storage.
//! [`PgDeviceRepository`] backs production; [`MemoryDeviceRepository`] keeps
//! the same semantics in process for tests and database-less runs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::shared::{Device, DevicePatch, DeviceStatus, NewDevice};

pub mod devices;
pub mod memory;

pub use devices::PgDeviceRepository;
pub use memory::MemoryDeviceRepository;

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Persist a new device, assigning its id
    ///
    /// Fails with `ConstraintViolation` when the MAC address is already taken.
    async fn create_device(&self, device: &NewDevice) -> Result<Device, DatabaseError>;

    /// All devices in creation order
    async fn get_all_devices(&self) -> Result<Vec<Device>, DatabaseError>;

    /// `Ok(None)` when no device has this id
    async fn get_device_by_id(&self, id: Uuid) -> Result<Option<Device>, DatabaseError>;

    /// Coalesce-merge `patch` into the stored device and return the result
    async fn update_device(&self, id: Uuid, patch: &DevicePatch) -> Result<Device, DatabaseError>;

    /// Replace only the status column
    async fn update_device_status(
        &self,
        id: Uuid,
        status: DeviceStatus,
    ) -> Result<Device, DatabaseError>;

    /// Remove the device permanently; `NotFound` when nothing was deleted
    async fn delete_device(&self, id: Uuid) -> Result<(), DatabaseError>;
}
