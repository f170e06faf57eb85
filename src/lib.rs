pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod repo;
pub mod request_id;
pub mod router;
pub mod shared;

// Also re-export the shared modules at root for convenience
pub use shared::{domain, id_generator, schema, validators};
pub use shared::{
    validate_device_id, validate_device_patch, validate_mac_address, validate_new_device,
    validate_status_update, Device, DevicePatch, DeviceStatus, DeviceType, DeviceVariant,
    FieldError, FixedIdGenerator, IdGenerator, Location, NewDevice, RandomIdGenerator,
    ValidationErrors,
};

pub use router::{build_router, AppState};
