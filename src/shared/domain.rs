use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Operational status reported for a sensor device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Offline,
    Maintenance,
    Error,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 5] = [
        DeviceStatus::Active,
        DeviceStatus::Inactive,
        DeviceStatus::Offline,
        DeviceStatus::Maintenance,
        DeviceStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Maintenance => "maintenance",
            DeviceStatus::Error => "error",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Discriminant selecting which sensor variant a device is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    AirSensor,
    TemperatureSensor,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::AirSensor => "AirSensor",
            DeviceType::TemperatureSensor => "TemperatureSensor",
        }
    }

    /// JSON key of the measurement field this variant requires
    pub fn measurement_field(&self) -> &'static str {
        match self {
            DeviceType::AirSensor => "moistureLevel",
            DeviceType::TemperatureSensor => "tempC",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AirSensor" => Ok(DeviceType::AirSensor),
            "TemperatureSensor" => Ok(DeviceType::TemperatureSensor),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Returned when a stored or submitted string names no known enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Physical placement of a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
}

impl Location {
    /// Build a location from its stored columns, `None` when both are empty
    pub fn from_parts(room: Option<String>, building: Option<String>) -> Option<Self> {
        if room.is_none() && building.is_none() {
            None
        } else {
            Some(Self { room, building })
        }
    }
}

/// Variant-specific part of a device, tagged by `deviceType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "deviceType")]
pub enum DeviceVariant {
    AirSensor {
        #[serde(rename = "moistureLevel")]
        moisture_level: f64,
    },
    TemperatureSensor {
        #[serde(rename = "tempC")]
        temp_c: f64,
    },
}

impl DeviceVariant {
    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceVariant::AirSensor { .. } => DeviceType::AirSensor,
            DeviceVariant::TemperatureSensor { .. } => DeviceType::TemperatureSensor,
        }
    }

    pub fn moisture_level(&self) -> Option<f64> {
        match self {
            DeviceVariant::AirSensor { moisture_level } => Some(*moisture_level),
            DeviceVariant::TemperatureSensor { .. } => None,
        }
    }

    pub fn temp_c(&self) -> Option<f64> {
        match self {
            DeviceVariant::AirSensor { .. } => None,
            DeviceVariant::TemperatureSensor { temp_c } => Some(*temp_c),
        }
    }
}

/// A validated device payload that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub device_name: String,
    pub mac_address: String,
    pub device_status: DeviceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(flatten)]
    pub variant: DeviceVariant,
}

impl NewDevice {
    pub fn device_type(&self) -> DeviceType {
        self.variant.device_type()
    }

    pub fn room(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.room.as_deref())
    }

    pub fn building(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.building.as_deref())
    }
}

/// A persisted device record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    #[serde(flatten)]
    pub attributes: NewDevice,
}

impl Device {
    pub fn new(id: Uuid, attributes: NewDevice) -> Self {
        Self { id, attributes }
    }

    pub fn device_type(&self) -> DeviceType {
        self.attributes.device_type()
    }

    /// Apply a partial update, leaving every absent field untouched
    ///
    /// Fails with the stored type when the patch implies the other variant.
    pub fn apply_patch(&mut self, patch: &DevicePatch) -> Result<(), DeviceType> {
        let stored = self.device_type();
        if patch.implied_type().is_some_and(|t| t != stored) {
            return Err(stored);
        }

        let attrs = &mut self.attributes;
        if let Some(name) = &patch.device_name {
            attrs.device_name = name.clone();
        }
        if let Some(mac) = &patch.mac_address {
            attrs.mac_address = mac.clone();
        }
        if let Some(status) = patch.device_status {
            attrs.device_status = status;
        }
        if let Some(level) = patch.battery_level {
            attrs.battery_level = Some(level);
        }
        if let Some(strength) = patch.signal_strength {
            attrs.signal_strength = Some(strength);
        }
        if patch.room.is_some() || patch.building.is_some() {
            let location = attrs.location.get_or_insert_with(Location::default);
            if let Some(room) = &patch.room {
                location.room = Some(room.clone());
            }
            if let Some(building) = &patch.building {
                location.building = Some(building.clone());
            }
        }
        match &mut attrs.variant {
            DeviceVariant::AirSensor { moisture_level } => {
                if let Some(level) = patch.moisture_level {
                    *moisture_level = level;
                }
            }
            DeviceVariant::TemperatureSensor { temp_c } => {
                if let Some(temp) = patch.temp_c {
                    *temp_c = temp;
                }
            }
        }
        Ok(())
    }
}

/// Partial update for a device; `None` means "keep the stored value"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePatch {
    pub device_type: Option<DeviceType>,
    pub device_name: Option<String>,
    pub mac_address: Option<String>,
    pub device_status: Option<DeviceStatus>,
    pub battery_level: Option<f64>,
    pub signal_strength: Option<f64>,
    pub room: Option<String>,
    pub building: Option<String>,
    pub moisture_level: Option<f64>,
    pub temp_c: Option<f64>,
}

impl DevicePatch {
    /// Device type the patch requires the stored record to have, if any
    pub fn implied_type(&self) -> Option<DeviceType> {
        self.device_type.or(if self.moisture_level.is_some() {
            Some(DeviceType::AirSensor)
        } else if self.temp_c.is_some() {
            Some(DeviceType::TemperatureSensor)
        } else {
            None
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == DevicePatch::default()
    }
}
