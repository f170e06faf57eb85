use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};
use uuid::Uuid;

use super::DeviceRepository;
use crate::config::DatabaseConfig;
use crate::error::DatabaseError;
use crate::shared::{
    Device, DevicePatch, DeviceStatus, DeviceType, DeviceVariant, IdGenerator, Location,
    NewDevice,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS devices (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        device_name TEXT NOT NULL,
        mac_address TEXT NOT NULL UNIQUE,
        device_status TEXT NOT NULL,
        battery_level DOUBLE PRECISION,
        signal_strength DOUBLE PRECISION,
        room TEXT,
        building TEXT,
        moisture_level DOUBLE PRECISION,
        temp_c DOUBLE PRECISION,
        device_type TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

// Tables created before creation-order listing lack this column
const ADD_CREATED_AT: &str =
    "ALTER TABLE devices ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT now()";

// Numeric columns are cast so tables with INTEGER/REAL columns still decode
const RETURNING_COLUMNS: &str = "id, device_name, mac_address, device_status, \
    battery_level::DOUBLE PRECISION AS battery_level, \
    signal_strength::DOUBLE PRECISION AS signal_strength, \
    room, building, \
    moisture_level::DOUBLE PRECISION AS moisture_level, \
    temp_c::DOUBLE PRECISION AS temp_c, \
    device_type";

/// Raw `devices` row before variant resolution
#[derive(Debug, sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    device_name: String,
    mac_address: String,
    device_status: String,
    battery_level: Option<f64>,
    signal_strength: Option<f64>,
    room: Option<String>,
    building: Option<String>,
    moisture_level: Option<f64>,
    temp_c: Option<f64>,
    device_type: String,
}

impl TryFrom<DeviceRow> for Device {
    type Error = DatabaseError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let device_type = DeviceType::from_str(&row.device_type)
            .map_err(|e| DatabaseError::InvalidRow(format!("device {}: {}", row.id, e)))?;

        let device_status = DeviceStatus::from_str(&row.device_status)
            .map_err(|e| DatabaseError::InvalidRow(format!("device {}: {}", row.id, e)))?;

        let variant = match device_type {
            DeviceType::AirSensor => row
                .moisture_level
                .map(|moisture_level| DeviceVariant::AirSensor { moisture_level }),
            DeviceType::TemperatureSensor => row
                .temp_c
                .map(|temp_c| DeviceVariant::TemperatureSensor { temp_c }),
        }
        .ok_or_else(|| {
            DatabaseError::InvalidRow(format!(
                "device {}: missing {} for {}",
                row.id,
                device_type.measurement_field(),
                device_type
            ))
        })?;

        Ok(Device::new(
            row.id,
            NewDevice {
                device_name: row.device_name,
                mac_address: row.mac_address,
                device_status,
                battery_level: row.battery_level,
                signal_strength: row.signal_strength,
                location: Location::from_parts(row.room, row.building),
                variant,
            },
        ))
    }
}

/// PostgreSQL-backed device store using a shared connection pool
#[derive(Clone)]
pub struct PgDeviceRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }

    /// Open a connection pool using the configured connection string and password
    pub async fn connect(
        config: &DatabaseConfig,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, DatabaseError> {
        let mut options = PgConnectOptions::from_str(&config.connection_string)?;
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        info!(
            max_connections = config.max_connections,
            "Initializing database connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!("Database connected successfully");

        Ok(Self::new(pool, ids))
    }

    /// Create the `devices` table if it does not exist yet
    ///
    /// Safe to run on every startup.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(ADD_CREATED_AT).execute(&self.pool).await?;
        info!("Devices table ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn create_device(&self, device: &NewDevice) -> Result<Device, DatabaseError> {
        let id = self.ids.uuid_v4();
        let query = format!(
            "INSERT INTO devices (
                id, device_name, mac_address, device_status, battery_level,
                signal_strength, room, building, moisture_level, temp_c, device_type
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}",
            RETURNING_COLUMNS
        );

        let row: DeviceRow = sqlx::query_as(&query)
            .bind(id)
            .bind(&device.device_name)
            .bind(&device.mac_address)
            .bind(device.device_status.as_str())
            .bind(device.battery_level)
            .bind(device.signal_strength)
            .bind(device.room())
            .bind(device.building())
            .bind(device.variant.moisture_level())
            .bind(device.variant.temp_c())
            .bind(device.device_type().as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = DatabaseError::from(e);
                warn!(mac_address = %device.mac_address, error = %err, "Error creating device");
                err
            })?;

        Device::try_from(row)
    }

    async fn get_all_devices(&self) -> Result<Vec<Device>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM devices ORDER BY created_at, id",
            RETURNING_COLUMNS
        );

        let rows: Vec<DeviceRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        rows.into_iter().map(Device::try_from).collect()
    }

    async fn get_device_by_id(&self, id: Uuid) -> Result<Option<Device>, DatabaseError> {
        let query = format!("SELECT {} FROM devices WHERE id = $1", RETURNING_COLUMNS);

        let row: Option<DeviceRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Device::try_from).transpose()
    }

    async fn update_device(&self, id: Uuid, patch: &DevicePatch) -> Result<Device, DatabaseError> {
        let required_type = patch.implied_type();
        let query = format!(
            "UPDATE devices SET
                device_name = COALESCE($1, device_name),
                mac_address = COALESCE($2, mac_address),
                device_status = COALESCE($3, device_status),
                battery_level = COALESCE($4, battery_level),
                signal_strength = COALESCE($5, signal_strength),
                room = COALESCE($6, room),
                building = COALESCE($7, building),
                moisture_level = COALESCE($8, moisture_level),
                temp_c = COALESCE($9, temp_c)
            WHERE id = $10 AND ($11::TEXT IS NULL OR device_type = $11)
            RETURNING {}",
            RETURNING_COLUMNS
        );

        let row: Option<DeviceRow> = sqlx::query_as(&query)
            .bind(patch.device_name.as_deref())
            .bind(patch.mac_address.as_deref())
            .bind(patch.device_status.map(|s| s.as_str()))
            .bind(patch.battery_level)
            .bind(patch.signal_strength)
            .bind(patch.room.as_deref())
            .bind(patch.building.as_deref())
            .bind(patch.moisture_level)
            .bind(patch.temp_c)
            .bind(id)
            .bind(required_type.map(|t| t.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = DatabaseError::from(e);
                warn!(device_id = %id, error = %err, "Error updating device");
                err
            })?;

        match (row, required_type) {
            (Some(row), _) => Device::try_from(row),
            (None, None) => Err(DatabaseError::NotFound),
            // Zero rows: either the id is unknown or the variant did not match
            (None, Some(_)) => {
                let stored: Option<(String,)> =
                    sqlx::query_as("SELECT device_type FROM devices WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;

                match stored {
                    None => Err(DatabaseError::NotFound),
                    Some((device_type,)) => {
                        let stored = DeviceType::from_str(&device_type).map_err(|e| {
                            DatabaseError::InvalidRow(format!("device {}: {}", id, e))
                        })?;
                        Err(DatabaseError::DeviceTypeMismatch { stored })
                    }
                }
            }
        }
    }

    async fn update_device_status(
        &self,
        id: Uuid,
        status: DeviceStatus,
    ) -> Result<Device, DatabaseError> {
        let query = format!(
            "UPDATE devices SET device_status = $2 WHERE id = $1 RETURNING {}",
            RETURNING_COLUMNS
        );

        let row: Option<DeviceRow> = sqlx::query_as(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(DatabaseError::NotFound).and_then(Device::try_from)
    }

    async fn delete_device(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}
