//! Request contracts for creating and partially updating each entity.
//!
//! Create payloads list required fields as plain types; update payloads make
//! every field optional and an absent field means "leave as is". Fields the
//! record may lack are `Option<Option<T>>`: an explicit `null` clears them.
//! On required fields `null` reads the same as absent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Maps a present field to `Some`, so a `null` becomes `Some(None)` while
/// `#[serde(default)]` keeps an absent one at `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub full_name: String,
    pub enrollment_number: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Plain text; only its Argon2 hash is stored.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    #[serde(default)]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub street: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub postal_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub id: Uuid,
    pub plate: String,
    pub model: String,
    pub capacity: i32,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehiclePatch {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub accessible: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    pub name: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub stops: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub stops: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    pub route_id: Uuid,
    pub departure_date: DateTime<Utc>,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub seats_available: i32,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripPatch {
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seats_available: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollment {
    pub trip_id: Uuid,
    pub student_id: Uuid,
    #[serde(default)]
    pub boarding_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentPatch {
    #[serde(default)]
    pub boarding_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub permission_level: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permission_level: Option<i32>,
}
