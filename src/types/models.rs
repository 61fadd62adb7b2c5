use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub enrollment_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String,
    pub model: String,
    pub capacity: i32,
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub origin: String,
    pub destination: String,
    /// Stop name to description.
    pub stops: BTreeMap<String, String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub route_id: Uuid,
    pub departure_date: DateTime<Utc>,
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub seats_available: i32,
    pub status: String,
}

/// A trip roster entry linking one student to one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub trip_id: Uuid,
    pub student_id: Uuid,
    pub enrollment_date: DateTime<Utc>,
    pub boarding_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub permission_level: i32,
}

/// Primary key of a trip: partition `route_id`, clustering `departure_date, id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripKey {
    pub route_id: Uuid,
    pub departure_date: DateTime<Utc>,
    pub id: Uuid,
}

/// Primary key of an enrollment: partition `trip_id`, clustering `student_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentKey {
    pub trip_id: Uuid,
    pub student_id: Uuid,
}

impl Trip {
    #[must_use]
    pub fn key(&self) -> TripKey {
        TripKey {
            route_id: self.route_id,
            departure_date: self.departure_date,
            id: self.id,
        }
    }
}

impl Enrollment {
    #[must_use]
    pub fn key(&self) -> EnrollmentKey {
        EnrollmentKey {
            trip_id: self.trip_id,
            student_id: self.student_id,
        }
    }
}
