use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::schema::{ADMINS, DRIVERS, ENROLLMENTS, ROUTES, STUDENTS, TRIPS, TableSchema, VEHICLES};
use super::value::{Row, Value};
use super::{Query, Store};
use crate::error::Result;
use crate::types::*;

/// Primary key values in partition-then-clustering order.
pub trait PrimaryKey {
    fn values(&self) -> Vec<Value>;
}

impl PrimaryKey for Uuid {
    fn values(&self) -> Vec<Value> {
        vec![Value::Uuid(*self)]
    }
}

impl PrimaryKey for TripKey {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Uuid(self.route_id),
            Value::Timestamp(self.departure_date),
            Value::Uuid(self.id),
        ]
    }
}

impl PrimaryKey for EnrollmentKey {
    fn values(&self) -> Vec<Value> {
        vec![Value::Uuid(self.trip_id), Value::Uuid(self.student_id)]
    }
}

/// Maps a record type onto its table.
pub trait Model: Sized {
    type Key: PrimaryKey + DeserializeOwned + Clone + Send + Sync + 'static;

    const TABLE: &'static TableSchema;

    fn key(&self) -> Self::Key;
    fn to_row(&self) -> Row;
    fn from_row(row: Row) -> Result<Self>;
}

impl Model for Student {
    type Key = Uuid;
    const TABLE: &'static TableSchema = &STUDENTS;

    fn key(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("full_name", self.full_name.as_str())
            .with("enrollment_number", self.enrollment_number.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.clone())
            .with("password_hash", self.password_hash.clone())
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            id: row.uuid("id")?,
            full_name: row.text("full_name")?,
            enrollment_number: row.text("enrollment_number")?,
            email: row.text("email")?,
            phone: row.opt_text("phone")?,
            password_hash: row.opt_text("password_hash")?,
        })
    }
}

impl Model for Driver {
    type Key = Uuid;
    const TABLE: &'static TableSchema = &DRIVERS;

    fn key(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("full_name", self.full_name.as_str())
            .with("national_id", self.national_id.as_str())
            .with("license_number", self.license_number.as_str())
            .with("birth_date", self.birth_date)
            .with("phone", self.phone.clone())
            .with("street", self.street.clone())
            .with("number", self.number.clone())
            .with("city", self.city.clone())
            .with("postal_code", self.postal_code.clone())
            .with("state", self.state.clone())
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            id: row.uuid("id")?,
            full_name: row.text("full_name")?,
            national_id: row.text("national_id")?,
            license_number: row.text("license_number")?,
            birth_date: row.opt_timestamp("birth_date")?,
            phone: row.opt_text("phone")?,
            street: row.opt_text("street")?,
            number: row.opt_text("number")?,
            city: row.opt_text("city")?,
            postal_code: row.opt_text("postal_code")?,
            state: row.opt_text("state")?,
        })
    }
}

impl Model for Vehicle {
    type Key = Uuid;
    const TABLE: &'static TableSchema = &VEHICLES;

    fn key(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("plate", self.plate.as_str())
            .with("model", self.model.as_str())
            .with("capacity", self.capacity)
            .with("accessible", self.accessible)
            .with("year", self.year)
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            id: row.uuid("id")?,
            plate: row.text("plate")?,
            model: row.text("model")?,
            capacity: row.int("capacity")?,
            accessible: row.bool("accessible")?,
            year: row.opt_int("year")?,
        })
    }
}

impl Model for Route {
    type Key = Uuid;
    const TABLE: &'static TableSchema = &ROUTES;

    fn key(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("origin", self.origin.as_str())
            .with("destination", self.destination.as_str())
            .with("stops", self.stops.clone())
            .with("active", self.active)
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            id: row.uuid("id")?,
            name: row.text("name")?,
            origin: row.text("origin")?,
            destination: row.text("destination")?,
            stops: row.map("stops")?,
            active: row.bool("active")?,
        })
    }
}

impl Model for Trip {
    type Key = TripKey;
    const TABLE: &'static TableSchema = &TRIPS;

    fn key(&self) -> TripKey {
        Trip::key(self)
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("route_id", self.route_id)
            .with("departure_date", self.departure_date)
            .with("id", self.id)
            .with("vehicle_id", self.vehicle_id)
            .with("driver_id", self.driver_id)
            .with("departure_time", self.departure_time)
            .with("seats_available", self.seats_available)
            .with("status", self.status.as_str())
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            route_id: row.uuid("route_id")?,
            departure_date: row.timestamp("departure_date")?,
            id: row.uuid("id")?,
            vehicle_id: row.uuid("vehicle_id")?,
            driver_id: row.uuid("driver_id")?,
            departure_time: row.timestamp("departure_time")?,
            seats_available: row.int("seats_available")?,
            status: row.text("status")?,
        })
    }
}

impl Model for Enrollment {
    type Key = EnrollmentKey;
    const TABLE: &'static TableSchema = &ENROLLMENTS;

    fn key(&self) -> EnrollmentKey {
        Enrollment::key(self)
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("trip_id", self.trip_id)
            .with("student_id", self.student_id)
            .with("enrollment_date", self.enrollment_date)
            .with("boarding_status", self.boarding_status.as_str())
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            trip_id: row.uuid("trip_id")?,
            student_id: row.uuid("student_id")?,
            enrollment_date: row.timestamp("enrollment_date")?,
            boarding_status: row.text("boarding_status")?,
        })
    }
}

impl Model for Admin {
    type Key = Uuid;
    const TABLE: &'static TableSchema = &ADMINS;

    fn key(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("email", self.email.as_str())
            .with("password_hash", self.password_hash.as_str())
            .with("permission_level", self.permission_level)
    }

    fn from_row(mut row: Row) -> Result<Self> {
        Ok(Self {
            id: row.uuid("id")?,
            name: row.text("name")?,
            email: row.text("email")?,
            password_hash: row.text("password_hash")?,
            permission_level: row.int("permission_level")?,
        })
    }
}

/// Typed access to any [`Store`] through the [`Model`] mappings.
pub trait ModelStore {
    fn insert_model<M: Model>(&self, model: &M) -> Result<()>;
    fn find_model<M: Model>(&self, key: &M::Key) -> Result<Option<M>>;
    fn query_models<M: Model>(&self, query: &Query) -> Result<Vec<M>>;
    fn count_models<M: Model>(&self, query: &Query) -> Result<i64>;
    fn update_model<M: Model>(&self, model: &M) -> Result<()>;
    fn delete_model<M: Model>(&self, key: &M::Key) -> Result<bool>;
}

impl<S: Store + ?Sized> ModelStore for S {
    fn insert_model<M: Model>(&self, model: &M) -> Result<()> {
        self.insert(M::TABLE, &model.to_row())
    }

    fn find_model<M: Model>(&self, key: &M::Key) -> Result<Option<M>> {
        self.get(M::TABLE, &key.values())?
            .map(M::from_row)
            .transpose()
    }

    fn query_models<M: Model>(&self, query: &Query) -> Result<Vec<M>> {
        self.select(M::TABLE, query)?
            .into_iter()
            .map(M::from_row)
            .collect()
    }

    fn count_models<M: Model>(&self, query: &Query) -> Result<i64> {
        self.count(M::TABLE, query)
    }

    fn update_model<M: Model>(&self, model: &M) -> Result<()> {
        self.update(M::TABLE, &model.to_row())
    }

    fn delete_model<M: Model>(&self, key: &M::Key) -> Result<bool> {
        self.delete(M::TABLE, &key.values())
    }
}
