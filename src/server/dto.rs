//! Query-string contracts for list and count endpoints.

use serde::Deserialize;
use uuid::Uuid;

use crate::store::{Query, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Equality filters accepted by a collection endpoint.
pub trait Filters {
    fn into_query(self) -> Query;
}

/// Supplied filters are combined with AND. Any filter at all opts the query
/// into scanning, since most filterable columns are neither keys nor indexed.
fn equality_query<const N: usize>(filters: [(&'static str, Option<Value>); N]) -> Query {
    let mut query = Query::new();
    let mut restricted = false;
    for (column, value) in filters {
        if let Some(value) = value {
            query = query.eq(column, value);
            restricted = true;
        }
    }
    if restricted {
        query.allow_filtering()
    } else {
        query
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentFilters {
    pub enrollment_number: Option<String>,
    pub email: Option<String>,
}

impl Filters for StudentFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("enrollment_number", self.enrollment_number.map(Value::from)),
            ("email", self.email.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverFilters {
    pub national_id: Option<String>,
    pub city: Option<String>,
}

impl Filters for DriverFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("national_id", self.national_id.map(Value::from)),
            ("city", self.city.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub plate: Option<String>,
    pub accessible: Option<bool>,
}

impl Filters for VehicleFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("plate", self.plate.map(Value::from)),
            ("accessible", self.accessible.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteFilters {
    pub name: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl Filters for RouteFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("name", self.name.map(Value::from)),
            ("origin", self.origin.map(Value::from)),
            ("destination", self.destination.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TripFilters {
    pub route_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub status: Option<String>,
}

impl Filters for TripFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("route_id", self.route_id.map(Value::from)),
            ("driver_id", self.driver_id.map(Value::from)),
            ("vehicle_id", self.vehicle_id.map(Value::from)),
            ("status", self.status.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrollmentFilters {
    pub trip_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub boarding_status: Option<String>,
}

impl Filters for EnrollmentFilters {
    fn into_query(self) -> Query {
        equality_query([
            ("trip_id", self.trip_id.map(Value::from)),
            ("student_id", self.student_id.map(Value::from)),
            ("boarding_status", self.boarding_status.map(Value::from)),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminFilters {
    pub email: Option<String>,
}

impl Filters for AdminFilters {
    fn into_query(self) -> Query {
        equality_query([("email", self.email.map(Value::from))])
    }
}
