//! Cross-partition reads that join entities in application code.
//!
//! The store has no join engine, so these operations walk the keys
//! themselves: one query for the top level, then one concurrent lookup per
//! key found. Per-item failures in the fan-out are logged and dropped; only
//! the top-level query can fail the whole operation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::stream::{FuturesUnordered, StreamExt};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{ModelStore, Query, Store};
use crate::types::{Driver, Enrollment, Student, Trip, Vehicle};

#[derive(Clone)]
pub struct Composer {
    store: Arc<dyn Store>,
}

impl Composer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every student enrolled in any trip of the route, each listed once.
    ///
    /// Students referenced by an enrollment but since deleted are omitted.
    /// The result is ordered by name, then id.
    pub async fn students_on_route(&self, route_id: Uuid) -> Result<Vec<Student>> {
        let trips: Vec<Trip> = self
            .blocking(move |store| {
                store.query_models(&Query::new().eq("route_id", route_id).allow_filtering())
            })
            .await?;

        if trips.is_empty() {
            return Ok(Vec::new());
        }

        let mut rosters = FuturesUnordered::new();
        for trip in &trips {
            let trip_id = trip.id;
            rosters.push(
                self.blocking(move |store| {
                    store.query_models::<Enrollment>(&Query::new().eq("trip_id", trip_id))
                })
                .map(move |res| (trip_id, res)),
            );
        }

        let mut student_ids = BTreeSet::new();
        while let Some((trip_id, res)) = rosters.next().await {
            match res {
                Ok(enrollments) => {
                    student_ids.extend(enrollments.into_iter().map(|e| e.student_id));
                }
                Err(e) => {
                    tracing::warn!(%trip_id, error = %e, "skipping enrollments of trip");
                }
            }
        }

        let mut lookups = FuturesUnordered::new();
        for student_id in student_ids {
            lookups.push(
                self.blocking(move |store| store.find_model::<Student>(&student_id))
                    .map(move |res| (student_id, res)),
            );
        }

        let mut students = Vec::new();
        while let Some((student_id, res)) = lookups.next().await {
            match res {
                Ok(Some(student)) => students.push(student),
                Ok(None) => {
                    tracing::debug!(%student_id, "enrolled student no longer exists");
                }
                Err(e) => {
                    tracing::warn!(%student_id, error = %e, "skipping student");
                }
            }
        }

        students.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(students)
    }

    /// Trips the driver has yet to run with the given vehicle.
    pub async fn driver_trips_with_vehicle(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Vec<Trip>> {
        self.driver_trips_with_vehicle_since(driver_id, vehicle_id, Utc::now())
            .await
    }

    /// Trips departing at or after `since`. The driver is checked before the
    /// vehicle, so a missing driver reports `Driver not found` regardless of
    /// the vehicle.
    pub async fn driver_trips_with_vehicle_since(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Trip>> {
        self.blocking(move |store| {
            store
                .find_model::<Driver>(&driver_id)?
                .ok_or(Error::NotFound("Driver"))?;
            store
                .find_model::<Vehicle>(&vehicle_id)?
                .ok_or(Error::NotFound("Vehicle"))?;

            let query = Query::new()
                .eq("driver_id", driver_id)
                .eq("vehicle_id", vehicle_id)
                .gte("departure_date", since)
                .allow_filtering();
            store.query_models(&query)
        })
        .await
    }

    /// Runs one store call on the blocking pool. A panicked or cancelled
    /// task surfaces as `Error::Task`.
    fn blocking<T, F>(&self, f: F) -> impl Future<Output = Result<T>> + Send + 'static
    where
        F: FnOnce(&dyn Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || f(store.as_ref()));
        async move { task.await.map_err(|e| Error::Task(e.to_string()))? }
    }
}
