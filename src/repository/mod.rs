//! Typed CRUD over the store for every entity table.

mod entities;
pub mod validation;

pub use entities::{DEFAULT_BOARDING_STATUS, DEFAULT_PERMISSION_LEVEL, DEFAULT_TRIP_STATUS};

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::store::{Model, ModelStore, PrimaryKey, Query, Store};

/// Rows returned by a list when the caller gives no limit.
pub const DEFAULT_LIMIT: u32 = 10;

/// A record the API creates from a payload and updates through a patch.
pub trait Entity: Model + Serialize + Clone + Send + Sync + 'static {
    /// Used in `"<NAME> not found"` messages.
    const NAME: &'static str;
    /// Refuse to create a record whose key already exists instead of
    /// overwriting it.
    const REJECT_EXISTING: bool = false;

    type Input: DeserializeOwned + Send + 'static;
    type Patch: Patch<Self> + DeserializeOwned + Send + 'static;

    /// Validates the payload and fills generated fields.
    fn build(input: Self::Input) -> Result<Self>;
}

/// A partial update. Absent fields leave the record unchanged.
pub trait Patch<E> {
    fn is_empty(&self) -> bool;
    fn apply(self, entity: &mut E) -> Result<()>;
}

pub struct Repository<E> {
    store: Arc<dyn Store>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn create(&self, input: E::Input) -> Result<E> {
        let entity = E::build(input)?;

        // Check-then-insert is not atomic; two concurrent creates for the
        // same key can both pass and the later write wins.
        if E::REJECT_EXISTING
            && self.store.find_model::<E>(&entity.key())?.is_some()
        {
            return Err(Error::Conflict(format!("{} already exists", E::NAME)));
        }

        self.store.insert_model(&entity)?;
        tracing::debug!(table = E::TABLE.name, "record created");
        Ok(entity)
    }

    pub fn find(&self, key: &E::Key) -> Result<Option<E>> {
        self.store.find_model(key)
    }

    pub fn get(&self, key: &E::Key) -> Result<E> {
        self.find(key)?.ok_or(Error::NotFound(E::NAME))
    }

    /// Lists at most `limit` records, [`DEFAULT_LIMIT`] when absent.
    pub fn list(&self, query: Query, limit: Option<i64>) -> Result<Vec<E>> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(n) if n <= 0 => {
                return Err(Error::validation("limit must be greater than zero"));
            }
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        };
        self.store.query_models(&query.limit(limit))
    }

    /// Counting scans the table, so filtering is always allowed here.
    pub fn count(&self, query: Query) -> Result<i64> {
        self.store.count_models::<E>(&query.allow_filtering())
    }

    pub fn update(&self, key: &E::Key, patch: E::Patch) -> Result<E> {
        let mut entity = self.get(key)?;
        if patch.is_empty() {
            return Err(Error::validation("no fields supplied for update"));
        }
        patch.apply(&mut entity)?;
        self.store.update_model(&entity)?;
        self.get(key)
    }

    pub fn delete(&self, key: &E::Key) -> Result<()> {
        if !self.store.delete_model::<E>(key)? {
            return Err(Error::NotFound(E::NAME));
        }
        tracing::debug!(table = E::TABLE.name, key = ?key.values(), "record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn setup() -> (TempDir, Arc<dyn Store>) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(&dir.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (dir, Arc::new(store))
    }

    fn new_route(name: &str) -> NewRoute {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "origin": "Centro",
            "destination": "Campus do Pici",
        }))
        .unwrap()
    }

    fn new_student(name: &str, number: &str) -> NewStudent {
        serde_json::from_value(serde_json::json!({
            "full_name": name,
            "enrollment_number": number,
            "email": format!("{number}@alu.ufc.br"),
        }))
        .unwrap()
    }

    #[test]
    fn test_create_then_get_returns_same_record() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);

        let mut input = new_route("Linha 1");
        input.stops.insert("1".into(), "Praça do Ferreira".into());
        let created = routes.create(input).unwrap();

        assert!(created.active);
        assert_eq!(routes.get(&created.id).unwrap(), created);
    }

    #[test]
    fn test_student_password_is_hashed() {
        let (_dir, store) = setup();
        let students = Repository::<Student>::new(store);

        let mut input = new_student("Ana Souza", "500001");
        input.password = Some("s3cret".into());
        let created = students.create(input).unwrap();

        let stored = students.get(&created.id).unwrap();
        let hash = stored.password_hash.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "s3cret");
    }

    #[test]
    fn test_create_rejects_blank_required_field() {
        let (_dir, store) = setup();
        let students = Repository::<Student>::new(store);

        let err = students.create(new_student("  ", "500001")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_get_missing_names_entity() {
        let (_dir, store) = setup();
        let drivers = Repository::<Driver>::new(store);

        let err = drivers.get(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound("Driver")));
        assert_eq!(err.to_string(), "Driver not found");
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        let created = routes.create(new_route("Linha 1")).unwrap();

        let patch: RoutePatch =
            serde_json::from_value(serde_json::json!({ "active": false })).unwrap();
        let updated = routes.update(&created.id, patch).unwrap();

        assert!(!updated.active);
        assert_eq!(updated.name, "Linha 1");
        assert_eq!(updated.origin, created.origin);
    }

    #[test]
    fn test_update_null_clears_optional_field() {
        let (_dir, store) = setup();
        let students = Repository::<Student>::new(store);
        let mut input = new_student("Ana Souza", "500001");
        input.phone = Some("85 99999-0000".into());
        let created = students.create(input).unwrap();

        let patch: StudentPatch =
            serde_json::from_value(serde_json::json!({ "phone": null })).unwrap();
        assert!(!patch.is_empty());
        let updated = students.update(&created.id, patch).unwrap();

        assert_eq!(updated.phone, None);
        assert_eq!(updated.full_name, "Ana Souza");
        assert_eq!(students.get(&created.id).unwrap().phone, None);

        let absent: StudentPatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(absent.is_empty());
    }

    #[test]
    fn test_update_null_on_required_field_leaves_it() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        let created = routes.create(new_route("Linha 1")).unwrap();

        let patch: RoutePatch =
            serde_json::from_value(serde_json::json!({ "name": null, "active": false }))
                .unwrap();
        let updated = routes.update(&created.id, patch).unwrap();

        assert_eq!(updated.name, "Linha 1");
        assert!(!updated.active);
    }

    #[test]
    fn test_update_with_empty_patch_is_rejected() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        let created = routes.create(new_route("Linha 1")).unwrap();

        let err = routes.update(&created.id, RoutePatch::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_update_missing_record_is_not_found_before_empty_check() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);

        let err = routes.update(&Uuid::new_v4(), RoutePatch::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound("Route")));
    }

    #[test]
    fn test_delete_twice_is_not_found() {
        let (_dir, store) = setup();
        let students = Repository::<Student>::new(store);
        let created = students.create(new_student("Ana", "500001")).unwrap();

        students.delete(&created.id).unwrap();
        assert!(matches!(
            students.delete(&created.id),
            Err(Error::NotFound("Student"))
        ));
        assert!(students.find(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_list_applies_default_and_explicit_limit() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        for i in 0..12 {
            routes.create(new_route(&format!("Linha {i}"))).unwrap();
        }

        assert_eq!(routes.list(Query::new(), None).unwrap().len(), 10);
        assert_eq!(routes.list(Query::new(), Some(3)).unwrap().len(), 3);
        assert_eq!(routes.list(Query::new(), Some(50)).unwrap().len(), 12);
    }

    #[test]
    fn test_list_rejects_non_positive_limit() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);

        assert!(matches!(
            routes.list(Query::new(), Some(0)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            routes.list(Query::new(), Some(-5)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_list_by_non_key_column_requires_opt_in() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        routes.create(new_route("Linha 1")).unwrap();

        let query = Query::new().eq("origin", "Centro");
        assert!(matches!(
            routes.list(query.clone(), None),
            Err(Error::FilteringRequired { .. })
        ));
        assert_eq!(routes.list(query.allow_filtering(), None).unwrap().len(), 1);
    }

    #[test]
    fn test_count_allows_filtering() {
        let (_dir, store) = setup();
        let routes = Repository::<Route>::new(store);
        routes.create(new_route("Linha 1")).unwrap();
        routes.create(new_route("Linha 2")).unwrap();

        assert_eq!(routes.count(Query::new()).unwrap(), 2);
        assert_eq!(routes.count(Query::new().eq("name", "Linha 2")).unwrap(), 1);
    }

    #[test]
    fn test_vehicle_keeps_supplied_id() {
        let (_dir, store) = setup();
        let vehicles = Repository::<Vehicle>::new(store);
        let id = Uuid::new_v4();

        let input: NewVehicle = serde_json::from_value(serde_json::json!({
            "id": id,
            "plate": "ABC1D23",
            "model": "Marcopolo Volare",
            "capacity": 30,
        }))
        .unwrap();
        let created = vehicles.create(input).unwrap();

        assert_eq!(created.id, id);
        assert!(!created.accessible);
        assert_eq!(vehicles.get(&id).unwrap(), created);
    }

    #[test]
    fn test_trip_round_trips_by_composite_key() {
        let (_dir, store) = setup();
        let trips = Repository::<Trip>::new(store);
        let departure = Utc::now() + Duration::days(1);

        let input = NewTrip {
            route_id: Uuid::new_v4(),
            departure_date: departure,
            vehicle_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            departure_time: departure,
            seats_available: 30,
            status: None,
        };
        let created = trips.create(input).unwrap();

        assert_eq!(created.status, DEFAULT_TRIP_STATUS);
        assert_eq!(trips.get(&created.key()).unwrap(), created);
    }

    #[test]
    fn test_duplicate_enrollment_conflicts() {
        let (_dir, store) = setup();
        let enrollments = Repository::<Enrollment>::new(store);
        let input = || NewEnrollment {
            trip_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            boarding_status: None,
        };

        let first = input();
        let (trip_id, student_id) = (first.trip_id, first.student_id);
        let created = enrollments.create(first).unwrap();
        assert_eq!(created.boarding_status, DEFAULT_BOARDING_STATUS);

        let again = NewEnrollment {
            trip_id,
            student_id,
            boarding_status: Some("boarded".into()),
        };
        assert!(matches!(
            enrollments.create(again),
            Err(Error::Conflict(_))
        ));
        assert!(enrollments.create(input()).is_ok());
    }

    #[test]
    fn test_admin_requires_valid_email() {
        let (_dir, store) = setup();
        let admins = Repository::<Admin>::new(store);

        let input = |email: &str| NewAdmin {
            name: "Coordenação".into(),
            email: email.into(),
            password: "s3cret".into(),
            permission_level: None,
        };

        assert!(matches!(
            admins.create(input("not-an-email")),
            Err(Error::Validation(_))
        ));
        let created = admins.create(input("coord@rotafacil.com")).unwrap();
        assert_eq!(created.permission_level, DEFAULT_PERMISSION_LEVEL);
    }
}
