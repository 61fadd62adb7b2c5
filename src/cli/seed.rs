use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::composer::Composer;
use crate::config::ServerConfig;
use crate::repository::Repository;
use crate::store::{Query, Store, schema};
use crate::types::*;

use super::open_store;

fn print_header(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "─".repeat(title.chars().count()));
}

fn print_records<T: Serialize>(records: &[T]) -> anyhow::Result<()> {
    if records.is_empty() {
        println!("  (none)");
    }
    for record in records {
        println!("  {}", serde_json::to_string(record)?);
    }
    Ok(())
}

struct Seeded {
    route_id: Uuid,
    driver_id: Uuid,
    vehicle_id: Uuid,
}

fn populate(store: &Arc<dyn Store>) -> anyhow::Result<Seeded> {
    for table in schema::TABLES {
        store.truncate(table)?;
    }

    let routes = Repository::<Route>::new(Arc::clone(store));
    let campus = routes.create(NewRoute {
        name: "Rota UFC - Terminal".into(),
        origin: "UFC Pici".into(),
        destination: "Terminal Papicu".into(),
        stops: [
            ("1".to_string(), "Portão principal".to_string()),
            ("2".to_string(), "Av. Bezerra de Menezes".to_string()),
        ]
        .into(),
        active: true,
    })?;
    let night = routes.create(NewRoute {
        name: "Rota Noturna - Centro".into(),
        origin: "Benfica".into(),
        destination: "Praça do Ferreira".into(),
        stops: Default::default(),
        active: true,
    })?;

    let vehicles = Repository::<Vehicle>::new(Arc::clone(store));
    let bus = vehicles.create(NewVehicle {
        id: Uuid::new_v4(),
        plate: "ABC-1234".into(),
        model: "Ônibus".into(),
        capacity: 40,
        accessible: false,
        year: Some(2019),
    })?;
    let minibus = vehicles.create(NewVehicle {
        id: Uuid::new_v4(),
        plate: "XYZ-5678".into(),
        model: "Micro-ônibus".into(),
        capacity: 25,
        accessible: true,
        year: None,
    })?;

    let drivers = Repository::<Driver>::new(Arc::clone(store));
    let driver = |full_name: &str, national_id: &str, license_number: &str| NewDriver {
        full_name: full_name.into(),
        national_id: national_id.into(),
        license_number: license_number.into(),
        birth_date: None,
        phone: None,
        street: None,
        number: None,
        city: Some("Fortaleza".into()),
        postal_code: None,
        state: Some("CE".into()),
    };
    let carlos = drivers.create(driver("Carlos Souza", "111.222.333-44", "123456789"))?;
    let ana = drivers.create(driver("Ana Pereira", "555.666.777-88", "987654321"))?;

    let students = Repository::<Student>::new(Arc::clone(store));
    let mut enrolled = Vec::new();
    for (full_name, number, email) in [
        ("Beatriz Lima", "500001", "bia@ufc.br"),
        ("Davi Costa", "500002", "davi@ufc.br"),
        ("Helena Dias", "500003", "helena@ufc.br"),
        ("Lucas Martins", "500004", "lucas@ufc.br"),
        ("Sofia Ribeiro", "500005", "sofia@ufc.br"),
    ] {
        enrolled.push(students.create(NewStudent {
            full_name: full_name.into(),
            enrollment_number: number.into(),
            email: email.into(),
            phone: None,
            password: None,
        })?);
    }

    Repository::<Admin>::new(Arc::clone(store)).create(NewAdmin {
        name: "Admin Principal".into(),
        email: "admin@rotafacil.com".into(),
        password: "rotafacil".into(),
        permission_level: Some(5),
    })?;

    let trips = Repository::<Trip>::new(Arc::clone(store));
    let now = Utc::now();
    let trip = |route: &Route, vehicle: &Vehicle, driver: &Driver, offset: Duration| NewTrip {
        route_id: route.id,
        departure_date: now + offset,
        vehicle_id: vehicle.id,
        driver_id: driver.id,
        departure_time: now + offset,
        seats_available: vehicle.capacity,
        status: None,
    };
    let departed = trips.create(NewTrip {
        status: Some("completed".into()),
        ..trip(&campus, &bus, &carlos, -Duration::days(1))
    })?;
    let morning = trips.create(trip(&campus, &bus, &carlos, Duration::hours(2)))?;
    let tomorrow = trips.create(trip(&campus, &minibus, &ana, Duration::days(1)))?;
    let evening = trips.create(trip(&night, &bus, &carlos, Duration::days(2)))?;

    let enrollments = Repository::<Enrollment>::new(Arc::clone(store));
    for (trip, student) in [
        (&morning, &enrolled[0]),
        (&morning, &enrolled[1]),
        (&tomorrow, &enrolled[2]),
        (&tomorrow, &enrolled[3]),
        (&departed, &enrolled[0]),
        (&evening, &enrolled[0]),
        (&evening, &enrolled[4]),
    ] {
        enrollments.create(NewEnrollment {
            trip_id: trip.id,
            student_id: student.id,
            boarding_status: None,
        })?;
    }

    Ok(Seeded {
        route_id: campus.id,
        driver_id: carlos.id,
        vehicle_id: bus.id,
    })
}

/// Replaces every table's contents with a small connected data set, then
/// runs the cross-partition reads against it.
pub async fn run_seed(config: &ServerConfig) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = Arc::new(open_store(config)?);
    let seeded = populate(&store)?;

    println!("Seeded {}", config.db_path().display());

    print_header("Vehicles");
    let vehicles = Repository::<Vehicle>::new(Arc::clone(&store)).list(Query::new(), None)?;
    print_records(&vehicles)?;

    print_header("Drivers");
    let drivers = Repository::<Driver>::new(Arc::clone(&store)).count(Query::new())?;
    println!("  total: {drivers}");

    print_header("Routes named 'Rota UFC - Terminal'");
    let routes = Repository::<Route>::new(Arc::clone(&store)).list(
        Query::new().eq("name", "Rota UFC - Terminal"),
        None,
    )?;
    print_records(&routes)?;

    let composer = Composer::new(Arc::clone(&store));

    print_header("Students on route 'Rota UFC - Terminal'");
    let students = composer.students_on_route(seeded.route_id).await?;
    print_records(&students)?;

    print_header("Upcoming trips of Carlos Souza with ABC-1234");
    let trips = composer
        .driver_trips_with_vehicle(seeded.driver_id, seeded.vehicle_id)
        .await?;
    print_records(&trips)?;

    store.close()?;
    Ok(())
}
