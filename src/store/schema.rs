pub const SCHEMA: &str = r#"
-- Students
CREATE TABLE IF NOT EXISTS students (
    id TEXT NOT NULL,
    full_name TEXT NOT NULL,
    enrollment_number TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    password_hash TEXT,
    PRIMARY KEY (id)
);

-- Drivers
CREATE TABLE IF NOT EXISTS drivers (
    id TEXT NOT NULL,
    full_name TEXT NOT NULL,
    national_id TEXT NOT NULL,
    license_number TEXT NOT NULL,
    birth_date TEXT,
    phone TEXT,
    street TEXT,
    number TEXT,
    city TEXT,
    postal_code TEXT,
    state TEXT,
    PRIMARY KEY (id)
);

-- Vehicles (id is supplied by the caller)
CREATE TABLE IF NOT EXISTS vehicles (
    id TEXT NOT NULL,
    plate TEXT NOT NULL,
    model TEXT NOT NULL,
    capacity INTEGER NOT NULL,
    accessible INTEGER NOT NULL DEFAULT 0,
    year INTEGER,
    PRIMARY KEY (id)
);

-- Routes; stops is a JSON object of stop name -> description
CREATE TABLE IF NOT EXISTS routes (
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    origin TEXT NOT NULL,
    destination TEXT NOT NULL,
    stops TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (id)
);

-- Trips: partitioned by route, clustered by (departure_date, id)
CREATE TABLE IF NOT EXISTS trips (
    route_id TEXT NOT NULL,
    departure_date TEXT NOT NULL,
    id TEXT NOT NULL,
    vehicle_id TEXT NOT NULL,
    driver_id TEXT NOT NULL,
    departure_time TEXT NOT NULL,
    seats_available INTEGER NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (route_id, departure_date, id)
);

-- Trip rosters: partitioned by trip, clustered by student.
-- No foreign keys: references may dangle after deletes.
CREATE TABLE IF NOT EXISTS enrollments (
    trip_id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    enrollment_date TEXT NOT NULL,
    boarding_status TEXT NOT NULL,
    PRIMARY KEY (trip_id, student_id)
);

-- Administrators
CREATE TABLE IF NOT EXISTS admins (
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    permission_level INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (id)
);

-- Secondary indexes
CREATE INDEX IF NOT EXISTS idx_students_enrollment_number ON students(enrollment_number);
CREATE INDEX IF NOT EXISTS idx_drivers_national_id ON drivers(national_id);
CREATE INDEX IF NOT EXISTS idx_vehicles_plate ON vehicles(plate);
CREATE INDEX IF NOT EXISTS idx_routes_name ON routes(name);
CREATE INDEX IF NOT EXISTS idx_trips_vehicle ON trips(vehicle_id);
CREATE INDEX IF NOT EXISTS idx_trips_driver ON trips(driver_id);
CREATE INDEX IF NOT EXISTS idx_admins_email ON admins(email);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Int,
    Bool,
    Timestamp,
    /// Text-to-text map, stored as a JSON object.
    Map,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

const fn col(name: &'static str, kind: ColumnType) -> Column {
    Column { name, kind }
}

/// Wide-column layout of a table: which columns locate a partition, which
/// order rows inside it, and which carry a secondary index.
#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub partition_key: &'static [&'static str],
    pub clustering_key: &'static [&'static str],
    pub indexed: &'static [&'static str],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Partition key columns followed by clustering key columns.
    pub fn primary_key(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.partition_key
            .iter()
            .chain(self.clustering_key.iter())
            .copied()
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key().any(|k| k == name)
    }
}

use ColumnType::{Bool, Int, Map, Text, Timestamp, Uuid};

pub const STUDENTS: TableSchema = TableSchema {
    name: "students",
    columns: &[
        col("id", Uuid),
        col("full_name", Text),
        col("enrollment_number", Text),
        col("email", Text),
        col("phone", Text),
        col("password_hash", Text),
    ],
    partition_key: &["id"],
    clustering_key: &[],
    indexed: &["enrollment_number"],
};

pub const DRIVERS: TableSchema = TableSchema {
    name: "drivers",
    columns: &[
        col("id", Uuid),
        col("full_name", Text),
        col("national_id", Text),
        col("license_number", Text),
        col("birth_date", Timestamp),
        col("phone", Text),
        col("street", Text),
        col("number", Text),
        col("city", Text),
        col("postal_code", Text),
        col("state", Text),
    ],
    partition_key: &["id"],
    clustering_key: &[],
    indexed: &["national_id"],
};

pub const VEHICLES: TableSchema = TableSchema {
    name: "vehicles",
    columns: &[
        col("id", Uuid),
        col("plate", Text),
        col("model", Text),
        col("capacity", Int),
        col("accessible", Bool),
        col("year", Int),
    ],
    partition_key: &["id"],
    clustering_key: &[],
    indexed: &["plate"],
};

pub const ROUTES: TableSchema = TableSchema {
    name: "routes",
    columns: &[
        col("id", Uuid),
        col("name", Text),
        col("origin", Text),
        col("destination", Text),
        col("stops", Map),
        col("active", Bool),
    ],
    partition_key: &["id"],
    clustering_key: &[],
    indexed: &["name"],
};

pub const TRIPS: TableSchema = TableSchema {
    name: "trips",
    columns: &[
        col("route_id", Uuid),
        col("departure_date", Timestamp),
        col("id", Uuid),
        col("vehicle_id", Uuid),
        col("driver_id", Uuid),
        col("departure_time", Timestamp),
        col("seats_available", Int),
        col("status", Text),
    ],
    partition_key: &["route_id"],
    clustering_key: &["departure_date", "id"],
    indexed: &["vehicle_id", "driver_id"],
};

pub const ENROLLMENTS: TableSchema = TableSchema {
    name: "enrollments",
    columns: &[
        col("trip_id", Uuid),
        col("student_id", Uuid),
        col("enrollment_date", Timestamp),
        col("boarding_status", Text),
    ],
    partition_key: &["trip_id"],
    clustering_key: &["student_id"],
    indexed: &[],
};

pub const ADMINS: TableSchema = TableSchema {
    name: "admins",
    columns: &[
        col("id", Uuid),
        col("name", Text),
        col("email", Text),
        col("password_hash", Text),
        col("permission_level", Int),
    ],
    partition_key: &["id"],
    clustering_key: &[],
    indexed: &["email"],
};

pub const TABLES: [&TableSchema; 7] = [
    &STUDENTS,
    &DRIVERS,
    &VEHICLES,
    &ROUTES,
    &TRIPS,
    &ENROLLMENTS,
    &ADMINS,
];
