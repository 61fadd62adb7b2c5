use chrono::Utc;
use uuid::Uuid;

use super::validation::{require_email, require_non_negative, require_positive, require_text};
use super::{Entity, Patch};
use crate::error::Result;
use crate::password::hash_password;
use crate::store::truncate_timestamp;
use crate::types::*;

pub const DEFAULT_TRIP_STATUS: &str = "scheduled";
pub const DEFAULT_BOARDING_STATUS: &str = "pending";
pub const DEFAULT_PERMISSION_LEVEL: i32 = 1;

impl Entity for Student {
    const NAME: &'static str = "Student";
    type Input = NewStudent;
    type Patch = StudentPatch;

    fn build(input: NewStudent) -> Result<Self> {
        require_text("full_name", &input.full_name)?;
        require_text("enrollment_number", &input.enrollment_number)?;
        require_text("email", &input.email)?;

        let password_hash = match input.password {
            Some(password) => {
                require_text("password", &password)?;
                Some(hash_password(&password)?)
            }
            None => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            enrollment_number: input.enrollment_number,
            email: input.email,
            phone: input.phone,
            password_hash,
        })
    }
}

impl Patch<Student> for StudentPatch {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password.is_none()
    }

    fn apply(self, student: &mut Student) -> Result<()> {
        if let Some(full_name) = self.full_name {
            require_text("full_name", &full_name)?;
            student.full_name = full_name;
        }
        if let Some(email) = self.email {
            require_text("email", &email)?;
            student.email = email;
        }
        if let Some(phone) = self.phone {
            student.phone = phone;
        }
        if let Some(password) = self.password {
            require_text("password", &password)?;
            student.password_hash = Some(hash_password(&password)?);
        }
        Ok(())
    }
}

impl Entity for Driver {
    const NAME: &'static str = "Driver";
    type Input = NewDriver;
    type Patch = DriverPatch;

    fn build(input: NewDriver) -> Result<Self> {
        require_text("full_name", &input.full_name)?;
        require_text("national_id", &input.national_id)?;
        require_text("license_number", &input.license_number)?;

        Ok(Self {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            national_id: input.national_id,
            license_number: input.license_number,
            birth_date: input.birth_date.map(truncate_timestamp),
            phone: input.phone,
            street: input.street,
            number: input.number,
            city: input.city,
            postal_code: input.postal_code,
            state: input.state,
        })
    }
}

impl Patch<Driver> for DriverPatch {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.birth_date.is_none()
            && self.phone.is_none()
            && self.street.is_none()
            && self.number.is_none()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.state.is_none()
    }

    fn apply(self, driver: &mut Driver) -> Result<()> {
        if let Some(full_name) = self.full_name {
            require_text("full_name", &full_name)?;
            driver.full_name = full_name;
        }
        if let Some(birth_date) = self.birth_date {
            driver.birth_date = birth_date.map(truncate_timestamp);
        }
        // Contact and address fields are free-form.
        let fields = [
            (self.phone, &mut driver.phone),
            (self.street, &mut driver.street),
            (self.number, &mut driver.number),
            (self.city, &mut driver.city),
            (self.postal_code, &mut driver.postal_code),
            (self.state, &mut driver.state),
        ];
        for (update, field) in fields {
            if let Some(value) = update {
                *field = value;
            }
        }
        Ok(())
    }
}

impl Entity for Vehicle {
    const NAME: &'static str = "Vehicle";
    type Input = NewVehicle;
    type Patch = VehiclePatch;

    fn build(input: NewVehicle) -> Result<Self> {
        require_text("plate", &input.plate)?;
        require_text("model", &input.model)?;
        require_positive("capacity", input.capacity)?;

        Ok(Self {
            id: input.id,
            plate: input.plate,
            model: input.model,
            capacity: input.capacity,
            accessible: input.accessible,
            year: input.year,
        })
    }
}

impl Patch<Vehicle> for VehiclePatch {
    fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.capacity.is_none()
            && self.accessible.is_none()
            && self.year.is_none()
    }

    fn apply(self, vehicle: &mut Vehicle) -> Result<()> {
        if let Some(model) = self.model {
            require_text("model", &model)?;
            vehicle.model = model;
        }
        if let Some(capacity) = self.capacity {
            require_positive("capacity", capacity)?;
            vehicle.capacity = capacity;
        }
        if let Some(accessible) = self.accessible {
            vehicle.accessible = accessible;
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        Ok(())
    }
}

impl Entity for Route {
    const NAME: &'static str = "Route";
    type Input = NewRoute;
    type Patch = RoutePatch;

    fn build(input: NewRoute) -> Result<Self> {
        require_text("name", &input.name)?;
        require_text("origin", &input.origin)?;
        require_text("destination", &input.destination)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            origin: input.origin,
            destination: input.destination,
            stops: input.stops,
            active: input.active,
        })
    }
}

impl Patch<Route> for RoutePatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.origin.is_none()
            && self.destination.is_none()
            && self.stops.is_none()
            && self.active.is_none()
    }

    fn apply(self, route: &mut Route) -> Result<()> {
        if let Some(name) = self.name {
            require_text("name", &name)?;
            route.name = name;
        }
        if let Some(origin) = self.origin {
            require_text("origin", &origin)?;
            route.origin = origin;
        }
        if let Some(destination) = self.destination {
            require_text("destination", &destination)?;
            route.destination = destination;
        }
        if let Some(stops) = self.stops {
            route.stops = stops;
        }
        if let Some(active) = self.active {
            route.active = active;
        }
        Ok(())
    }
}

impl Entity for Trip {
    const NAME: &'static str = "Trip";
    type Input = NewTrip;
    type Patch = TripPatch;

    fn build(input: NewTrip) -> Result<Self> {
        require_non_negative("seats_available", input.seats_available)?;
        let status = match input.status {
            Some(status) => {
                require_text("status", &status)?;
                status
            }
            None => DEFAULT_TRIP_STATUS.to_string(),
        };

        Ok(Self {
            route_id: input.route_id,
            departure_date: truncate_timestamp(input.departure_date),
            id: Uuid::new_v4(),
            vehicle_id: input.vehicle_id,
            driver_id: input.driver_id,
            departure_time: truncate_timestamp(input.departure_time),
            seats_available: input.seats_available,
            status,
        })
    }
}

impl Patch<Trip> for TripPatch {
    fn is_empty(&self) -> bool {
        self.vehicle_id.is_none()
            && self.driver_id.is_none()
            && self.departure_time.is_none()
            && self.seats_available.is_none()
            && self.status.is_none()
    }

    fn apply(self, trip: &mut Trip) -> Result<()> {
        if let Some(vehicle_id) = self.vehicle_id {
            trip.vehicle_id = vehicle_id;
        }
        if let Some(driver_id) = self.driver_id {
            trip.driver_id = driver_id;
        }
        if let Some(departure_time) = self.departure_time {
            trip.departure_time = truncate_timestamp(departure_time);
        }
        if let Some(seats) = self.seats_available {
            require_non_negative("seats_available", seats)?;
            trip.seats_available = seats;
        }
        if let Some(status) = self.status {
            require_text("status", &status)?;
            trip.status = status;
        }
        Ok(())
    }
}

impl Entity for Enrollment {
    const NAME: &'static str = "Enrollment";
    const REJECT_EXISTING: bool = true;
    type Input = NewEnrollment;
    type Patch = EnrollmentPatch;

    fn build(input: NewEnrollment) -> Result<Self> {
        let boarding_status = match input.boarding_status {
            Some(status) => {
                require_text("boarding_status", &status)?;
                status
            }
            None => DEFAULT_BOARDING_STATUS.to_string(),
        };

        Ok(Self {
            trip_id: input.trip_id,
            student_id: input.student_id,
            enrollment_date: truncate_timestamp(Utc::now()),
            boarding_status,
        })
    }
}

impl Patch<Enrollment> for EnrollmentPatch {
    fn is_empty(&self) -> bool {
        self.boarding_status.is_none()
    }

    fn apply(self, enrollment: &mut Enrollment) -> Result<()> {
        if let Some(status) = self.boarding_status {
            require_text("boarding_status", &status)?;
            enrollment.boarding_status = status;
        }
        Ok(())
    }
}

impl Entity for Admin {
    const NAME: &'static str = "Admin";
    type Input = NewAdmin;
    type Patch = AdminPatch;

    fn build(input: NewAdmin) -> Result<Self> {
        require_text("name", &input.name)?;
        require_email("email", &input.email)?;
        require_text("password", &input.password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            permission_level: input.permission_level.unwrap_or(DEFAULT_PERMISSION_LEVEL),
        })
    }
}

impl Patch<Admin> for AdminPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.permission_level.is_none()
    }

    fn apply(self, admin: &mut Admin) -> Result<()> {
        if let Some(name) = self.name {
            require_text("name", &name)?;
            admin.name = name;
        }
        if let Some(level) = self.permission_level {
            admin.permission_level = level;
        }
        Ok(())
    }
}
