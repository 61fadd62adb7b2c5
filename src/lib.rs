//! # Rota Fácil
//!
//! A school transportation API (students, drivers, vehicles, routes, trips,
//! enrollments and admins) over a wide-column style table store, usable both
//! as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! rotafacil = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rotafacil::server::{AppState, create_router};
//! use rotafacil::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/rotafacil.db").unwrap();
//! store.initialize().unwrap();
//!
//! let router = create_router(Arc::new(AppState::new(Arc::new(store))));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod password;
pub mod repository;
pub mod server;
pub mod store;
pub mod types;
