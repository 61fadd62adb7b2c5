mod composite;
pub mod dto;
pub mod resources;
pub mod response;
mod router;

pub use resources::Resource;
pub use router::{AppState, create_router};
