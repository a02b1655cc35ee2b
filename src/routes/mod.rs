pub mod assignments;

pub mod auth;

pub mod health;

pub use assignments::configure_assignments_routes;
pub use auth::configure_auth_routes;
pub use health::configure_health_routes;
