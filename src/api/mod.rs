//! Reference backend server: the local backend exposed over HTTP.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::create_router;
