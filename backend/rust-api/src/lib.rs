// Library root, shared by the server binary, the admin tooling and the tests.

pub mod app_state;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod image_host;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use app_state::AppState;
pub use config::Config;
pub use error::ApiError;
pub use routes::build_router;
