pub mod auth;

pub use auth::{AdminIdentity, AuthError, AuthGate, Credential};
