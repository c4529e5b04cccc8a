//! Wire models for the unichess backend API.
//!
//! - `LoginResponse`: body of a successful `POST /users/login`
//! - `ErrorBody`, `ErrorDetail`: structured failure payloads
//! - `NewUser`, `User`: account creation and lookup

pub mod auth;
pub mod user;

pub use auth::{ErrorBody, ErrorDetail, LoginResponse, ValidationError};
pub use user::{NewUser, User};
