//! Session intake: registration validation and age derivation.
//!
//! Pure and synchronous. Bad input comes back as `FieldErrors`, never as a
//! panic.

pub mod age;
pub mod session;
pub mod validator;

pub use age::compute_age;
pub use session::start_session;
pub use validator::{validate, MAX_AGE, MIN_AGE};
