//! User resource.
//!
//! Plain request/response mapping over the local store: validation,
//! password hashing and persistence. No retry or timeout semantics apply.

pub mod model;
pub mod password;
pub mod repository;
pub mod validation;

pub use model::{NewUser, User, UserChanges, UserPayload};
pub use repository::UserRepository;
pub use validation::{validate_create, validate_update, CreateFields, ValidatedFields, ValidationErrors};
