pub mod auth;

pub use auth::{token_guard, TOKEN_COOKIE};
