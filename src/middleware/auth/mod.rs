pub mod access;
pub mod credential;

pub use access::{access_middleware, apply, propagate};
