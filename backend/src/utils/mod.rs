//! Shared low-level helpers: password hashing, JWT encoding and deadlines for
//! blocking work.

pub mod blocking;
pub mod jwt;
pub mod password;
