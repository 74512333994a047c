#![forbid(unsafe_code)]

pub mod demo;
pub mod repository;
pub mod sqlite;

pub use repository::{Storage, StorageError};
