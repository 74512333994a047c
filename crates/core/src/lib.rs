#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod navigator;
pub mod store;
pub mod time;

pub use error::Error;
pub use navigator::{Navigation, Navigator};
pub use store::AnswerStore;
pub use time::Clock;
