#![forbid(unsafe_code)]

pub mod model;
pub mod search;
pub mod time;

pub use time::Clock;
