#![forbid(unsafe_code)]

pub mod attempt;
pub mod completion;
pub mod model;
pub mod progress;
pub mod time;

pub use time::Clock;
