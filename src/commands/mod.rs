pub mod config;
pub mod day;
pub mod month;
pub mod range;
