pub mod client;
pub mod log;
pub mod planner;
pub mod reconstruction;
