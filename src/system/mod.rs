pub mod collector;
pub mod control;
pub mod history;
pub mod platform;
pub mod process;
pub mod rate;
pub mod snapshot;
