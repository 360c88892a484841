//! CLI library for testing purposes

pub mod report;
pub mod validation;

pub use validation::{Input, Output, Task, plan_task};
