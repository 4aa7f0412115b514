pub mod action;
pub mod task;

pub use action::*;
pub use task::*;
