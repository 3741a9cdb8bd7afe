//! Control instances: lifecycle, delegation and the host boundary.

pub mod delegate;
pub mod instance;
pub mod lifecycle;

pub use instance::{ControlInstance, VALIDATION_ERRORS_ID};
pub use lifecycle::{LifecycleState, LifecycleTracker};
