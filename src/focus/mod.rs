//! Focused-control snapshot model

mod control;

pub use control::{ControlRole, ControlSnapshot, ControlStates};
