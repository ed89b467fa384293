//! Echo control module
//!
//! Two independent tri-state modes (typed characters, typed words),
//! each cycling Off -> On -> EditableOnly, driving the boolean echo
//! flags the host speech layer consumes.

mod controller;
mod mode;

pub use controller::{Announcement, EchoConfig, EchoController, EchoFlags};
pub use mode::{EchoMode, Feature, InvalidModeValue};
