//! Domain models for the MediQueue system.

mod appointment;
mod emergency;
mod patient;
mod prescription;
mod recommendation;
mod specialty;

pub use appointment::*;
pub use emergency::*;
pub use patient::*;
pub use prescription::*;
pub use recommendation::*;
pub use specialty::*;
