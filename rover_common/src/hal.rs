//! Hardware collaborator interfaces.
//!
//! The control core depends only on these narrow traits: motor actuation,
//! the physical switch panel, and the restart primitive.

pub mod driver;
pub mod types;
