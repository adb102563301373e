//! Services shared across front-ends

mod patients;

pub use patients::{Mutation, PatientService};
