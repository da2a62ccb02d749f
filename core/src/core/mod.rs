pub mod artifact;
pub mod control;
pub mod step;

// Re-export key types for easier access from other kiln modules (and lib.rs)
pub use artifact::Artifact;
pub use control::{RunStatus, StepStatus};
pub use step::{FnStep, Step, StepHandler, StepInputs, StepOutputs, StepSignature};
