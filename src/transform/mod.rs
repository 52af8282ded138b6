//! Lifting wavelet transforms and their two dimensional drivers.

pub mod filter;
pub mod lifting;
pub mod recursive;

pub use filter::{Cascade, Filter, LinearScheme, Mass};
pub use lifting::{LiftingScheme, LiftingStep, Sample, StepFn, StepKind};
pub use recursive::{Inverse2d, Transform2d};
