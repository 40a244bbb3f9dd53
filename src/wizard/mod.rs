//! Reusable multi-step wizard state machine.
//!
//! A wizard is an ordered list of [`StepDef`]s, each with a stable id and
//! an optional pure validator, driven by a [`WizardController`] that owns
//! the draft record and gates forward navigation on validation. Front ends
//! render `FieldSpec`s generically and never dispatch on display labels.

pub mod controller;
pub mod draft;
pub mod step;

pub use controller::{SubmitError, WizardController, WizardPhase};
pub use draft::Draft;
pub use step::{ErrorMap, FieldKind, FieldSpec, StepDef, StepValidator};
