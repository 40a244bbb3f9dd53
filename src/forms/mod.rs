//! Entity-specific wizard definitions built on the generic wizard core.

pub mod application;
pub mod batch;

use serde_json::Value;

use crate::backend::{BackendError, SubmissionBackend};
use crate::wizard::{SubmitError, WizardController};

pub use application::{application_steps, ApplicationWizard, GENERATION_TYPE_KEY};
pub use batch::{batch_steps, BatchWizard};

/// Uniform driving surface for entity wizards, so front ends can run any
/// of them through the same loop.
///
/// `set_field` exists as a seam because some wizards react to specific
/// fields (the application wizard re-resolves its step list when the
/// generation type changes).
pub trait WizardFlow {
    fn controller(&self) -> &WizardController;

    fn controller_mut(&mut self) -> &mut WizardController;

    fn set_field(&mut self, key: &str, value: Value) {
        self.controller_mut().update_field(key, value);
    }

    /// Hands the validated draft to the backend; returns the record id.
    fn submit(
        &mut self,
        backend: &mut dyn SubmissionBackend,
    ) -> Result<String, SubmitError<BackendError>>;
}

impl WizardFlow for BatchWizard {
    fn controller(&self) -> &WizardController {
        BatchWizard::controller(self)
    }

    fn controller_mut(&mut self) -> &mut WizardController {
        BatchWizard::controller_mut(self)
    }

    fn submit(
        &mut self,
        backend: &mut dyn SubmissionBackend,
    ) -> Result<String, SubmitError<BackendError>> {
        BatchWizard::submit(self, backend)
    }
}

impl WizardFlow for ApplicationWizard {
    fn controller(&self) -> &WizardController {
        ApplicationWizard::controller(self)
    }

    fn controller_mut(&mut self) -> &mut WizardController {
        ApplicationWizard::controller_mut(self)
    }

    fn set_field(&mut self, key: &str, value: Value) {
        ApplicationWizard::update_field(self, key, value);
    }

    fn submit(
        &mut self,
        backend: &mut dyn SubmissionBackend,
    ) -> Result<String, SubmitError<BackendError>> {
        ApplicationWizard::submit(self, backend)
    }
}
