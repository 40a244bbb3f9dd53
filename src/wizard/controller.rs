use std::collections::HashSet;

use serde_json::Value;

use super::draft::Draft;
use super::step::{ErrorMap, StepDef};

/// Where the wizard is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    /// Fields are editable and navigation is live.
    Editing,
    /// The submission closure is running; the submit control is disabled.
    Submitting,
    /// The backend accepted the draft; the wizard shows its success view.
    Completed,
}

/// Why a `submit` call did not complete.
///
/// Both variants are recoverable: validation failures re-open the failing
/// step, backend failures leave the draft intact for retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError<E> {
    Validation {
        step_index: usize,
        step_id: &'static str,
        errors: ErrorMap,
    },
    Backend(E),
}

/// Owns step position and draft mutation for one wizard instance, gating
/// forward navigation on a validation pass.
///
/// Completion is tracked by stable step id, so swapping in a re-resolved
/// step list (see [`WizardController::replace_steps`]) keeps completion
/// attached to the steps it was earned on.
pub struct WizardController {
    steps: Vec<StepDef>,
    current: usize,
    completed: HashSet<&'static str>,
    draft: Draft,
    errors: ErrorMap,
    phase: WizardPhase,
}

impl WizardController {
    pub fn new(steps: Vec<StepDef>, draft: Draft) -> Self {
        Self {
            steps,
            current: 0,
            completed: HashSet::new(),
            draft,
            errors: ErrorMap::new(),
            phase: WizardPhase::Editing,
        }
    }

    pub fn steps(&self) -> &[StepDef] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&StepDef> {
        self.steps.get(self.current)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Validation errors currently on display for the active step.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == WizardPhase::Completed
    }

    pub fn is_step_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Merges a field into the draft and synchronously clears any error
    /// displayed under the same key, so stale messages never sit next to
    /// corrected input. Always succeeds.
    pub fn update_field(&mut self, key: &str, value: impl Into<Value>) {
        self.draft.set(key, value);
        self.errors.remove(key);
    }

    /// Appends one line item to an array field, clearing that field's
    /// error the same way `update_field` does.
    pub fn push_item(&mut self, key: &str, item: Value) {
        self.draft.push_item(key, item);
        self.errors.remove(key);
    }

    /// Runs the given step's validator against the current draft, stores
    /// the result as display state, and returns it. Deterministic for a
    /// given draft.
    pub fn validate_step(&mut self, index: usize) -> ErrorMap {
        let errors = match self.steps.get(index) {
            Some(step) => step.validate(&self.draft),
            None => ErrorMap::new(),
        };
        self.errors = errors.clone();
        errors
    }

    /// Validates the current step; on success marks it completed and
    /// advances (clamped to the last step). On failure the position is
    /// unchanged and the errors stay on display. Returns whether the
    /// position advanced.
    pub fn go_next(&mut self) -> bool {
        let errors = self.validate_step(self.current);
        if !errors.is_empty() {
            return false;
        }
        if let Some(step) = self.steps.get(self.current) {
            self.completed.insert(step.id);
        }
        let last = self.steps.len().saturating_sub(1);
        if self.current < last {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Moves one step back, clamped at the first step. Backward
    /// navigation never validates.
    pub fn go_prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jumps to step `index` when it is at or before the current position
    /// or already completed; otherwise the request is silently ignored.
    pub fn go_to_step(&mut self, index: usize) {
        if index >= self.steps.len() {
            return;
        }
        let permitted = index <= self.current
            || self
                .steps
                .get(index)
                .map(|step| self.completed.contains(step.id))
                .unwrap_or(false);
        if permitted {
            self.current = index;
        }
    }

    /// Re-validates every step except the final confirmation step, then
    /// hands the draft to the submission closure.
    ///
    /// On the first validation failure the displayed step jumps to the
    /// failing one and no submission happens. A backend failure leaves the
    /// draft intact and the wizard editable; no partial state survives.
    pub fn submit<T, E, F>(&mut self, op: F) -> Result<T, SubmitError<E>>
    where
        F: FnOnce(&Draft) -> Result<T, E>,
    {
        let gated = self.steps.len().saturating_sub(1);
        for index in 0..gated {
            let errors = self.steps[index].validate(&self.draft);
            if !errors.is_empty() {
                self.current = index;
                self.errors = errors.clone();
                return Err(SubmitError::Validation {
                    step_index: index,
                    step_id: self.steps[index].id,
                    errors,
                });
            }
        }

        self.errors.clear();
        self.phase = WizardPhase::Submitting;
        match op(&self.draft) {
            Ok(receipt) => {
                self.phase = WizardPhase::Completed;
                Ok(receipt)
            }
            Err(err) => {
                self.phase = WizardPhase::Editing;
                Err(SubmitError::Backend(err))
            }
        }
    }

    /// Swaps in a re-resolved step list (e.g. after the form generation
    /// type changed).
    ///
    /// Completion is retained for step ids that survive and dropped for
    /// ids absent from the new list. The current position follows the
    /// current step's id when it survives, otherwise it is clamped.
    pub fn replace_steps(&mut self, steps: Vec<StepDef>) {
        let current_id = self.steps.get(self.current).map(|step| step.id);
        let surviving: HashSet<&'static str> = steps.iter().map(|step| step.id).collect();
        self.completed.retain(|id| surviving.contains(id));

        let remapped = current_id
            .and_then(|id| steps.iter().position(|step| step.id == id));
        match remapped {
            Some(index) => self.current = index,
            None => {
                self.current = self.current.min(steps.len().saturating_sub(1));
                self.errors.clear();
            }
        }
        self.steps = steps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::step::{FieldKind, FieldSpec};

    fn require_name(draft: &Draft) -> ErrorMap {
        let mut errors = ErrorMap::new();
        if draft.str_field("name").is_none() {
            errors.insert("name".into(), "名称不能为空".into());
        }
        errors
    }

    fn three_steps() -> Vec<StepDef> {
        vec![
            StepDef::new(
                "basic",
                "基本信息",
                vec![FieldSpec::new("name", "名称", FieldKind::Text)],
            )
            .with_validator(require_name),
            StepDef::new("detail", "详细信息", vec![]),
            StepDef::new("confirm", "确认提交", vec![]),
        ]
    }

    #[test]
    fn go_next_blocks_on_validation_failure() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        assert!(!wizard.go_next());
        assert_eq!(wizard.current_index(), 0);
        assert!(wizard.errors().contains_key("name"));

        wizard.update_field("name", "重点专项");
        assert!(wizard.go_next());
        assert_eq!(wizard.current_index(), 1);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn update_field_clears_stale_error_and_is_idempotent() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.go_next();
        assert!(wizard.errors().contains_key("name"));

        wizard.update_field("name", "青年基金");
        assert!(!wizard.errors().contains_key("name"));
        let once = (wizard.draft().clone(), wizard.errors().clone());

        wizard.update_field("name", "青年基金");
        assert_eq!(wizard.draft(), &once.0);
        assert_eq!(wizard.errors(), &once.1);
        assert_eq!(wizard.draft().str_field("name"), Some("青年基金"));
    }

    #[test]
    fn go_to_step_ignores_unvisited_targets() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.go_to_step(2);
        assert_eq!(wizard.current_index(), 0);

        wizard.update_field("name", "x");
        wizard.go_next();
        wizard.go_to_step(0);
        assert_eq!(wizard.current_index(), 0);
        // Step 0 is completed, so jumping forward to it from anywhere works,
        // but step 2 is still out of reach.
        wizard.go_to_step(2);
        assert_eq!(wizard.current_index(), 0);
    }

    #[test]
    fn go_prev_clamps_and_never_validates() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.go_prev();
        assert_eq!(wizard.current_index(), 0);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn submit_jumps_to_first_failing_step() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.update_field("name", "x");
        wizard.go_next();
        wizard.draft();
        // Invalidate step 0 behind the controller's back.
        wizard.update_field("name", " ");

        let result: Result<(), SubmitError<&str>> = wizard.submit(|_| Ok(()));
        match result {
            Err(SubmitError::Validation {
                step_index, step_id, ..
            }) => {
                assert_eq!(step_index, 0);
                assert_eq!(step_id, "basic");
                assert_eq!(wizard.current_index(), 0);
            }
            other => panic!("expected validation failure, got {:?}", other.is_ok()),
        }
        assert_eq!(wizard.phase(), WizardPhase::Editing);
    }

    #[test]
    fn backend_failure_keeps_draft_for_retry() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.update_field("name", "软科学专项");

        let result: Result<(), SubmitError<String>> =
            wizard.submit(|_| Err("稍后重试".to_string()));
        assert!(matches!(result, Err(SubmitError::Backend(_))));
        assert_eq!(wizard.phase(), WizardPhase::Editing);
        assert_eq!(wizard.draft().str_field("name"), Some("软科学专项"));

        let result: Result<&'static str, SubmitError<String>> = wizard.submit(|_| Ok("batch-9"));
        assert_eq!(result, Ok("batch-9"));
        assert!(wizard.is_completed());
    }

    #[test]
    fn replace_steps_remaps_by_id_and_drops_orphans() {
        let mut wizard = WizardController::new(three_steps(), Draft::new());
        wizard.update_field("name", "x");
        wizard.go_next(); // completes "basic", now on "detail"

        wizard.replace_steps(vec![
            StepDef::new("basic", "基本信息", vec![]),
            StepDef::new("upload", "附件材料", vec![]),
            StepDef::new("detail", "详细信息", vec![]),
            StepDef::new("confirm", "确认提交", vec![]),
        ]);
        // "detail" moved to index 2; the position follows the id.
        assert_eq!(wizard.current_index(), 2);
        assert!(wizard.is_step_completed("basic"));

        wizard.replace_steps(vec![
            StepDef::new("upload", "附件材料", vec![]),
            StepDef::new("confirm", "确认提交", vec![]),
        ]);
        // "detail" and "basic" are gone: position clamps, completion drops.
        assert_eq!(wizard.current_index(), 1);
        assert!(!wizard.is_step_completed("basic"));
    }
}
