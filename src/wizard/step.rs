use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::draft::Draft;

/// Field-keyed validation messages for one step. Empty means the step
/// passes.
pub type ErrorMap = BTreeMap<String, String>;

/// Pure step validator: reads the draft, reports field errors, changes
/// nothing.
pub type StepValidator = Arc<dyn Fn(&Draft) -> ErrorMap + Send + Sync>;

/// Supported input kinds for a prompted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultilineText,
    Date,
    Integer,
    Flag,
    Choice(Vec<&'static str>),
    /// Repeating line items (materials, team members, budget rows), each
    /// described by its own field list.
    Collection(Vec<FieldSpec>),
}

/// Declarative description of a single draft field, used by front ends to
/// prompt generically. Behaviour is never dispatched on the display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// One step of a wizard: a stable id, a display title, the fields it
/// collects, and an optional validator gating forward navigation.
///
/// Completion tracking and navigation permissions are keyed by `id`, never
/// by position or title, so re-resolving the step list cannot silently
/// reroute validation.
#[derive(Clone)]
pub struct StepDef {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    validator: Option<StepValidator>,
}

impl StepDef {
    pub fn new(id: &'static str, title: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            id,
            title,
            fields,
            validator: None,
        }
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Draft) -> ErrorMap + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Runs the step validator against the draft. Steps without a
    /// validator always pass.
    pub fn validate(&self, draft: &Draft) -> ErrorMap {
        match &self.validator {
            Some(validator) => validator(draft),
            None => ErrorMap::new(),
        }
    }
}

impl fmt::Debug for StepDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDef")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("fields", &self.fields.len())
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
