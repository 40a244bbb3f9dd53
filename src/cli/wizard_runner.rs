//! Drives a [`WizardFlow`] interactively: prompt the current step's
//! fields, navigate on the controller, and hand the final draft to the
//! backend.

use serde_json::{json, Value};

use crate::backend::SubmissionBackend;
use crate::errors::GrantError;
use crate::forms::WizardFlow;
use crate::wizard::{FieldKind, FieldSpec, StepDef, SubmitError};

use super::output;
use super::prompts;

/// How an interactive wizard session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerOutcome {
    /// Backend accepted the draft; carries the record id.
    Submitted(String),
    Cancelled,
}

/// Runs the wizard loop until submission succeeds or the user backs out.
pub fn run_wizard(
    flow: &mut dyn WizardFlow,
    backend: &mut dyn SubmissionBackend,
) -> Result<RunnerOutcome, GrantError> {
    loop {
        let (index, total, step) = {
            let controller = flow.controller();
            let total = controller.steps().len();
            match controller.current_step() {
                Some(step) => (controller.current_index(), total, step.clone()),
                None => return Ok(RunnerOutcome::Cancelled),
            }
        };

        output::print_section(format!("步骤 {}/{} — {}", index + 1, total, step.title));

        let last_step = index + 1 == total;
        if last_step {
            render_summary(flow);
            match prompts::choose("确认提交", &["提交", "上一步", "取消"])? {
                0 => match flow.submit(backend) {
                    Ok(id) => {
                        output::print_success(format!("提交成功，编号 {id}"));
                        return Ok(RunnerOutcome::Submitted(id));
                    }
                    Err(SubmitError::Validation {
                        step_index, errors, ..
                    }) => {
                        output::print_warning(format!(
                            "第 {} 步校验未通过，请修正后重新提交",
                            step_index + 1
                        ));
                        render_errors(&errors);
                    }
                    Err(SubmitError::Backend(err)) => {
                        output::toast_error(err);
                    }
                },
                1 => flow.controller_mut().go_prev(),
                _ => return Ok(RunnerOutcome::Cancelled),
            }
            continue;
        }

        for field in &step.fields {
            fill_field(flow, field)?;
        }

        match prompts::choose("下一步操作", &["下一步", "上一步", "取消"])? {
            0 => {
                if !flow.controller_mut().go_next() {
                    let errors = flow.controller().errors().clone();
                    render_errors(&errors);
                }
            }
            1 => flow.controller_mut().go_prev(),
            _ => return Ok(RunnerOutcome::Cancelled),
        }
    }
}

fn fill_field(flow: &mut dyn WizardFlow, field: &FieldSpec) -> Result<(), GrantError> {
    let current = flow
        .controller()
        .draft()
        .get(field.key)
        .cloned();
    let value = prompt_value(field, current.as_ref())?;
    if let Some(value) = value {
        flow.set_field(field.key, value);
    }
    Ok(())
}

fn prompt_value(field: &FieldSpec, current: Option<&Value>) -> Result<Option<Value>, GrantError> {
    let default_text = current.and_then(Value::as_str);
    match &field.kind {
        FieldKind::Text | FieldKind::MultilineText => {
            if field.required {
                Ok(Some(json!(prompts::input_text(field.label, default_text)?)))
            } else {
                Ok(prompts::input_optional(field.label, default_text)?.map(|text| json!(text)))
            }
        }
        FieldKind::Date => Ok(Some(json!(prompts::input_date(field.label, default_text)?))),
        FieldKind::Integer => {
            let default = current.and_then(Value::as_i64);
            Ok(Some(json!(prompts::input_integer(field.label, default)?)))
        }
        FieldKind::Flag => {
            let default = current.and_then(Value::as_bool).unwrap_or(false);
            Ok(Some(json!(prompts::confirm(field.label, default)?)))
        }
        FieldKind::Choice(options) => {
            let index = prompts::choose(field.label, options)?;
            Ok(options.get(index).map(|label| json!(label)))
        }
        FieldKind::Collection(item_fields) => {
            Ok(Some(collect_items(field, item_fields)?))
        }
    }
}

fn collect_items(field: &FieldSpec, item_fields: &[FieldSpec]) -> Result<Value, GrantError> {
    let mut items = Vec::new();
    let prompt = if field.required {
        format!("添加{}条目？", field.label)
    } else {
        format!("添加{}条目？（可跳过）", field.label)
    };
    while prompts::confirm(&prompt, items.is_empty() && field.required)? {
        let mut item = serde_json::Map::new();
        for spec in item_fields {
            if let Some(value) = prompt_value(spec, None)? {
                item.insert(spec.key.to_string(), value);
            }
        }
        items.push(Value::Object(item));
    }
    Ok(Value::Array(items))
}

fn render_summary(flow: &dyn WizardFlow) {
    output::print_info("请核对以下信息：");
    for (key, value) in flow.controller().draft().iter() {
        let rendered = match value {
            Value::Array(items) => format!("{} 条", items.len()),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        output::print_info(format!("  {key}: {rendered}"));
    }
}

fn render_errors(errors: &crate::wizard::ErrorMap) {
    for (field, message) in errors {
        output::print_warning(format!("{field}: {message}"));
    }
}

/// Renders a one-line position indicator, e.g. `●─●─○─○`, used by menu
/// headers before the runner takes over.
pub fn progress_line(steps: &[StepDef], current: usize) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(index, _)| if index <= current { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join("─")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::StepDef;

    #[test]
    fn progress_line_marks_visited_steps() {
        let steps = vec![
            StepDef::new("a", "一", vec![]),
            StepDef::new("b", "二", vec![]),
            StepDef::new("c", "三", vec![]),
        ];
        assert_eq!(progress_line(&steps, 1), "●─●─○");
    }
}
