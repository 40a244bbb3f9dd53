//! Thin dialoguer wrappers shared by the menus and the wizard runner.

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::errors::GrantError;

/// Required text input; re-prompts until non-blank.
pub fn input_text(prompt: &str, default: Option<&str>) -> Result<String, GrantError> {
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text()?;
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        super::output::print_warning("该字段不能为空");
    }
}

/// Optional text input; blank returns `None`.
pub fn input_optional(prompt: &str, default: Option<&str>) -> Result<Option<String>, GrantError> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let value = input.interact_text()?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Date input in `YYYY-MM-DD`; re-prompts until it parses.
pub fn input_date(prompt: &str, default: Option<&str>) -> Result<String, GrantError> {
    loop {
        let value = input_text(&format!("{prompt} (YYYY-MM-DD)"), default)?;
        if NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok() {
            return Ok(value);
        }
        super::output::print_warning("日期格式应为 YYYY-MM-DD");
    }
}

/// Non-negative integer input.
pub fn input_integer(prompt: &str, default: Option<i64>) -> Result<i64, GrantError> {
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text()?;
        match value.trim().parse::<i64>() {
            Ok(number) if number >= 0 => return Ok(number),
            _ => super::output::print_warning("请输入非负整数"),
        }
    }
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool, GrantError> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Single choice; returns the selected index.
pub fn choose(prompt: &str, items: &[&str]) -> Result<usize, GrantError> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}

/// Multi-selection; returns the selected indices.
pub fn choose_many(prompt: &str, items: &[String]) -> Result<Vec<usize>, GrantError> {
    Ok(MultiSelect::new()
        .with_prompt(prompt)
        .items(items)
        .interact()?)
}
