use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

/// Output behaviour toggles, sourced from [`crate::config::Config`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    pub quiet_mode: bool,
    pub plain_output: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn styled(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Success => format!("[✓] {text}"),
        MessageKind::Warning => format!("[!] {text}"),
        MessageKind::Error => format!("[x] {text}"),
        MessageKind::Info => text,
    };
    if prefs.plain_output {
        return base;
    }
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = preferences();
    if prefs.quiet_mode && kind == MessageKind::Info {
        return;
    }
    match kind {
        MessageKind::Section => println!("\n{}", styled(kind, message, &prefs)),
        _ => println!("{}", styled(kind, message, &prefs)),
    }
}

pub fn print_info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn print_success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn print_warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn print_error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn print_section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Dismissable-toast equivalent for operation failures: the message plus
/// the generic retry hint.
pub fn toast_error(message: impl fmt::Display) {
    print(MessageKind::Error, format!("{message}（请稍后重试）"));
}
