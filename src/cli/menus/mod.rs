//! Interactive menu loop standing in for the browser pages.

mod batches;
mod experts;
mod projects;
mod settings;

use crate::backend::MockBackend;
use crate::catalog::BatchKind;
use crate::config::{Config, ConfigManager};
use crate::errors::GrantError;

use super::{output, prompts};

/// Mutable state shared by every menu: the backend stub, the active
/// configuration, and where to persist configuration edits.
pub struct AppContext {
    pub backend: MockBackend,
    pub config: Config,
    pub config_manager: ConfigManager,
}

/// Top-level menu loop; returns when the user quits.
pub fn run_cli(context: &mut AppContext) -> Result<(), GrantError> {
    loop {
        output::print_section("科研项目管理");
        let choice = prompts::choose(
            "请选择功能",
            &[
                "申报批次管理",
                "评审批次管理",
                "项目申报管理",
                "评审专家与通知",
                "设置",
                "退出",
            ],
        )?;
        match choice {
            0 => batches::run(context, BatchKind::Application)?,
            1 => batches::run(context, BatchKind::Review)?,
            2 => projects::run(context)?,
            3 => experts::run(context)?,
            4 => settings::run(context)?,
            _ => return Ok(()),
        }
    }
}
