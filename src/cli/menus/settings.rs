//! Settings view backed by the persisted configuration file.

use crate::errors::GrantError;
use crate::listing::SortKey;

use super::super::output::{self, OutputPreferences};
use super::super::prompts;
use super::AppContext;

pub fn run(context: &mut AppContext) -> Result<(), GrantError> {
    loop {
        output::print_section("设置");
        output::print_info(format!("每页条数: {}", context.config.page_size));
        output::print_info(format!("默认排序: {}", sort_label(context.config.default_sort)));
        output::print_info(format!("模拟延迟: {} ms", context.config.mock_latency_ms));
        output::print_info(format!("安静模式: {}", flag_label(context.config.quiet_mode)));
        output::print_info(format!("无颜色输出: {}", flag_label(context.config.plain_output)));

        let choice = prompts::choose(
            "操作",
            &[
                "修改每页条数",
                "修改默认排序",
                "修改模拟延迟",
                "切换安静模式",
                "切换无颜色输出",
                "保存并返回",
            ],
        )?;
        match choice {
            0 => {
                let value = prompts::input_integer("每页条数", Some(context.config.page_size as i64))?;
                context.config.page_size = (value.max(1)) as usize;
            }
            1 => {
                let index = prompts::choose("默认排序", &["开始日期", "结束日期", "名称"])?;
                context.config.default_sort = match index {
                    1 => SortKey::EndDate,
                    2 => SortKey::Name,
                    _ => SortKey::StartDate,
                };
            }
            2 => {
                let value = prompts::input_integer(
                    "模拟延迟（毫秒）",
                    Some(context.config.mock_latency_ms as i64),
                )?;
                context.config.mock_latency_ms = value as u64;
                context
                    .backend
                    .set_latency(std::time::Duration::from_millis(context.config.mock_latency_ms));
            }
            3 => context.config.quiet_mode = !context.config.quiet_mode,
            4 => context.config.plain_output = !context.config.plain_output,
            _ => {
                output::set_preferences(OutputPreferences {
                    quiet_mode: context.config.quiet_mode,
                    plain_output: context.config.plain_output,
                });
                match context.config_manager.save(&context.config) {
                    Ok(()) => output::print_success("设置已保存"),
                    Err(err) => output::print_error(format!("设置保存失败: {err}")),
                }
                return Ok(());
            }
        }
    }
}

fn sort_label(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Name => "名称",
        SortKey::StartDate => "开始日期",
        SortKey::EndDate => "结束日期",
    }
}

fn flag_label(flag: bool) -> &'static str {
    if flag {
        "开"
    } else {
        "关"
    }
}
