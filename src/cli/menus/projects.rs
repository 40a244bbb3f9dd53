//! Project application list and the create/edit/delete actions driven
//! through the application wizard.

use crate::backend::SubmissionBackend;
use crate::catalog::ProjectRecord;
use crate::errors::GrantError;
use crate::forms::ApplicationWizard;

use super::super::tables::{Table, TableColumn};
use super::super::wizard_runner::run_wizard;
use super::super::{output, prompts};
use super::AppContext;

pub fn run(context: &mut AppContext) -> Result<(), GrantError> {
    let mut page_number = 1;
    let mut batch_filter: Option<String> = None;

    loop {
        let page = match context.backend.list_projects(
            batch_filter.as_deref(),
            page_number,
            context.config.page_size,
        ) {
            Ok(page) => page,
            Err(err) => {
                output::toast_error(err);
                return Ok(());
            }
        };

        output::print_section(format!(
            "项目申报（第 {}/{} 页，共 {} 条）",
            page.page,
            page.page_count().max(1),
            page.total
        ));
        render_project_table(&page.items);

        let choice = prompts::choose(
            "操作",
            &[
                "创建项目",
                "编辑项目",
                "删除项目",
                "按批次筛选",
                "下一页",
                "上一页",
                "返回",
            ],
        )?;
        match choice {
            0 => create_project(context)?,
            1 => edit_project(context, &page.items)?,
            2 => delete_project(context, &page.items)?,
            3 => {
                batch_filter = prompts::input_optional("批次编号（留空显示全部）", None)?;
                page_number = 1;
            }
            4 => {
                if page_number < page.page_count() {
                    page_number += 1;
                }
            }
            5 => page_number = page_number.saturating_sub(1).max(1),
            _ => return Ok(()),
        }
    }
}

fn render_project_table(projects: &[ProjectRecord]) {
    let mut table = Table::new(vec![
        TableColumn::left("编号"),
        TableColumn::left("批次"),
        TableColumn::left("名称").capped(24),
        TableColumn::left("负责人"),
        TableColumn::left("生成方式"),
        TableColumn::left("状态"),
        TableColumn::left("提交日期"),
    ]);
    for project in projects {
        table.push_row(vec![
            project.id.clone(),
            project.batch_id.clone(),
            project.title.clone(),
            project.leader.clone(),
            project.generation_type.label().into(),
            project.state.label().into(),
            project.submitted_on.to_string(),
        ]);
    }
    if projects.is_empty() {
        output::print_info("暂无数据");
    } else {
        output::print_info(table.render());
    }
}

fn create_project(context: &mut AppContext) -> Result<(), GrantError> {
    let batch_id = prompts::input_text("申报批次编号", None)?;
    if let Err(err) = context.backend.get_batch(&batch_id) {
        output::toast_error(err);
        return Ok(());
    }
    let mut wizard = ApplicationWizard::new_create(batch_id);
    run_wizard(&mut wizard, &mut context.backend)?;
    Ok(())
}

fn edit_project(context: &mut AppContext, visible: &[ProjectRecord]) -> Result<(), GrantError> {
    let Some(record) = pick_project(visible)? else {
        return Ok(());
    };
    let mut wizard = ApplicationWizard::new_edit(&record);
    run_wizard(&mut wizard, &mut context.backend)?;
    Ok(())
}

fn delete_project(context: &mut AppContext, visible: &[ProjectRecord]) -> Result<(), GrantError> {
    let Some(record) = pick_project(visible)? else {
        return Ok(());
    };
    if !prompts::confirm(&format!("确认删除项目 {}？", record.id), false)? {
        return Ok(());
    }
    match context.backend.delete_project(&record.id) {
        Ok(()) => output::print_success("已删除"),
        Err(err) => output::toast_error(err),
    }
    Ok(())
}

fn pick_project(visible: &[ProjectRecord]) -> Result<Option<ProjectRecord>, GrantError> {
    if visible.is_empty() {
        output::print_info("暂无数据");
        return Ok(None);
    }
    let mut labels: Vec<String> = visible
        .iter()
        .map(|project| format!("{} {}", project.id, project.title))
        .collect();
    labels.push("取消".into());
    let index =
        prompts::choose("选择项目", &labels.iter().map(String::as_str).collect::<Vec<_>>())?;
    Ok(visible.get(index).cloned())
}
