//! Batch list view with search, filtering, pagination, selection, and the
//! create/edit/delete actions driven through the batch wizard.

use chrono::NaiveDate;

use crate::backend::{BackendError, BatchQuery, SubmissionBackend};
use crate::catalog::{BatchKind, BatchRecord, Phase};
use crate::errors::GrantError;
use crate::forms::BatchWizard;
use crate::listing::Selection;

use super::super::tables::{Table, TableColumn};
use super::super::wizard_runner::{run_wizard, RunnerOutcome};
use super::super::{output, prompts};
use super::AppContext;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn run(context: &mut AppContext, kind: BatchKind) -> Result<(), GrantError> {
    let mut query = BatchQuery::first_page(context.config.page_size);
    query.filter.kind = Some(kind);
    query.sort = context.config.default_sort;
    let mut selection = Selection::new();

    loop {
        let now = today();
        let page = match context.backend.list_batches(&query, now) {
            Ok(page) => page,
            Err(err) => {
                output::toast_error(err);
                return Ok(());
            }
        };

        output::print_section(format!(
            "{}（第 {}/{} 页，共 {} 条）",
            kind.label(),
            page.page,
            page.page_count().max(1),
            page.total
        ));
        render_batch_table(&page.items, &selection, now);
        if !selection.is_empty() {
            output::print_info(format!("已选中 {} 条", selection.len()));
        }

        let choice = prompts::choose(
            "操作",
            &[
                "创建批次",
                "编辑批次",
                "删除批次",
                "选择/取消选择",
                "全选本页",
                "清空选择",
                "批量删除选中",
                "搜索",
                "按阶段筛选",
                "下一页",
                "上一页",
                "返回",
            ],
        )?;
        match choice {
            0 => create_batch(context, kind)?,
            1 => edit_batch(context, &page.items)?,
            2 => delete_batch(context, &page.items)?,
            3 => toggle_selection(&mut selection, &page.items)?,
            4 => selection.select_all(page.items.iter().map(|batch| batch.id.as_str())),
            5 => selection.clear(),
            6 => delete_selected(context, &mut selection)?,
            7 => {
                query.filter.search = prompts::input_optional("搜索名称或描述", None)?;
                query.page = 1;
            }
            8 => {
                query.filter.phase = choose_phase()?;
                query.page = 1;
            }
            9 => {
                if query.page < page.page_count() {
                    query.page += 1;
                }
            }
            10 => query.page = query.page.saturating_sub(1).max(1),
            _ => return Ok(()),
        }
    }
}

fn render_batch_table(batches: &[BatchRecord], selection: &Selection, now: NaiveDate) {
    let mut table = Table::new(vec![
        TableColumn::left(" "),
        TableColumn::left("编号"),
        TableColumn::left("名称").capped(24),
        TableColumn::left("类别").capped(16),
        TableColumn::left("阶段"),
        TableColumn::left("起止"),
        TableColumn::right("项目数"),
    ]);
    for batch in batches {
        table.push_row(vec![
            if selection.is_selected(&batch.id) { "*" } else { " " }.into(),
            batch.id.clone(),
            batch.name.clone(),
            batch.category.clone(),
            batch.phase(now).label().into(),
            format!("{} ~ {}", batch.start_date, batch.end_date),
            batch.project_count.to_string(),
        ]);
    }
    if batches.is_empty() {
        output::print_info("暂无数据");
    } else {
        output::print_info(table.render());
    }
}

fn create_batch(context: &mut AppContext, kind: BatchKind) -> Result<(), GrantError> {
    let mut wizard = BatchWizard::new_create(kind);
    run_wizard(&mut wizard, &mut context.backend)?;
    Ok(())
}

fn edit_batch(context: &mut AppContext, visible: &[BatchRecord]) -> Result<(), GrantError> {
    let Some(id) = pick_batch_id(visible)? else {
        return Ok(());
    };
    let record = match context.backend.get_batch(&id) {
        Ok(record) => record,
        Err(err) => {
            output::toast_error(err);
            return Ok(());
        }
    };
    let mut wizard = BatchWizard::new_edit(&record);
    if let RunnerOutcome::Submitted(id) = run_wizard(&mut wizard, &mut context.backend)? {
        tracing::info!(%id, "batch updated");
    }
    Ok(())
}

fn delete_batch(context: &mut AppContext, visible: &[BatchRecord]) -> Result<(), GrantError> {
    let Some(id) = pick_batch_id(visible)? else {
        return Ok(());
    };
    if !prompts::confirm(&format!("确认删除批次 {id}？关联项目将一并删除"), false)? {
        return Ok(());
    }
    match context.backend.delete_batch(&id) {
        Ok(()) => output::print_success("已删除"),
        Err(err) => output::toast_error(err),
    }
    Ok(())
}

fn toggle_selection(selection: &mut Selection, visible: &[BatchRecord]) -> Result<(), GrantError> {
    if visible.is_empty() {
        output::print_info("暂无数据");
        return Ok(());
    }
    let labels: Vec<String> = visible
        .iter()
        .map(|batch| format!("{} {}", batch.id, batch.name))
        .collect();
    for index in prompts::choose_many("切换选中状态", &labels)? {
        if let Some(batch) = visible.get(index) {
            selection.toggle(&batch.id);
        }
    }
    Ok(())
}

fn delete_selected(context: &mut AppContext, selection: &mut Selection) -> Result<(), GrantError> {
    if selection.is_empty() {
        output::print_warning("请先选择要删除的批次");
        return Ok(());
    }
    if !prompts::confirm(&format!("确认删除选中的 {} 条批次？", selection.len()), false)? {
        return Ok(());
    }
    let ids: Vec<String> = selection.ids().map(str::to_string).collect();
    let mut failed = Vec::new();
    for id in ids {
        match context.backend.delete_batch(&id) {
            Ok(()) => {}
            Err(BackendError::NotFound(_)) => {}
            Err(err) => {
                failed.push(id.clone());
                output::toast_error(err);
            }
        }
    }
    selection.clear();
    selection.select_all(failed.iter().map(String::as_str));
    Ok(())
}

fn pick_batch_id(visible: &[BatchRecord]) -> Result<Option<String>, GrantError> {
    if visible.is_empty() {
        output::print_info("暂无数据");
        return Ok(None);
    }
    let mut labels: Vec<String> = visible
        .iter()
        .map(|batch| format!("{} {}", batch.id, batch.name))
        .collect();
    labels.push("取消".into());
    let index = prompts::choose("选择批次", &labels.iter().map(String::as_str).collect::<Vec<_>>())?;
    Ok(visible.get(index).map(|batch| batch.id.clone()))
}

fn choose_phase() -> Result<Option<Phase>, GrantError> {
    let index = prompts::choose("阶段", &["全部", "未开始", "进行中", "已结束"])?;
    Ok(match index {
        1 => Some(Phase::NotStarted),
        2 => Some(Phase::InProgress),
        3 => Some(Phase::Ended),
        _ => None,
    })
}
