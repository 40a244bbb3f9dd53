//! Expert roster view and review-notification dispatch.

use chrono::NaiveDate;

use crate::backend::{BatchQuery, SubmissionBackend};
use crate::catalog::{BatchKind, ExpertInfo};
use crate::errors::GrantError;
use crate::notify::{dispatch, DispatchError, NotificationRequest};

use super::super::tables::{Table, TableColumn};
use super::super::{output, prompts};
use super::AppContext;

pub fn run(context: &mut AppContext) -> Result<(), GrantError> {
    loop {
        let page = match context.backend.list_experts(1, context.config.page_size) {
            Ok(page) => page,
            Err(err) => {
                output::toast_error(err);
                return Ok(());
            }
        };

        output::print_section(format!("评审专家（共 {} 人）", page.total));
        render_expert_table(&page.items);

        match prompts::choose("操作", &["发送评审通知", "返回"])? {
            0 => send_notification(context, &page.items)?,
            _ => return Ok(()),
        }
    }
}

fn render_expert_table(experts: &[ExpertInfo]) {
    let mut table = Table::new(vec![
        TableColumn::left("编号"),
        TableColumn::left("姓名"),
        TableColumn::left("职称"),
        TableColumn::left("单位").capped(20),
        TableColumn::left("研究领域").capped(16),
        TableColumn::left("邮箱"),
    ]);
    for expert in experts {
        table.push_row(vec![
            expert.id.clone(),
            expert.name.clone(),
            expert.title.clone(),
            expert.institution.clone(),
            expert.field.clone(),
            expert.email.clone(),
        ]);
    }
    if experts.is_empty() {
        output::print_info("暂无数据");
    } else {
        output::print_info(table.render());
    }
}

/// Builds the typed request from the selections, then validates and
/// dispatches it in one step.
fn send_notification(context: &mut AppContext, experts: &[ExpertInfo]) -> Result<(), GrantError> {
    let Some(batch_id) = pick_review_batch(context)? else {
        return Ok(());
    };

    let labels: Vec<String> = experts
        .iter()
        .map(|expert| format!("{}（{}，{}）", expert.name, expert.title, expert.institution))
        .collect();
    let picked = prompts::choose_many("选择评审专家", &labels)?;
    let expert_ids: Vec<String> = picked
        .into_iter()
        .filter_map(|index| experts.get(index))
        .map(|expert| expert.id.clone())
        .collect();

    let mut request = NotificationRequest::new(batch_id, expert_ids);
    request.subject = prompts::input_optional("通知标题", Some("评审邀请"))?.unwrap_or_default();
    request.body = prompts::input_optional("通知内容", None)?.unwrap_or_default();

    match dispatch(&mut context.backend, &request) {
        Ok(delivered) => output::print_success(format!("已通知 {delivered} 位专家")),
        Err(DispatchError::Invalid(errors)) => {
            for (field, message) in errors {
                output::print_warning(format!("{field}: {message}"));
            }
        }
        Err(DispatchError::Backend(err)) => output::toast_error(err),
    }
    Ok(())
}

fn pick_review_batch(context: &mut AppContext) -> Result<Option<String>, GrantError> {
    let mut query = BatchQuery::first_page(context.config.page_size);
    query.filter.kind = Some(BatchKind::Review);
    let now: NaiveDate = chrono::Local::now().date_naive();
    let page = match context.backend.list_batches(&query, now) {
        Ok(page) => page,
        Err(err) => {
            output::toast_error(err);
            return Ok(None);
        }
    };
    if page.items.is_empty() {
        output::print_warning("当前没有评审批次");
        return Ok(None);
    }
    let mut labels: Vec<String> = page
        .items
        .iter()
        .map(|batch| format!("{} {}", batch.id, batch.name))
        .collect();
    labels.push("取消".into());
    let index =
        prompts::choose("评审批次", &labels.iter().map(String::as_str).collect::<Vec<_>>())?;
    Ok(page.items.get(index).map(|batch| batch.id.clone()))
}
