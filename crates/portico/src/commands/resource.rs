//! Generic resource handler: one implementation serves every entity.

use std::sync::Arc;

use tracing::debug;

use portico_core::form::RecordForm;
use portico_core::list::page_info;
use portico_core::resource::{SEARCH, decode_record};
use portico_core::{
    Command as CoreCommand, CommandResult, ConfirmModal, Controller, CoreError, EntityId,
    FilterState, FilterValue, FormModal, Notification, RequestParams, Resource, RowAction, Sort,
    SortOrder, TableState, list::parse_filter,
};

use crate::cli::{
    ContentCommand, CrudCommand, GlobalOpts, ListArgs, ViolationsCommand, WriteArgs,
};
use crate::error::CliError;
use crate::output;

use super::rows::{Listing, detail};
use super::util;

// ── Operations ──────────────────────────────────────────────────────

/// Every subcommand shape, flattened.
#[derive(Debug)]
pub enum Op {
    List(ListArgs),
    Get { id: String },
    Create(WriteArgs),
    Update { id: String, write: WriteArgs },
    Delete { id: String },
    Transition {
        id: String,
        action: RowAction,
        input: Option<String>,
    },
}

impl From<CrudCommand> for Op {
    fn from(cmd: CrudCommand) -> Self {
        match cmd {
            CrudCommand::List(args) => Self::List(args),
            CrudCommand::Get { id } => Self::Get { id },
            CrudCommand::Create(write) => Self::Create(write),
            CrudCommand::Update { id, write } => Self::Update { id, write },
            CrudCommand::Delete { id } => Self::Delete { id },
        }
    }
}

impl From<ContentCommand> for Op {
    fn from(cmd: ContentCommand) -> Self {
        let (id, action, input) = match cmd {
            ContentCommand::Crud(crud) => return crud.into(),
            ContentCommand::Publish { id, at } => (id, RowAction::Publish, at),
            ContentCommand::Pin { id, order } => (id, RowAction::Pin, Some(order)),
            ContentCommand::Unpin { id } => (id, RowAction::Unpin, None),
            ContentCommand::Archive { id } => (id, RowAction::Archive, None),
        };
        Self::Transition { id, action, input }
    }
}

impl From<ViolationsCommand> for Op {
    fn from(cmd: ViolationsCommand) -> Self {
        match cmd {
            ViolationsCommand::Crud(crud) => crud.into(),
            ViolationsCommand::Archive { id } => Self::Transition {
                id,
                action: RowAction::Archive,
                input: None,
            },
        }
    }
}

// ── Request building ────────────────────────────────────────────────

/// Table state, filters and derived query for a `list` invocation.
pub fn list_request<R: Resource>(
    args: &ListArgs,
    default_page_size: u32,
) -> Result<(TableState, RequestParams), CliError> {
    let mut table = TableState::with_page_size(args.page_size.unwrap_or(default_page_size));
    table.page_index = args.page.saturating_sub(1);
    if let Some(ref key) = args.sort {
        let order = if args.desc {
            SortOrder::Descend
        } else {
            SortOrder::Ascend
        };
        table.sort = Sort::new(key.clone(), order);
    }

    let mut filters = FilterState::new();
    if let Some(ref search) = args.search {
        filters.insert(SEARCH, FilterValue::text(search.clone()));
    }
    for raw in &args.filter {
        let (key, value) = util::parse_pair(raw, "filter")?;
        match R::KIND.filter_field(key) {
            Some(field) => {
                let parsed = parse_filter(field, value).map_err(|reason| CliError::Validation {
                    field: field.key.into(),
                    reason,
                })?;
                match parsed {
                    Some(parsed) => filters.insert(field.key, parsed),
                    None => {
                        filters.remove(field.key);
                    }
                }
            }
            // Keys the table doesn't know go to the server untouched.
            None => filters.insert(key, FilterValue::text(value)),
        }
    }

    let params = RequestParams::derive(&table, &filters, R::KIND.filter_fields());
    Ok((table, params))
}

/// Apply `--from-file` then `--set` to a form. Bad values stay on the
/// modal as field errors and surface from `prepare()`.
///
/// File keys the form doesn't edit (`id`, `status`, timestamps) are
/// skipped so a `get -o json` export can be fed straight back in.
/// `--set` keys must name a form field.
fn apply_write<R: Resource>(modal: &mut FormModal<R>, write: &WriteArgs) -> Result<(), CliError> {
    if let Some(ref path) = write.from_file {
        let value = util::read_json_file(path)?;
        let serde_json::Value::Object(map) = value else {
            return Err(CliError::Validation {
                field: "from-file".into(),
                reason: "expected a JSON object".into(),
            });
        };
        for (key, value) in &map {
            if <R::Form as RecordForm>::field(key).is_none() {
                debug!(field = %key, "skipping read-only file key");
                continue;
            }
            if let Err(reason) = modal.set_field(key, &util::json_text(value)) {
                debug!(field = %key, %reason, "rejected file value");
            }
        }
    }
    for raw in &write.set {
        let (key, value) = util::parse_pair(raw, "set")?;
        if let Err(reason) = modal.set_field(key, value) {
            debug!(field = %key, %reason, "rejected --set value");
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<R: Listing>(
    controller: &Controller,
    op: Op,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = R::KIND;
    match op {
        Op::List(args) => {
            let (table, params) = list_request::<R>(&args, controller.config().page_size)?;
            debug!(resource = %kind, %params, all = args.all, "listing");
            let loading = format!("Loading {}", kind.label().to_lowercase());

            let (items, total) = if args.all {
                let items = util::with_spinner(
                    &loading,
                    global.quiet,
                    controller.fetch_all::<R>(&params, table.page_size),
                )
                .await?;
                let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
                (items, total)
            } else {
                let page = util::with_spinner(
                    &loading,
                    global.quiet,
                    controller.fetch_page::<R>(&params),
                )
                .await?;
                (Arc::unwrap_or_clone(page.items), page.total_count)
            };

            let out = output::render_list(global.output, &items, R::row, |r| r.id().to_string())?;
            output::print_output(&out, global.quiet);
            if !args.all {
                output::print_page_footer(&page_info(&table, total), global.output, global.quiet);
            }
            Ok(())
        }

        Op::Get { id } => {
            let record = controller.get::<R>(&EntityId::from(id)).await?;
            print_record(&record, global)
        }

        Op::Create(write) => {
            let mut modal = FormModal::<R>::new();
            modal.open_create();
            apply_write(&mut modal, &write)?;
            submit_form(controller, &mut modal, global).await
        }

        Op::Update { id, write } => {
            let current = controller.get::<R>(&EntityId::from(id)).await?;
            let mut modal = FormModal::<R>::new();
            modal.open_edit(&current);
            apply_write(&mut modal, &write)?;
            submit_form(controller, &mut modal, global).await
        }

        Op::Delete { id } => {
            let id = EntityId::from(id);
            let label = if global.yes {
                id.to_string()
            } else {
                controller.get::<R>(&id).await?.display_name().to_owned()
            };
            let Some(mut modal) = ConfirmModal::new(kind, RowAction::Delete, id, label) else {
                return Err(CliError::Internal("delete needs a confirmation".into()));
            };
            if !util::confirm(&modal.prompt(), global.yes, "delete")? {
                return Ok(());
            }
            submit_confirm::<R>(controller, &mut modal, global).await
        }

        Op::Transition { id, action, input } => {
            let Some(mut modal) = ConfirmModal::new(kind, action, EntityId::from(id.clone()), id)
            else {
                return Err(CliError::Internal(format!("{action} needs a form")));
            };
            if let Some(input) = input {
                modal.set_input(input);
            }
            submit_confirm::<R>(controller, &mut modal, global).await
        }
    }
}

// ── Submission ──────────────────────────────────────────────────────

async fn submit_form<R: Listing>(
    controller: &Controller,
    modal: &mut FormModal<R>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let command = modal.prepare()?;
    let outcome = send(controller, command, global).await;
    let note = modal.resolve(&outcome);
    finish::<R>(&note, outcome, global)
}

async fn submit_confirm<R: Listing>(
    controller: &Controller,
    modal: &mut ConfirmModal,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let command = modal.prepare()?;
    let outcome = send(controller, command, global).await;
    let note = modal.resolve(&outcome);
    finish::<R>(&note, outcome, global)
}

async fn send(
    controller: &Controller,
    command: CoreCommand,
    global: &GlobalOpts,
) -> Result<CommandResult, CoreError> {
    let message = format!(
        "Sending {} {}",
        command.mutation.verb(),
        command.kind.singular()
    );
    util::with_spinner(&message, global.quiet, controller.execute(command)).await
}

/// Print the notification on success and the echoed record if any.
fn finish<R: Listing>(
    note: &Notification,
    outcome: Result<CommandResult, CoreError>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = outcome?;
    output::print_notification(note, output::should_color(global.color), global.quiet);
    if let Some(value) = result.record() {
        match decode_record::<R>(value.clone()) {
            Ok(record) => print_record(&record, global)?,
            Err(e) => debug!(error = %e, "echoed record not decodable"),
        }
    }
    Ok(())
}

fn print_record<R: Listing>(record: &R, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, record, detail::<R>, |r| r.id().to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use portico_core::Announcement;

    fn args(filter: &[&str]) -> ListArgs {
        ListArgs {
            page: 2,
            page_size: Some(25),
            search: Some("  flood ".into()),
            filter: filter.iter().map(|s| (*s).to_owned()).collect(),
            sort: Some("title".into()),
            desc: true,
            asc: false,
            all: false,
        }
    }

    #[test]
    fn list_args_derive_wire_params() {
        let (table, params) =
            list_request::<Announcement>(&args(&["status=published", "Region=north"]), 10)
                .unwrap();
        assert_eq!(table.page_index, 1);
        assert_eq!(params.get("PageNumber"), Some("2"));
        assert_eq!(params.get("PageSize"), Some("25"));
        assert_eq!(params.get("SearchTerm"), Some("flood"));
        assert_eq!(params.get("Status"), Some("Published"));
        assert_eq!(params.get("Region"), Some("north"));
        assert_eq!(params.get("SortBy"), Some("title"));
        assert_eq!(params.get("SortOrder"), Some("desc"));
    }

    #[test]
    fn bad_choice_is_a_usage_error() {
        let err = list_request::<Announcement>(&args(&["Status=sideways"]), 10).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "Status"));
    }

    #[test]
    fn content_commands_flatten_to_transitions() {
        let op = Op::from(ContentCommand::Pin {
            id: "4".into(),
            order: "3".into(),
        });
        assert!(matches!(
            op,
            Op::Transition { action: RowAction::Pin, input: Some(ref o), .. } if o == "3"
        ));
    }
}
