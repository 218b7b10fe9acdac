// ── Mutation modals ──
//
// Form and confirmation state machines around one remote write. A write
// is sent only after client-side validation passes; the owning list is
// invalidated only after the server confirms it.

use futures::future::BoxFuture;

use crate::command::{Command, CommandResult, Mutation};
use crate::controller::Controller;
use crate::error::CoreError;
use crate::form::{FormMode, RecordForm, parse_count, parse_datetime};
use crate::model::{EntityId, MAX_PINNED_ORDER, RowAction, Transition};
use crate::notification::{GENERIC_FAILURE, Notification};
use crate::query::ResourceQuery;
use crate::resource::{Resource, ResourceKind};
use crate::validation::ValidationErrors;

const FIX_FIELDS: &str = "Please correct the highlighted fields.";

/// Something that can be told its data is out of date.
pub trait Invalidate: Send + Sync {
    fn invalidate(&self) -> BoxFuture<'_, ()>;
}

impl<R: Resource> Invalidate for ResourceQuery<R> {
    fn invalidate(&self) -> BoxFuture<'_, ()> {
        Box::pin(ResourceQuery::invalidate(self))
    }
}

/// Send one write and, only if the server accepts it, invalidate `target`
/// once.
pub async fn run_mutation(
    controller: &Controller,
    kind: ResourceKind,
    mutation: Mutation,
    target: &dyn Invalidate,
) -> Result<CommandResult, CoreError> {
    let result = controller.execute(Command::new(kind, mutation)).await;
    if result.is_ok() {
        target.invalidate().await;
    }
    result
}

fn validation_failed(errors: ValidationErrors) -> CoreError {
    CoreError::ValidationFailed {
        message: FIX_FIELDS.into(),
        field_errors: errors.into_inner(),
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// ── Form modal ───────────────────────────────────────────────────────

/// Create/edit form for one record type.
#[derive(Debug, Clone)]
pub struct FormModal<R: Resource> {
    open: bool,
    mode: FormMode,
    form: R::Form,
    errors: ValidationErrors,
    parse_errors: ValidationErrors,
}

impl<R: Resource> Default for FormModal<R> {
    fn default() -> Self {
        Self {
            open: false,
            mode: FormMode::Create,
            form: R::Form::default(),
            errors: ValidationErrors::new(),
            parse_errors: ValidationErrors::new(),
        }
    }
}

impl<R: Resource> FormModal<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &R::Form {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// First error shown under `field`.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.first(field)
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("New {}", R::KIND.singular()),
            FormMode::Edit(_) => format!("Edit {}", R::KIND.singular()),
        }
    }

    pub fn open_create(&mut self) {
        self.reset(FormMode::Create, R::Form::default());
    }

    /// Open seeded from `record`. Always re-seeds, even if the modal was
    /// last opened for another record.
    pub fn open_edit(&mut self, record: &R) {
        self.reset(FormMode::Edit(record.id().clone()), R::Form::seed(record));
    }

    fn reset(&mut self, mode: FormMode, form: R::Form) {
        self.open = true;
        self.mode = mode;
        self.form = form;
        self.errors = ValidationErrors::new();
        self.parse_errors = ValidationErrors::new();
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Write raw text into a field. Unparseable input is kept as a field
    /// error and blocks submission until corrected.
    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let field = <R::Form as RecordForm>::field(key).map_or(key, |f| f.key);
        self.errors.clear_field(field);
        self.parse_errors.clear_field(field);
        self.form.assign(key, raw).inspect_err(|message| {
            self.parse_errors.add(field, message.clone());
            self.errors.add(field, message.clone());
        })
    }

    /// Validate and build the write. Field errors are kept on the modal.
    pub fn prepare(&mut self) -> Result<Command, CoreError> {
        let mut errors = self.form.validate(&self.mode);
        errors.merge(self.parse_errors.clone());
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(validation_failed(errors));
        }
        self.errors = ValidationErrors::new();

        let body = self.form.payload_json()?;
        let mutation = match &self.mode {
            FormMode::Create => Mutation::Create(body),
            FormMode::Edit(id) => Mutation::Update {
                id: id.clone(),
                body,
            },
        };
        Ok(Command::new(R::KIND, mutation))
    }

    /// Apply the outcome of a submit. Success closes and resets the form;
    /// failure keeps it open with any server field errors attached.
    pub fn resolve(&mut self, outcome: &Result<CommandResult, CoreError>) -> Notification {
        match outcome {
            Ok(_) => {
                let verb = match self.mode {
                    FormMode::Create => "created",
                    FormMode::Edit(_) => "updated",
                };
                self.close();
                Notification::success(format!("{} {verb}.", capitalized(R::KIND.singular())))
            }
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.errors.overwrite(ValidationErrors::from(fields.clone()));
                }
                Notification::from_error(err, GENERIC_FAILURE)
            }
        }
    }

    /// Validate, send, invalidate on success, resolve.
    pub async fn submit(&mut self, controller: &Controller, target: &dyn Invalidate) -> Notification {
        let outcome = match self.prepare() {
            Ok(cmd) => run_mutation(controller, cmd.kind, cmd.mutation, target).await,
            Err(err) => Err(err),
        };
        self.resolve(&outcome)
    }
}

// ── Confirmation modal ───────────────────────────────────────────────

/// Extra input a confirmation collects before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmInput {
    /// Optional schedule; blank publishes immediately.
    PublishAt,
    /// Required, 1..=9999.
    PinOrder,
}

/// Delete and state transitions for one row.
#[derive(Debug, Clone)]
pub struct ConfirmModal {
    kind: ResourceKind,
    action: RowAction,
    id: EntityId,
    label: String,
    input: String,
    error: Option<String>,
    open: bool,
}

impl ConfirmModal {
    /// `None` for actions that need a form rather than a confirmation.
    pub fn new(kind: ResourceKind, action: RowAction, id: EntityId, label: impl Into<String>) -> Option<Self> {
        if action == RowAction::Edit {
            return None;
        }
        let input = if action == RowAction::Pin { "1" } else { "" };
        Some(Self {
            kind,
            action,
            id,
            label: label.into(),
            input: input.to_owned(),
            error: None,
            open: true,
        })
    }

    pub fn for_record<R: Resource>(record: &R, action: RowAction) -> Option<Self> {
        Self::new(R::KIND, action, record.id().clone(), record.display_name())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn action(&self) -> RowAction {
        self.action
    }

    pub fn target(&self) -> &EntityId {
        &self.id
    }

    pub fn prompt(&self) -> String {
        format!(
            "{} {} \"{}\"?",
            capitalized(self.action.verb()),
            self.kind.singular(),
            self.label
        )
    }

    pub fn input_kind(&self) -> Option<ConfirmInput> {
        match self.action {
            RowAction::Publish => Some(ConfirmInput::PublishAt),
            RowAction::Pin => Some(ConfirmInput::PinOrder),
            _ => None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn prepare(&mut self) -> Result<Command, CoreError> {
        let id = self.id.clone();
        let mutation = match self.action {
            RowAction::Delete => Mutation::Delete { id },
            RowAction::Publish => {
                let at = parse_datetime(&self.input).map_err(|e| self.input_error("publishAt", e))?;
                Mutation::Transition {
                    id,
                    transition: Transition::Publish { at },
                }
            }
            RowAction::Pin => {
                let order = parse_count(&self.input).map_err(|e| self.input_error("pinnedOrder", e))?;
                if !(1..=MAX_PINNED_ORDER).contains(&order) {
                    return Err(self.input_error(
                        "pinnedOrder",
                        format!("Pin order must be between 1 and {MAX_PINNED_ORDER}"),
                    ));
                }
                Mutation::Transition {
                    id,
                    transition: Transition::Pin { order },
                }
            }
            RowAction::Unpin => Mutation::Transition {
                id,
                transition: Transition::Unpin,
            },
            RowAction::Archive => Mutation::Transition {
                id,
                transition: Transition::Archive,
            },
            RowAction::Edit => {
                return Err(CoreError::Unsupported {
                    operation: "edit".into(),
                    reason: "edits go through the form".into(),
                });
            }
        };
        Ok(Command::new(self.kind, mutation))
    }

    fn input_error(&mut self, field: &str, message: String) -> CoreError {
        self.error = Some(message.clone());
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        validation_failed(errors)
    }

    pub fn resolve(&mut self, outcome: &Result<CommandResult, CoreError>) -> Notification {
        match outcome {
            Ok(_) => {
                self.close();
                Notification::success(format!(
                    "{} {}.",
                    capitalized(self.kind.singular()),
                    self.action.past_tense()
                ))
            }
            Err(err) => {
                if let Some(message) = err.field_errors().and_then(|f| f.values().flatten().next()) {
                    self.error = Some(message.clone());
                }
                Notification::from_error(err, GENERIC_FAILURE)
            }
        }
    }

    pub async fn submit(&mut self, controller: &Controller, target: &dyn Invalidate) -> Notification {
        let outcome = match self.prepare() {
            Ok(cmd) => run_mutation(controller, cmd.kind, cmd.mutation, target).await,
            Err(err) => Err(err),
        };
        self.resolve(&outcome)
    }
}
