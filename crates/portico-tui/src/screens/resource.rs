//! Generic list screen: one table, its pagination, and the filter, form
//! and confirmation overlays for a single resource.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use portico_core::resource::SEARCH;
use portico_core::{
    Command, CommandResult, ConfirmModal, Controller, CoreError, FilterPanel, FilterState,
    FilterValue, FormModal, ListView, Notification, QuerySnapshot, ResourceQuery, RowAction,
    SortOrder, run_mutation,
};

use super::columns::Columns;
use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::input::FieldEditor;
use crate::widgets::{OverlayKey, confirm, filter, form};

/// Page sizes `+` and `-` step through.
const PAGE_SIZES: &[u32] = &[5, 10, 20, 50, 100];

/// Which overlay started the write in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Form,
    Confirm,
}

pub struct ResourceScreen<R: Columns> {
    focused: bool,
    controller: Controller,
    query: ResourceQuery<R>,
    view: ListView,
    snapshot: QuerySnapshot<R>,
    table_state: TableState,

    filters: FilterPanel,
    filter_error: Option<String>,
    form: FormModal<R>,
    confirm: Option<ConfirmModal>,
    /// Quick-search line, open while `Some`.
    search: Option<FieldEditor>,
    /// Text editor shared by whichever overlay is open.
    editor: FieldEditor,
    pending: Option<Pending>,

    throbber_state: ThrobberState,
    action_tx: Option<UnboundedSender<Action>>,
    cancel: CancellationToken,
    forward_task: Option<JoinHandle<()>>,
    sync_task: Option<JoinHandle<()>>,
}

impl<R: Columns> ResourceScreen<R> {
    /// `cancel` stops the snapshot forwarder and auto-sync.
    pub fn new(controller: Controller, query: ResourceQuery<R>, cancel: CancellationToken) -> Self {
        let view = ListView::new(Arc::clone(query.store()), R::KIND);
        let snapshot = query.snapshot();
        Self {
            focused: false,
            controller,
            query,
            view,
            snapshot,
            table_state: TableState::default(),
            filters: FilterPanel::new(R::KIND),
            filter_error: None,
            form: FormModal::new(),
            confirm: None,
            search: None,
            editor: FieldEditor::default(),
            pending: None,
            throbber_state: ThrobberState::default(),
            action_tx: None,
            cancel,
            forward_task: None,
            sync_task: None,
        }
    }

    // ── Selection ───────────────────────────────────────────────

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn select(&mut self, idx: usize) {
        let len = self.snapshot.items.len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(len - 1)));
        }
    }

    fn move_selection(&mut self, down: bool) {
        let current = self.selected_index();
        let next = if down {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        self.select(next);
    }

    fn selected(&self) -> Option<&R> {
        self.snapshot.items.get(self.selected_index())
    }

    fn refresh_snapshot(&mut self) {
        self.snapshot = self.query.snapshot();
        self.select(self.selected_index());
    }

    // ── List controls ───────────────────────────────────────────

    fn step_page_size(&self, larger: bool) {
        let current = self.query.store().table().page_size;
        let next = if larger {
            PAGE_SIZES.iter().copied().find(|&s| s > current)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&s| s < current)
        };
        if let Some(size) = next {
            self.view.set_page_size(size);
        }
    }

    fn commit_search(&self, text: &str) {
        self.query
            .patch_filters(FilterState::new().with(SEARCH, FilterValue::text(text)));
    }

    fn spawn_refetch(&self) {
        let query = self.query.clone();
        tokio::spawn(async move { query.refetch().await });
    }

    // ── Row actions ─────────────────────────────────────────────

    fn open_create(&mut self) {
        self.form.open_create();
        form::begin(&self.form, &mut self.editor);
    }

    fn request(&mut self, wanted: &[RowAction]) -> Option<Action> {
        let record = self.selected()?.clone();
        let offered = self.view.row_actions(&record);
        let Some(action) = wanted.iter().copied().find(|a| offered.contains(a)) else {
            let verb = wanted.first().map_or("change", |a| a.verb());
            return Some(Action::Notify(Notification::info(format!(
                "Can't {verb} this {}.",
                R::KIND.singular()
            ))));
        };

        if action == RowAction::Edit {
            self.form.open_edit(&record);
            form::begin(&self.form, &mut self.editor);
        } else if let Some(modal) = ConfirmModal::for_record(&record, action) {
            confirm::begin(&modal, &mut self.editor);
            self.confirm = Some(modal);
        }
        None
    }

    // ── Writes ──────────────────────────────────────────────────

    fn spawn_mutation(&mut self, origin: Pending, cmd: Command) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        self.pending = Some(origin);
        let controller = self.controller.clone();
        let query = self.query.clone();
        debug!(entity = R::KIND.path(), verb = cmd.mutation.verb(), "submitting");
        tokio::spawn(async move {
            let outcome = run_mutation(&controller, cmd.kind, cmd.mutation, &query).await;
            if let Err(e) = &outcome {
                warn!(entity = R::KIND.path(), error = %e, "write failed");
            }
            let _ = tx.send(Action::MutationFinished(R::KIND, Arc::new(outcome)));
        });
    }

    fn submit_form(&mut self) -> Option<Action> {
        if self.pending.is_some() {
            return None;
        }
        match self.form.prepare() {
            Ok(cmd) => {
                self.spawn_mutation(Pending::Form, cmd);
                None
            }
            Err(err) => Some(Action::Notify(self.form.resolve(&Err(err)))),
        }
    }

    fn submit_confirm(&mut self) -> Option<Action> {
        if self.pending.is_some() {
            return None;
        }
        let modal = self.confirm.as_mut()?;
        match modal.prepare() {
            Ok(cmd) => {
                self.spawn_mutation(Pending::Confirm, cmd);
                None
            }
            Err(err) => Some(Action::Notify(modal.resolve(&Err(err)))),
        }
    }

    fn finish_mutation(&mut self, outcome: &Result<CommandResult, CoreError>) -> Option<Action> {
        let note = match self.pending.take()? {
            Pending::Form => self.form.resolve(outcome),
            Pending::Confirm => {
                let modal = self.confirm.as_mut()?;
                let note = modal.resolve(outcome);
                if !modal.is_open() {
                    self.confirm = None;
                }
                note
            }
        };
        Some(Action::Notify(note))
    }

    // ── Key handling per mode ───────────────────────────────────

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Option<Option<Action>> {
        if self.confirm.is_some() {
            let outcome = self
                .confirm
                .as_mut()
                .map(|modal| confirm::handle_key(modal, &mut self.editor, key));
            return Some(match outcome {
                Some(OverlayKey::Submit) => self.submit_confirm(),
                Some(OverlayKey::Cancel) if self.pending.is_none() => {
                    self.confirm = None;
                    None
                }
                _ => None,
            });
        }

        if self.form.is_open() {
            return Some(match form::handle_key(&mut self.form, &mut self.editor, key) {
                OverlayKey::Submit => self.submit_form(),
                OverlayKey::Cancel if self.pending.is_none() => {
                    self.form.close();
                    None
                }
                _ => None,
            });
        }

        if self.filters.is_open() {
            match filter::handle_key(&mut self.filters, &mut self.editor, &mut self.filter_error, key) {
                OverlayKey::Submit => self.filters.submit(self.query.store()),
                OverlayKey::Cancel => {
                    self.filters.dismiss();
                    self.filter_error = None;
                }
                OverlayKey::Reset => {
                    self.filters.clear(self.query.store());
                    self.filter_error = None;
                }
                OverlayKey::Consumed => {}
            }
            return Some(None);
        }

        let search = self.search.as_mut()?;
        match key.code {
            KeyCode::Esc => self.search = None,
            KeyCode::Enter => {
                let text = search.value().to_owned();
                self.search = None;
                self.commit_search(&text);
            }
            _ => {
                search.handle_key(key);
            }
        }
        Some(None)
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char('g') | KeyCode::Home => self.select(0),
            KeyCode::Char('G') | KeyCode::End => self.select(usize::MAX),

            KeyCode::Char(']') | KeyCode::Right | KeyCode::PageDown => {
                self.view.next_page(self.snapshot.total_count);
            }
            KeyCode::Char('[') | KeyCode::Left | KeyCode::PageUp => self.view.prev_page(),
            KeyCode::Char('+' | '=') => self.step_page_size(true),
            KeyCode::Char('-') => self.step_page_size(false),
            KeyCode::Char('s') => self.view.cycle_sort(),

            KeyCode::Char('/') => {
                let mut editor = FieldEditor::default();
                let current = self.query.store().filters();
                let text = current.get(SEARCH).map(FilterValue::display).unwrap_or_default();
                editor.load(0, text);
                self.search = Some(editor);
            }
            KeyCode::Char('f') => {
                self.filters.open(self.query.store());
                self.filter_error = None;
                filter::begin(&self.filters, &mut self.editor);
            }
            KeyCode::Char('x') => self.query.clear_filters(),
            KeyCode::Char('r') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.spawn_refetch();
            }

            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('e') | KeyCode::Enter => return self.request(&[RowAction::Edit]),
            KeyCode::Char('d') | KeyCode::Delete => return self.request(&[RowAction::Delete]),
            KeyCode::Char('p') => return self.request(&[RowAction::Publish]),
            KeyCode::Char('P') => return self.request(&[RowAction::Pin, RowAction::Unpin]),
            KeyCode::Char('a') => return self.request(&[RowAction::Archive]),
            _ => {}
        }
        None
    }

    // ── Rendering ───────────────────────────────────────────────

    fn summary_line(&self) -> Line<'static> {
        if let Some(search) = &self.search {
            let mut spans = vec![Span::styled(" / ", theme::key_hint_key())];
            spans.extend(search.spans(
                theme::field_value(),
                Style::default().fg(theme::ELECTRIC_YELLOW),
                false,
            ));
            return Line::from(spans);
        }

        let state = self.query.store().snapshot();
        let mut spans = vec![Span::raw(" ")];
        match (&state.table.sort.key, state.table.sort.order) {
            (Some(key), order) if order != SortOrder::None => {
                spans.push(Span::styled("sort ", theme::key_hint()));
                spans.push(Span::styled(format!("{key} {order}"), theme::field_value()));
            }
            _ => spans.push(Span::styled("unsorted", theme::key_hint())),
        }
        if !state.filters.is_empty() {
            spans.push(Span::styled("  filters ", theme::key_hint()));
            let joined = state
                .filters
                .iter()
                .map(|(k, v)| format!("{k}={}", v.display()))
                .collect::<Vec<_>>()
                .join(", ");
            spans.push(Span::styled(joined, Style::default().fg(theme::CORAL)));
        }
        Line::from(spans)
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        if self.snapshot.items.is_empty() {
            let (text, style) = match &self.snapshot.error {
                Some(err) => (format!("Could not load {}: {err}", R::KIND.path()), theme::field_error()),
                None if self.snapshot.is_loading => ("Loading…".to_owned(), theme::key_hint()),
                None => (format!("No {} found", R::KIND.path()), theme::key_hint()),
            };
            let chunks = Layout::vertical([Constraint::Percentage(45), Constraint::Min(1)]).split(area);
            frame.render_widget(
                Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center),
                chunks[1],
            );
            return;
        }

        let header = Row::new(
            R::HEADERS
                .iter()
                .map(|h| Cell::from(*h).style(theme::table_header()))
                .collect::<Vec<_>>(),
        );
        let status_col = R::HEADERS.iter().position(|h| *h == "Status");
        let selected_idx = self.selected_index();

        let rows: Vec<Row> = self
            .snapshot
            .items
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let is_selected = i == selected_idx;
                let cells = record.cells().into_iter().enumerate().map(|(col, text)| {
                    if col == 0 {
                        let prefix = if is_selected { "▸" } else { " " };
                        Cell::from(format!("{prefix}{text}")).style(
                            Style::default().fg(theme::NEON_CYAN).add_modifier(if is_selected {
                                Modifier::BOLD
                            } else {
                                Modifier::empty()
                            }),
                        )
                    } else if Some(col) == status_col {
                        Cell::from(text).style(theme::status(record.status()))
                    } else {
                        Cell::from(text)
                    }
                });
                Row::new(cells.collect::<Vec<_>>()).style(if is_selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                })
            })
            .collect();

        let table = Table::new(rows, R::WIDTHS.iter().copied())
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn footer_line(&self) -> Line<'static> {
        let info = self.view.page_info(self.snapshot.total_count);
        let page_size = self.query.store().table().page_size;
        let mut spans = vec![
            Span::styled(
                format!(" Page {}/{} ", info.page, info.page_count),
                theme::title_style(),
            ),
            Span::styled(
                format!("· {}–{} of {} · {page_size}/page   ", info.first_item, info.last_item, info.total),
                theme::key_hint(),
            ),
        ];
        for (key, label) in [
            ("[/]", "page"),
            ("s", "sort"),
            ("/", "search"),
            ("f", "filter"),
            ("n", "new"),
            ("e", "edit"),
            ("d", "delete"),
            ("p", "publish"),
            ("P", "pin"),
            ("a", "archive"),
        ] {
            spans.push(Span::styled(key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        Line::from(spans)
    }
}

impl<R: Columns> Component for ResourceScreen<R> {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        let mut stream = self.query.subscribe();
        let tx = action_tx.clone();
        let cancel = self.cancel.clone();
        self.forward_task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    changed = stream.changed() => {
                        if changed.is_none() || tx.send(Action::QueryUpdated(R::KIND)).is_err() {
                            break;
                        }
                    }
                }
            }
        }));
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(outcome) = self.handle_overlay_key(key) {
            return Ok(outcome);
        }
        Ok(self.handle_list_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::QueryUpdated(_) => {
                self.refresh_snapshot();
                Ok(None)
            }
            Action::MutationFinished(_, outcome) => Ok(self.finish_mutation(outcome)),
            Action::Tick => {
                if self.snapshot.is_loading || self.pending.is_some() {
                    self.throbber_state.calc_next();
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" {} ({}) ", R::KIND.label(), self.snapshot.total_count);
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // sort, filters or search
            Constraint::Min(1),    // table
            Constraint::Length(1), // pagination + hints
        ])
        .split(inner);

        let top = Layout::horizontal([Constraint::Min(1), Constraint::Length(16)]).split(layout[0]);
        frame.render_widget(Paragraph::new(self.summary_line()), top[0]);
        if self.snapshot.is_loading || self.pending.is_some() {
            let label = if self.pending.is_some() { "saving" } else { "loading" };
            let throbber = Throbber::default()
                .label(label)
                .style(theme::key_hint())
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, top[1], &mut self.throbber_state.clone());
        }

        self.render_table(frame, layout[1]);
        frame.render_widget(Paragraph::new(self.footer_line()), layout[2]);

        if self.filters.is_open() {
            filter::render(frame, area, &self.filters, &self.editor, self.filter_error.as_deref());
        }
        if self.form.is_open() {
            form::render(frame, area, &self.form, &self.editor);
        }
        if let Some(modal) = &self.confirm {
            confirm::render(frame, area, modal, &self.editor);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused && self.sync_task.is_none() {
            self.sync_task = Some(self.query.spawn_auto_sync(self.cancel.child_token()));
        }
    }

    fn captures_input(&self) -> bool {
        self.search.is_some()
            || self.filters.is_open()
            || self.form.is_open()
            || self.confirm.is_some()
    }
}

impl<R: Columns> Drop for ResourceScreen<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
