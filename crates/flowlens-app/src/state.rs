//! # Application State
//!
//! Top-level state for one flowlens session: the flow store, the table
//! controller, and the detail-panel settings (which body is shown and
//! the user's format override). Keyboard events are routed here first;
//! anything not claimed by the app layer falls through to the table
//! controller.

use flowlens_core::flow::{Flow, FlowRecord};
use tracing::info;

use crate::config::Config;
use crate::content::{format_content, FormatTag, FormattedContent};
use crate::input_key::InputKey;
use crate::store::FlowStore;
use crate::table::{toggle_pin, FlowTableState, KeyOutcome};

/// Which side of the detail exchange the body panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyTab {
    Request,
    #[default]
    Response,
}

/// Format overrides the user can cycle through with `f`.
const FORMAT_CYCLE: &[FormatTag] = &[
    FormatTag::Auto,
    FormatTag::Text,
    FormatTag::Json,
    FormatTag::Xml,
    FormatTag::Binary,
];

/// Kind-filter cycle for the `t` key: everything, then one protocol.
const KIND_CYCLE: &[Option<&str>] = &[None, Some("http"), Some("dns"), Some("tcp"), Some("udp")];

/// All mutable state for a running flowlens instance.
#[derive(Debug)]
pub struct AppState {
    pub store: FlowStore,
    pub table: FlowTableState,
    pub body_tab: BodyTab,
    /// User format override for the body panel (`Auto` = negotiate).
    pub body_format: FormatTag,
    /// Subject of the body panel, set by the single-select-on-focus
    /// callback when keyboard focus moves.
    pub detail: Option<flowlens_core::flow::FlowId>,
    /// When set, keystrokes edit the filter text instead of navigating.
    pub filter_active: bool,
    pub max_flows: usize,
    pub should_quit: bool,
    /// Row index the view should scroll into view on the next frame.
    pub scroll_to: Option<usize>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let mut table = FlowTableState::default();
        table.pinned_only = config.pinned_only;
        table.page_step = config.page_step;
        Self {
            store: FlowStore::new(),
            table,
            body_tab: BodyTab::default(),
            body_format: FormatTag::Auto,
            detail: None,
            filter_active: false,
            max_flows: config.max_flows,
            should_quit: false,
            scroll_to: None,
        }
    }

    /// Ingest a refreshed flow list from the capture source.
    ///
    /// Upserts preserve pin/note state by identity; selection and focus
    /// entries whose rows disappeared are pruned afterwards.
    pub fn refresh(&mut self, flows: Vec<Flow>) {
        let count = flows.len();
        for flow in flows {
            self.store.upsert(flow);
        }
        self.store.prune(self.max_flows);
        self.table.retain_ids(self.store.list());
        if let Some(id) = &self.detail {
            if self.store.get(id).is_none() {
                self.detail = None;
            }
        }
        info!(count, total = self.store.len(), "flow refresh applied");
    }

    /// The flow under keyboard focus, if it still exists.
    pub fn focused_flow(&self) -> Option<&Flow> {
        let id = self.table.focused.as_deref()?;
        self.store.get(id)
    }

    /// The flow shown in the body panel: the last row reported by the
    /// focus-follows single-select callback, if it still exists.
    pub fn detail_flow(&self) -> Option<&Flow> {
        let id = self.detail.as_deref()?;
        self.store.get(id)
    }

    /// Derive the body panel content for the detail flow.
    ///
    /// Recomputed on every render from the source bytes and format
    /// settings; `None` when nothing is selected for detail or the
    /// variant carries no payload for the chosen side.
    pub fn formatted_body(&self) -> Option<FormattedContent> {
        let flow = self.detail_flow()?;
        let socket_buf;
        let (payload, content_type, effective) = match &flow.record {
            FlowRecord::Http(f) => match self.body_tab {
                BodyTab::Request => {
                    let req = f.request.as_ref()?;
                    (
                        req.message.content.as_deref(),
                        req.message.headers.content_type(),
                        req.message.effective_content_type.as_deref(),
                    )
                }
                BodyTab::Response => {
                    let resp = f.response.as_ref()?;
                    (
                        resp.message.content.as_deref(),
                        resp.message.headers.content_type(),
                        resp.message.effective_content_type.as_deref(),
                    )
                }
            },
            // DNS carries only packed sizes, no payload bytes.
            FlowRecord::Dns(_) => return None,
            FlowRecord::Tcp(f) => {
                socket_buf = socket_payload(&f.messages, self.body_tab);
                (socket_buf.as_deref(), None, None)
            }
            FlowRecord::Udp(f) => {
                socket_buf = socket_payload(&f.messages, self.body_tab);
                (socket_buf.as_deref(), None, None)
            }
        };
        Some(format_content(
            payload,
            self.body_format,
            content_type,
            effective,
        ))
    }

    /// Route a key event. While the filter input is active, keystrokes
    /// edit the filter text; otherwise app-level chords are handled
    /// here and everything else is offered to the table controller.
    pub fn handle_key(&mut self, key: &InputKey, from_text_input: bool) {
        if from_text_input {
            return;
        }
        if self.filter_active {
            self.handle_filter_key(key);
            return;
        }
        match key {
            InputKey::Char('q') | InputKey::Esc => {
                self.should_quit = true;
            }
            InputKey::Char('/') => {
                self.filter_active = true;
            }
            InputKey::Char('t') => {
                self.cycle_kind_filter();
            }
            InputKey::Tab => {
                self.body_tab = match self.body_tab {
                    BodyTab::Request => BodyTab::Response,
                    BodyTab::Response => BodyTab::Request,
                };
            }
            InputKey::Char('f') => {
                self.cycle_body_format();
            }
            InputKey::Char('p') => {
                if let Some(id) = self.table.focused.clone() {
                    if let Some(flow) = self.store.get_mut(&id) {
                        toggle_pin(flow);
                    }
                }
            }
            InputKey::Char('P') => {
                self.table.pinned_only = !self.table.pinned_only;
            }
            InputKey::Char('d') => {
                let ids: Vec<_> = self.table.selected.iter().cloned().collect();
                let deleted = self.store.delete(&ids);
                info!(count = deleted.len(), "deleted selected flows");
                self.table.retain_ids(self.store.list());
            }
            InputKey::Char('D') => {
                let deleted = self.store.delete_all_unpinned();
                info!(count = deleted.len(), "deleted all unpinned flows");
                self.table.retain_ids(self.store.list());
            }
            InputKey::Char(c) if c.is_ascii_digit() => {
                // Digit keys stand in for header clicks.
                let column = *c as usize - '0' as usize;
                self.table.on_header_activate(column);
            }
            other => {
                if let KeyOutcome::Handled(effect) =
                    self.table.handle_key(other, false, self.store.list())
                {
                    if effect.scroll_to.is_some() {
                        self.scroll_to = effect.scroll_to;
                    }
                    // Single-select-on-focus: the newly focused row
                    // becomes the body panel subject.
                    if let Some(id) = effect.select {
                        self.detail = Some(id);
                    }
                }
            }
        }
    }

    /// Filter-input editing keys. Navigation is suppressed entirely
    /// while the filter input has focus.
    fn handle_filter_key(&mut self, key: &InputKey) {
        match key {
            InputKey::Enter => {
                self.filter_active = false;
            }
            InputKey::Esc => {
                self.filter_active = false;
                self.table.filter_text.clear();
            }
            InputKey::Backspace => {
                self.table.filter_text.pop();
            }
            InputKey::Char(c) => {
                self.table.filter_text.push(*c);
            }
            _ => {}
        }
    }

    fn cycle_body_format(&mut self) {
        let pos = FORMAT_CYCLE
            .iter()
            .position(|f| *f == self.body_format)
            .unwrap_or(0);
        self.body_format = FORMAT_CYCLE[(pos + 1) % FORMAT_CYCLE.len()];
    }

    fn cycle_kind_filter(&mut self) {
        let pos = KIND_CYCLE
            .iter()
            .position(|k| *k == self.table.kind_filter.as_deref())
            .unwrap_or(0);
        self.table.kind_filter =
            KIND_CYCLE[(pos + 1) % KIND_CYCLE.len()].map(str::to_string);
    }
}

/// Concatenated socket payload for one direction of a session.
///
/// Every segment in the direction contributes, in capture order, so
/// the body panel agrees with the byte columns. Returns `None` when
/// the direction has no messages, so the panel distinguishes "nothing
/// captured" from an empty payload.
fn socket_payload(messages: &[flowlens_core::flow::SocketMessage], tab: BodyTab) -> Option<Vec<u8>> {
    let from_client = matches!(tab, BodyTab::Request);
    let mut matched = messages
        .iter()
        .filter(|m| m.from_client == from_client)
        .peekable();
    matched.peek()?;
    Some(matched.flat_map(|m| m.content.iter().copied()).collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
