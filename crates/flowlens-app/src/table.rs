//! # Flow Table Controller
//!
//! Owns the table's interaction state: multi-column sort, multi-row
//! selection, focused row, and the pinned-only, kind, and free-text
//! filters. Derives the
//! visible sequence fresh from the authoritative flow list on every
//! call — nothing here is memoized, so a wholesale list replacement
//! can never leave a stale view behind.
//!
//! Keyboard and pointer events are translated into state transitions;
//! every operation is total over well-formed state. An id referencing
//! a row that is no longer present is a no-op, never an error.

use std::cmp::Ordering;
use std::collections::HashSet;

use flowlens_core::flow::{Flow, FlowId, FlowRecord, FlowStatus, SocketConnection};

use crate::input_key::InputKey;

// ── Columns ───────────────────────────────────────────────────────────────────

/// What a column displays, and therefore how it sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Leading selection checkbox. Interactive control, never sorts.
    Checkbox,
    Started,
    Summary,
    Status,
    Duration,
    BytesIn,
    BytesOut,
    /// Pin-filter toggle header. Interactive control, never sorts.
    Pin,
}

/// Static description of one table column.
pub struct ColumnSpec {
    pub label: &'static str,
    pub sortable: bool,
    pub kind: ColumnKind,
}

/// Fixed column layout. Index positions are part of the controller's
/// public contract (header activation is by index).
pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        label: "",
        sortable: false,
        kind: ColumnKind::Checkbox,
    },
    ColumnSpec {
        label: "Started",
        sortable: true,
        kind: ColumnKind::Started,
    },
    ColumnSpec {
        label: "Summary",
        sortable: true,
        kind: ColumnKind::Summary,
    },
    ColumnSpec {
        label: "Status",
        sortable: true,
        kind: ColumnKind::Status,
    },
    ColumnSpec {
        label: "Duration",
        sortable: true,
        kind: ColumnKind::Duration,
    },
    ColumnSpec {
        label: "In",
        sortable: true,
        kind: ColumnKind::BytesIn,
    },
    ColumnSpec {
        label: "Out",
        sortable: true,
        kind: ColumnKind::BytesOut,
    },
    ColumnSpec {
        label: "Pin",
        sortable: false,
        kind: ColumnKind::Pin,
    },
];

/// Index of the Started column, the default sort.
pub const STARTED_COLUMN: usize = 1;

/// Sentinel id accepted by [`FlowTableState::toggle_selection`] that
/// toggles every currently visible row together.
pub const SELECT_ALL: &str = "*select-all*";

// ── Sort ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Comparable key extracted from a flow for one column.
///
/// Absent values sort before any present value; numbers compare
/// numerically; everything else compares as case-sensitive text.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Absent,
    Num(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Absent, SortKey::Absent) => Ordering::Equal,
            (SortKey::Absent, _) => Ordering::Less,
            (_, SortKey::Absent) => Ordering::Greater,
            (SortKey::Num(a), SortKey::Num(b)) => a.total_cmp(b),
            (SortKey::Num(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Num(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}

fn sort_key(flow: &Flow, kind: ColumnKind) -> SortKey {
    match kind {
        // Interactive columns never reach the comparator.
        ColumnKind::Checkbox | ColumnKind::Pin => SortKey::Absent,
        // Missing timestamps compare as millisecond 0, not as absent.
        ColumnKind::Started => SortKey::Num(
            flow.record
                .start_timestamp()
                .map(|t| t.as_millis())
                .unwrap_or(0) as f64,
        ),
        ColumnKind::Summary => SortKey::Text(flow.record.request_summary()),
        ColumnKind::Status => match flow.record.status() {
            FlowStatus::Http(code) => SortKey::Num(code as f64),
            other => SortKey::Text(other.display()),
        },
        ColumnKind::Duration => flow
            .record
            .duration_ms()
            .map(SortKey::Num)
            .unwrap_or(SortKey::Absent),
        ColumnKind::BytesIn => flow
            .record
            .inbound_bytes()
            .map(|b| SortKey::Num(b as f64))
            .unwrap_or(SortKey::Absent),
        ColumnKind::BytesOut => flow
            .record
            .outbound_bytes()
            .map(|b| SortKey::Num(b as f64))
            .unwrap_or(SortKey::Absent),
    }
}

// ── Navigation effects ────────────────────────────────────────────────────────

/// Side effects a handled navigation key asks the caller to perform.
///
/// The controller mutates its own state synchronously and returns the
/// rest as data, so the rendering layer decides how to scroll and what
/// single-selection to propagate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavEffect {
    /// Row index in the visible sequence to scroll into view.
    pub scroll_to: Option<usize>,
    /// Row to report through the single-select-on-focus callback.
    pub select: Option<FlowId>,
}

/// Outcome of feeding a key to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Key was recognized; the platform default action must be
    /// suppressed and the effects applied.
    Handled(NavEffect),
    /// Not a table key; propagate.
    Ignored,
}

// ── FlowTableState ────────────────────────────────────────────────────────────

/// Interaction state for one flow table instance.
///
/// Owned by the table's host and passed by reference to event
/// handlers; never module-level, so multiple independent tables and
/// deterministic tests both work.
#[derive(Debug, Clone)]
pub struct FlowTableState {
    /// Active sort column index into [`COLUMNS`], if any.
    pub sort_column: Option<usize>,
    pub sort_direction: SortDirection,
    /// Multi-select membership, keyed by flow identity.
    pub selected: HashSet<FlowId>,
    /// Keyboard focus, independent of the selection set.
    pub focused: Option<FlowId>,
    /// When set, only pinned flows are visible.
    pub pinned_only: bool,
    /// Free-text filter, matched case-insensitively against each
    /// flow's searchable text. Empty means no filtering.
    pub filter_text: String,
    /// When set, only flows of this protocol kind are visible.
    pub kind_filter: Option<String>,
    /// Rows skipped per PageUp/PageDown.
    pub page_step: usize,
}

impl Default for FlowTableState {
    fn default() -> Self {
        Self {
            sort_column: Some(STARTED_COLUMN),
            sort_direction: SortDirection::Descending,
            selected: HashSet::new(),
            focused: None,
            pinned_only: false,
            filter_text: String::new(),
            kind_filter: None,
            page_step: 10,
        }
    }
}

impl FlowTableState {
    /// Derive the visible sequence: pinned filter, kind filter, text
    /// filter, then a stable sort by the active column. Computed fresh
    /// on every call.
    pub fn visible<'a>(&self, flows: &'a [Flow]) -> Vec<&'a Flow> {
        let needle = self.filter_text.to_lowercase();
        let mut rows: Vec<&Flow> = flows
            .iter()
            .filter(|f| !self.pinned_only || f.pinned)
            .filter(|f| {
                self.kind_filter
                    .as_deref()
                    .map_or(true, |kind| f.record.kind_name() == kind)
            })
            .filter(|f| needle.is_empty() || matches_text(f, &needle))
            .collect();

        if let Some(col) = self.sort_column {
            if let Some(spec) = COLUMNS.get(col).filter(|s| s.sortable) {
                // `sort_by` is stable: equal keys keep their relative order.
                rows.sort_by(|a, b| {
                    let ord = sort_key(a, spec.kind).compare(&sort_key(b, spec.kind));
                    match self.sort_direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }
        rows
    }

    /// Header activation: toggle direction on the active column,
    /// otherwise sort ascending by the new one. Interactive columns
    /// (checkbox, pin filter) are excluded.
    pub fn on_header_activate(&mut self, column: usize) {
        let Some(spec) = COLUMNS.get(column) else {
            return;
        };
        if !spec.sortable {
            return;
        }
        if self.sort_column == Some(column) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = Some(column);
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Flip one row's selection membership, or — for the
    /// [`SELECT_ALL`] sentinel — toggle every visible row together.
    ///
    /// Ids not present in `flows` are a no-op: the list can change
    /// between event dispatch and handling.
    pub fn toggle_selection(&mut self, id: &str, flows: &[Flow]) {
        if id == SELECT_ALL {
            self.toggle_select_all_visible(flows);
            return;
        }
        if !flows.iter().any(|f| f.identity() == id) {
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select-all semantics scoped to the visible sequence: if every
    /// visible row is selected, deselect them; otherwise select the
    /// visible rows that are missing. Rows hidden by the pinned filter
    /// are never touched.
    pub fn toggle_select_all_visible(&mut self, flows: &[Flow]) {
        let visible_ids: Vec<FlowId> = self
            .visible(flows)
            .iter()
            .map(|f| f.identity())
            .collect();
        if visible_ids.is_empty() {
            return;
        }
        let all_selected = visible_ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            for id in &visible_ids {
                self.selected.remove(id);
            }
        } else {
            for id in visible_ids {
                self.selected.insert(id);
            }
        }
    }

    /// Drop selection/focus entries whose rows are gone. Called on
    /// data refresh; stale ids are otherwise tolerated lazily.
    pub fn retain_ids(&mut self, flows: &[Flow]) {
        let live: HashSet<FlowId> = flows.iter().map(|f| f.identity()).collect();
        self.selected.retain(|id| live.contains(id));
        if let Some(focused) = &self.focused {
            if !live.contains(focused) {
                self.focused = None;
            }
        }
    }

    /// Translate a key event into a state transition.
    ///
    /// `from_text_input` opts out entirely so a filter box keeps its
    /// own editing keys. Arrow keys move focus by one row, page keys
    /// by [`page_step`](Self::page_step); all clamp to the visible
    /// range and land on row 0 when nothing was focused. Enter and
    /// Space toggle the focused row's selection. Ctrl+A toggles
    /// select-all-visible.
    pub fn handle_key(
        &mut self,
        key: &InputKey,
        from_text_input: bool,
        flows: &[Flow],
    ) -> KeyOutcome {
        if from_text_input {
            return KeyOutcome::Ignored;
        }
        match key {
            InputKey::Up => self.move_focus(-1, flows),
            InputKey::Down => self.move_focus(1, flows),
            InputKey::PageUp => self.move_focus(-(self.page_step as isize), flows),
            InputKey::PageDown => self.move_focus(self.page_step as isize, flows),
            InputKey::Enter | InputKey::Char(' ') => {
                if let Some(focused) = self.focused.clone() {
                    self.toggle_selection(&focused, flows);
                }
                KeyOutcome::Handled(NavEffect::default())
            }
            InputKey::CharCtrl('a') => {
                self.toggle_select_all_visible(flows);
                KeyOutcome::Handled(NavEffect::default())
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn move_focus(&mut self, delta: isize, flows: &[Flow]) -> KeyOutcome {
        let visible = self.visible(flows);
        if visible.is_empty() {
            return KeyOutcome::Handled(NavEffect::default());
        }
        let current = self
            .focused
            .as_ref()
            .and_then(|id| visible.iter().position(|f| &f.identity() == id));
        let index = match current {
            // No prior focus lands on row 0 regardless of direction.
            None => 0,
            Some(i) => {
                let max = visible.len() as isize - 1;
                (i as isize + delta).clamp(0, max) as usize
            }
        };
        let id = visible[index].identity();
        self.focused = Some(id.clone());
        KeyOutcome::Handled(NavEffect {
            scroll_to: Some(index),
            select: Some(id),
        })
    }
}

/// Flip a flow's pinned flag. Touches nothing else: the visible
/// sequence reorders only on the next derivation.
pub fn toggle_pin(flow: &mut Flow) {
    flow.pinned = !flow.pinned;
}

// ── Text filter ───────────────────────────────────────────────────────────────

/// Case-insensitive free-text match. `needle` must already be
/// lowercased.
///
/// Searchable text: the user note for every kind; then per kind the
/// URL, method, and status code for Http, the first question name for
/// Dns, and the server endpoint plus client address for Tcp/Udp.
fn matches_text(flow: &Flow, needle: &str) -> bool {
    if let Some(note) = &flow.note {
        if note.to_lowercase().contains(needle) {
            return true;
        }
    }
    match &flow.record {
        FlowRecord::Http(f) => {
            let Some(req) = &f.request else {
                return false;
            };
            let url = req.display_url.as_deref().unwrap_or(&req.url);
            let status = f
                .response
                .as_ref()
                .and_then(|r| r.status_code)
                .map(|c| c.to_string())
                .unwrap_or_default();
            format!("{} {} {}", url, req.method, status)
                .to_lowercase()
                .contains(needle)
        }
        FlowRecord::Dns(f) => f
            .questions
            .first()
            .is_some_and(|q| q.name.to_lowercase().contains(needle)),
        FlowRecord::Tcp(f) => matches_socket_text(&f.conn, needle),
        FlowRecord::Udp(f) => matches_socket_text(&f.conn, needle),
    }
}

fn matches_socket_text(conn: &SocketConnection, needle: &str) -> bool {
    let endpoint = format!("{}:{}", conn.server_host, conn.server_port).to_lowercase();
    endpoint.contains(needle) || conn.client_addr.to_lowercase().contains(needle)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
