//! # Flow Table Widget
//!
//! Renders a scrollable table of captured flows with selection
//! checkboxes, icon category, start time, status, duration, byte
//! counts, and pin markers. Supports focus highlighting and the
//! pinned-only filter indicator.

use flowlens_app::table::{FlowTableState, SortDirection, COLUMNS};
use flowlens_core::flow::{format_bytes, format_duration_ms, Flow};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use super::{icon_glyph, status_color, truncate};

// ── Column widths (characters) ────────────────────────────────────────────────

/// Selection checkbox column width.
const COL_CHECK: u16 = 4;

/// Icon glyph column width.
const COL_ICON: u16 = 4;

/// Start time column width (`HH:MM:SS.mmm`).
const COL_STARTED: u16 = 14;

/// Status column width.
const COL_STATUS: u16 = 7;

/// Duration column width.
const COL_DURATION: u16 = 9;

/// Inbound/outbound byte count column widths.
const COL_BYTES: u16 = 9;

/// Pin marker column width.
const COL_PIN: u16 = 4;

// Summary column gets the remaining space.

// ── FlowTable ─────────────────────────────────────────────────────────────────

/// Scrollable table widget over the derived visible sequence.
///
/// The widget is pure: it owns no state. The parent derives the
/// visible rows with `FlowTableState::visible` and passes them in;
/// scroll management belongs to the caller.
pub struct FlowTable<'a> {
    /// Pre-filtered, pre-sorted rows to display.
    rows: &'a [&'a Flow],
    state: &'a FlowTableState,
    /// First visible row index (scroll state).
    scroll_offset: usize,
}

impl<'a> FlowTable<'a> {
    pub fn new(rows: &'a [&'a Flow], state: &'a FlowTableState, scroll_offset: usize) -> Self {
        Self {
            rows,
            state,
            scroll_offset,
        }
    }
}

impl Widget for FlowTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Need at least 2 rows: header bar + column headers.
        if area.height < 2 {
            return;
        }

        self.render_header(area, buf);

        let header_area = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        self.render_column_headers(header_area, buf);

        let data_area = Rect {
            y: area.y + 2,
            height: area.height.saturating_sub(2),
            ..area
        };
        self.render_rows(data_area, buf);
    }
}

impl FlowTable<'_> {
    // ── Header bar ────────────────────────────────────────────────────────────

    /// Render the status header: flow count, selection count, filter state.
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let header_area = Rect { height: 1, ..area };

        let count_text = format!("{} flows", self.rows.len());
        let selected_text = if self.state.selected.is_empty() {
            String::new()
        } else {
            format!("  {} selected", self.state.selected.len())
        };
        let mut filter_text = String::new();
        if self.state.pinned_only {
            filter_text.push_str("  pinned only");
        }
        if let Some(kind) = &self.state.kind_filter {
            filter_text.push_str(&format!("  kind:{kind}"));
        }
        if !self.state.filter_text.is_empty() {
            filter_text.push_str(&format!("  /{}", self.state.filter_text));
        }

        buf.set_string(
            header_area.x,
            header_area.y,
            &count_text,
            Style::default().fg(Color::Gray),
        );
        let mut x = header_area.x + count_text.width() as u16;
        if !selected_text.is_empty() {
            buf.set_string(
                x,
                header_area.y,
                &selected_text,
                Style::default().fg(Color::Blue),
            );
            x += selected_text.width() as u16;
        }
        if !filter_text.is_empty() {
            buf.set_string(
                x,
                header_area.y,
                &filter_text,
                Style::default().fg(Color::Yellow),
            );
        }
    }

    // ── Column headers ────────────────────────────────────────────────────────

    /// Label for a column, with a direction arrow on the active sort.
    fn header_label(&self, column: usize, base: &str) -> String {
        if self.state.sort_column == Some(column) {
            let arrow = match self.state.sort_direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            };
            format!("{base}{arrow}")
        } else {
            base.to_string()
        }
    }

    fn render_column_headers(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);
        let mut x = area.x;

        buf.set_string(x, area.y, "Sel", style);
        x += COL_CHECK + COL_ICON;
        // Column indices follow flowlens_app::table::COLUMNS.
        buf.set_string(x, area.y, self.header_label(1, COLUMNS[1].label), style);
        x += COL_STARTED;
        buf.set_string(x, area.y, self.header_label(3, COLUMNS[3].label), style);
        x += COL_STATUS;
        buf.set_string(x, area.y, self.header_label(4, COLUMNS[4].label), style);
        x += COL_DURATION;
        buf.set_string(x, area.y, self.header_label(5, COLUMNS[5].label), style);
        x += COL_BYTES;
        buf.set_string(x, area.y, self.header_label(6, COLUMNS[6].label), style);
        x += COL_BYTES;
        buf.set_string(x, area.y, COLUMNS[7].label, style);
        x += COL_PIN;
        buf.set_string(x, area.y, self.header_label(2, COLUMNS[2].label), style);
    }

    // ── Data rows ─────────────────────────────────────────────────────────────

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let visible_rows = area.height as usize;
        let start = self.scroll_offset;
        let end = (start + visible_rows).min(self.rows.len());

        for (row_idx, flow_idx) in (start..end).enumerate() {
            let flow = self.rows[flow_idx];
            let y = area.y + row_idx as u16;
            let id = flow.identity();
            let is_focused = self.state.focused.as_deref() == Some(id.as_str());
            let is_selected = self.state.selected.contains(&id);

            let row_style = if is_focused {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            // Clear entire row with the row background.
            for x in area.x..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(row_style).set_char(' ');
                }
            }

            let mut x = area.x;

            // Selection checkbox
            let check = if is_selected { "[x]" } else { "[ ]" };
            let check_style = if is_selected {
                Style::default().fg(Color::Blue)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            buf.set_string(x, y, check, check_style.patch(row_style));
            x += COL_CHECK;

            // Icon category
            buf.set_string(
                x,
                y,
                icon_glyph(flow.record.icon_category()),
                Style::default().fg(Color::Magenta).patch(row_style),
            );
            x += COL_ICON;

            // Start time
            let started = flow
                .record
                .start_timestamp()
                .map(|t| t.display())
                .unwrap_or_default();
            buf.set_string(
                x,
                y,
                truncate(&started, COL_STARTED as usize - 1),
                Style::default().fg(Color::Gray).patch(row_style),
            );
            x += COL_STARTED;

            // Status
            let status = flow.record.status();
            buf.set_string(
                x,
                y,
                truncate(&status.display(), COL_STATUS as usize - 1),
                Style::default()
                    .fg(status_color(status.class()))
                    .patch(row_style),
            );
            x += COL_STATUS;

            // Duration
            let duration = flow
                .record
                .duration_ms()
                .map(format_duration_ms)
                .unwrap_or_else(|| "...".to_string());
            buf.set_string(
                x,
                y,
                truncate(&duration, COL_DURATION as usize - 1),
                Style::default().fg(Color::White).patch(row_style),
            );
            x += COL_DURATION;

            // Byte counts
            let inbound = flow
                .record
                .inbound_bytes()
                .map(format_bytes)
                .unwrap_or_default();
            buf.set_string(
                x,
                y,
                truncate(&inbound, COL_BYTES as usize - 1),
                Style::default().fg(Color::Gray).patch(row_style),
            );
            x += COL_BYTES;
            let outbound = flow
                .record
                .outbound_bytes()
                .map(format_bytes)
                .unwrap_or_default();
            buf.set_string(
                x,
                y,
                truncate(&outbound, COL_BYTES as usize - 1),
                Style::default().fg(Color::Gray).patch(row_style),
            );
            x += COL_BYTES;

            // Pin marker
            if flow.pinned {
                buf.set_string(
                    x,
                    y,
                    "●",
                    Style::default().fg(Color::Yellow).patch(row_style),
                );
            }
            x += COL_PIN;

            // Summary — gets remaining width
            let summary_width = area.right().saturating_sub(x) as usize;
            buf.set_string(
                x,
                y,
                truncate(&flow.record.request_summary(), summary_width),
                Style::default().fg(Color::White).patch(row_style),
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use flowlens_core::flow::{
        FlowRecord, HttpFlow, HttpMessage, HttpRequest, HttpResponse, Timestamp,
    };

    fn make_flow(id: &str, status: Option<u16>) -> Flow {
        Flow::new(FlowRecord::Http(HttpFlow {
            id: id.to_string(),
            request: Some(HttpRequest {
                method: "GET".to_string(),
                url: format!("https://example.com/api/{id}"),
                display_url: None,
                message: HttpMessage {
                    timestamp_start: Some(Timestamp {
                        seconds: 1_700_000_000,
                        nanos: 0,
                    }),
                    ..Default::default()
                },
            }),
            response: status.map(|code| HttpResponse {
                status_code: Some(code),
                message: HttpMessage {
                    content: Some(vec![0u8; 1024]),
                    ..Default::default()
                },
            }),
            error: None,
        }))
    }

    fn render_to_buf(rows: &[&Flow], state: &FlowTableState, w: u16, h: u16) -> Buffer {
        let widget = FlowTable::new(rows, state, 0);
        let mut buf = Buffer::empty(Rect::new(0, 0, w, h));
        widget.render(Rect::new(0, 0, w, h), &mut buf);
        buf
    }

    fn buf_text(buf: &Buffer, w: u16, h: u16) -> String {
        let mut s = String::new();
        for y in 0..h {
            for x in 0..w {
                if let Some(c) = buf.cell((x, y)) {
                    s.push_str(c.symbol());
                }
            }
        }
        s
    }

    #[test]
    fn test_renders_without_panic() {
        let state = FlowTableState::default();
        render_to_buf(&[], &state, 100, 24);
        render_to_buf(&[], &state, 100, 0);
        render_to_buf(&[], &state, 0, 24);
        render_to_buf(&[], &state, 10, 1);
    }

    #[test]
    fn test_shows_flow_count() {
        let state = FlowTableState::default();
        let f1 = make_flow("1", Some(200));
        let f2 = make_flow("2", Some(404));
        let buf = render_to_buf(&[&f1, &f2], &state, 120, 10);
        let text = buf_text(&buf, 120, 1);
        assert!(text.contains("2 flows"), "got: {text:?}");
    }

    #[test]
    fn test_shows_pinned_only_indicator() {
        let mut state = FlowTableState::default();
        state.pinned_only = true;
        let buf = render_to_buf(&[], &state, 120, 10);
        let text = buf_text(&buf, 120, 1);
        assert!(text.contains("pinned only"), "got: {text:?}");
    }

    #[test]
    fn test_shows_filter_indicators() {
        let mut state = FlowTableState::default();
        state.kind_filter = Some("dns".to_string());
        state.filter_text = "example".to_string();
        let buf = render_to_buf(&[], &state, 120, 10);
        let text = buf_text(&buf, 120, 1);
        assert!(text.contains("kind:dns"), "got: {text:?}");
        assert!(text.contains("/example"), "got: {text:?}");
    }

    #[test]
    fn test_shows_selection_count() {
        let mut state = FlowTableState::default();
        state.selected.insert("1".to_string());
        let f1 = make_flow("1", Some(200));
        let buf = render_to_buf(&[&f1], &state, 120, 10);
        let text = buf_text(&buf, 120, 1);
        assert!(text.contains("1 selected"), "got: {text:?}");
    }

    #[test]
    fn test_column_headers_present_with_sort_arrow() {
        let state = FlowTableState::default(); // Started descending
        let buf = render_to_buf(&[], &state, 120, 5);
        let text = buf_text(&buf, 120, 2);
        assert!(text.contains("Started▼"), "got: {text:?}");
        assert!(text.contains("Summary"), "got: {text:?}");
        assert!(text.contains("Status"), "got: {text:?}");
    }

    #[test]
    fn test_renders_row_content() {
        let state = FlowTableState::default();
        let f1 = make_flow("1", Some(200));
        let buf = render_to_buf(&[&f1], &state, 140, 10);
        let text = buf_text(&buf, 140, 10);
        assert!(text.contains("200"), "got: {text:?}");
        assert!(text.contains("GET https://example.com/api/1"), "got: {text:?}");
        assert!(text.contains("1.0 KB"), "got: {text:?}");
    }

    #[test]
    fn test_selected_row_shows_checked_box() {
        let mut state = FlowTableState::default();
        state.selected.insert("1".to_string());
        let f1 = make_flow("1", Some(200));
        let buf = render_to_buf(&[&f1], &state, 120, 10);
        let text = buf_text(&buf, 120, 10);
        assert!(text.contains("[x]"), "got: {text:?}");
    }

    #[test]
    fn test_pending_flow_shows_dots() {
        let state = FlowTableState::default();
        let f1 = make_flow("1", None);
        let buf = render_to_buf(&[&f1], &state, 120, 10);
        let text = buf_text(&buf, 120, 10);
        assert!(text.contains("..."), "got: {text:?}");
    }

    #[test]
    fn test_pinned_flow_shows_marker() {
        let state = FlowTableState::default();
        let mut f1 = make_flow("1", Some(200));
        f1.pinned = true;
        let buf = render_to_buf(&[&f1], &state, 120, 10);
        let text = buf_text(&buf, 120, 10);
        assert!(text.contains("●"), "got: {text:?}");
    }

    #[test]
    fn test_scroll_offset_windows_rows() {
        let state = FlowTableState::default();
        let f0 = make_flow("0", Some(200));
        let f1 = make_flow("1", Some(200));
        let f2 = make_flow("2", Some(200));
        let rows = vec![&f0, &f1, &f2];
        let widget = FlowTable::new(&rows, &state, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 140, 10));
        widget.render(Rect::new(0, 0, 140, 10), &mut buf);
        let text = buf_text(&buf, 140, 10);
        assert!(text.contains("/api/1"), "got: {text:?}");
        assert!(!text.contains("/api/0"), "got: {text:?}");
    }
}
