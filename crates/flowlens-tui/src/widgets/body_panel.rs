//! # Body Panel Widget
//!
//! Renders the formatted payload of the focused flow. Text payloads
//! are shown line by line, byte payloads as a hex dump, and base64
//! image payloads as a placeholder with the encoded size.

use flowlens_app::{BodyTab, ContentData, ContentEncoding, FormatTag, FormattedContent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use super::truncate;

/// Bytes shown per hex dump row.
const HEX_ROW_BYTES: usize = 16;

/// Detail panel for the focused flow's request or response body.
pub struct BodyPanel<'a> {
    content: Option<&'a FormattedContent>,
    tab: BodyTab,
    /// The user's format override, shown in the panel title.
    requested: FormatTag,
}

impl<'a> BodyPanel<'a> {
    pub fn new(content: Option<&'a FormattedContent>, tab: BodyTab, requested: FormatTag) -> Self {
        Self {
            content,
            tab,
            requested,
        }
    }

    fn title(&self) -> String {
        let side = match self.tab {
            BodyTab::Request => "Request",
            BodyTab::Response => "Response",
        };
        match self.content {
            Some(content) if self.requested == FormatTag::Auto => {
                format!("{side} · {}", content.format)
            }
            Some(content) => format!("{side} · {} (forced)", content.format),
            None => side.to_string(),
        }
    }
}

impl Widget for BodyPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        buf.set_string(
            area.x,
            area.y,
            truncate(&self.title(), area.width as usize),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let body_area = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };
        if body_area.height == 0 {
            return;
        }

        let Some(content) = self.content else {
            buf.set_string(
                body_area.x,
                body_area.y,
                "no body",
                Style::default().fg(Color::DarkGray),
            );
            return;
        };

        match (&content.data, content.encoding) {
            (ContentData::Text(text), ContentEncoding::Base64) => {
                // Base64 image payload: show size, not the blob.
                let note = format!("(image, {} base64 chars)", text.len());
                buf.set_string(
                    body_area.x,
                    body_area.y,
                    note,
                    Style::default().fg(Color::DarkGray),
                );
            }
            (ContentData::Text(text), _) => {
                render_text(text, body_area, buf);
            }
            (ContentData::Bytes(bytes), _) => {
                render_hex(bytes, body_area, buf);
            }
        }
    }
}

fn render_text(text: &str, area: Rect, buf: &mut Buffer) {
    if text.is_empty() {
        buf.set_string(
            area.x,
            area.y,
            "(empty body)",
            Style::default().fg(Color::DarkGray),
        );
        return;
    }
    for (i, line) in text.lines().take(area.height as usize).enumerate() {
        buf.set_string(
            area.x,
            area.y + i as u16,
            truncate(line, area.width as usize),
            Style::default().fg(Color::White),
        );
    }
}

/// Classic hex dump: offset, hex bytes, printable-ASCII gutter.
fn render_hex(bytes: &[u8], area: Rect, buf: &mut Buffer) {
    if bytes.is_empty() {
        buf.set_string(
            area.x,
            area.y,
            "(empty body)",
            Style::default().fg(Color::DarkGray),
        );
        return;
    }
    for (i, chunk) in bytes
        .chunks(HEX_ROW_BYTES)
        .take(area.height as usize)
        .enumerate()
    {
        buf.set_string(
            area.x,
            area.y + i as u16,
            truncate(&hex_dump_row(i * HEX_ROW_BYTES, chunk), area.width as usize),
            Style::default().fg(Color::Gray),
        );
    }
}

fn hex_dump_row(offset: usize, chunk: &[u8]) -> String {
    let mut hex = String::with_capacity(HEX_ROW_BYTES * 3);
    for (i, b) in chunk.iter().enumerate() {
        if i > 0 {
            hex.push(' ');
        }
        hex.push_str(&format!("{b:02x}"));
    }
    // Pad short final rows so the ASCII gutter stays aligned.
    let pad = HEX_ROW_BYTES * 3 - 1 - hex.len();
    for _ in 0..pad {
        hex.push(' ');
    }
    let ascii: String = chunk
        .iter()
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    format!("{offset:08x}  {hex}  |{ascii}|")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_text(panel: BodyPanel, w: u16, h: u16) -> String {
        let mut buf = Buffer::empty(Rect::new(0, 0, w, h));
        panel.render(Rect::new(0, 0, w, h), &mut buf);
        let mut s = String::new();
        for y in 0..h {
            for x in 0..w {
                if let Some(c) = buf.cell((x, y)) {
                    s.push_str(c.symbol());
                }
            }
            s.push('\n');
        }
        s
    }

    fn text_content(text: &str, format: FormatTag) -> FormattedContent {
        FormattedContent {
            data: ContentData::Text(text.to_string()),
            encoding: ContentEncoding::Text,
            format,
        }
    }

    #[test]
    fn test_no_body_placeholder() {
        let panel = BodyPanel::new(None, BodyTab::Response, FormatTag::Auto);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("Response"));
        assert!(text.contains("no body"));
    }

    #[test]
    fn test_title_names_side_and_format() {
        let content = text_content("{}", FormatTag::Json);
        let panel = BodyPanel::new(Some(&content), BodyTab::Request, FormatTag::Auto);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("Request · json"), "got: {text}");
    }

    #[test]
    fn test_forced_format_marked_in_title() {
        let content = text_content("abc", FormatTag::Text);
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Text);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("(forced)"), "got: {text}");
    }

    #[test]
    fn test_text_body_rendered_line_by_line() {
        let content = text_content("alpha\nbeta", FormatTag::Text);
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Auto);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
    }

    #[test]
    fn test_empty_text_body_placeholder() {
        let content = text_content("", FormatTag::Text);
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Auto);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("(empty body)"));
    }

    #[test]
    fn test_bytes_render_as_hex_dump() {
        let content = FormattedContent {
            data: ContentData::Bytes(b"AB\x00".to_vec()),
            encoding: ContentEncoding::Binary,
            format: FormatTag::Binary,
        };
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Auto);
        let text = render_to_text(panel, 80, 5);
        assert!(text.contains("00000000"), "got: {text}");
        assert!(text.contains("41 42 00"), "got: {text}");
        assert!(text.contains("|AB.|"), "got: {text}");
    }

    #[test]
    fn test_base64_image_shows_size_note() {
        let content = FormattedContent {
            data: ContentData::Text("aGVsbG8=".to_string()),
            encoding: ContentEncoding::Base64,
            format: FormatTag::Image,
        };
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Auto);
        let text = render_to_text(panel, 60, 5);
        assert!(text.contains("base64 chars"), "got: {text}");
    }

    #[test]
    fn test_hex_dump_row_alignment() {
        let full = hex_dump_row(0, &[0u8; 16]);
        let partial = hex_dump_row(16, &[0u8; 3]);
        // Offset + hex field width must match so gutters align.
        assert_eq!(
            full.find('|').unwrap(),
            partial.find('|').unwrap()
        );
        assert!(partial.starts_with("00000010"));
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let content = text_content("x", FormatTag::Text);
        let panel = BodyPanel::new(Some(&content), BodyTab::Response, FormatTag::Auto);
        render_to_text(panel, 0, 0);
    }
}
