//! Widget helpers shared by the flow table and detail panels.

pub mod body_panel;
pub mod flow_table;

pub use body_panel::BodyPanel;
pub use flow_table::FlowTable;

use flowlens_core::flow::{IconCategory, StatusClass};
use ratatui::style::Color;

/// Glyph for the leading icon column.
pub fn icon_glyph(category: IconCategory) -> &'static str {
    match category {
        IconCategory::Json => "{}",
        IconCategory::Xml => "<>",
        IconCategory::Html => "</",
        IconCategory::Css => "#",
        IconCategory::Script => "JS",
        IconCategory::Text => "Tx",
        IconCategory::Font => "Ff",
        IconCategory::Image => "Im",
        IconCategory::Dns => "@",
        IconCategory::File => "··",
        IconCategory::Network => "⇄",
        IconCategory::Message => "✉",
        IconCategory::Server => "Dns",
    }
}

/// Status color by display class.
pub fn status_color(class: StatusClass) -> Color {
    match class {
        StatusClass::Success => Color::Green,
        StatusClass::Redirect => Color::Cyan,
        StatusClass::ErrorClass => Color::Red,
        StatusClass::PendingClass => Color::DarkGray,
    }
}

/// Truncate `s` to at most `max` Unicode characters, appending `…`
/// when truncated. Counts `chars()` so multi-byte characters in URLs
/// or hostnames never cause a mid-character slice.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(1);
    let truncated: String = s.chars().take(keep).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("hello world", 5), "hell…");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        assert_eq!(truncate("héllo", 4), "hél…");
        assert_eq!(truncate("日本語テスト", 4), "日本語…");
    }

    #[test]
    fn test_truncate_zero_max() {
        assert_eq!(truncate("hello", 0), "…");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(StatusClass::Success), Color::Green);
        assert_eq!(status_color(StatusClass::Redirect), Color::Cyan);
        assert_eq!(status_color(StatusClass::ErrorClass), Color::Red);
        assert_eq!(status_color(StatusClass::PendingClass), Color::DarkGray);
    }

    #[test]
    fn test_icon_glyphs_distinct_for_content_kinds() {
        assert_ne!(
            icon_glyph(IconCategory::Json),
            icon_glyph(IconCategory::Text)
        );
        assert_ne!(
            icon_glyph(IconCategory::Network),
            icon_glyph(IconCategory::Message)
        );
    }
}
