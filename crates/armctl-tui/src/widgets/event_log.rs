//! Event log widget: the newest entries that fit, oldest at the top.

use std::collections::VecDeque;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use armctl_core::LogEntry;

use crate::theme::styles;

pub struct EventLog<'a> {
    logs: &'a VecDeque<LogEntry>,
}

impl<'a> EventLog<'a> {
    pub fn new(logs: &'a VecDeque<LogEntry>) -> Self {
        Self { logs }
    }

    fn format_entry(entry: &'a LogEntry) -> Line<'a> {
        Line::from(vec![
            Span::styled(entry.formatted_time(), styles::text_muted()),
            Span::raw(" "),
            Span::styled(entry.level.prefix(), styles::log_level(entry.level)),
            Span::raw(" "),
            Span::styled(
                format!("{:<5}", entry.source.prefix()),
                styles::log_source(entry.source),
            ),
            Span::raw(" "),
            Span::styled(entry.message.as_str(), styles::text_primary()),
        ])
    }
}

impl Widget for EventLog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(false)
            .title(Line::styled(" Events ", styles::text_secondary()))
            .title(
                Line::styled(format!(" {} ", self.logs.len()), styles::text_muted())
                    .right_aligned(),
            );
        let visible = block.inner(area).height as usize;

        let lines: Vec<Line> = if self.logs.is_empty() {
            vec![Line::styled("No events yet", styles::text_muted())]
        } else {
            let skip = self.logs.len().saturating_sub(visible);
            self.logs.iter().skip(skip).map(Self::format_entry).collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTerminal;
    use armctl_core::LogSource;

    #[test]
    fn test_empty_log_placeholder() {
        let logs = VecDeque::new();
        let mut term = TestTerminal::with_size(40, 6);
        term.render_widget(EventLog::new(&logs), term.area());

        assert!(term.buffer_contains("No events yet"));
    }

    #[test]
    fn test_log_shows_newest_entries() {
        let logs: VecDeque<LogEntry> = (0..10)
            .map(|i| LogEntry::info(LogSource::App, format!("entry-{}", i)))
            .collect();
        let mut term = TestTerminal::with_size(50, 5);
        term.render_widget(EventLog::new(&logs), term.area());

        // 3 visible rows: entries 7, 8, 9
        assert!(term.buffer_contains("entry-9"));
        assert!(term.buffer_contains("entry-7"));
        assert!(!term.buffer_contains("entry-6"));
        assert!(term.line_contains(1, "entry-7"));
    }

    #[test]
    fn test_log_entry_shows_source_and_level() {
        let mut logs = VecDeque::new();
        logs.push_back(LogEntry::error(LogSource::Command, "base rejected"));
        let mut term = TestTerminal::with_size(50, 4);
        term.render_widget(EventLog::new(&logs), term.area());

        assert!(term.line_contains(1, "✗ cmd   base rejected"));
    }
}
