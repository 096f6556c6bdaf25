//! Servo gauges: one line gauge per servo with its angle in whole degrees.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{LineGauge, Widget},
};

use armctl_app::state::ArmState;
use armctl_app::PositionSource;
use armctl_core::ServoId;

use crate::theme::{palette, styles};

pub struct ServoGauges<'a> {
    arm: &'a ArmState,
    source: PositionSource,
}

impl<'a> ServoGauges<'a> {
    pub fn new(arm: &'a ArmState, source: PositionSource) -> Self {
        Self { arm, source }
    }

    fn source_label(&self) -> &'static str {
        match self.source {
            PositionSource::Initial => "initial",
            PositionSource::Input => "input",
            PositionSource::PowerOn => "power-on",
            PositionSource::Device => "device",
        }
    }

    fn label(&self, servo: ServoId) -> Line<'static> {
        let angle = self.arm.positions.get(servo);
        // "*" marks a command still in flight
        let pending = if self.arm.is_pending(servo) { "*" } else { " " };
        Line::from(vec![
            Span::styled(format!("{:<8}", servo.label()), styles::text_secondary()),
            Span::styled(format!("{:>3}°", angle.degrees()), styles::accent_bold()),
            Span::styled(pending, styles::status_yellow()),
        ])
    }
}

impl Widget for ServoGauges<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(false)
            .title(Line::styled(" Servos ", styles::text_secondary()))
            .title(
                Line::styled(format!(" {} ", self.source_label()), styles::text_muted())
                    .right_aligned(),
            );
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical([Constraint::Length(1); 4]).split(inner);
        for (servo, row) in ServoId::ALL.into_iter().zip(rows.iter()) {
            if row.height == 0 {
                continue;
            }
            let ratio = self.arm.positions.get(servo).ratio();
            LineGauge::default()
                .ratio(ratio)
                .label(self.label(servo))
                .filled_style(Style::default().fg(palette::GAUGE_FILLED))
                .unfilled_style(Style::default().fg(palette::GAUGE_UNFILLED))
                .render(*row, buf);
        }
    }
}
