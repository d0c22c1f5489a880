use bluelight_core::{Indicator, StatusBoard, StatusReport};

use crate::blocks::{MessageBuilder, SlackMessage};

/// `<indicator> *<Heading>:* <text>`
pub fn render_line(report: &StatusReport) -> String {
    let indicator = Indicator::for_report(report);
    format!("{} *{}:* {}", indicator.emoji(), report.region.heading(), report.display_text())
}

pub fn render_status_text(board: &StatusBoard) -> String {
    board.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

/// Ephemeral reply carrying one line per region in a single section.
pub fn deploy_status_message(board: &StatusBoard) -> SlackMessage {
    let text = render_status_text(board);
    MessageBuilder::ephemeral()
        .section(|section| {
            section.mrkdwn(text);
        })
        .build()
}
