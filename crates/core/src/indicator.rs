use serde::Serialize;

use crate::board::{FetchOutcome, StatusReport};

const RED_STATUSES: &[&str] = &["testfail", "error"];
const GREEN_STATUSES: &[&str] = &["testok", "testing", "merging", "building", "deploy"];
const BLUE_STATUSES: &[&str] = &["pr"];

/// Colour category for a deployment status.
///
/// Red marks failures (and fetch errors), green marks in-flight pipeline
/// stages, blue marks an open PR, white covers `complete` and anything
/// unrecognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Red,
    Green,
    Blue,
    White,
}

impl Indicator {
    pub fn for_status(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return Self::Red;
        };

        let status = status.to_lowercase();
        if RED_STATUSES.contains(&status.as_str()) {
            Self::Red
        } else if GREEN_STATUSES.contains(&status.as_str()) {
            Self::Green
        } else if BLUE_STATUSES.contains(&status.as_str()) {
            Self::Blue
        } else {
            Self::White
        }
    }

    pub fn for_report(report: &StatusReport) -> Self {
        match &report.outcome {
            FetchOutcome::Failed(_) => Self::Red,
            FetchOutcome::Status(status) => Self::for_status(Some(status)),
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Red => "🟥",
            Self::Green => "🟩",
            Self::Blue => "🟦",
            Self::White => "⬜",
        }
    }
}
