use crate::region::Region;

/// Result of one region's fetch. Exactly one of status or error exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Status(String),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReport {
    pub region: Region,
    pub outcome: FetchOutcome,
}

impl StatusReport {
    pub fn status(region: Region, status: impl Into<String>) -> Self {
        Self { region, outcome: FetchOutcome::Status(status.into()) }
    }

    pub fn failed(region: Region, error: impl Into<String>) -> Self {
        Self { region, outcome: FetchOutcome::Failed(error.into()) }
    }

    pub fn status_text(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Status(status) => Some(status),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Status(_) => None,
            FetchOutcome::Failed(error) => Some(error),
        }
    }

    /// Text shown to users: the status token, or the error description.
    pub fn display_text(&self) -> &str {
        match &self.outcome {
            FetchOutcome::Status(text) | FetchOutcome::Failed(text) => text,
        }
    }
}

/// One report per region, always exhaustive and always in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusBoard {
    reports: [StatusReport; Region::COUNT],
}

pub const MISSING_REPORT: &str = "no status reported";

impl StatusBoard {
    /// Builds a board from reports in any order. Duplicates keep the last
    /// report for a region; regions with no report are marked failed.
    pub fn from_reports(reports: impl IntoIterator<Item = StatusReport>) -> Self {
        let mut slots: [Option<StatusReport>; Region::COUNT] = Default::default();
        for report in reports {
            let index = report.region.index();
            slots[index] = Some(report);
        }

        let reports = Region::ALL.map(|region| {
            slots[region.index()]
                .take()
                .unwrap_or_else(|| StatusReport::failed(region, MISSING_REPORT))
        });
        Self { reports }
    }

    pub fn get(&self, region: Region) -> &StatusReport {
        &self.reports[region.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusReport> {
        self.reports.iter()
    }

    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|report| report.error_text().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{StatusBoard, StatusReport, MISSING_REPORT};
    use crate::region::Region;

    #[test]
    fn board_orders_reports_by_region() {
        let board = StatusBoard::from_reports(vec![
            StatusReport::status(Region::Us, "building"),
            StatusReport::status(Region::Overall, "testing"),
            StatusReport::failed(Region::Ca, "HTTP 500"),
            StatusReport::status(Region::Or, "pr"),
            StatusReport::status(Region::Au, "complete"),
        ]);

        let regions: Vec<_> = board.iter().map(|report| report.region).collect();
        assert_eq!(regions, Region::ALL.to_vec());
        assert_eq!(board.get(Region::Ca).error_text(), Some("HTTP 500"));
        assert_eq!(board.get(Region::Us).status_text(), Some("building"));
        assert_eq!(board.failures(), 1);
    }

    #[test]
    fn missing_regions_are_reported_as_failures() {
        let board = StatusBoard::from_reports(vec![StatusReport::status(Region::Au, "complete")]);

        assert_eq!(board.iter().count(), Region::COUNT);
        assert_eq!(board.get(Region::Overall).error_text(), Some(MISSING_REPORT));
        assert_eq!(board.failures(), 4);
    }

    #[test]
    fn report_exposes_exactly_one_of_status_or_error() {
        let ok = StatusReport::status(Region::Overall, "complete");
        assert_eq!((ok.status_text(), ok.error_text()), (Some("complete"), None));

        let failed = StatusReport::failed(Region::Au, "Connection timeout");
        assert_eq!((failed.status_text(), failed.error_text()), (None, Some("Connection timeout")));
        assert_eq!(failed.display_text(), "Connection timeout");
    }
}
