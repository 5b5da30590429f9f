//! Per-device status snapshot tracking.

use tuyabridge_domain::time::Timestamp;
use tuyabridge_domain::tuya::{StatusUpdate, TuyaStatus};

/// Merges partial reports into the full device snapshot.
///
/// Tuya pushes only the codes that were reported, so the snapshot handed to
/// controllers is the merge of every report seen so far, and the changed
/// codes are those whose value differs from the previous snapshot.
#[derive(Debug, Default)]
pub struct StatusTracker {
    snapshot: TuyaStatus,
    last_report: Option<Timestamp>,
}

impl StatusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a report and return the resulting update.
    pub fn apply(&mut self, report: TuyaStatus, reported_at: Option<Timestamp>) -> StatusUpdate {
        let mut changed = Vec::new();
        for (code, value) in report.iter() {
            if self.snapshot.get(code) != Some(value) {
                changed.push(code.to_string());
            }
        }
        for (code, value) in report.iter() {
            self.snapshot.insert(code, value.clone());
        }
        if reported_at.is_some() {
            self.last_report = reported_at;
        }
        StatusUpdate::new(self.snapshot.clone(), changed)
    }

    #[must_use]
    pub fn snapshot(&self) -> &TuyaStatus {
        &self.snapshot
    }

    #[must_use]
    pub fn last_report(&self) -> Option<Timestamp> {
        self.last_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuyabridge_domain::time::from_millis;
    use tuyabridge_domain::tuya::{TuyaValue, codes};

    fn report(entries: &[(&str, TuyaValue)]) -> TuyaStatus {
        entries.iter().cloned().collect()
    }

    #[test]
    fn should_report_every_code_as_changed_on_first_report() {
        let mut tracker = StatusTracker::new();

        let update = tracker.apply(
            report(&[(codes::SWITCH, true.into()), (codes::FAN_SPEED, 2.0.into())]),
            None,
        );

        assert!(update.has_changed(codes::SWITCH));
        assert!(update.has_changed(codes::FAN_SPEED));
    }

    #[test]
    fn should_only_report_codes_whose_value_changed() {
        let mut tracker = StatusTracker::new();
        tracker.apply(
            report(&[(codes::SWITCH, true.into()), (codes::FAN_SPEED, 2.0.into())]),
            None,
        );

        let update = tracker.apply(
            report(&[(codes::SWITCH, true.into()), (codes::FAN_SPEED, 3.0.into())]),
            None,
        );

        assert_eq!(update.changed, [codes::FAN_SPEED.to_string()]);
    }

    #[test]
    fn should_merge_partial_reports_into_snapshot() {
        let mut tracker = StatusTracker::new();
        tracker.apply(report(&[(codes::SWITCH, true.into())]), None);

        let update = tracker.apply(report(&[(codes::FAN_SPEED, 4.0.into())]), None);

        assert_eq!(update.status.get(codes::SWITCH), Some(&TuyaValue::Bool(true)));
        assert_eq!(update.status.len(), 2);
        assert_eq!(update.changed, [codes::FAN_SPEED.to_string()]);
    }

    #[test]
    fn should_keep_latest_report_time() {
        let mut tracker = StatusTracker::new();
        let at = from_millis(1_700_000_000_000);

        tracker.apply(report(&[(codes::SWITCH, true.into())]), at);
        tracker.apply(report(&[(codes::SWITCH, false.into())]), None);

        assert_eq!(tracker.last_report(), at);
        assert_eq!(tracker.snapshot().get(codes::SWITCH), Some(&TuyaValue::Bool(false)));
    }
}
