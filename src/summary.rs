use crate::models::{CohortSummary, Status, StudentRecord};

pub fn summarize(records: &[StudentRecord]) -> CohortSummary {
    let mut summary = CohortSummary {
        total: records.len(),
        ..CohortSummary::default()
    };

    for record in records {
        match record.status {
            Status::OnTrack => summary.on_track += 1,
            Status::Flagged => summary.flagged += 1,
            Status::AtRisk => summary.at_risk += 1,
        }

        if record.sun_submitted {
            summary.sun_submitted += 1;
        }
        if record.wed_submitted {
            summary.wed_submitted += 1;
        }

        let ordinal = record.current_phase.ordinal() as usize;
        if (1..=4).contains(&ordinal) {
            summary.phase_counts[ordinal - 1] += 1;
        }

        if !record.mr_url.is_empty() {
            summary.mr_submitted += 1;
        }
        if record.mr_merged() {
            summary.mr_merged += 1;
        }
        if record.intervention.is_some() {
            summary.interventions_needed += 1;
        }
    }

    summary.current_week = records.iter().map(|r| r.week).max().unwrap_or(0);
    summary
}

/// `"n (x.x%)"`, or `"0"` when there is nothing to divide by.
pub fn share(count: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{} ({:.1}%)", count, percent(count, total))
}

/// `"n/total (x.x%)"`, or `"0"` when there is nothing to divide by.
pub fn rate(count: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{}/{} ({:.1}%)", count, total, percent(count, total))
}

fn percent(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterventionReason, Phase};

    fn sample(week: i32, phase: Phase, status: Status) -> StudentRecord {
        StudentRecord {
            week,
            current_phase: phase,
            status,
            ..StudentRecord::default()
        }
    }

    #[test]
    fn empty_cohort_has_zero_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, CohortSummary::default());
        assert_eq!(summary.current_week, 0);
    }

    #[test]
    fn shares_guard_against_empty_cohort() {
        assert_eq!(share(0, 0), "0");
        assert_eq!(rate(0, 0), "0");
    }

    #[test]
    fn shares_render_one_decimal() {
        assert_eq!(share(1, 3), "1 (33.3%)");
        assert_eq!(share(2, 2), "2 (100.0%)");
        assert_eq!(rate(1, 4), "1/4 (25.0%)");
    }

    #[test]
    fn counts_statuses_phases_and_merges() {
        let mut merged = sample(5, Phase::SubmissionIteration, Status::OnTrack);
        merged.mr_url = "https://gitlab.com/group/project/-/merge_requests/7".to_string();
        merged.mr_status = "Merged".to_string();
        merged.sun_submitted = true;

        let mut at_risk = sample(2, Phase::IssueSelection, Status::AtRisk);
        at_risk.intervention = Some(InterventionReason::MissingBoth);

        let mut flagged = sample(4, Phase::Implementation, Status::Flagged);
        flagged.intervention = Some(InterventionReason::MissingDeliverables);
        flagged.wed_submitted = true;

        let unknown = sample(3, Phase::Unrecognized("paused".to_string()), Status::OnTrack);

        let summary = summarize(&[merged, at_risk, flagged, unknown]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.on_track, 2);
        assert_eq!(summary.flagged, 1);
        assert_eq!(summary.at_risk, 1);
        assert_eq!(summary.sun_submitted, 1);
        assert_eq!(summary.wed_submitted, 1);
        assert_eq!(summary.phase_counts, [1, 0, 1, 1]);
        assert_eq!(summary.mr_submitted, 1);
        assert_eq!(summary.mr_merged, 1);
        assert_eq!(summary.interventions_needed, 2);
        assert_eq!(summary.current_week, 5);
    }
}
