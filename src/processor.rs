use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::derive::derive;
use crate::error::{Result, TrackerError};
use crate::mapping::{self, map_row};
use crate::models::{ProcessingResult, RawRow, StudentRecord, TrackerReport};
use crate::report::build_report;
use crate::risk::classify;
use crate::summary::summarize;
use crate::workbook::write_workbook;

pub const DEFAULT_OUTPUT_FILENAME: &str = "tracker_report.xlsx";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Short rows read missing cells as empty.
pub fn parse_rows(data: &[u8]) -> Result<Vec<RawRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if mapping::mapped_column_count(headers.iter()) == 0 {
        warn!(columns = headers.len(), "no recognised survey columns in header row");
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(idx, label)| (label, record.get(idx).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

pub fn classify_rows(rows: Vec<RawRow>) -> Vec<StudentRecord> {
    rows.into_iter()
        .map(|row| {
            let record = classify(derive(map_row(row)));
            debug!(
                name = %record.name,
                week = record.week,
                phase = %record.current_phase,
                status = ?record.status,
                reason = record.intervention_code(),
                "classified record"
            );
            record
        })
        .collect()
}

pub fn classify_export(data: &[u8]) -> Result<Vec<StudentRecord>> {
    let rows = parse_rows(data)?;
    if rows.is_empty() {
        return Err(TrackerError::EmptyInput);
    }
    Ok(classify_rows(rows))
}

pub fn try_process(data: &[u8]) -> Result<TrackerReport> {
    let run_id = Uuid::new_v4();
    let generated_at = Utc::now();

    let records = classify_export(data)?;
    let summary = summarize(&records);
    let layout = build_report(&records, &summary, generated_at);
    let workbook = write_workbook(&layout)?;

    info!(
        %run_id,
        rows = records.len(),
        on_track = summary.on_track,
        flagged = summary.flagged,
        at_risk = summary.at_risk,
        bytes = workbook.len(),
        "tracker report generated"
    );

    Ok(TrackerReport {
        run_id,
        generated_at,
        records,
        summary,
        workbook,
    })
}

/// Boundary form of [`try_process`]: never fails, reports errors in the result.
pub fn process(data: &[u8]) -> ProcessingResult {
    match try_process(data) {
        Ok(report) => ProcessingResult {
            success: true,
            rows_processed: report.records.len(),
            output_data: Some(report.workbook),
            output_filename: Some(DEFAULT_OUTPUT_FILENAME.to_string()),
            error_message: None,
        },
        Err(err) => {
            warn!(error = %err, "tracker processing failed");
            ProcessingResult {
                success: false,
                error_message: Some(err.to_string()),
                ..ProcessingResult::default()
            }
        }
    }
}

pub fn report_filename(input_name: &str) -> String {
    let stem = match input_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None if input_name.is_empty() => "tracker",
        None => input_name,
    };
    format!("{stem}_report.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterventionReason, Phase, Status, TimelineType};

    const MINIMAL_CSV: &str = "\
Which week is this?,What phase are you currently in?
Week 1,Phase 1
";

    const COHORT_CSV: &str = "\
#,What's your name?,Which week is this?,Which submission are you completing?,What phase are you currently in?,\"Have you completed the \"\"Why I chose this issue\"\" section in your README?\",Have you documented your reproduction process in your README?,Have you documented your solution approach in your README?,Are you currently blocked or stuck?,Describe what you're blocked on,Tags
1,Avery Lee,Week 3,Sunday Report,Phase 2,1,1,1,0,,
2,Jules Moreno,Week 6,Sunday Report,Reproduction,1,1,1,0,,
3,Kiara Patel,Week 4,Wednesday Check-in,Implementation,1,0,0,1,Waiting on review,AI Generated
4,Sam Ortiz,Week 4,,Phase 3,1,1,1,0,,
5,Rin Sato,Week 5,Sunday Report,Phase 3,1,1,0,0,,
";

    #[test]
    fn minimal_row_is_missing_both() {
        let records = classify_export(MINIMAL_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.week, 1);
        assert_eq!(record.current_phase.label(), "Phase 1: Issue Selection");
        assert_eq!(record.deliverables_expected, 1);
        assert_eq!(record.status, Status::AtRisk);
        assert_eq!(record.intervention, Some(InterventionReason::MissingBoth));
        assert_eq!(record.raw.get("Which week is this?"), Some("Week 1"));
    }

    #[test]
    fn cohort_rows_classify_in_input_order() {
        let records = classify_export(COHORT_CSV.as_bytes()).unwrap();
        let outcomes: Vec<(&str, Status, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.status, r.intervention_code()))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ("Avery Lee", Status::OnTrack, ""),
                ("Jules Moreno", Status::AtRisk, "PHASE_CRITICAL"),
                ("Kiara Patel", Status::AtRisk, "STALLED"),
                ("Sam Ortiz", Status::AtRisk, "MISSING_BOTH"),
                ("Rin Sato", Status::Flagged, "MISSING_DELIVERABLES"),
            ]
        );
        assert_eq!(records[1].timeline_type, TimelineType::Compressed);
        assert_eq!(records[2].notes, "[AI Generated Response]");
        assert_eq!(records[2].current_phase, Phase::Implementation);
    }

    #[test]
    fn deliverable_invariants_hold() {
        let records = classify_export(COHORT_CSV.as_bytes()).unwrap();
        for record in &records {
            assert!([0, 1, 3, 5, 6].contains(&record.deliverables_expected));
            assert!(record.deliverables_complete <= 6);
            assert_eq!(
                record.intervention.is_some(),
                record.status != Status::OnTrack
            );
        }
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(MINIMAL_CSV.as_bytes());
        let records = classify_export(&data).unwrap();
        assert_eq!(records[0].week, 1);
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let data = "What's your name?,Which week is this?\nAvery Lee\n";
        let records = classify_export(data.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Avery Lee");
        assert_eq!(records[0].week, 0);
    }

    #[test]
    fn header_only_input_is_empty() {
        let err = classify_export(b"Which week is this?\n").unwrap_err();
        assert!(matches!(err, TrackerError::EmptyInput));

        let result = process(b"");
        assert!(!result.success);
        assert!(result.output_data.is_none());
        assert_eq!(result.error_message.as_deref(), Some("CSV file is empty"));
        assert_eq!(result.rows_processed, 0);
    }

    #[test]
    fn invalid_utf8_is_a_processing_error() {
        let result = process(b"Which week is this?\n\xFF\xFE\n");
        assert!(!result.success);
        assert!(result.output_data.is_none());
        assert!(result
            .error_message
            .unwrap_or_default()
            .starts_with("Processing error: "));
    }

    #[test]
    fn successful_run_returns_workbook_and_count() {
        let result = process(COHORT_CSV.as_bytes());
        assert!(result.success);
        assert_eq!(result.rows_processed, 5);
        assert_eq!(result.output_filename.as_deref(), Some(DEFAULT_OUTPUT_FILENAME));
        assert!(result.error_message.is_none());
        assert!(result.output_data.unwrap().starts_with(b"PK"));
    }

    #[test]
    fn classification_is_idempotent() {
        let first = classify_export(COHORT_CSV.as_bytes()).unwrap();
        let second = classify_export(COHORT_CSV.as_bytes()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let a = try_process(COHORT_CSV.as_bytes()).unwrap();
        let b = try_process(COHORT_CSV.as_bytes()).unwrap();
        assert_eq!(a.records, b.records);
        assert_eq!(a.summary, b.summary);
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn extreme_week_value_still_processes() {
        let data = "\
Which week is this?,What phase are you currently in?,Which submission are you completing?
Week -2147483648,Phase 1,Sunday
";
        let result = process(data.as_bytes());
        assert!(result.success);
        assert_eq!(result.rows_processed, 1);

        let records = classify_export(data.as_bytes()).unwrap();
        assert_eq!(records[0].week, i32::MIN);
        assert_eq!(records[0].weeks_remaining, i32::MAX);
        assert_eq!(records[0].intervention, Some(InterventionReason::MissingDeliverables));
    }

    #[test]
    fn report_filename_uses_input_stem() {
        assert_eq!(report_filename("week3_responses.csv"), "week3_responses_report.xlsx");
        assert_eq!(report_filename("export"), "export_report.xlsx");
        assert_eq!(report_filename("cohort.v2.csv"), "cohort.v2_report.xlsx");
        assert_eq!(report_filename(".csv"), "_report.xlsx");
        assert_eq!(report_filename(""), "tracker_report.xlsx");
    }
}
