use crate::models::Phase;

const PHASE_KEYWORDS: [(&str, &str, Phase); 4] = [
    ("1", "selection", Phase::IssueSelection),
    ("2", "reproduction", Phase::ReproductionPlanning),
    ("3", "implementation", Phase::Implementation),
    ("4", "submission", Phase::SubmissionIteration),
];

/// Maps free-text phase answers to a canonical phase.
pub fn normalize(text: &str) -> Phase {
    let lowered = text.to_lowercase();

    PHASE_KEYWORDS
        .iter()
        .find(|(digit, keyword, _)| lowered.contains(*digit) || lowered.contains(*keyword))
        .map(|(_, _, phase)| phase.clone())
        .unwrap_or(Phase::Unrecognized(lowered))
}
