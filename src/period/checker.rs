//! Pure date-range checks for financial periods: overlap rejection, gap
//! detection and default date suggestion.

use time::{Date, Duration};

/// An existing period's dates, as needed by the checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSpan {
    pub name: String,
    pub start: Date,
    pub end: Date,
}

/// Finds the first existing period whose dates overlap the candidate range.
///
/// Two ranges overlap when `existing.start <= candidate.end` and
/// `existing.end >= candidate.start`. The caller excludes the period being
/// edited from `existing`.
pub fn find_overlap<'a>(
    candidate_start: Date,
    candidate_end: Date,
    existing: &'a [PeriodSpan],
) -> Option<&'a PeriodSpan> {
    existing
        .iter()
        .find(|span| span.start <= candidate_end && span.end >= candidate_start)
}

/// Finds the days left uncovered between the candidate and its neighbours.
///
/// The candidate is inserted into the start-sorted list and each adjacent
/// pair is checked: a pair leaves a gap when more than zero days lie strictly
/// between the first range's end and the second's start. Gaps are a warning,
/// not an error.
pub fn find_gaps(
    candidate_start: Date,
    candidate_end: Date,
    existing: &[PeriodSpan],
) -> Vec<(Date, Date)> {
    let mut ranges: Vec<(Date, Date)> = existing.iter().map(|span| (span.start, span.end)).collect();
    ranges.push((candidate_start, candidate_end));
    ranges.sort_by_key(|(start, _)| *start);

    ranges
        .windows(2)
        .filter_map(|pair| {
            let (_, current_end) = pair[0];
            let (next_start, _) = pair[1];
            let gap_days = (next_start - current_end).whole_days() - 1;

            (gap_days > 0)
                .then(|| (current_end + Duration::days(1), next_start - Duration::days(1)))
        })
        .collect()
}

/// Suggests default dates for a new period: the day after the latest
/// existing end date (or the first day of the current month when there are
/// no periods), spanning 30 days.
pub fn suggest_range(latest_end: Option<Date>, today: Date) -> (Date, Date) {
    let start = match latest_end {
        Some(end) => end + Duration::days(1),
        None => today.replace_day(1).unwrap_or(today),
    };

    (start, start + Duration::days(30))
}
