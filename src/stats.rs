use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::models::LogEntry;

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total_minutes: u64,
    pub working_days: usize,
    pub streak: u32,
}

pub fn project_stats(entries: &[LogEntry], project: &str) -> ProjectStats {
    project_stats_at(Utc::now().date_naive(), entries, project)
}

/// Stats over the entries belonging to one project. `today` anchors the
/// streak walk; the caller injects it so the calculation stays
/// deterministic.
pub fn project_stats_at(today: NaiveDate, entries: &[LogEntry], project: &str) -> ProjectStats {
    let project = project.trim();
    let filtered: Vec<&LogEntry> = entries
        .iter()
        .filter(|entry| entry.project.trim() == project)
        .collect();

    let total_minutes = filtered
        .iter()
        .map(|entry| entry.work_time.total_minutes())
        .sum();

    let days: BTreeSet<NaiveDate> = filtered.iter().map(|entry| entry.day()).collect();

    // Walk backward from today; the first missing day ends the streak, so
    // a project without an entry today scores zero regardless of history.
    let mut streak = 0;
    let mut cursor = today;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    ProjectStats {
        total_minutes,
        working_days: days.len(),
        streak,
    }
}

/// Distinct trimmed project labels, insertion-ordered by first appearance.
pub fn project_names(entries: &[LogEntry]) -> Vec<String> {
    let mut seen = Vec::new();
    for entry in entries {
        let name = entry.project.trim();
        if !name.is_empty() && !seen.iter().any(|known| known == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeUnit, WorkTime};
    use chrono::{Duration, TimeZone, Utc};

    fn entry_on(day_offset: i64, project: &str, work_time: WorkTime) -> LogEntry {
        let base = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        LogEntry {
            id: format!("{project}-{day_offset}"),
            created_at: base - Duration::days(day_offset),
            project: project.to_string(),
            work_time,
            gains: "g".repeat(30),
            challenges: "c".repeat(30),
            plan: "p".repeat(30),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn minutes(amount: u32) -> WorkTime {
        WorkTime { amount, unit: TimeUnit::Minutes }
    }

    #[test]
    fn empty_list_scores_zero_everywhere() {
        let stats = project_stats_at(today(), &[], "Alpha");
        assert_eq!(stats, ProjectStats::default());
    }

    #[test]
    fn three_consecutive_days_ending_today_is_streak_three() {
        let entries = vec![
            entry_on(0, "Alpha", minutes(30)),
            entry_on(1, "Alpha", minutes(30)),
            entry_on(2, "Alpha", minutes(30)),
        ];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.working_days, 3);
    }

    #[test]
    fn missing_today_breaks_the_streak() {
        let entries = vec![
            entry_on(1, "Alpha", minutes(30)),
            entry_on(2, "Alpha", minutes(30)),
        ];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.working_days, 2);
    }

    #[test]
    fn gap_behind_today_stops_the_walk() {
        let entries = vec![
            entry_on(0, "Alpha", minutes(30)),
            entry_on(1, "Alpha", minutes(30)),
            entry_on(3, "Alpha", minutes(30)),
        ];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.working_days, 3);
    }

    #[test]
    fn mixed_units_sum_in_minutes() {
        let entries = vec![
            entry_on(0, "Alpha", WorkTime { amount: 2, unit: TimeUnit::Hours }),
            entry_on(1, "Alpha", minutes(15)),
        ];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.total_minutes, 135);
    }

    #[test]
    fn other_projects_are_excluded() {
        let entries = vec![
            entry_on(0, "Alpha", minutes(30)),
            entry_on(0, "Beta", minutes(45)),
        ];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.total_minutes, 30);
        assert_eq!(stats.working_days, 1);
    }

    #[test]
    fn project_match_ignores_surrounding_whitespace() {
        let entries = vec![entry_on(0, "  Alpha ", minutes(30))];
        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.total_minutes, 30);
    }

    #[test]
    fn two_entries_same_day_count_one_working_day() {
        let mut late = entry_on(0, "Alpha", minutes(30));
        late.id = "alpha-late".into();
        late.created_at += Duration::hours(5);
        let entries = vec![entry_on(0, "Alpha", minutes(30)), late];

        let stats = project_stats_at(today(), &entries, "Alpha");
        assert_eq!(stats.working_days, 1);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn project_names_are_distinct_and_trimmed() {
        let entries = vec![
            entry_on(0, "Alpha", minutes(30)),
            entry_on(1, " Alpha ", minutes(30)),
            entry_on(0, "Beta", minutes(30)),
            entry_on(0, "  ", minutes(30)),
        ];
        assert_eq!(project_names(&entries), vec!["Alpha".to_string(), "Beta".to_string()]);
    }
}
