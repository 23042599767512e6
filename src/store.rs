//src/store.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

use crate::date_input::parse_date;

/// One logged workout as it appears on disk.
///
/// Field names follow the file format: the set count is stored under the
/// historical key `goal`, and missing keys load as empty strings so
/// hand-edited files still open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WorkoutRecord {
    pub date: String,
    pub exercise: String,
    pub reps: String,
    #[serde(rename = "goal")]
    pub sets: String,
}

/// Identifies a workout within one session. Ids are never persisted and
/// restart from zero on every load, so records with identical content stay
/// individually addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

#[derive(Debug, Clone)]
pub struct Workout {
    pub id: RecordId,
    pub date: String,
    pub exercise: String,
    pub reps: String,
    pub sets: String,
}

impl Workout {
    /// The workout's date as a calendar value, or `None` if the stored text
    /// does not parse (possible in hand-edited files).
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Copies the workout back into its on-disk shape.
    #[must_use]
    pub fn record(&self) -> WorkoutRecord {
        WorkoutRecord {
            date: self.date.clone(),
            exercise: self.exercise.clone(),
            reps: self.reps.clone(),
            sets: self.sets.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// Criteria for listing workouts. `None` fields match everything; set
/// fields must all match (logical AND).
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkoutFilters<'a> {
    /// Matches workouts whose stored date parses to exactly this day.
    pub date: Option<NaiveDate>,
    /// Case-insensitive exercise name match.
    pub exercise: Option<&'a str>,
}

impl WorkoutFilters<'_> {
    #[must_use]
    pub fn matches(&self, workout: &Workout) -> bool {
        if let Some(date) = self.date {
            if workout.parsed_date() != Some(date) {
                return false;
            }
        }
        if let Some(exercise) = self.exercise {
            if workout.exercise.to_lowercase() != exercise.to_lowercase() {
                return false;
            }
        }
        true
    }
}

/// In-memory list of logged workouts, in display order.
///
/// The order is exactly what a view should show: loads and adds append,
/// [`sort_by_date`](Self::sort_by_date) rearranges in place, and equal
/// dates keep their relative order through any number of re-sorts.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    next_id: u64,
}

impl WorkoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from persisted records, assigning fresh session ids
    /// in file order.
    #[must_use]
    pub fn from_records(records: Vec<WorkoutRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.add(record);
        }
        store
    }

    /// Appends a workout and returns its session id.
    pub fn add(&mut self, record: WorkoutRecord) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.workouts.push(Workout {
            id,
            date: record.date,
            exercise: record.exercise,
            reps: record.reps,
            sets: record.sets,
        });
        id
    }

    /// Removes the workout with the given id, returning it. Unknown ids
    /// are a no-op.
    pub fn remove(&mut self, id: RecordId) -> Option<Workout> {
        let pos = self.workouts.iter().position(|w| w.id == id)?;
        Some(self.workouts.remove(pos))
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Reorders the list by date. The sort is stable, so workouts sharing a
    /// date keep their relative order in both directions. A date that does
    /// not parse sorts as the earliest possible date.
    pub fn sort_by_date(&mut self, order: SortOrder) {
        match order {
            SortOrder::Ascending => self.workouts.sort_by_cached_key(Workout::parsed_date),
            SortOrder::Descending => self
                .workouts
                .sort_by_cached_key(|w| Reverse(w.parsed_date())),
        }
    }

    /// Lists workouts matching the filters, in current display order.
    #[must_use]
    pub fn filtered(&self, filters: WorkoutFilters) -> Vec<&Workout> {
        self.workouts.iter().filter(|w| filters.matches(w)).collect()
    }

    #[must_use]
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    /// Snapshot of every workout in its on-disk shape, for saving.
    #[must_use]
    pub fn records(&self) -> Vec<WorkoutRecord> {
        self.workouts.iter().map(Workout::record).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, exercise: &str, reps: &str) -> WorkoutRecord {
        WorkoutRecord {
            date: date.to_string(),
            exercise: exercise.to_string(),
            reps: reps.to_string(),
            sets: "3".to_string(),
        }
    }

    fn reps_in_order(store: &WorkoutStore) -> Vec<&str> {
        store.all().iter().map(|w| w.reps.as_str()).collect()
    }

    #[test]
    fn test_from_records_keeps_file_order() {
        let store = WorkoutStore::from_records(vec![
            record("16.03.2024", "Squats", "a"),
            record("15.03.2024", "Running", "b"),
        ]);
        assert_eq!(reps_in_order(&store), ["a", "b"]);
    }

    #[test]
    fn test_add_and_get() {
        let mut store = WorkoutStore::new();
        let id = store.add(record("15.03.2024", "Squats", "10"));
        let workout = store.get(id).unwrap();
        assert_eq!(workout.exercise, "Squats");
        assert_eq!(workout.sets, "3");
    }

    #[test]
    fn test_remove_is_single_shot() {
        let mut store = WorkoutStore::new();
        let id = store.add(record("15.03.2024", "Squats", "10"));
        assert_eq!(store.remove(id).unwrap().reps, "10");
        assert!(store.remove(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_identical_records_have_distinct_ids() {
        let mut store = WorkoutStore::new();
        let first = store.add(record("15.03.2024", "Squats", "10"));
        let second = store.add(record("15.03.2024", "Squats", "10"));
        assert_ne!(first, second);

        store.remove(first);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id, second);
    }

    #[test]
    fn test_sort_ascending_then_descending() {
        let mut store = WorkoutStore::from_records(vec![
            record("16.03.2024", "Squats", "mid"),
            record("01.01.2025", "Squats", "late"),
            record("15.03.2024", "Squats", "early"),
        ]);

        store.sort_by_date(SortOrder::Ascending);
        assert_eq!(reps_in_order(&store), ["early", "mid", "late"]);

        store.sort_by_date(SortOrder::Descending);
        assert_eq!(reps_in_order(&store), ["late", "mid", "early"]);
    }

    #[test]
    fn test_sort_keeps_equal_dates_in_insertion_order() {
        let mut store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Squats", "first"),
            record("15.03.2024", "Running", "second"),
            record("14.03.2024", "Squats", "older"),
            record("15.03.2024", "Push-ups", "third"),
        ]);

        store.sort_by_date(SortOrder::Ascending);
        assert_eq!(reps_in_order(&store), ["older", "first", "second", "third"]);

        // Stable in reverse too: the equal-date block does not flip.
        store.sort_by_date(SortOrder::Descending);
        assert_eq!(reps_in_order(&store), ["first", "second", "third", "older"]);
    }

    #[test]
    fn test_unparseable_dates_sort_as_earliest() {
        let mut store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Squats", "valid"),
            record("not a date", "Squats", "broken"),
        ]);

        store.sort_by_date(SortOrder::Ascending);
        assert_eq!(reps_in_order(&store), ["broken", "valid"]);

        store.sort_by_date(SortOrder::Descending);
        assert_eq!(reps_in_order(&store), ["valid", "broken"]);
    }

    #[test]
    fn test_filter_by_date_uses_parsed_value() {
        let store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Squats", "padded"),
            record("15.3.2024", "Running", "unpadded"),
            record("16.03.2024", "Squats", "other day"),
        ]);

        let filters = WorkoutFilters {
            date: parse_date("15.03.2024"),
            ..Default::default()
        };
        let matched = store.filtered(filters);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].reps, "padded");
        assert_eq!(matched[1].reps, "unpadded");
    }

    #[test]
    fn test_filter_by_exercise_ignores_case() {
        let store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Running", "yes"),
            record("15.03.2024", "Squats", "no"),
        ]);

        let filters = WorkoutFilters {
            exercise: Some("running"),
            ..Default::default()
        };
        let matched = store.filtered(filters);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].reps, "yes");
    }

    #[test]
    fn test_filters_combine_with_and() {
        let store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Running", "match"),
            record("15.03.2024", "Squats", "wrong exercise"),
            record("16.03.2024", "Running", "wrong day"),
        ]);

        let filters = WorkoutFilters {
            date: parse_date("15.03.2024"),
            exercise: Some("RUNNING"),
        };
        let matched = store.filtered(filters);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].reps, "match");
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let store = WorkoutStore::from_records(vec![
            record("15.03.2024", "Running", "a"),
            record("not a date", "Squats", "b"),
        ]);
        assert_eq!(store.filtered(WorkoutFilters::default()).len(), 2);
    }

    #[test]
    fn test_records_round_trip_shape() {
        let original = vec![
            record("15.03.2024", "Squats", "10"),
            record("16.03.2024", "Running", "25"),
        ];
        let store = WorkoutStore::from_records(original.clone());
        assert_eq!(store.records(), original);
    }
}
