// src/lib.rs
use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;

// --- Declare modules ---
mod catalog;
mod date_input;
mod storage;
mod store;

// --- Expose public types ---
pub use catalog::{
    Error as CatalogError, // Renamed from Error
    ExerciseCatalog,
    ListenerId,
};
pub use date_input::{parse_date, today_text, DateInput, DATE_FORMAT};
pub use storage::{
    Error as StorageError, // Renamed from Error
    Storage,
};
pub use store::{RecordId, SortOrder, Workout, WorkoutFilters, WorkoutRecord, WorkoutStore};

/// Everything that can go wrong in a service operation, flattened so a
/// presentation layer can match once and show one message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required field: {0}.")]
    MissingField(&'static str),
    #[error("No exercise selected.")]
    NoExerciseSelected,
    #[error("Exercise not found: {0}")]
    UnknownExercise(String),
    #[error("Invalid date '{0}'. Use format DD.MM.YYYY.")]
    InvalidDate(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Input for [`AppService::add_workout`], one field per entry widget.
/// `exercise` is `None` while nothing is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkoutDraft<'a> {
    pub date: &'a str,
    pub exercise: Option<&'a str>,
    pub reps: &'a str,
    pub sets: &'a str,
}

/// Current list-view filter inputs, kept verbatim as the user entered
/// them. Interpretation (trimming, date parsing) happens on every query,
/// so the view and the stored text never disagree.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub date_text: String,
    pub exercise: Option<String>,
}

impl FilterState {
    fn resolve(&self) -> WorkoutFilters<'_> {
        // An unparseable date filter is ignored, same as an empty field.
        let date = parse_date(self.date_text.trim());
        let exercise = self
            .exercise
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        WorkoutFilters { date, exercise }
    }
}

/// One application session: owns the exercise catalog, the workout store,
/// the persistence layer, and the view state (filters and the sort
/// toggle). Every presentation-layer operation goes through here, and
/// every successful mutation is written to disk before it returns.
#[derive(Debug)]
pub struct AppService {
    catalog: ExerciseCatalog,
    store: WorkoutStore,
    storage: Storage,
    filters: FilterState,
    next_sort: SortOrder,
}

impl AppService {
    /// Initializes the application service from the default data
    /// directory, loading both data files.
    /// # Errors
    /// Returns `anyhow::Error` if data-dir resolution or loading fails.
    pub fn initialize() -> Result<Self> {
        let storage = Storage::new().context("Failed to determine data directory")?;
        Self::with_storage(storage)
    }

    /// Initializes the service on explicit storage. Used by tests and
    /// embedders that manage their own data directory.
    /// # Errors
    /// Returns `anyhow::Error` if either data file exists but cannot be
    /// read or parsed.
    pub fn with_storage(storage: Storage) -> Result<Self> {
        let records = storage
            .load_workouts()
            .with_context(|| format!("Failed to load workouts from {:?}", storage.workouts_path()))?
            .unwrap_or_default();
        let names = storage.load_exercises().with_context(|| {
            format!("Failed to load exercises from {:?}", storage.exercises_path())
        })?;

        let store = WorkoutStore::from_records(records);
        let catalog = match names {
            Some(names) => ExerciseCatalog::from_names(names),
            None => ExerciseCatalog::new(),
        };
        log::info!(
            "Loaded {} workout(s) and {} exercise(s) from {:?}",
            store.len(),
            catalog.names().len(),
            storage.base_dir()
        );

        Ok(Self {
            catalog,
            store,
            storage,
            filters: FilterState::default(),
            next_sort: SortOrder::default(),
        })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.storage.base_dir()
    }

    // --- Workouts ---

    /// Validates a draft, appends the workout, and saves the log.
    /// Returns the new record's session id; the presentation layer treats
    /// it as the signal to clear the entry fields.
    /// # Errors
    /// - `Error::MissingField` if date or reps is empty after trimming.
    /// - `Error::NoExerciseSelected` if no exercise is selected.
    /// - `Error::UnknownExercise` if the selection is not in the catalog.
    /// - `Error::InvalidDate` if the date is not a real `DD.MM.YYYY` date.
    /// - `Error::Storage` if saving fails (the record stays in memory).
    pub fn add_workout(&mut self, draft: WorkoutDraft) -> Result<RecordId, Error> {
        let date = draft.date.trim();
        if date.is_empty() {
            return Err(Error::MissingField("date"));
        }
        let exercise = draft
            .exercise
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(Error::NoExerciseSelected)?;
        if !self.catalog.contains(exercise) {
            return Err(Error::UnknownExercise(exercise.to_string()));
        }
        let reps = draft.reps.trim();
        if reps.is_empty() {
            return Err(Error::MissingField("reps"));
        }
        if parse_date(date).is_none() {
            return Err(Error::InvalidDate(date.to_string()));
        }

        let id = self.store.add(WorkoutRecord {
            date: date.to_string(),
            exercise: exercise.to_string(),
            reps: reps.to_string(),
            sets: draft.sets.trim().to_string(),
        });
        self.save_workouts()?;
        Ok(id)
    }

    /// Deletes a workout by session id and saves the log. An unknown id is
    /// a no-op reported as `Ok(None)`, not an error.
    /// # Errors
    /// Returns `Error::Storage` if saving fails (the deletion stands in
    /// memory).
    pub fn delete_workout(&mut self, id: RecordId) -> Result<Option<Workout>, Error> {
        let Some(removed) = self.store.remove(id) else {
            return Ok(None);
        };
        self.save_workouts()?;
        Ok(Some(removed))
    }

    /// Applies the pending sort order to the workout list (ascending on
    /// the first call), then flips the toggle. Returns the order that was
    /// applied so the UI can label the control. The reordering is held in
    /// memory only; it reaches disk with the next write-through.
    pub fn sort_workouts(&mut self) -> SortOrder {
        let applied = self.next_sort;
        self.store.sort_by_date(applied);
        self.next_sort = applied.toggled();
        log::debug!("Sorted workouts by date, {applied}");
        applied
    }

    /// The order the next [`sort_workouts`](Self::sort_workouts) call
    /// will apply.
    #[must_use]
    pub fn pending_sort(&self) -> SortOrder {
        self.next_sort
    }

    /// Stores the filter inputs and returns the matching workouts in
    /// current display order. An unparseable date text is ignored, same
    /// as an empty one; an empty or absent exercise means no exercise
    /// filter; both filters combine with AND.
    pub fn filter_workouts(&mut self, date_text: &str, exercise: Option<&str>) -> Vec<&Workout> {
        self.filters = FilterState {
            date_text: date_text.to_string(),
            exercise: exercise.map(ToString::to_string),
        };
        self.visible_workouts()
    }

    /// Clears both filters and returns the full, still currently sorted,
    /// list.
    pub fn reset_filters(&mut self) -> Vec<&Workout> {
        self.filters = FilterState::default();
        self.visible_workouts()
    }

    /// The workouts matching the current filter state, recomputed on
    /// demand. This is the list a view should display.
    #[must_use]
    pub fn visible_workouts(&self) -> Vec<&Workout> {
        self.store.filtered(self.filters.resolve())
    }

    /// Every logged workout in current display order, filters ignored.
    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        self.store.all()
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    // --- Exercises ---

    /// Adds an exercise to the catalog and saves it.
    /// # Errors
    /// - `Error::Catalog` for an empty, reserved, or duplicate name.
    /// - `Error::Storage` if saving fails (the addition stands in memory).
    pub fn add_exercise(&mut self, name: &str) -> Result<(), Error> {
        self.catalog.add(name)?;
        self.save_exercises()?;
        Ok(())
    }

    /// Removes an exercise by exact name and saves the catalog. Returns
    /// whether anything was removed; the catch-all entry and unknown
    /// names report `Ok(false)` without touching the file. Logged
    /// workouts keep the removed name.
    /// # Errors
    /// Returns `Error::Storage` if saving fails (the removal stands in
    /// memory).
    pub fn delete_exercise(&mut self, name: &str) -> Result<bool, Error> {
        if !self.catalog.remove(name) {
            return Ok(false);
        }
        let orphaned = self
            .store
            .all()
            .iter()
            .filter(|w| w.exercise == name)
            .count();
        if orphaned > 0 {
            log::warn!(
                "Removed exercise '{name}' while {orphaned} logged workout(s) still reference it"
            );
        }
        self.save_exercises()?;
        Ok(true)
    }

    /// All catalog names in display order, catch-all entry last. This is
    /// the option list for an exercise selector.
    #[must_use]
    pub fn exercises(&self) -> &[String] {
        self.catalog.names()
    }

    /// Catalog names the user may delete (everything but the catch-all
    /// entry).
    #[must_use]
    pub fn manageable_exercises(&self) -> Vec<&str> {
        self.catalog.manageable().collect()
    }

    /// Registers a listener for catalog changes; see
    /// [`ExerciseCatalog::subscribe`].
    pub fn subscribe_catalog<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&[String]) + 'static,
    {
        self.catalog.subscribe(listener)
    }

    pub fn unsubscribe_catalog(&mut self, id: ListenerId) -> bool {
        self.catalog.unsubscribe(id)
    }

    // --- Persistence ---

    fn save_workouts(&self) -> Result<(), Error> {
        let records = self.store.records();
        self.storage.save_workouts(&records)?;
        Ok(())
    }

    fn save_exercises(&self) -> Result<(), Error> {
        self.storage.save_exercises(self.catalog.names())?;
        Ok(())
    }
}
