//src/catalog.rs
use std::fmt;
use thiserror::Error;

const DEFAULT_EXERCISES: [&str; 4] = ["Squats", "Push-ups", "Running", "Other"];

#[derive(Error, Debug)]
pub enum Error {
    #[error("Exercise name cannot be empty.")]
    EmptyName,
    #[error("Exercise name '{0}' is reserved.")]
    Reserved(String),
    #[error("Exercise '{0}' already exists.")]
    Duplicate(String),
}

/// Handle returned by [`ExerciseCatalog::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&[String])>;

/// Ordered list of exercise names offered when logging a workout.
///
/// The list always ends with the catch-all entry [`Self::OTHER`] and
/// contains it exactly once; every mutation and load path maintains that.
/// User-added names keep their insertion order ahead of it.
pub struct ExerciseCatalog {
    names: Vec<String>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl ExerciseCatalog {
    /// Catch-all entry pinned to the end of the list. Cannot be added or
    /// removed by name.
    pub const OTHER: &'static str = "Other";

    #[must_use]
    pub fn new() -> Self {
        Self::from_names(DEFAULT_EXERCISES.iter().map(ToString::to_string).collect())
    }

    /// Builds a catalog from stored names, repairing the catch-all entry if
    /// the file was edited by hand: missing, duplicated, or misplaced
    /// occurrences are collapsed into a single trailing one.
    #[must_use]
    pub fn from_names(mut names: Vec<String>) -> Self {
        if Self::restore_sentinel(&mut names) {
            log::warn!(
                "Exercise list did not end with a single '{}' entry; repaired.",
                Self::OTHER
            );
        }
        Self {
            names,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    // True if a repair was needed.
    fn restore_sentinel(names: &mut Vec<String>) -> bool {
        let well_placed = names.last().map(String::as_str) == Some(Self::OTHER)
            && names.iter().filter(|n| n.as_str() == Self::OTHER).count() == 1;
        if well_placed {
            return false;
        }
        names.retain(|n| n != Self::OTHER);
        names.push(Self::OTHER.to_string());
        true
    }

    /// Adds a new exercise ahead of the catch-all entry. The name is
    /// trimmed first; surrounding whitespace never reaches the list.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyName` if the trimmed name is empty.
    /// - `Error::Reserved` if it matches the catch-all entry in any case.
    /// - `Error::Duplicate` if the exact name is already listed.
    pub fn add(&mut self, name: &str) -> Result<(), Error> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyName);
        }
        if trimmed.to_lowercase() == Self::OTHER.to_lowercase() {
            return Err(Error::Reserved(trimmed.to_string()));
        }
        if self.names.iter().any(|n| n == trimmed) {
            return Err(Error::Duplicate(trimmed.to_string()));
        }
        self.names.retain(|n| n != Self::OTHER);
        self.names.push(trimmed.to_string());
        self.names.push(Self::OTHER.to_string());
        self.notify();
        Ok(())
    }

    /// Removes an exercise by exact name. Returns whether anything was
    /// removed; the catch-all entry and unknown names are no-ops.
    pub fn remove(&mut self, name: &str) -> bool {
        if name == Self::OTHER {
            return false;
        }
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
            self.notify();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact-match membership test, catch-all entry included.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Names the user may remove, i.e. everything but the catch-all entry.
    pub fn manageable(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| *n != Self::OTHER)
    }

    /// Registers a listener called with the full name list after every
    /// mutation. Lets a presentation layer keep selection widgets in sync.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&[String]) + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let names = &self.names;
        for (_, listener) in &mut self.listeners {
            listener(names);
        }
    }
}

impl Default for ExerciseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExerciseCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseCatalog")
            .field("names", &self.names)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
