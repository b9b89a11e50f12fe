//! Built-in exercise library, embedded at compile time from
//! `exercises.toml`.

use serde::{Deserialize, Serialize};

use super::model::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanics {
    Compound,
    Isolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub mechanics: Mechanics,
}

#[derive(Debug, Deserialize)]
struct ExerciseLibrary {
    exercises: Vec<ExerciseEntry>,
}

static EXERCISES_TOML: &str = include_str!("exercises.toml");

/// Load the whole library.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed, which the tests below rule out.
pub fn load_exercises() -> Vec<ExerciseEntry> {
    let lib: ExerciseLibrary =
        toml::from_str(EXERCISES_TOML).expect("embedded exercises.toml is invalid");
    lib.exercises
}

/// Exercises filtered by category and/or difficulty.
pub fn find_exercises(category: Option<&str>, difficulty: Option<Difficulty>) -> Vec<ExerciseEntry> {
    load_exercises()
        .into_iter()
        .filter(|e| category.is_none_or(|c| e.category.eq_ignore_ascii_case(c)))
        .filter(|e| difficulty.is_none_or(|d| e.difficulty == d))
        .collect()
}

/// Distinct categories, sorted.
pub fn exercise_categories() -> Vec<String> {
    let mut cats: Vec<String> = load_exercises().into_iter().map(|e| e.category).collect();
    cats.sort();
    cats.dedup();
    cats
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn embedded_library_loads_with_unique_ids() {
        let all = load_exercises();
        assert!(all.len() >= 20);
        let ids: HashSet<&str> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn filter_by_category_and_difficulty() {
        let legs = find_exercises(Some("LEGS"), Some(Difficulty::Beginner));
        assert!(!legs.is_empty());
        assert!(legs.iter().all(|e| e.category == "legs"));
        assert!(legs.iter().all(|e| e.difficulty == Difficulty::Beginner));
    }

    #[test]
    fn categories_are_sorted_and_distinct() {
        let cats = exercise_categories();
        let mut sorted = cats.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(cats, sorted);
        assert!(cats.contains(&"cardio".to_string()));
    }
}
