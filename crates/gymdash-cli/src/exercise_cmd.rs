use gymdash_core::catalog::{exercise_categories, find_exercises};

use crate::ExerciseCommands;

pub fn run_exercise_command(command: ExerciseCommands) {
    match command {
        ExerciseCommands::List {
            category,
            difficulty,
        } => {
            let found = find_exercises(category.as_deref(), difficulty);
            if found.is_empty() {
                println!(
                    "No exercises found. Categories: {}",
                    exercise_categories().join(", ")
                );
                return;
            }
            let name_w = found.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);
            println!("{:<name_w$}  {:<10}  {:<12}  MECHANICS", "NAME", "CATEGORY", "DIFFICULTY");
            for e in &found {
                let mechanics = match e.mechanics {
                    gymdash_core::catalog::Mechanics::Compound => "compound",
                    gymdash_core::catalog::Mechanics::Isolation => "isolation",
                };
                println!(
                    "{:<name_w$}  {:<10}  {:<12}  {mechanics}",
                    e.name,
                    e.category,
                    e.difficulty.as_str(),
                );
            }
        }
    }
}
