use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{EventState, Question};

/// Question lists read from a TOML seed file.
///
/// ```toml
/// [[round1_questions]]
/// title = "Off-by-One Error"
/// content = "def last(items): return items[len(items)]"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct QuestionSeed {
    #[serde(default)]
    pub round1_questions: Vec<Question>,
    #[serde(default)]
    pub round2_questions: Vec<Question>,
}

impl QuestionSeed {
    pub fn into_event_state(self) -> EventState {
        EventState::new(self.round1_questions, self.round2_questions)
    }
}

pub fn load_seed(path: &Path) -> anyhow::Result<QuestionSeed> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read question seed '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse question seed '{}'", path.display()))
}

/// State the server starts with when no seed file is configured.
pub fn default_event_state() -> EventState {
    EventState::new(default_round1_questions(), Vec::new())
}

fn default_round1_questions() -> Vec<Question> {
    vec![
        Question::new(
            "Infinite Loop",
            r#"def calculate_average_grade(grades):
    """Calculates the average of a list of grades."""
    if not grades:
        return 0
    total = sum(grades)
    # Error: Uses a fixed number (10) instead of the actual list length
    average = total / 10
    return average"#,
        ),
        Question::new(
            "Off-by-One Error",
            r#"def get_final_price(price):
    """Calculates final price with incorrect discount logic."""
    final_price = float(price)
    if final_price > 50:
        final_price *= 0.9
    if final_price > 100:
        final_price *= 0.8
    return round(final_price, 2)"#,
        ),
        Question::new(
            "Null Pointer Exception",
            r#"def is_in_range(number, min_val, max_val):
    """Checks if a number is between min and max, inclusively."""
    return number > min_val and number < max_val"#,
        ),
        Question::new(
            "Incorrect API Endpoint",
            r#"def get_welcome_message(user_dict, is_logged_in):
    if user_dict:
        return f"Welcome, {user_dict['name']}!"
    else:
        return "Welcome, Guest!""#,
        ),
        Question::new(
            "CSS Z-Index Issue",
            r#"def count_odd_numbers(numbers):
    count = 0
    for num in numbers:
        count += 1
    return count"#,
        ),
    ]
}

#[cfg(test)]
#[path = "tests/seed_tests.rs"]
mod tests;
