//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the line editor
pub fn prompt(user_id: i64) -> String {
    format!("#{}> ", user_id)
}

/// Redisplay the prompt after printing an event
pub fn redisplay_prompt(user_id: i64) {
    print!("{}", prompt(user_id));
    std::io::stdout().flush().ok();
}
