use crate::types::Result;
use dialoguer::{theme::ColorfulTheme, Input};

const EXIT_WORDS: [&str; 4] = ["exit", "quit", "sair", "tchau"];

/// Read one chat turn from the terminal. Empty input is returned as-is.
pub fn ask_chat_turn(prompt: &str) -> Result<String> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(input)
}

pub fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim();
    EXIT_WORDS.iter().any(|word| trimmed.eq_ignore_ascii_case(word))
}
