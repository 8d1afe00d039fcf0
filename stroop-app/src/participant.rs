//! Participant metadata from flags, or asked for on the terminal.

use std::io::{self, BufRead, Write};

use stroop_core::{Gender, Participant};
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("participant information was not provided")]
    Cancelled,

    #[error("terminal io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = PromptError> = std::result::Result<T, E>;

pub fn resolve(cli: &Cli) -> Result<Participant> {
    match &cli.participant_id {
        Some(id) => Ok(Participant::new(
            id.clone(),
            cli.age.clone().unwrap_or_default(),
            cli.gender.unwrap_or_default(),
        )),
        None => {
            let stdin = io::stdin();
            prompt(&mut stdin.lock(), &mut io::stdout(), cli.study.title())
        }
    }
}

/// Asks for ID, age and gender. End of input cancels.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, title: &str) -> Result<Participant> {
    writeln!(output, "{title}: participant information")?;
    let id = ask(input, output, "Participant ID")?;
    let age = ask(input, output, "Age")?;

    for (i, g) in Gender::ALL.iter().enumerate() {
        writeln!(output, "  {}) {g}", i + 1)?;
    }
    let gender = loop {
        let answer = ask(input, output, "Gender [1]")?;
        if answer.is_empty() {
            break Gender::default();
        }
        let by_number = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Gender::ALL.get(i).copied());
        match by_number.map(Ok).unwrap_or_else(|| answer.parse::<Gender>()) {
            Ok(gender) => break gender,
            Err(err) => writeln!(output, "{err}")?,
        }
    };

    Ok(Participant::new(id, age, gender))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::Cancelled);
    }
    Ok(line.trim().to_string())
}
