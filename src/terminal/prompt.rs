use std::io::{self, BufRead, IsTerminal};

use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

/// Describes one value an operation needs from the operator.
#[derive(Debug, Clone)]
pub struct Field {
    label: String,
    default: Option<String>,
}

impl Field {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: None,
        }
    }

    /// Value used when the operator submits an empty answer.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// How fields are asked for. Operations only ever talk to this trait, so they
/// can be driven by a terminal or by a canned script.
pub trait Prompter {
    fn text(&mut self, field: &Field) -> io::Result<String>;

    /// Hidden input, used for private keys.
    fn secret(&mut self, label: &str) -> io::Result<String>;

    fn confirm(&mut self, label: &str, default: bool) -> io::Result<bool>;

    /// Blocks until the operator acknowledges the last outcome.
    fn pause(&mut self) -> io::Result<()>;

    fn is_interactive(&self) -> bool;
}

/// Prompts through dialoguer when a person sits at the terminal. With
/// redirected input it reads plain lines from stdin instead, so a closed
/// stream ends the session rather than answering empty forever.
pub struct ConsolePrompter {
    theme: ColorfulTheme,
    term: Term,
    attended: bool,
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        let term = Term::stderr();
        let attended = term.features().is_attended() && io::stdin().is_terminal();

        Self {
            theme: ColorfulTheme::default(),
            term,
            attended,
        }
    }
}

impl ConsolePrompter {
    fn read_plain(&self, label: &str) -> io::Result<String> {
        self.term.write_str(&format!("{}: ", label))?;
        read_answer(&mut io::stdin().lock())
    }
}

impl Prompter for ConsolePrompter {
    fn text(&mut self, field: &Field) -> io::Result<String> {
        if !self.attended {
            let answer = self.read_plain(field.label())?;
            return Ok(answer_or_default(answer, field));
        }

        let mut input = Input::<String>::with_theme(&self.theme);
        input.with_prompt(field.label()).allow_empty(true);

        if let Some(default) = field.default_value() {
            input.default(default.to_owned());
        }

        input.interact_text()
    }

    fn secret(&mut self, label: &str) -> io::Result<String> {
        if !self.attended {
            return self.read_plain(label);
        }

        Password::with_theme(&self.theme)
            .with_prompt(label)
            .interact()
    }

    fn confirm(&mut self, label: &str, default: bool) -> io::Result<bool> {
        if !self.attended {
            let answer = self.read_plain(&format!("{} [y/n]", label))?;
            return Ok(parse_confirm(&answer, default));
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact()
    }

    fn pause(&mut self) -> io::Result<()> {
        if !self.attended {
            return Ok(());
        }

        self.term.write_str("Press any key to continue...")?;
        self.term.read_key()?;
        self.term.clear_line()
    }

    fn is_interactive(&self) -> bool {
        self.attended
    }
}

/// Reads one line without its terminator. A drained reader is `UnexpectedEof`.
fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();

    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input stream closed",
        ));
    }

    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_owned())
}

fn answer_or_default(answer: String, field: &Field) -> String {
    match field.default_value() {
        Some(default) if answer.trim().is_empty() => default.to_owned(),
        _ => answer,
    }
}

fn parse_confirm(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

#[cfg(test)]
pub use scripted::ScriptedPrompter;
