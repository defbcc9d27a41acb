//! Terminal line editing
//!
//! Interactive sessions read through `rustyline`, which provides history
//! and tab completion of command names, class names and dotted methods.

use anyhow::{Context, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::Editor;

use super::console::LineSource;
use super::help;

/// Commands whose first argument is a class name
const CLASS_COMMANDS: &[&str] = &["all", "count", "create", "destroy", "show", "update"];

/// Methods accepted after `<Class>.`
const DOTTED_METHODS: &[&str] = &["all()", "count()", "destroy(", "show("];

/// Completion of console words
pub struct CommandCompleter {
    classes: Vec<&'static str>,
}

impl CommandCompleter {
    pub fn new(classes: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Returns the start of the word being completed and its candidates
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        let start = head
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &head[start..];
        let previous: Vec<&str> = head[..start].split_whitespace().collect();

        match previous.as_slice() {
            [] => match word.split_once('.') {
                Some((class, method)) if self.classes.contains(&class) => {
                    (start + class.len() + 1, matching(DOTTED_METHODS.iter().copied(), method))
                }
                Some(_) => (start, Vec::new()),
                None => {
                    let mut found = matching(help::TOPICS.iter().map(|(name, _)| *name), word);
                    found.extend(matching(self.classes.iter().copied(), word));
                    (start, found)
                }
            },
            ["help"] => (start, matching(help::TOPICS.iter().map(|(name, _)| *name), word)),
            [command] if CLASS_COMMANDS.contains(command) => {
                (start, matching(self.classes.iter().copied(), word))
            }
            _ => (start, Vec::new()),
        }
    }
}

fn matching<'a>(items: impl IntoIterator<Item = &'a str>, prefix: &str) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| item.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, found) = self.candidates(line, pos);
        let pairs = found
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl rustyline::Helper for CommandCompleter {}

/// Terminal input with history and completion
pub struct EditorSource {
    editor: Editor<CommandCompleter, DefaultHistory>,
}

impl EditorSource {
    pub fn new(completer: CommandCompleter) -> Result<Self> {
        let mut editor = Editor::new().context("Failed to initialize line editor")?;
        editor.set_helper(Some(completer));
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .context("Failed to record history")?;
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line only
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e).context("Failed to read console input"),
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }
}
