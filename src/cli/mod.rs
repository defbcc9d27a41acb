//! # Command-Line Interface
//!
//! The `hbnb` console: a line-oriented interpreter over the object store.
//!
//! ## Commands
//!
//! | Command | Purpose | Example |
//! |---------|---------|---------|
//! | `create` | New instance with typed params | `create Place name="Loft" max_guest=4` |
//! | `show` | Print one instance | `show User <id>` |
//! | `destroy` | Delete one instance | `destroy User <id>` |
//! | `all` | Print all instances, optionally of one class | `all City` |
//! | `update` | Set a string attribute | `update User <id> first_name "Betty"` |
//! | `count` | Count instances of a class | `count State` |
//! | `help`, `quit`, `EOF` | Session control | `help create` |
//!
//! `<Class>.all()`, `<Class>.count()`, `<Class>.show(<id>)` and
//! `<Class>.destroy(<id>)` are accepted as dotted forms.
//!
//! With a terminal attached, input goes through a line editor with history
//! and tab completion. Piped input is read plainly and each command is
//! followed by the `(hbnb) ` marker.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for diagnostics on stderr:
//! ```bash
//! echo 'create User age=3' | hbnb --verbose
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and start a session.

mod app;
mod console;
mod dispatch;
mod editor;
mod help;
mod output;
mod words;

pub use app::{run, Cli};
pub use console::{BatchSource, Console, LineSource, BATCH_MARKER};
pub use dispatch::{parse_line, Control, Interpreter, UsageError};
pub use editor::{CommandCompleter, EditorSource};
pub use output::Output;
pub use words::{split_words, split_words_lenient, WordsError};
