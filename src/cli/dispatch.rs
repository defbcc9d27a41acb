//! Command dispatch
//!
//! Interprets one console line at a time. Named commands are resolved by
//! their leading identifier; anything else goes through the dotted
//! `Class.method(arg)` fallback.

use std::io::Write;

use anyhow::Result;
use thiserror::Error;

use super::help;
use super::output::Output;
use super::words::split_words_lenient;
use crate::domain::{apply_params, quote, Applied, AttrValue, Instance, ObjectKey};
use crate::storage::Storage;

/// User-facing command errors, printed verbatim
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    ClassDoesNotExist,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstanceFound,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,

    #[error("** invalid command **")]
    InvalidCommand,
}

/// What the shell loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Eof,
}

/// Splits a line into its command word and argument
///
/// The command word is the leading run of ASCII letters, digits and `_`;
/// a leading `?` stands for `help`.
pub fn parse_line(line: &str) -> (&str, &str) {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('?') {
        return ("help", rest.trim());
    }

    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    (&line[..end], line[end..].trim())
}

/// Command interpreter that owns the storage handle
pub struct Interpreter {
    storage: Storage,
}

impl Interpreter {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Executes one line
    ///
    /// Usage errors are printed and never returned; an `Err` means output
    /// or storage failed and the session cannot go on.
    pub fn onecmd<W: Write>(&mut self, line: &str, out: &mut Output<W>) -> Result<Control> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Control::Continue);
        }

        let (command, arg) = parse_line(line);
        out.verbose_ctx("dispatch", &format!("command={:?} arg={:?}", command, arg));

        match command {
            "create" => self.do_create(arg, out)?,
            "show" => self.do_show(arg, out)?,
            "destroy" => self.do_destroy(arg, out)?,
            "all" => self.do_all(arg, out)?,
            "update" => self.do_update(arg, out)?,
            "count" => self.do_count(arg, out)?,
            "help" => self.do_help(arg, out)?,
            "quit" => return Ok(Control::Quit),
            "EOF" => {
                out.line("")?;
                return Ok(Control::Eof);
            }
            _ => self.default(line, out)?,
        }

        Ok(Control::Continue)
    }

    /// Checks a class name argument against the registry
    fn require_class<'a>(&self, class_name: Option<&'a str>) -> Result<&'a str, UsageError> {
        let class_name = class_name.ok_or(UsageError::ClassNameMissing)?;
        if !self.storage.registry().contains(class_name) {
            return Err(UsageError::ClassDoesNotExist);
        }
        Ok(class_name)
    }

    /// Resolves `<class> <id>` arguments to the key of a stored instance
    fn require_instance(&self, args: &[&str]) -> Result<ObjectKey, UsageError> {
        let class_name = self.require_class(args.first().copied())?;
        let id = args.get(1).ok_or(UsageError::InstanceIdMissing)?;

        let key = ObjectKey::new(class_name, *id);
        if self.storage.get(&key).is_none() {
            return Err(UsageError::NoInstanceFound);
        }
        Ok(key)
    }

    fn do_create<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        let args = split_words_lenient(arg);
        let class_name = match self.require_class(args.first().map(String::as_str)) {
            Ok(class_name) => class_name,
            Err(e) => return Ok(out.line(e)?),
        };

        let class = match self.storage.registry().get(class_name) {
            Some(class) => *class,
            None => return Ok(out.line(UsageError::ClassDoesNotExist)?),
        };

        let mut instance = class.instantiate();
        for applied in apply_params(&mut instance, args[1..].iter().map(String::as_str)) {
            match applied {
                Applied::Set(name) => out.verbose_ctx("create", &format!("set {}", name)),
                Applied::Skipped(reason) => {
                    out.verbose_ctx("create", &format!("skipped parameter: {}", reason))
                }
            }
        }
        for violation in class.validate(&instance) {
            out.verbose_ctx(
                "create",
                &format!("{}.{}: {}", class.name, violation.field, violation.message),
            );
        }

        instance.touch();
        let id = instance.id().to_string();
        let key = self.storage.new_object(instance);
        self.storage.save()?;
        out.verbose_ctx("create", &format!("saved {}", key));

        out.line(id)?;
        Ok(())
    }

    fn do_show<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        let args: Vec<&str> = arg.split_whitespace().collect();
        match self.require_instance(&args) {
            Ok(key) => {
                if let Some(instance) = self.storage.get(&key) {
                    out.line(instance)?;
                }
            }
            Err(e) => out.line(e)?,
        }
        Ok(())
    }

    fn do_destroy<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        let args: Vec<&str> = arg.split_whitespace().collect();
        match self.require_instance(&args) {
            Ok(key) => {
                self.storage.delete(&key);
                self.storage.save()?;
                out.verbose_ctx("destroy", &format!("deleted {}", key));
            }
            Err(e) => out.line(e)?,
        }
        Ok(())
    }

    /// Lists string forms, each rendered as a quoted literal
    fn do_all<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        let literal = |instance: &Instance| quote(&instance.to_string());
        match arg.split_whitespace().next() {
            None => out.list(self.storage.all().values().map(literal))?,
            Some(class_name) => match self.require_class(Some(class_name)) {
                Ok(class_name) => out.list(self.storage.all_of(class_name).map(literal))?,
                Err(e) => out.line(e)?,
            },
        }
        Ok(())
    }

    fn do_update<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        let args = split_words_lenient(arg);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let key = match self.require_instance(&args) {
            Ok(key) => key,
            Err(e) => return Ok(out.line(e)?),
        };
        let name = match args.get(2) {
            Some(name) => *name,
            None => return Ok(out.line(UsageError::AttributeNameMissing)?),
        };
        let value = match args.get(3) {
            Some(value) => value.trim_matches('"'),
            None => return Ok(out.line(UsageError::ValueMissing)?),
        };

        let Some(instance) = self.storage.get_mut(&key) else {
            return Ok(out.line(UsageError::NoInstanceFound)?);
        };
        if let Err(e) = instance.set(name, AttrValue::from(value)) {
            out.verbose_ctx("update", &format!("{}: {}", key, e));
            return Ok(());
        }

        self.storage.save()?;
        out.verbose_ctx("update", &format!("{}.{} updated", key, name));
        Ok(())
    }

    /// Counts instances of a class
    ///
    /// An unknown class is reported but still counted, which yields 0.
    fn do_count<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        if !self.storage.registry().contains(arg) {
            out.line(UsageError::ClassDoesNotExist)?;
        }
        out.line(self.storage.count(arg))?;
        Ok(())
    }

    fn do_help<W: Write>(&mut self, arg: &str, out: &mut Output<W>) -> Result<()> {
        if arg.is_empty() {
            out.line(help::overview())?;
        } else {
            match help::topic(arg) {
                Some(text) => out.line(text)?,
                None => out.line(format!("*** No help on {}", arg))?,
            }
        }
        Ok(())
    }

    /// Handles `Class.method(arg)` lines
    ///
    /// A malformed line is reported, then dispatch is still attempted with
    /// whatever parts could be recovered.
    fn default<W: Write>(&mut self, line: &str, out: &mut Output<W>) -> Result<()> {
        let Some((class_name, call)) = line.split_once('.') else {
            // No method part, so there is nothing left to dispatch
            out.line(UsageError::InvalidCommand)?;
            return Ok(());
        };

        let (method, arg) = match call.split_once('(') {
            Some((method, rest)) => (method, rest.strip_suffix(')').unwrap_or(rest)),
            None => {
                out.line(UsageError::InvalidCommand)?;
                (call, "")
            }
        };

        out.verbose_ctx(
            "dispatch",
            &format!("dotted call class={:?} method={:?} arg={:?}", class_name, method, arg),
        );

        match method {
            "all" => self.do_all(class_name, out),
            "count" => self.do_count(class_name, out),
            "show" => self.do_show(&format!("{} {}", class_name, arg), out),
            "destroy" => self.do_destroy(&format!("{} {}", class_name, arg), out),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Registry;

    fn interpreter() -> Interpreter {
        Interpreter::new(Storage::in_memory(Registry::standard()))
    }

    /// Runs lines and returns everything printed
    fn run(interp: &mut Interpreter, lines: &[&str]) -> String {
        let mut out = Output::new(Vec::new(), false);
        for line in lines {
            interp.onecmd(line, &mut out).unwrap();
        }
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn create(interp: &mut Interpreter, line: &str) -> String {
        run(interp, &[line]).trim().to_string()
    }

    #[test]
    fn parse_line_splits_identifier() {
        assert_eq!(parse_line("create User a=1"), ("create", "User a=1"));
        assert_eq!(parse_line("  all  "), ("all", ""));
        assert_eq!(parse_line("User.count()"), ("User", ".count()"));
        assert_eq!(parse_line("?quit"), ("help", "quit"));
        assert_eq!(parse_line(".x"), ("", ".x"));
    }

    #[test]
    fn empty_line_does_nothing() {
        let mut interp = interpreter();
        create(&mut interp, "create User");

        let mut out = Output::new(Vec::new(), false);
        assert_eq!(interp.onecmd("", &mut out).unwrap(), Control::Continue);
        assert_eq!(interp.onecmd("   ", &mut out).unwrap(), Control::Continue);
        assert!(out.get_ref().is_empty());
        assert_eq!(interp.storage().count("User"), 1);
    }

    #[test]
    fn quit_and_eof() {
        let mut interp = interpreter();
        let mut out = Output::new(Vec::new(), false);
        assert_eq!(interp.onecmd("quit", &mut out).unwrap(), Control::Quit);
        assert!(out.get_ref().is_empty());
        assert_eq!(interp.onecmd("EOF", &mut out).unwrap(), Control::Eof);
        assert_eq!(out.get_ref().as_slice(), b"\n");
    }

    #[test]
    fn create_validation_order() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["create"]), "** class name missing **\n");
        assert_eq!(run(&mut interp, &["create Bogus"]), "** class doesn't exist **\n");
        assert!(interp.storage().all().is_empty());
    }

    #[test]
    fn create_then_show() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User email=\"a@b.c\" age=30 height=1.8");

        let shown = run(&mut interp, &[&format!("show User {}", id)]);
        assert!(shown.starts_with(&format!("[User] ({})", id)));
        assert!(shown.contains("\"email\": \"a@b.c\""));
        assert!(shown.contains("\"age\": 30"));
        assert!(shown.contains("\"height\": 1.8"));
    }

    #[test]
    fn create_swallows_malformed_params() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create Place junk name=Loft =5 id=0 max_guest=4");

        let key = ObjectKey::new("Place", &id);
        let place = interp.storage().get(&key).unwrap();
        assert_eq!(place.get("name"), Some(&AttrValue::from("Loft")));
        assert_eq!(place.get("max_guest"), Some(&AttrValue::Int(4)));
        assert_eq!(place.attributes().len(), 2);
    }

    #[test]
    fn create_keeps_underscores_in_quoted_value() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User name=\"Bob_Smith\"");

        let key = ObjectKey::new("User", &id);
        let user = interp.storage().get(&key).unwrap();
        assert_eq!(user.get("name"), Some(&AttrValue::from("Bob_Smith")));
    }

    #[test]
    fn create_increments_count() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["count City"]), "0\n");
        create(&mut interp, "create City name=Paris");
        assert_eq!(run(&mut interp, &["count City"]), "1\n");
    }

    #[test]
    fn show_validation_order() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["show"]), "** class name missing **\n");
        assert_eq!(run(&mut interp, &["show Bogus 123"]), "** class doesn't exist **\n");
        assert_eq!(run(&mut interp, &["show User"]), "** instance id missing **\n");
        assert_eq!(run(&mut interp, &["show User 123"]), "** no instance found **\n");
    }

    #[test]
    fn destroy_removes_instance() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create State name=CA");

        assert_eq!(run(&mut interp, &[&format!("destroy State {}", id)]), "");
        assert_eq!(
            run(&mut interp, &[&format!("show State {}", id)]),
            "** no instance found **\n"
        );
        assert_eq!(
            run(&mut interp, &[&format!("destroy State {}", id)]),
            "** no instance found **\n"
        );
    }

    #[test]
    fn destroy_validation_order() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["destroy"]), "** class name missing **\n");
        assert_eq!(run(&mut interp, &["destroy Bogus"]), "** class doesn't exist **\n");
        assert_eq!(run(&mut interp, &["destroy City"]), "** instance id missing **\n");
    }

    #[test]
    fn all_lists_and_filters() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["all"]), "[]\n");

        let user = create(&mut interp, "create User");
        let city = create(&mut interp, "create City");

        let everything = run(&mut interp, &["all"]);
        assert!(everything.contains(&user));
        assert!(everything.contains(&city));

        let users = run(&mut interp, &["all User"]);
        let user_form = interp
            .storage()
            .get(&ObjectKey::new("User", &user))
            .unwrap()
            .to_string();
        assert_eq!(users, format!("[{}]\n", quote(&user_form)));
        assert!(users.starts_with(&format!("[\"[User] ({}) {{\\\"id\\\": ", user)));
        assert!(!users.contains(&city));

        let city_form = interp
            .storage()
            .get(&ObjectKey::new("City", &city))
            .unwrap()
            .to_string();
        let mut expected = vec![quote(&city_form), quote(&user_form)];
        expected.sort_by_key(|item| !item.starts_with("\"[City]"));
        assert_eq!(everything, format!("[{}]\n", expected.join(", ")));

        assert_eq!(run(&mut interp, &["all Bogus"]), "** class doesn't exist **\n");
    }

    #[test]
    fn update_validation_order() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User");

        assert_eq!(run(&mut interp, &["update"]), "** class name missing **\n");
        assert_eq!(run(&mut interp, &["update Bogus"]), "** class doesn't exist **\n");
        assert_eq!(run(&mut interp, &["update User"]), "** instance id missing **\n");
        assert_eq!(run(&mut interp, &["update User nope"]), "** no instance found **\n");
        assert_eq!(
            run(&mut interp, &["update User nope first_name Bob"]),
            "** no instance found **\n"
        );
        assert_eq!(
            run(&mut interp, &[&format!("update User {}", id)]),
            "** attribute name missing **\n"
        );
        assert_eq!(
            run(&mut interp, &[&format!("update User {} first_name", id)]),
            "** value missing **\n"
        );
    }

    #[test]
    fn update_sets_string_value() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User");
        let key = ObjectKey::new("User", &id);

        run(&mut interp, &[&format!("update User {} first_name \"Betty Holberton\"", id)]);
        run(&mut interp, &[&format!("update User {} age 89", id)]);
        run(&mut interp, &[&format!("update User {} nick '\"B\"\"x\"'", id)]);

        let user = interp.storage().get(&key).unwrap();
        assert_eq!(user.get("first_name"), Some(&AttrValue::from("Betty Holberton")));
        assert_eq!(user.get("age"), Some(&AttrValue::from("89")));
        assert_eq!(user.get("nick"), Some(&AttrValue::from("B\"\"x")));
    }

    #[test]
    fn update_ignores_reserved_attributes() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User");

        assert_eq!(run(&mut interp, &[&format!("update User {} id 1", id)]), "");
        assert!(interp.storage().get(&ObjectKey::new("User", &id)).is_some());
    }

    #[test]
    fn update_on_missing_instance_leaves_storage_alone() {
        let mut interp = interpreter();
        create(&mut interp, "create User");
        let before = interp.storage().all().clone();

        run(&mut interp, &["update User missing name Bob"]);
        assert_eq!(interp.storage().all(), &before);
    }

    #[test]
    fn count_reports_unknown_class_then_counts() {
        let mut interp = interpreter();
        assert_eq!(
            run(&mut interp, &["count Bogus"]),
            "** class doesn't exist **\n0\n"
        );
        assert_eq!(run(&mut interp, &["count"]), "** class doesn't exist **\n0\n");
    }

    #[test]
    fn dotted_count_matches_named_count() {
        let mut interp = interpreter();
        create(&mut interp, "create City");
        create(&mut interp, "create City");

        assert_eq!(run(&mut interp, &["City.count()"]), run(&mut interp, &["count City"]));
        assert_eq!(run(&mut interp, &["Bogus.count()"]), run(&mut interp, &["count Bogus"]));
    }

    #[test]
    fn dotted_all_show_destroy() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create Amenity name=Wifi");

        assert_eq!(run(&mut interp, &["Amenity.all()"]), run(&mut interp, &["all Amenity"]));
        assert_eq!(
            run(&mut interp, &[&format!("Amenity.show({})", id)]),
            run(&mut interp, &[&format!("show Amenity {}", id)])
        );

        run(&mut interp, &[&format!("Amenity.destroy({})", id)]);
        assert_eq!(interp.storage().count("Amenity"), 0);
    }

    #[test]
    fn dotted_show_takes_argument_verbatim() {
        let mut interp = interpreter();
        let id = create(&mut interp, "create User");

        assert_eq!(
            run(&mut interp, &[&format!("User.show(\"{}\")", id)]),
            "** no instance found **\n"
        );
        assert_eq!(run(&mut interp, &["User.show()"]), "** instance id missing **\n");
    }

    #[test]
    fn dotted_unknown_method_is_silent() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["User.fly()"]), "");
    }

    #[test]
    fn invalid_command_without_dot() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, &["hello"]), "** invalid command **\n");
        assert_eq!(run(&mut interp, &["Create User"]), "** invalid command **\n");
    }

    #[test]
    fn missing_parenthesis_still_dispatches() {
        let mut interp = interpreter();
        interp.storage.new_object(Instance::new("Review"));

        assert_eq!(
            run(&mut interp, &["Review.count"]),
            "** invalid command **\n1\n"
        );
    }

    #[test]
    fn help_output() {
        let mut interp = interpreter();
        let overview = run(&mut interp, &["help"]);
        assert!(overview.contains("Documented commands (type help <topic>):"));

        assert_eq!(
            run(&mut interp, &["help quit"]),
            "Quit command to exit the program\n"
        );
        assert_eq!(run(&mut interp, &["?quit"]), "Quit command to exit the program\n");
        assert_eq!(run(&mut interp, &["help fly"]), "*** No help on fly\n");
    }
}
