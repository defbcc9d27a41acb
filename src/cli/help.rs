//! Built-in help topics

/// Documented commands and their help text, sorted by name
pub const TOPICS: &[(&str, &str)] = &[
    ("EOF", "EOF command to exit the program"),
    (
        "all",
        "Prints all string representation of all instances based or not on the class name.\n\
         Usage: all [class name]\n\
         Usage: <class name>.all()",
    ),
    (
        "count",
        "Prints the number of instances of a class.\n\
         Usage: count <class name>\n\
         Usage: <class name>.count()",
    ),
    (
        "create",
        "Creates a new instance, saves it and prints the id.\n\
         Usage: create <class name> <param 1> <param 2> ...\n\
         Param syntax: <key name>=<value> (int, float or string)",
    ),
    (
        "destroy",
        "Deletes an instance based on the class name and id and saves the change.\n\
         Usage: destroy <class name> <id>\n\
         Usage: <class name>.destroy(<id>)",
    ),
    (
        "help",
        "List available commands with \"help\" or detailed help with \"help cmd\".",
    ),
    ("quit", "Quit command to exit the program"),
    (
        "show",
        "Prints the string representation of an instance based on the class name and id.\n\
         Usage: show <class name> <id>\n\
         Usage: <class name>.show(<id>)",
    ),
    (
        "update",
        "Updates an instance based on the class name and id by adding or updating an attribute.\n\
         Usage: update <class name> <id> <attribute name> \"<attribute value>\"",
    ),
];

pub const DOC_HEADER: &str = "Documented commands (type help <topic>):";

/// Returns the help text for a command
pub fn topic(name: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(topic, _)| *topic == name)
        .map(|(_, text)| *text)
}

/// Renders the command overview shown by a bare `help`
pub fn overview() -> String {
    let names: Vec<&str> = TOPICS.iter().map(|(name, _)| *name).collect();
    format!(
        "\n{}\n{}\n{}\n",
        DOC_HEADER,
        "=".repeat(DOC_HEADER.len()),
        names.join("  ")
    )
}
