use crate::commands::{create, init, resolve, run, status};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "init",
            groups: init::EXAMPLES,
        },
        CommandExample {
            name: "create",
            groups: create::EXAMPLES,
        },
        CommandExample {
            name: "status",
            groups: status::EXAMPLES,
        },
        CommandExample {
            name: "up",
            groups: run::UP_EXAMPLES,
        },
        CommandExample {
            name: "down",
            groups: run::DOWN_EXAMPLES,
        },
        CommandExample {
            name: "resolve",
            groups: resolve::EXAMPLES,
        },
    ]
}

/// Plain-text `Examples:` section for a subcommand's long help.
pub fn render_examples(groups: &[ExampleGroup]) -> String {
    let mut help = String::from("Examples:\n");
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            help.push('\n');
        }
        help.push_str(&format!("  {}\n", group.title));
        for command in group.commands {
            help.push_str(&format!("    {command}\n"));
        }
    }
    help
}
