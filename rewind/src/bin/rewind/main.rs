mod commands;
mod context;
mod examples;
mod output;
mod project;
mod theme;

use anyhow::Result;
use clap::{
    Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{Styles, styling::AnsiColor},
};

use commands::{
    create::{CreateArgs, handle_create},
    init::{InitArgs, handle_init},
    resolve::{ResolveArgs, handle_resolve},
    run::{DownArgs, UpArgs, handle_down, handle_up},
    status::handle_status,
};
use context::ProjectContext;
use examples::{command_examples, render_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL when storage.kind = \"redis\""),
    ("RUST_LOG", "Log filter for engine diagnostics (e.g. rewind=debug)"),
];

#[derive(Parser)]
#[command(name = "rewind")]
#[command(version)]
#[command(
    about = "Ordered, reversible migrations with tracked execution history",
    long_about = r#"Migration runner that keeps an ordered list of reversible scripts and
records which ones have executed:

• Up/down by range, by step count, or by explicit name
• Execution history in a JSON file or a Redis hash
• Fail-fast execution: history always matches what actually ran

Commands:
  init      Initialize rewind in a project
  create    Generate a new up/down script pair
  status    Show executed and pending migrations
  up        Apply pending migrations
  down      Revert executed migrations
  resolve   Mark a migration applied or rolled back without running it
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_examples() -> Self {
        let matches = cli_command().get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

fn cli_command() -> Command {
    let mut command = Cli::command()
        .styles(help_styles())
        .after_long_help(environment_help());
    for example in command_examples() {
        command = command.mut_subcommand(example.name, |sub| {
            sub.after_long_help(render_examples(example.groups))
        });
    }
    command
}

fn environment_help() -> String {
    let mut help = String::from("Environment Variables:\n");
    for (key, description) in ENVIRONMENT_VARIABLES {
        help.push_str(&format!("  {key:<10} {description}\n"));
    }
    help.push_str("\nUse 'rewind <command> --help' to view examples for each command.\n");
    help
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .header(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .error(AnsiColor::Red.on_default().bold())
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize rewind in the current directory
    Init(InitArgs),

    /// Generate a new migration script pair
    Create(CreateArgs),

    /// Show executed and pending migrations
    Status,

    /// Apply pending migrations
    Up(UpArgs),

    /// Revert executed migrations (the most recent one by default)
    Down(DownArgs),

    /// Mark a migration as applied or rolled back without running it
    Resolve(ResolveArgs),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_examples();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = execute(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);

    match cli.command {
        Commands::Init(args) => handle_init(args, &output).await,
        command => execute_in_project(command, &output).await,
    }
}

async fn execute_in_project(command: Commands, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    if !ctx.initialized {
        anyhow::bail!("No {} found. Run 'rewind init' first.", ctx.config_path.display());
    }
    output.verbose(&format!("Project root: {}", ctx.project_root.display()));

    match command {
        Commands::Init(args) => handle_init(args, output).await,
        Commands::Create(args) => handle_create(&ctx, args, output).await,
        Commands::Status => handle_status(&ctx, output).await,
        Commands::Up(args) => handle_up(&ctx, args, output).await,
        Commands::Down(args) => handle_down(&ctx, args, output).await,
        Commands::Resolve(args) => handle_resolve(&ctx, args, output).await,
    }
}
