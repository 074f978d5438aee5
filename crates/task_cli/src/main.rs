use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use task_cli::cli::{Cli, Command, ListArgs, parse_config_overrides};
use task_cli::render;
use task_core::clock;
use task_core::config::{self, Config};
use task_core::error::AppError;
use task_core::model::{NewTask, Task};
use task_core::options::{self, OTHER_CATEGORY};
use task_core::query::{self, ViewFilter};
use task_core::session::Session;
use task_core::storage::json_store;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn base_config() -> Config {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "ignoring unreadable config");
    }
    loaded.config
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let overrides = parse_config_overrides(&cli.config_override)?;
    Ok(config::merge_overrides(&base_config(), &overrides))
}

fn resolve_store(explicit: Option<&Path>, config: &Config) -> PathBuf {
    json_store::store_path(explicit, config.store_path.as_deref())
}

fn print_json(value: &serde_json::Value) {
    println!("{value}");
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<(), AppError> {
    let today = clock::today()?;
    if json {
        print_json(&render::tasks_json(tasks, &today)?);
    } else {
        println!("{}", render::tasks_table(tasks, &today));
    }
    Ok(())
}

fn print_task(verb: &str, task: &Task, json: bool) -> Result<(), AppError> {
    if json {
        print_json(&render::task_json(task, &clock::today()?)?);
    } else {
        println!("{verb} task: {} ({})", task.title, task.id);
    }
    Ok(())
}

fn not_found(id: u64) -> AppError {
    AppError::invalid_input(format!("task {id} not found"))
}

fn find(session: &Session, id: u64) -> Result<&Task, AppError> {
    session
        .tasks()
        .iter()
        .find(|task| task.id == id)
        .ok_or_else(|| not_found(id))
}

fn list_view(session: &Session, args: &ListArgs) -> Vec<Task> {
    let filter = ViewFilter {
        category: args.category.clone(),
        priority: args.priority,
        show_completed: args.all,
    };
    let mut tasks = session.view(&filter);
    if let Some(needle) = args.search.as_deref() {
        tasks = query::search(&tasks, needle);
    }
    query::sort_by_due_date(&tasks, !args.desc)
}

fn run_command(
    command: Command,
    session: &mut Session,
    config: &Config,
    json: bool,
) -> Result<(), AppError> {
    match command {
        Command::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let input = NewTask {
                title: title.unwrap_or_default(),
                description,
                priority: priority.unwrap_or(config.default_priority),
                category: category.unwrap_or_else(|| OTHER_CATEGORY.to_string()),
                due_date: due.unwrap_or_else(|| clock::now_local().date()),
            };
            let task = session
                .add(true, &input)?
                .ok_or_else(|| AppError::invalid_input("title is required"))?;
            print_task("Added", &task, json)?;
        }
        Command::List(args) => {
            print_tasks(&list_view(session, &args), json)?;
        }
        Command::Overdue => {
            let tasks = query::overdue_tasks(session.tasks())?;
            print_tasks(&query::sort_by_due_date(&tasks, true), json)?;
        }
        Command::Upcoming => {
            let tasks = query::upcoming_tasks(session.tasks())?;
            print_tasks(&query::sort_by_due_date(&tasks, true), json)?;
        }
        Command::Done { id } => {
            if !session.toggle(id)? {
                return Err(not_found(id));
            }
            let task = find(session, id)?;
            let verb = if task.completed { "Completed" } else { "Reopened" };
            print_task(verb, task, json)?;
        }
        Command::Delete { id } => {
            if !session.delete(id)? {
                return Err(not_found(id));
            }
            if json {
                print_json(&serde_json::json!({ "id": id, "deleted": true }));
            } else {
                println!("Deleted task: {id}");
            }
        }
        Command::Edit(args) => {
            let updates = args.to_update()?;
            if !session.edit(args.id, &updates)? {
                return Err(not_found(args.id));
            }
            print_task("Updated", find(session, args.id)?, json)?;
        }
        Command::Options => {
            let filter_options = options::filter_options(session.tasks());
            let choices = options::category_choices(session.tasks(), &config.categories);
            if json {
                print_json(&render::options_json(&filter_options, &choices));
            } else {
                let priorities: Vec<&str> = filter_options
                    .priorities
                    .iter()
                    .map(|priority| priority.as_str())
                    .collect();
                println!("Categories: {}", filter_options.categories.join(", "));
                println!("Priorities: {}", priorities.join(", "));
                println!("New task categories: {}", choices.join(", "));
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits an interactive line into arguments. Double quotes group words and
/// `\"` inside quotes is a literal quote.
fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes && matches!(chars.peek(), Some('"') | Some('\\')) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let config = base_config();
    let path = resolve_store(None, &config);
    let mut session = Session::open(&path)?;

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) if !args.is_empty() => args,
            Ok(_) => continue,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };

        let argv = std::iter::once("task_cli".to_string()).chain(args);
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };
        if cli.file.is_some() || !cli.config_override.is_empty() {
            warn!("--file and --config-override are ignored in interactive mode");
        }

        if let Err(err) = run_command(cli.command, &mut session, &config, cli.json) {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let path = resolve_store(cli.file.as_deref(), &config);
    let mut session = Session::open(&path)?;
    run_command(cli.command, &mut session, &config, cli.json)
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
