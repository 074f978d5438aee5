use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use task_core::clock;
use task_core::config::ConfigOverrides;
use task_core::error::AppError;
use task_core::model::{Priority, TaskUpdate};
use time::Date;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal task tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file to use instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: task_cli add "Buy milk" --priority high --category Errands --due 2025-01-15
    Add {
        title: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        category: Option<String>,
        /// Due date as YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_due)]
        due: Option<Date>,
    },
    /// List tasks sorted by due date
    ///
    /// Example: task_cli list --category Work --all
    List(ListArgs),
    /// List open tasks due before today
    Overdue,
    /// List open tasks due today or later
    Upcoming,
    /// Toggle a task between open and completed
    ///
    /// Example: task_cli done 3
    Done { id: u64 },
    /// Delete a task
    ///
    /// Example: task_cli delete 3
    Delete { id: u64 },
    /// Change fields of a task
    ///
    /// Example: task_cli edit 3 --title "Buy oat milk" --due 2025-02-01
    Edit(EditArgs),
    /// Show the categories and priorities available for filtering
    Options,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// Include completed tasks
    #[arg(short, long)]
    pub all: bool,
    /// Only tasks whose title or description contains this text
    #[arg(short, long)]
    pub search: Option<String>,
    /// Latest due date first
    #[arg(long)]
    pub desc: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: u64,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub priority: Option<Priority>,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(long, value_parser = parse_due)]
    pub due: Option<Date>,
    #[arg(long)]
    pub completed: Option<bool>,
}

impl EditArgs {
    pub fn to_update(&self) -> Result<TaskUpdate, AppError> {
        let title = match self.title.as_deref() {
            Some(raw) if raw.trim().is_empty() => {
                return Err(AppError::invalid_input("title is required"));
            }
            Some(raw) => Some(raw.trim().to_string()),
            None => None,
        };

        let update = TaskUpdate {
            title,
            description: self.description.clone(),
            priority: self.priority,
            category: self.category.clone(),
            due_date: self.due,
            completed: self.completed,
        };
        if update.is_empty() {
            return Err(AppError::invalid_input("nothing to update"));
        }
        Ok(update)
    }
}

fn parse_due(raw: &str) -> Result<Date, AppError> {
    clock::parse_date(raw)
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

/// Parses `KEY=VALUE` overrides. Later values for the same key win.
pub fn parse_config_overrides(raws: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for raw in raws {
        let (key_raw, value_raw) = raw.trim().split_once('=').ok_or_else(|| {
            AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG} must be KEY=VALUE"))
        })?;
        let value = value_raw.trim();
        let key = canonicalize_flag_name(key_raw)
            .ok_or_else(|| AppError::invalid_input("override key cannot be empty"))?;

        match key.as_str() {
            "store_path" | "file" => {
                if value.is_empty() {
                    return Err(AppError::invalid_input("store_path cannot be empty"));
                }
                overrides.store_path = Some(PathBuf::from(value));
            }
            "categories" => {
                overrides.categories = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|category| !category.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "default_priority" | "priority" => {
                overrides.default_priority = Some(value.parse()?);
            }
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown config field '{other}'"
                )));
            }
        }
    }

    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
