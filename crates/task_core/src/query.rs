//! Read-only views over a task collection.
//!
//! Nothing here mutates its input or touches the store. Date comparisons are
//! plain string comparisons on `YYYY-MM-DD`, which order chronologically.

use crate::clock;
use crate::error::AppError;
use crate::model::{Priority, Task};

pub fn filter_by_priority(tasks: &[Task], priority: Priority) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.priority == Some(priority))
        .cloned()
        .collect()
}

pub fn filter_by_category(tasks: &[Task], category: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.category == category)
        .cloned()
        .collect()
}

pub fn filter_by_completion(tasks: &[Task], completed: bool) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.completed == completed)
        .cloned()
        .collect()
}

/// Case-insensitive substring match against title or description.
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// An empty `due_date` sorts before every date, so an open task without one
/// counts as overdue.
pub fn is_overdue_on(task: &Task, today: &str) -> bool {
    !task.completed && task.due_date.as_str() < today
}

pub fn is_overdue(task: &Task) -> Result<bool, AppError> {
    Ok(is_overdue_on(task, &clock::today()?))
}

pub fn overdue_tasks_on(tasks: &[Task], today: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| is_overdue_on(task, today))
        .cloned()
        .collect()
}

pub fn overdue_tasks(tasks: &[Task]) -> Result<Vec<Task>, AppError> {
    Ok(overdue_tasks_on(tasks, &clock::today()?))
}

pub fn upcoming_tasks_on(tasks: &[Task], today: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| !task.completed && task.due_date.as_str() >= today)
        .cloned()
        .collect()
}

pub fn upcoming_tasks(tasks: &[Task]) -> Result<Vec<Task>, AppError> {
    Ok(upcoming_tasks_on(tasks, &clock::today()?))
}

/// Stable sort on `due_date`. Ties keep their input order in both directions.
pub fn sort_by_due_date(tasks: &[Task], ascending: bool) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    if ascending {
        sorted.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    } else {
        sorted.sort_by(|a, b| b.due_date.cmp(&a.due_date));
    }
    sorted
}

/// Category/priority/completion filter as chosen in a filter bar. `None`
/// stands for "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub show_completed: bool,
}

impl ViewFilter {
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut filtered = tasks.to_vec();
        if let Some(category) = self.category.as_deref() {
            filtered = filter_by_category(&filtered, category);
        }
        if let Some(priority) = self.priority {
            filtered = filter_by_priority(&filtered, priority);
        }
        if !self.show_completed {
            filtered = filter_by_completion(&filtered, false);
        }
        filtered
    }
}
