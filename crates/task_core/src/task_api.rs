use crate::clock;
use crate::error::AppError;
use crate::identity::generate_unique_id;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::storage::json_store;
use std::path::Path;
use time::OffsetDateTime;
use tracing::info;

/// Collection after a by-id mutation, and whether any task carried that id.
///
/// When `matched` is false the collection is exactly what was read or passed
/// in; callers decide whether an unknown id is worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub tasks: Vec<Task>,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Complete,
    Delete,
}

pub fn build_task(tasks: &[Task], input: &NewTask) -> Result<Task, AppError> {
    build_task_at(tasks, input, clock::now_local())
}

pub fn build_task_at(tasks: &[Task], input: &NewTask, now: OffsetDateTime) -> Result<Task, AppError> {
    Ok(Task {
        id: generate_unique_id(tasks)?,
        title: input.title.clone(),
        description: input.description.clone(),
        priority: Some(input.priority),
        category: input.category.clone(),
        due_date: clock::format_date(input.due_date)?,
        completed: false,
        created_at: clock::format_timestamp(now)?,
    })
}

/// Creates and persists a task when the form was submitted with a title.
///
/// Returns `Ok(None)` without touching `tasks` or the store otherwise.
pub fn add_task(
    path: &Path,
    tasks: &mut Vec<Task>,
    submitted: bool,
    input: &NewTask,
) -> Result<Option<Task>, AppError> {
    let title = input.title.trim();
    if !submitted || title.is_empty() {
        return Ok(None);
    }

    let input = NewTask {
        title: title.to_string(),
        ..input.clone()
    };
    let task = build_task(tasks, &input)?;
    tasks.push(task.clone());
    json_store::save_tasks(path, tasks)?;
    info!(id = task.id, "task added");

    Ok(Some(task))
}

/// Flips `completed` on the stored task with `id`.
///
/// Reads the store rather than a caller copy, so the write is based on the
/// latest saved state.
pub fn toggle_complete(path: &Path, id: u64) -> Result<Mutation, AppError> {
    update_stored(path, id, |task| task.completed = !task.completed)
}

/// Marks the stored task with `id` completed. Already completed tasks stay so.
pub fn complete_task(path: &Path, id: u64) -> Result<Mutation, AppError> {
    update_stored(path, id, |task| task.completed = true)
}

/// Removes the stored task with `id`. Repeating the call is a no-op.
pub fn delete_task(path: &Path, id: u64) -> Result<Mutation, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    let matched = tasks.len() != before;

    json_store::save_tasks(path, &tasks)?;
    if matched {
        info!(id, "task deleted");
    }

    Ok(Mutation { tasks, matched })
}

fn update_stored<F>(path: &Path, id: u64, change: F) -> Result<Mutation, AppError>
where
    F: FnOnce(&mut Task),
{
    let mut tasks = json_store::load_tasks(path)?;
    let matched = match tasks.iter_mut().find(|task| task.id == id) {
        Some(task) => {
            change(task);
            info!(id, completed = task.completed, "task updated");
            true
        }
        None => false,
    };

    json_store::save_tasks(path, &tasks)?;
    Ok(Mutation { tasks, matched })
}

/// Merges `updates` into the task with `id` and moves it to the end.
///
/// Pure: nothing is persisted. `id` and `created_at` always survive.
pub fn edit_task(tasks: &[Task], id: u64, updates: &TaskUpdate) -> Result<Mutation, AppError> {
    let Some(original) = tasks.iter().find(|task| task.id == id) else {
        return Ok(Mutation {
            tasks: tasks.to_vec(),
            matched: false,
        });
    };

    let edited = updates.apply_to(original)?;
    let mut next: Vec<Task> = tasks.iter().filter(|task| task.id != id).cloned().collect();
    next.push(edited);

    Ok(Mutation {
        tasks: next,
        matched: true,
    })
}

/// What a pair of per-task buttons asks for. Completing wins over deleting,
/// and completing an already completed task is not an action.
pub fn decide_task_action(
    task: &Task,
    complete_pressed: bool,
    delete_pressed: bool,
) -> Option<TaskAction> {
    if complete_pressed && !task.completed {
        return Some(TaskAction::Complete);
    }
    if delete_pressed {
        return Some(TaskAction::Delete);
    }
    None
}
