use crate::error::AppError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::query::ViewFilter;
use crate::storage::json_store;
use crate::task_api::{self, Mutation, TaskAction};
use std::path::{Path, PathBuf};

/// The collection a front end works against between user actions.
///
/// Loaded once on `open`; every mutating method saves before returning.
/// Toggle, complete and delete re-read the store, and the session adopts
/// whatever they wrote.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl Session {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let tasks = json_store::load_tasks(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            tasks,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn reload(&mut self) -> Result<(), AppError> {
        self.tasks = json_store::load_tasks(&self.path)?;
        Ok(())
    }

    pub fn add(&mut self, submitted: bool, input: &NewTask) -> Result<Option<Task>, AppError> {
        task_api::add_task(&self.path, &mut self.tasks, submitted, input)
    }

    pub fn toggle(&mut self, id: u64) -> Result<bool, AppError> {
        let outcome = task_api::toggle_complete(&self.path, id)?;
        Ok(self.adopt(outcome))
    }

    pub fn complete(&mut self, id: u64) -> Result<bool, AppError> {
        let outcome = task_api::complete_task(&self.path, id)?;
        Ok(self.adopt(outcome))
    }

    pub fn delete(&mut self, id: u64) -> Result<bool, AppError> {
        let outcome = task_api::delete_task(&self.path, id)?;
        Ok(self.adopt(outcome))
    }

    /// Edits in memory and saves only if a task matched.
    pub fn edit(&mut self, id: u64, updates: &TaskUpdate) -> Result<bool, AppError> {
        let outcome = task_api::edit_task(&self.tasks, id, updates)?;
        if outcome.matched {
            json_store::save_tasks(&self.path, &outcome.tasks)?;
        }
        Ok(self.adopt(outcome))
    }

    /// Runs a button action against the task with `id`.
    pub fn apply_action(&mut self, id: u64, action: TaskAction) -> Result<bool, AppError> {
        match action {
            TaskAction::Complete => self.complete(id),
            TaskAction::Delete => self.delete(id),
        }
    }

    pub fn view(&self, filter: &ViewFilter) -> Vec<Task> {
        filter.apply(&self.tasks)
    }

    fn adopt(&mut self, outcome: Mutation) -> bool {
        self.tasks = outcome.tasks;
        outcome.matched
    }
}
