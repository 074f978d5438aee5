use crate::error::AppError;
use crate::model::Task;

/// Next id for a new task: one past the largest id in use, or 1.
///
/// Ids of deleted tasks are only reused if they were the largest. Fails when
/// the largest id is already `u64::MAX`.
pub fn generate_unique_id(tasks: &[Task]) -> Result<u64, AppError> {
    match tasks.iter().map(|task| task.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data(format!("task id {max} leaves no room for a new id"))),
    }
}
