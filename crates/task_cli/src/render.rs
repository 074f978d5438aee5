use tabled::settings::Style;
use tabled::{Table, Tabled};
use task_core::error::AppError;
use task_core::model::Task;
use task_core::options::FilterOptions;
use task_core::query;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Due")]
    due_date: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub fn status_label(task: &Task, today: &str) -> &'static str {
    if task.completed {
        "done"
    } else if query::is_overdue_on(task, today) {
        "overdue"
    } else {
        "open"
    }
}

pub fn tasks_table(tasks: &[Task], today: &str) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        title: task.title.clone(),
        priority: task
            .priority
            .map(|priority| priority.to_string())
            .unwrap_or_else(|| "-".to_string()),
        category: task.category.clone(),
        due_date: if task.due_date.is_empty() {
            "-".to_string()
        } else {
            task.due_date.clone()
        },
        status: status_label(task, today),
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// The stored record plus a computed `overdue` flag.
pub fn task_json(task: &Task, today: &str) -> Result<serde_json::Value, AppError> {
    let mut value =
        serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "overdue".to_string(),
            serde_json::Value::Bool(query::is_overdue_on(task, today)),
        );
    }
    Ok(value)
}

pub fn tasks_json(tasks: &[Task], today: &str) -> Result<serde_json::Value, AppError> {
    let items = tasks
        .iter()
        .map(|task| task_json(task, today))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::Value::Array(items))
}

pub fn options_json(options: &FilterOptions, choices: &[String]) -> serde_json::Value {
    let priorities: Vec<&str> = options.priorities.iter().map(|p| p.as_str()).collect();
    serde_json::json!({
        "categories": options.categories,
        "priorities": priorities,
        "new_task_categories": choices,
    })
}

#[cfg(test)]
mod tests {
    use super::{status_label, task_json, tasks_table};
    use task_core::model::{Priority, Task};

    fn task(id: u64, due: &str, completed: bool) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: String::new(),
            priority: Some(Priority::Medium),
            category: "Work".to_string(),
            due_date: due.to_string(),
            completed,
            created_at: "2025-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn status_label_distinguishes_overdue() {
        assert_eq!(status_label(&task(1, "2025-01-01", false), "2025-01-02"), "overdue");
        assert_eq!(status_label(&task(1, "2025-01-01", true), "2025-01-02"), "done");
        assert_eq!(status_label(&task(1, "2025-01-03", false), "2025-01-02"), "open");
    }

    #[test]
    fn table_lists_every_task() {
        let rendered = tasks_table(&[task(1, "2025-01-01", false), task(2, "", true)], "2025-01-02");
        assert!(rendered.contains("Task 1"));
        assert!(rendered.contains("Task 2"));
        assert!(rendered.contains("overdue"));
        assert!(rendered.contains("Due"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(tasks_table(&[], "2025-01-02"), "No tasks.");
    }

    #[test]
    fn task_json_adds_overdue_flag() {
        let value = task_json(&task(5, "2025-01-01", false), "2025-01-02").unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["overdue"], true);
    }
}
