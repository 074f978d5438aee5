use crate::model::{Priority, Task};
use std::collections::BTreeSet;

pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub priorities: Vec<Priority>,
}

/// Distinct categories present in `tasks`, sorted, plus the fixed priority list.
pub fn filter_options(tasks: &[Task]) -> FilterOptions {
    let categories: BTreeSet<&str> = tasks.iter().map(|task| task.category.as_str()).collect();
    FilterOptions {
        categories: categories.into_iter().map(str::to_string).collect(),
        priorities: Priority::ALL.to_vec(),
    }
}

/// Categories offered when creating a task: "Other" first, then the configured
/// defaults merged with those already in use.
pub fn category_choices(tasks: &[Task], defaults: &[String]) -> Vec<String> {
    let mut known: BTreeSet<String> = filter_options(tasks).categories.into_iter().collect();
    known.extend(defaults.iter().map(|category| category.trim().to_string()));
    known.remove(OTHER_CATEGORY);
    known.remove("");

    let mut choices = Vec::with_capacity(known.len() + 1);
    choices.push(OTHER_CATEGORY.to_string());
    choices.extend(known);
    choices
}

#[cfg(test)]
mod tests {
    use super::{category_choices, filter_options};
    use crate::model::{Priority, Task};

    fn in_category(id: u64, category: &str) -> Task {
        Task {
            id,
            title: "t".to_string(),
            description: String::new(),
            priority: Some(Priority::Low),
            category: category.to_string(),
            due_date: "2025-01-01".to_string(),
            completed: false,
            created_at: "2025-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn categories_are_deduplicated_and_sorted() {
        let tasks = vec![
            in_category(1, "Work"),
            in_category(2, "Errands"),
            in_category(3, "Work"),
        ];

        let options = filter_options(&tasks);

        assert_eq!(options.categories, vec!["Errands", "Work"]);
        assert_eq!(
            options.priorities,
            vec![Priority::High, Priority::Medium, Priority::Low]
        );
    }

    #[test]
    fn empty_collection_still_lists_priorities() {
        let options = filter_options(&[]);
        assert!(options.categories.is_empty());
        assert_eq!(options.priorities.len(), 3);
    }

    #[test]
    fn category_choices_put_other_first() {
        let tasks = vec![in_category(1, "Work"), in_category(2, "Other")];
        let defaults = vec!["Personal".to_string(), "Work".to_string()];

        assert_eq!(
            category_choices(&tasks, &defaults),
            vec!["Other", "Personal", "Work"]
        );
    }
}
