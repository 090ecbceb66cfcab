use std::collections::HashMap;
use std::sync::OnceLock;

type Catalog = HashMap<&'static str, &'static [&'static str]>;

static TRAINING_CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Courses known to close gaps in `skill`. Skills without catalog entries get
/// a single search suggestion.
pub fn learning_resources(skill: &str) -> Vec<String> {
    match training_catalog().get(skill.trim()) {
        Some(courses) => courses.iter().map(|course| course.to_string()).collect(),
        None => vec![format!("Search LinkedIn Learning for {}", skill.trim())],
    }
}

/// Markdown-style bullet list, one course per line.
pub fn format_resources(resources: &[String]) -> String {
    resources
        .iter()
        .map(|course| format!("- {course}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn training_catalog() -> &'static Catalog {
    TRAINING_CATALOG.get_or_init(|| {
        const COURSES: &[(&str, &[&str])] = &[
            (
                "Python",
                &[
                    "Python for Everybody (Coursera)",
                    "The Complete Python Bootcamp (Udemy)",
                ],
            ),
            (
                "Market Analysis",
                &[
                    "Market Research and Consumer Behavior (Coursera)",
                    "Business Analytics Specialization (Coursera)",
                ],
            ),
            (
                "Data Visualization",
                &[
                    "Data Visualization with Tableau (Udacity)",
                    "Interactive Data Visualization with Python (Udemy)",
                ],
            ),
            (
                "Statistics",
                &[
                    "Statistics with R (Coursera)",
                    "Intro to Statistical Learning (edX)",
                ],
            ),
            (
                "SQL",
                &[
                    "SQL for Data Science (Coursera)",
                    "The Complete SQL Bootcamp (Udemy)",
                ],
            ),
            (
                "Algorithms",
                &[
                    "Algorithms Specialization (Coursera)",
                    "Algorithms, Part I (Coursera)",
                ],
            ),
        ];

        COURSES.iter().copied().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_skills_list_courses() {
        let resources = learning_resources("Python");
        assert_eq!(resources.len(), 2);
        assert!(resources[0].contains("Python for Everybody"));
    }

    #[test]
    fn unknown_skills_fall_back_to_search_hint() {
        assert_eq!(
            learning_resources(" Roadmapping "),
            vec!["Search LinkedIn Learning for Roadmapping".to_string()]
        );
    }

    #[test]
    fn resources_render_as_bullets() {
        let rendered = format_resources(&learning_resources("Statistics"));
        assert_eq!(
            rendered,
            "- Statistics with R (Coursera)\n- Intro to Statistical Learning (edX)"
        );
    }
}
