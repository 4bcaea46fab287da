use relia_core::Project;

pub struct TableFormatter {
    id_width: usize,
    name_width: usize,
    created_width: usize,
    description_width: usize,
}

impl TableFormatter {
    pub fn new(projects: &[Project]) -> Self {
        let name_width = projects
            .iter()
            .map(|p| p.name().chars().count())
            .max()
            .unwrap_or(16)
            .clamp(4, 40);

        Self {
            id_width: 36,
            name_width,
            created_width: 16,
            description_width: 30,
        }
    }

    /// Print the table, marking the row whose id is `current` with `*`.
    pub fn print_table(&self, projects: &[Project], current: Option<&Project>) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.header_row());
        println!("{}", self.border('├', '┼', '┤'));
        for project in projects {
            let is_current = current.is_some_and(|c| c.id() == project.id());
            println!("{}", self.row(project, is_current));
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn row(&self, project: &Project, is_current: bool) -> String {
        let marker = if is_current { "*" } else { " " };
        format!(
            "│ {} │ {} │ {} │ {} │ {} │",
            marker,
            truncate(project.id().as_str(), self.id_width),
            truncate(project.name(), self.name_width),
            truncate(
                &project.created_at().format("%Y-%m-%d %H:%M").to_string(),
                self.created_width
            ),
            truncate(project.description().unwrap_or(""), self.description_width),
        )
    }

    fn header_row(&self) -> String {
        format!(
            "│   │ {:<width_id$} │ {:<width_name$} │ {:<width_created$} │ {:<width_description$} │",
            "Id",
            "Name",
            "Created",
            "Description",
            width_id = self.id_width,
            width_name = self.name_width,
            width_created = self.created_width,
            width_description = self.description_width,
        )
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let columns = [
            1,
            self.id_width,
            self.name_width,
            self.created_width,
            self.description_width,
        ];
        let segments: Vec<String> = columns.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(&middle.to_string()))
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Counts characters, not bytes, so multi-byte names are cut safely.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
