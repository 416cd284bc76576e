use interpreter_core::{AppViewModel, ColumnRowView, Message, SubmissionOutcome};

/// Lines to print when the view moves from `prev` to `next`.
pub fn render_changes(prev: &AppViewModel, next: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if next.is_ingesting && !prev.is_ingesting {
        lines.push("Reading file...".to_string());
    }

    let table_changed = prev.file != next.file
        || prev.preview_header != next.preview_header
        || prev.preview_rows != next.preview_rows;
    if table_changed {
        match &next.file {
            Some(file) => {
                lines.push(format!(
                    "Loaded {} ({} bytes)",
                    file.name,
                    format_with_commas(file.size)
                ));
                lines.extend(render_preview(next));
            }
            None => lines.push("File removed.".to_string()),
        }
    }

    if table_changed || prev.columns != next.columns {
        lines.extend(render_columns(&next.columns));
    }

    if prev.mode != next.mode {
        lines.push(format!("Model: {}", next.mode));
    }
    if prev.allow_logging != next.allow_logging {
        let state = if next.allow_logging { "on" } else { "off" };
        lines.push(format!("Server logging: {state}"));
    }

    lines.extend(render_messages(&prev.messages, &next.messages));

    if next.is_submitting && !prev.is_submitting {
        lines.push("Waiting for the assistant...".to_string());
    }
    if !next.is_submitting
        && prev.is_submitting
        && next.last_outcome != Some(SubmissionOutcome::Succeeded)
    {
        lines.push("Request failed.".to_string());
    }

    if next.error != prev.error {
        if let Some(error) = &next.error {
            lines.push(format!("error: {error}"));
        }
    }

    lines
}

fn render_preview(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.preview_rows.len() + 1);
    lines.push(format!("  | {}", view.preview_header.join(" | ")));
    for row in &view.preview_rows {
        lines.push(format!("  | {}", row.join(" | ")));
    }
    lines
}

fn render_columns(columns: &[ColumnRowView]) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Columns:".to_string()];
    for column in columns {
        if column.description.is_empty() {
            lines.push(format!("  [{}] {}", column.index, column.header));
        } else {
            lines.push(format!(
                "  [{}] {}: {}",
                column.index, column.header, column.description
            ));
        }
    }
    lines
}

fn render_messages(prev: &[Message], next: &[Message]) -> Vec<String> {
    let shared = prev
        .iter()
        .zip(next)
        .take_while(|(before, after)| before == after)
        .count();

    let mut lines = Vec::new();
    for message in &prev[shared..] {
        if message.is_user {
            lines.push(format!("(withdrawn) you> {}", message.text));
        }
    }
    for message in &next[shared..] {
        lines.push(format_message(message));
    }
    lines
}

fn format_message(message: &Message) -> String {
    let speaker = if message.is_user { "you" } else { "assistant" };
    match message.images.len() {
        0 => format!("{speaker}> {}", message.text),
        1 => format!("{speaker}> {} [1 image]", message.text),
        n => format!("{speaker}> {} [{n} images]", message.text),
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
