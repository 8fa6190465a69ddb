use chrono::Local;
use zibaldone_core::{AppViewModel, ItemRowView, UploadOutcome};

use crate::platform::persistence::Theme;

const MAX_FILENAME_WIDTH: usize = 40;
const HEADERS: [&str; 6] = ["ID", "FILE", "STATUS", "SIZE", "TYPE", "CREATED"];

/// ANSI escapes per theme. `System` leaves the terminal's colors alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    accent: &'static str,
    muted: &'static str,
    error: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let (accent, muted, error) = match theme {
            Theme::System => return Self::plain(),
            Theme::Light => ("\x1b[34m", "\x1b[90m", "\x1b[31m"),
            Theme::Dark => ("\x1b[96m", "\x1b[37m", "\x1b[91m"),
            Theme::Ocean => ("\x1b[36m", "\x1b[34m", "\x1b[95m"),
            Theme::Forest => ("\x1b[32m", "\x1b[33m", "\x1b[31m"),
        };
        Self {
            accent,
            muted,
            error,
            reset: "\x1b[0m",
        }
    }

    pub fn plain() -> Self {
        Self {
            accent: "",
            muted: "",
            error: "",
            reset: "",
        }
    }

    fn accent(&self, text: &str) -> String {
        format!("{}{}{}", self.accent, text, self.reset)
    }

    fn muted(&self, text: &str) -> String {
        format!("{}{}{}", self.muted, text, self.reset)
    }

    fn error(&self, text: &str) -> String {
        format!("{}{}{}", self.error, text, self.reset)
    }
}

pub fn welcome(palette: &Palette) -> String {
    format!(
        "{}\nYour personal intellectual archive.\n\n\
         Upload files to begin processing. Ensure your local LLM server is running \
         for automatic tagging.\n",
        palette.accent("Welcome to Zibaldone")
    )
}

pub fn upload_line(filename: &str, outcome: &UploadOutcome, palette: &Palette) -> String {
    match outcome {
        UploadOutcome::Uploaded { item_id } => {
            format!("{} {} {}", palette.accent("uploaded"), filename, palette.muted(item_id))
        }
        UploadOutcome::Failed { cause } => {
            format!("{} {} ({})", palette.error("failed"), filename, cause)
        }
    }
}

/// The full screen: item table followed by status lines.
pub fn render(view: &AppViewModel, palette: &Palette, verbose: bool) -> String {
    let mut out = item_table(&view.items, palette, verbose);
    for line in status_lines(view, palette) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn item_table(rows: &[ItemRowView], palette: &Palette, verbose: bool) -> String {
    if rows.is_empty() {
        return format!("{}\n", palette.muted("No items in the archive yet."));
    }

    let cells: Vec<[String; 6]> = rows.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = format_row(&HEADERS.map(str::to_string), &widths);
    out.push_str(&palette.accent(&header));
    out.push('\n');
    for (row, cells) in rows.iter().zip(&cells) {
        out.push_str(&format_row(cells, &widths));
        out.push('\n');
        if verbose {
            for line in row.metadata.lines() {
                out.push_str(&palette.muted(&format!("    {line}")));
                out.push('\n');
            }
        }
    }
    out
}

pub fn status_lines(view: &AppViewModel, palette: &Palette) -> Vec<String> {
    let mut lines = Vec::new();
    if view.uploads_in_flight > 0 {
        lines.push(palette.muted(&format!("Uploading {} file(s)...", view.uploads_in_flight)));
    }
    if view.pending_deletes > 0 {
        lines.push(palette.muted(&format!("{} delete(s) pending", view.pending_deletes)));
    }
    if let Some(error) = &view.upload_error {
        lines.push(palette.error(error));
    }
    if let Some(alert) = &view.alert {
        lines.push(palette.error(alert));
    }
    lines
}

fn row_cells(row: &ItemRowView) -> [String; 6] {
    let created = row
        .created_at
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    [
        row.id.clone(),
        truncate(&row.filename, MAX_FILENAME_WIDTH),
        row.status.to_string(),
        row.size.clone(),
        row.kind.clone(),
        created,
    ]
}

fn format_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use zibaldone_core::ItemStatus;

    use super::*;

    fn row(id: &str, filename: &str) -> ItemRowView {
        ItemRowView {
            id: id.to_string(),
            filename: filename.to_string(),
            status: ItemStatus::Unprocessed,
            size: "1.5 KB".to_string(),
            kind: "PDF".to_string(),
            created_at: None,
            metadata: "{\n  \"size\": 1536\n}".to_string(),
        }
    }

    #[test]
    fn table_aligns_columns_without_colors_for_system_theme() {
        let table = item_table(
            &[row("a1", "paper.pdf"), row("b22", "a-much-longer-name.pdf")],
            &Palette::for_theme(Theme::System),
            false,
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID   FILE"));
        assert!(lines[1].starts_with("a1   paper.pdf"));
        assert!(lines[2].contains("a-much-longer-name.pdf  unprocessed  1.5 KB  PDF   -"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn verbose_table_includes_metadata() {
        let table = item_table(&[row("a", "x.pdf")], &Palette::plain(), true);
        assert!(table.contains("    \"size\": 1536"));
    }

    #[test]
    fn long_filenames_are_truncated() {
        let name = "n".repeat(60);
        let cells = row_cells(&row("id", &name));
        assert_eq!(cells[1].chars().count(), MAX_FILENAME_WIDTH);
        assert!(cells[1].ends_with("..."));
    }

    #[test]
    fn empty_archive_and_status_lines() {
        let view = AppViewModel {
            upload_error: Some("Failed to upload a.txt. Please try again.".to_string()),
            uploads_in_flight: 2,
            ..AppViewModel::default()
        };
        let screen = render(&view, &Palette::plain(), false);
        assert_eq!(
            screen,
            "No items in the archive yet.\n\
             Uploading 2 file(s)...\n\
             Failed to upload a.txt. Please try again.\n"
        );
    }

    #[test]
    fn colored_themes_wrap_text() {
        let line = upload_line(
            "a.txt",
            &UploadOutcome::Failed {
                cause: "timeout".to_string(),
            },
            &Palette::for_theme(Theme::Forest),
        );
        assert_eq!(line, "\x1b[31mfailed\x1b[0m a.txt (timeout)");
    }
}
