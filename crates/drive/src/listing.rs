//! Text formatting for folder listings.

use crate::api::{DriveFile, GOOGLE_APPS_PREFIX};

/// Fields requested for each listed entry.
pub const LIST_FIELDS: &str = "id,name,mimeType,parents,size,createdTime,modifiedTime";

/// `strftime` pattern for the modification column, e.g. `Mar  1 12:30`.
const TIMESTAMP_FORMAT: &str = "%b %e %H:%M";

/// Number of columns in a listing line.
const COLUMNS: usize = 5;

/// Cells of one listing line: id, type, size, modified time, name.
///
/// Native Drive types drop their `application/vnd.google-apps.` prefix so
/// folders show up as `folder`.
pub fn entry_columns(file: &DriveFile) -> [String; COLUMNS] {
    let file_type = file.mime_type.replace(GOOGLE_APPS_PREFIX, "");
    let timestamp = file
        .modified_time
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default();

    [
        file.id.clone(),
        file_type,
        file.size_bytes().to_string(),
        timestamp,
        file.name.clone(),
    ]
}

/// Format a full listing: a `total N` header, the folder itself, then its
/// children.
///
/// Every column but the last is padded to its widest cell plus one space.
pub fn format_listing(folder: &DriveFile, children: &[DriveFile]) -> String {
    let rows: Vec<_> = std::iter::once(folder)
        .chain(children)
        .map(entry_columns)
        .collect();

    let mut widths = [0usize; COLUMNS - 1];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("total {}\n", children.len());
    for row in &rows {
        for (cell, width) in row.iter().zip(widths) {
            out.push_str(&format!("{cell:<width$} "));
        }
        out.push_str(&row[COLUMNS - 1]);
        out.push('\n');
    }
    out
}
