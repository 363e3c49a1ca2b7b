//! Loading style and prompt lists from disk.
//!
//! Each list is a `.csv` file holding one fragment per line. Lines are
//! trimmed, blank lines are dropped, and a line wrapped in double quotes is
//! unquoted (`""` inside it becomes `"`), so fragments that contain commas
//! survive a spreadsheet round-trip.

use std::path::{Path, PathBuf};

use crate::combinations::InputList;
use crate::error::CoreError;

/// Extension of input list files.
pub const INPUT_LIST_EXTENSION: &str = "csv";

/// List the `.csv` files directly inside `dir`, sorted by file name.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        let path = entry.path();
        let is_list = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_LIST_EXTENSION));
        if is_list {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Split file contents into cleaned fragments.
pub fn parse_fragments(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(unquote)
        .map(|fragment| fragment.trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn unquote(line: &str) -> String {
    match line
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => line.to_string(),
    }
}

/// Read a list file; its file name becomes the list's source id.
///
/// A missing file is an input error. An empty list is returned as-is; the
/// enumerator decides that emptiness is fatal.
pub fn load_input_list(path: &Path) -> Result<InputList, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            CoreError::Input(format!("Input list not found: {}", path.display()))
        }
        _ => CoreError::io(path, e),
    })?;

    let source_id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(InputList::new(source_id, parse_fragments(&content)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn drops_blank_and_whitespace_lines() {
        let parsed = parse_fragments("van Gogh\n\n   \n  Monet  \r\n\t\n");
        assert_eq!(parsed, vec!["van Gogh", "Monet"]);
    }

    #[test]
    fn unquotes_csv_quoted_lines() {
        let parsed = parse_fragments("\"1girl,solo\"\n\"say \"\"hi\"\"\"\nplain,text\n");
        assert_eq!(parsed, vec!["1girl,solo", "say \"hi\"", "plain,text"]);
    }

    #[test]
    fn quoted_blank_is_dropped() {
        assert!(parse_fragments("\"  \"\n").is_empty());
    }

    #[test]
    fn lists_only_csv_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a.CSV"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let names: Vec<String> = list_input_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn load_uses_file_name_as_source_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artists.csv");
        std::fs::write(&path, "van Gogh\nMonet\n").unwrap();

        let list = load_input_list(&path).unwrap();
        assert_eq!(list.source_id, "artists.csv");
        assert_eq!(list.fragments, vec!["van Gogh", "Monet"]);
    }

    #[test]
    fn missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_input_list(&dir.path().join("nope.csv")),
            Err(CoreError::Input(_))
        );
    }
}
