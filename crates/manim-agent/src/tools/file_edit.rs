//! Primitive file operations shared by both tool conventions.
//!
//! Every operation resolves relative paths against the process working directory
//! and touches the filesystem synchronously. Failures are typed so the tool layer
//! can hand them back to the model as ordinary tool results.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("File {} not found", .0.display())]
    NotFound(PathBuf),

    #[error(
        "old_str not found in {}. Make sure the string matches exactly including whitespace.",
        .0.display()
    )]
    NoMatch(PathBuf),

    #[error("Line {line} is out of range for {} ({line_count} lines)", .path.display())]
    LineOutOfRange {
        path: PathBuf,
        line: usize,
        line_count: usize,
    },

    #[error("Invalid view range [{start}, {end}] for {} ({line_count} lines)", .path.display())]
    InvalidRange {
        path: PathBuf,
        start: usize,
        end: i64,
        line_count: usize,
    },

    #[error("old_str must not be empty")]
    EmptyPattern,

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type EditResult<T> = Result<T, EditError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> EditError + '_ {
    move |source| EditError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolve a path relative to the current working directory
pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn read_existing(path: &Path) -> EditResult<String> {
    if !path.exists() {
        return Err(EditError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(io_error(path))
}

/// Return the contents of a file, optionally limited to an inclusive 1-indexed line range.
///
/// An `end` of -1 reads to the end of the file and an `end` past the last line is clamped.
/// Directories are listed one entry per line, sorted by name.
pub fn view(path: impl AsRef<Path>, range: Option<(usize, i64)>) -> EditResult<String> {
    let path = resolve_path(path);

    if path.is_dir() {
        let mut entries = fs::read_dir(&path)
            .map_err(io_error(&path))?
            .map(|entry| {
                entry
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .map_err(io_error(&path))
            })
            .collect::<EditResult<Vec<_>>>()?;
        entries.sort();
        return Ok(entries.join("\n"));
    }

    let content = read_existing(&path)?;
    let Some((start, end)) = range else {
        return Ok(content);
    };

    let lines: Vec<&str> = content.lines().collect();
    let line_count = lines.len();
    let invalid = || EditError::InvalidRange {
        path: path.clone(),
        start,
        end,
        line_count,
    };

    if start < 1 || start > line_count {
        return Err(invalid());
    }
    let last = if end == -1 {
        line_count
    } else if end < start as i64 {
        return Err(invalid());
    } else {
        (end as usize).min(line_count)
    };

    Ok(lines[start - 1..last].join("\n"))
}

/// Write a file, creating parent directories and replacing any previous content
pub fn create(path: impl AsRef<Path>, content: &str) -> EditResult<String> {
    let path = resolve_path(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(&path, content).map_err(io_error(&path))?;
    Ok(format!("File created: {}", path.display()))
}

/// Replace the first exact occurrence of `old` with `new`
pub fn replace(path: impl AsRef<Path>, old: &str, new: &str) -> EditResult<String> {
    if old.is_empty() {
        return Err(EditError::EmptyPattern);
    }
    let path = resolve_path(path);
    let content = read_existing(&path)?;
    if !content.contains(old) {
        return Err(EditError::NoMatch(path));
    }

    let updated = content.replacen(old, new, 1);
    fs::write(&path, updated).map_err(io_error(&path))?;
    Ok(format!("File updated: {}", path.display()))
}

/// Insert `text` as a new line before the zero-indexed `line`.
///
/// `line` equal to the line count appends; anything larger fails and leaves the file untouched.
pub fn insert(path: impl AsRef<Path>, line: usize, text: &str) -> EditResult<String> {
    let path = resolve_path(path);
    let content = read_existing(&path)?;

    let mut lines: Vec<&str> = content.split('\n').collect();
    if line > lines.len() {
        return Err(EditError::LineOutOfRange {
            path,
            line,
            line_count: lines.len(),
        });
    }
    lines.insert(line, text);

    fs::write(&path, lines.join("\n")).map_err(io_error(&path))?;
    Ok(format!("Text inserted at line {} in {}", line, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_replace_first_occurrence_only() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "foo bar foo baz foo");

        replace(&path, "foo", "qux").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "qux bar foo baz foo");
        assert_eq!(content.matches("qux").count(), 1);
        assert_eq!(content.find("qux"), Some(0));
    }

    #[test]
    fn test_replace_simple() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "AAA BBB CCC");

        let message = replace(&path, "BBB", "XXX").unwrap();

        assert!(message.starts_with("File updated"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "AAA XXX CCC");
    }

    #[test]
    fn test_replace_missing_file_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        let err = replace(&path, "a", "b").unwrap_err();

        assert!(matches!(err, EditError::NotFound(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_replace_no_match_leaves_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "AAA BBB CCC\n");

        let err = replace(&path, "BBB  ", "XXX").unwrap_err();

        assert!(matches!(err, EditError::NoMatch(_)));
        assert!(err.to_string().contains("including whitespace"));
        assert_eq!(fs::read(&path).unwrap(), b"AAA BBB CCC\n");
    }

    #[test]
    fn test_replace_rejects_empty_pattern() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "content");

        assert!(matches!(
            replace(&path, "", "x").unwrap_err(),
            EditError::EmptyPattern
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_insert_in_the_middle() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "line0\nline1\nline2");

        insert(&path, 1, "INSERTED").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.split('\n').collect();
        assert_eq!(lines, vec!["line0", "INSERTED", "line1", "line2"]);
    }

    #[test]
    fn test_insert_at_every_position() {
        let dir = TempDir::new().unwrap();
        let original = ["a", "b", "c"];

        for k in 0..=original.len() {
            let path = write(&dir, "f.txt", &original.join("\n"));
            insert(&path, k, "new").unwrap();

            let content = fs::read_to_string(&path).unwrap();
            let lines: Vec<&str> = content.split('\n').collect();
            assert_eq!(lines.len(), original.len() + 1);
            assert_eq!(lines[k], "new");

            let rest: Vec<&str> = lines.iter().copied().filter(|l| *l != "new").collect();
            assert_eq!(rest, original);
        }
    }

    #[test]
    fn test_insert_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "line0\nline1");

        let err = insert(&path, 5, "x").unwrap_err();

        assert!(matches!(
            err,
            EditError::LineOutOfRange {
                line: 5,
                line_count: 2,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "line0\nline1");
    }

    #[test]
    fn test_insert_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = insert(dir.path().join("nope.txt"), 0, "x").unwrap_err();
        assert!(matches!(err, EditError::NotFound(_)));
    }

    #[test]
    fn test_create_overwrites_and_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.py");

        create(&path, "first").unwrap();
        create(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_view_ranges() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", "one\ntwo\nthree\nfour\n");

        assert_eq!(view(&path, None).unwrap(), "one\ntwo\nthree\nfour\n");
        assert_eq!(view(&path, Some((2, 3))).unwrap(), "two\nthree");
        assert_eq!(view(&path, Some((3, -1))).unwrap(), "three\nfour");
        assert_eq!(view(&path, Some((4, 100))).unwrap(), "four");

        assert!(matches!(
            view(&path, Some((0, 2))).unwrap_err(),
            EditError::InvalidRange { .. }
        ));
        assert!(matches!(
            view(&path, Some((5, -1))).unwrap_err(),
            EditError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_view_missing_and_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.txt", "");
        write(&dir, "a.txt", "");

        assert!(matches!(
            view(dir.path().join("missing.txt"), None).unwrap_err(),
            EditError::NotFound(_)
        ));
        assert_eq!(view(dir.path(), None).unwrap(), "a.txt\nb.txt");
    }
}
