use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::EvalError;

/// Read one token sequence per line, trimming surrounding whitespace.
/// Blank lines are kept so positions stay aligned with the other file.
pub fn load_segments(path: &Path) -> Result<Vec<String>, EvalError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| EvalError::io("reading segments", path, e))?;
    Ok(contents.lines().map(|line| line.trim().to_string()).collect())
}

/// Write each segment followed by a newline.
pub fn save_text(path: &Path, segments: &[String]) -> Result<(), EvalError> {
    let file = File::create(path).map_err(|e| EvalError::io("creating text file", path, e))?;
    let mut writer = BufWriter::new(file);
    for segment in segments {
        writeln!(writer, "{segment}").map_err(|e| EvalError::io("writing text file", path, e))?;
    }
    writer
        .flush()
        .map_err(|e| EvalError::io("flushing text file", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_trims_and_keeps_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pred.txt");
        std::fs::write(&path, "  a + b \n\nx = y\r\n").unwrap();
        let segments = load_segments(&path).unwrap();
        assert_eq!(segments, vec!["a + b", "", "x = y"]);
    }

    #[test]
    fn save_then_load_preserves_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.txt");
        let lines = vec!["\\frac { a } { b }".to_string(), "c".to_string()];
        save_text(&path, &lines).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\\frac { a } { b }\nc\n"
        );
        assert_eq!(load_segments(&path).unwrap(), lines);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_segments(Path::new("/nonexistent/pred.txt")).unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/pred.txt"));
    }
}
