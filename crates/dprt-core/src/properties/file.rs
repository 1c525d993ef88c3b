//! Line-oriented `keyword=value` property files.

use std::path::{Path, PathBuf};

use super::PropertySource;
use crate::error::PropertyError;

/// Properties read from a `keyword=value` text file.
///
/// Lookup is a prefix match scanned in file order: the first line that
/// starts with the keyword wins. A keyword that is a prefix of another key
/// (`dprt.fake` vs `dprt.fake.best_focus`) matches whichever line comes
/// first, so files should list the longer keys after the shorter ones.
#[derive(Debug, Clone, Default)]
pub struct FileProperties {
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl FileProperties {
    /// Load properties from a file.
    pub fn open(path: &Path) -> Result<Self, PropertyError> {
        let lines = read_lines(path)?;
        tracing::debug!("Loaded {} property lines from {:?}", lines.len(), path);
        Ok(Self {
            path: Some(path.to_path_buf()),
            lines,
        })
    }

    /// Build properties from in-memory text.
    pub fn parse(text: &str) -> Self {
        Self {
            path: None,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Re-read the backing file. No-op for in-memory properties.
    pub fn reload(&mut self) -> Result<(), PropertyError> {
        if let Some(path) = &self.path {
            self.lines = read_lines(path)?;
        }
        Ok(())
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn find_line(&self, keyword: &str) -> Option<&str> {
        self.lines
            .iter()
            .map(String::as_str)
            .find(|line| line.starts_with(keyword))
    }
}

impl PropertySource for FileProperties {
    fn get_string(&self, keyword: &str) -> Result<String, PropertyError> {
        if keyword.is_empty() {
            return Err(PropertyError::NullArgument);
        }
        let line = self
            .find_line(keyword)
            .ok_or_else(|| PropertyError::NotFound {
                keyword: keyword.to_string(),
            })?;
        let (_, value) = line
            .split_once('=')
            .ok_or_else(|| PropertyError::MalformedLine {
                keyword: keyword.to_string(),
                line: line.to_string(),
            })?;
        Ok(value.trim_end().to_string())
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, PropertyError> {
    let content = std::fs::read_to_string(path).map_err(|e| PropertyError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_after_first_equals() {
        let props = FileProperties::parse("dprt.url=http://x/?a=b\n");
        assert_eq!(props.get_string("dprt.url").unwrap(), "http://x/?a=b");
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let props = FileProperties::parse("dprt.name=ratcam \t\r\n");
        assert_eq!(props.get_string("dprt.name").unwrap(), "ratcam");
    }

    #[test]
    fn test_first_match_wins() {
        let props = FileProperties::parse("dprt.fake=true\ndprt.fake=false\n");
        assert_eq!(props.get_string("dprt.fake").unwrap(), "true");
    }

    #[test]
    fn test_prefix_match_shadows_longer_key() {
        // The shorter key is looked up but the longer key's line comes first.
        let props = FileProperties::parse("dprt.fake.best_focus=27.5\ndprt.fake=true\n");
        assert_eq!(props.get_string("dprt.fake").unwrap(), "27.5");
        assert!(props.get_bool("dprt.fake").is_err());
    }

    #[test]
    fn test_missing_keyword() {
        let props = FileProperties::parse("dprt.fake=true\n");
        let err = props.get_string("dprt.full_reduction").unwrap_err();
        assert_eq!(err.code(), 102);
        assert!(err.to_string().contains("dprt.full_reduction"));
    }

    #[test]
    fn test_line_without_separator() {
        let props = FileProperties::parse("dprt.fake\n");
        assert!(matches!(
            props.get_string("dprt.fake"),
            Err(PropertyError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_open_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dprt.properties");
        std::fs::write(&path, "dprt.fake=true\n").unwrap();

        let mut props = FileProperties::open(&path).unwrap();
        assert!(props.get_bool("dprt.fake").unwrap());
        assert_eq!(props.path(), Some(path.as_path()));

        std::fs::write(&path, "dprt.fake=false\n").unwrap();
        props.reload().unwrap();
        assert!(!props.get_bool("dprt.fake").unwrap());
    }

    #[test]
    fn test_open_missing_file() {
        let err = FileProperties::open(Path::new("/nonexistent/dprt.properties")).unwrap_err();
        assert_eq!(err.code(), 107);
    }
}
