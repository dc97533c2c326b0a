//! Where the source text comes from

use crate::error::TypingError;
use std::fs;
use std::path::PathBuf;

/// A provider of the text to type
pub trait ClipboardSource {
    fn read(&mut self) -> Result<String, TypingError>;
}

/// Read from `source`, rejecting empty content before anything is typed.
pub fn read_nonempty(source: &mut dyn ClipboardSource) -> Result<String, TypingError> {
    let text = source.read()?;
    if text.is_empty() {
        log::warn!("nothing to type: source text is empty");
        return Err(TypingError::EmptyClipboard);
    }
    Ok(text)
}

/// Reads the source text from a file instead of the clipboard
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClipboardSource for FileSource {
    fn read(&mut self) -> Result<String, TypingError> {
        fs::read_to_string(&self.path).map_err(|e| {
            TypingError::Clipboard(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(feature = "desktop")]
pub use desktop::SystemClipboard;

#[cfg(feature = "desktop")]
mod desktop {
    use super::ClipboardSource;
    use crate::error::TypingError;
    use arboard::Clipboard;

    /// The OS clipboard
    pub struct SystemClipboard {
        clipboard: Clipboard,
    }

    impl SystemClipboard {
        pub fn new() -> Result<Self, TypingError> {
            let clipboard = Clipboard::new().map_err(|e| {
                TypingError::Clipboard(format!("Failed to initialize clipboard: {}", e))
            })?;
            Ok(Self { clipboard })
        }
    }

    impl ClipboardSource for SystemClipboard {
        fn read(&mut self) -> Result<String, TypingError> {
            match self.clipboard.get_text() {
                Ok(text) => Ok(text),
                // arboard reports an empty clipboard as an error of its own
                Err(arboard::Error::ContentNotAvailable) => {
                    log::warn!("clipboard holds no text, treating it as empty");
                    Ok(String::new())
                }
                Err(e) => Err(TypingError::Clipboard(format!(
                    "Failed to read clipboard: {}",
                    e
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Fixed(&'static str);

    impl ClipboardSource for Fixed {
        fn read(&mut self) -> Result<String, TypingError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(read_nonempty(&mut Fixed("")), Err(TypingError::EmptyClipboard));
    }

    #[test]
    fn test_whitespace_is_content() {
        assert_eq!(read_nonempty(&mut Fixed("\n")), Ok("\n".to_string()));
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "def f():\n\treturn 1\n").unwrap();
        let mut source = FileSource::new(file.path());
        assert_eq!(read_nonempty(&mut source).unwrap(), "def f():\n\treturn 1\n");
    }

    #[test]
    fn test_missing_file() {
        let mut source = FileSource::new("/definitely/not/here.txt");
        assert!(matches!(
            read_nonempty(&mut source),
            Err(TypingError::Clipboard(_))
        ));
    }
}
