//! In-memory copy of an instrument export.

use crate::error::Result;
use encoding_rs::WINDOWS_1252;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Full text of a source file, read once and sliced on every access
#[derive(Debug, Clone)]
pub struct RawFile {
    text: Arc<str>,
}

impl RawFile {
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let text = match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        };
        Self { text: text.into() }
    }

    /// Decode raw bytes as UTF-8, falling back to Windows-1252.
    ///
    /// EC-Lab writes its MPT files in the Windows ANSI code page (e.g. `°C`
    /// in the header), which also covers the 0x80-0x9F range Latin-1 leaves
    /// to control characters.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::new(text),
            Err(err) => {
                debug!("Input is not UTF-8 ({}), decoding as Windows-1252", err.utf8_error());
                let bytes = err.into_bytes();
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
                Self::new(text.into_owned())
            }
        }
    }

    pub fn read(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines without their terminators (`\n` or `\r\n`)
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_fallback() {
        // "T/°C" in Latin-1
        let bytes = vec![b'T', b'/', 0xB0, b'C'];
        let raw = RawFile::from_bytes(bytes);
        assert_eq!(raw.text(), "T/°C");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "25 €, 0.1 µA" with the euro sign at 0x80 and micro at 0xB5
        let bytes = b"25 \x80, 0.1 \xb5A".to_vec();
        let raw = RawFile::from_bytes(bytes);
        assert_eq!(raw.text(), "25 €, 0.1 µA");
    }

    #[test]
    fn test_utf8_is_kept() {
        let raw = RawFile::from_bytes("T/°C".as_bytes().to_vec());
        assert_eq!(raw.text(), "T/°C");
    }

    #[test]
    fn test_lines_strip_crlf_and_bom() {
        let raw = RawFile::new("\u{feff}a,b\r\n0,0\r\n1,1");
        assert_eq!(raw.lines(), vec!["a,b", "0,0", "1,1"]);
    }
}
