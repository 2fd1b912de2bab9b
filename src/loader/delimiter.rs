//! Delimiter detection for plain CSV files.

use std::fmt;

/// Guesses the field delimiter from a few sample lines
pub trait DelimiterDetector: fmt::Debug + Send + Sync {
    fn detect(&self, sample: &[&str]) -> Option<u8>;
}

/// Picks the candidate that occurs the same, non-zero number of times on every
/// sampled line, preferring the one that splits lines into the most fields.
#[derive(Debug, Clone)]
pub struct SniffingDetector {
    sample_lines: usize,
    candidates: Vec<u8>,
}

impl Default for SniffingDetector {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SniffingDetector {
    pub fn new(sample_lines: usize) -> Self {
        Self {
            sample_lines: sample_lines.max(1),
            candidates: vec![b',', b'\t', b';', b'|'],
        }
    }

    fn count(line: &str, candidate: u8) -> usize {
        line.bytes().filter(|&b| b == candidate).count()
    }
}

impl DelimiterDetector for SniffingDetector {
    fn detect(&self, sample: &[&str]) -> Option<u8> {
        let lines: Vec<&str> = sample
            .iter()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .take(self.sample_lines)
            .collect();

        if lines.is_empty() {
            return None;
        }

        let mut best: Option<(u8, usize)> = None;
        for &candidate in &self.candidates {
            let first = Self::count(lines[0], candidate);
            if first == 0 {
                continue;
            }
            if lines.iter().any(|line| Self::count(line, candidate) != first) {
                continue;
            }
            if best.is_none_or(|(_, count)| first > count) {
                best = Some((candidate, first));
            }
        }

        best.map(|(candidate, _)| candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_comma() {
        let detector = SniffingDetector::default();
        assert_eq!(detector.detect(&["0,0", "1,1"]), Some(b','));
    }

    #[test]
    fn test_detects_tab_over_inconsistent_comma() {
        let detector = SniffingDetector::default();
        assert_eq!(detector.detect(&["1\t0,5\t3", "2\t1\t4"]), Some(b'\t'));
    }

    #[test]
    fn test_prefers_semicolon_with_decimal_commas() {
        let detector = SniffingDetector::new(3);
        assert_eq!(
            detector.detect(&["0,1;0,2;0,3", "1,5;2;3", "2;3,5;4"]),
            Some(b';')
        );
    }

    #[test]
    fn test_leading_empty_cell_keeps_its_delimiter() {
        let detector = SniffingDetector::default();
        assert_eq!(detector.detect(&["\t7", "2\t3"]), Some(b'\t'));
        assert_eq!(detector.detect(&[",2,", "1,,3\r"]), Some(b','));
    }

    #[test]
    fn test_single_column_has_no_delimiter() {
        let detector = SniffingDetector::default();
        assert_eq!(detector.detect(&["1", "2"]), None);
        assert_eq!(detector.detect(&[]), None);
    }
}
