use std::io::{self, Write};
use std::ops::AddAssign;

use serde::Serialize;
use tracing::warn;

use crate::io::SequenceRecord;

/// G/C counts of a nucleotide sequence.
///
/// `total` counts every symbol except the ambiguous base `N`, so the
/// percentage is relative to the called bases only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GcContent {
    pub gc: usize,
    pub total: usize,
}

impl GcContent {
    pub fn from_sequence(seq: &[u8]) -> Self {
        seq.iter().fold(Self::default(), |mut counts, &base| {
            if matches!(base, b'G' | b'C' | b'g' | b'c') {
                counts.gc += 1;
            }

            if !matches!(base, b'N' | b'n') {
                counts.total += 1;
            }

            counts
        })
    }

    /// `None` if the sequence had no called bases.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.gc as f64 / self.total as f64 * 100.0)
        }
    }
}

impl AddAssign for GcContent {
    fn add_assign(&mut self, rhs: Self) {
        self.gc += rhs.gc;
        self.total += rhs.total;
    }
}

/// Write the GC content of each record followed by the totals over all of
/// them. Records without called bases are skipped, but still reported in
/// the log.
pub fn write_gc_report<W: Write>(mut out: W, records: &[SequenceRecord]) -> io::Result<GcContent> {
    let mut total = GcContent::default();

    for (i, record) in records.iter().enumerate() {
        let counts = GcContent::from_sequence(&record.sequence);
        let Some(percentage) = counts.percentage() else {
            warn!("Sequence {i} ({}) has no called bases, skipping.", record.name);
            continue;
        };

        writeln!(out, "Sequence {i} ({}):", record.name)?;
        writeln!(out, "GC count: {}", counts.gc)?;
        writeln!(out, "Percentage: {percentage:.2}%")?;
        writeln!(out)?;
        total += counts;
    }

    writeln!(out, "Total Statistics:")?;
    writeln!(out, "Total GC count: {}", total.gc)?;
    writeln!(out, "Total base count: {}", total.total)?;
    match total.percentage() {
        Some(percentage) => writeln!(out, "Overall GC percentage: {percentage:.2}%")?,
        None => writeln!(out, "Overall GC percentage: n/a")?,
    }

    Ok(total)
}


#[cfg(test)]
mod tests {
    use super::{write_gc_report, GcContent};
    use crate::io::SequenceRecord;

    #[test]
    fn test_gc_counts() {
        let counts = GcContent::from_sequence(b"ACGTNNgcat");
        assert_eq!(counts, GcContent { gc: 4, total: 8 });
        assert_eq!(counts.percentage(), Some(50.0));
    }

    #[test]
    fn test_no_called_bases() {
        assert_eq!(GcContent::from_sequence(b"").percentage(), None);
        assert_eq!(GcContent::from_sequence(b"NNnn").percentage(), None);
    }

    #[test]
    fn test_sum() {
        let mut total = GcContent::from_sequence(b"GGCC");
        total += GcContent::from_sequence(b"AATT");
        assert_eq!(total, GcContent { gc: 4, total: 8 });
    }

    fn record(name: &str, sequence: &[u8]) -> SequenceRecord {
        SequenceRecord { name: name.to_string(), sequence: sequence.to_vec() }
    }

    #[test]
    fn test_report_with_totals() {
        let records = [record("first", b"GGCA"), record("unknown", b"NNN"), record("second", b"ATNNAT")];

        let mut out = Vec::new();
        let total = write_gc_report(&mut out, &records).unwrap();
        assert_eq!(total, GcContent { gc: 3, total: 8 });

        let expected = [
            "Sequence 0 (first):",
            "GC count: 3",
            "Percentage: 75.00%",
            "",
            "Sequence 2 (second):",
            "GC count: 0",
            "Percentage: 0.00%",
            "",
            "Total Statistics:",
            "Total GC count: 3",
            "Total base count: 8",
            "Overall GC percentage: 37.50%",
            "",
        ].join("\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_report_without_bases() {
        let mut out = Vec::new();
        let total = write_gc_report(&mut out, &[record("empty", b"")]).unwrap();
        assert_eq!(total, GcContent::default());

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("Total Statistics:\n"));
        assert!(output.ends_with("Total base count: 0\nOverall GC percentage: n/a\n"));
    }
}
