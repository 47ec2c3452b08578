use std::io::{self, Write};

use crate::alignment::{AlignOp, AlignmentStats, GAP_SYMBOL};
use crate::errors::AlignError;

mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";

    pub const BG_RED: &str = "\x1b[41m";
    pub const BG_GREEN: &str = "\x1b[42m";
    pub const BG_YELLOW: &str = "\x1b[43m";

    pub const BOLD: &str = "\x1b[1m";
    pub const UNDERLINE: &str = "\x1b[4m";
    pub const RESET: &str = "\x1b[0m";
}

pub const DEFAULT_LINE_WIDTH: usize = 60;

const GAP_CHAR: char = GAP_SYMBOL as char;

/// Block-wise rendering of two aligned sequences, optionally with ANSI colors.
pub struct AlignmentView<'a> {
    aligned1: &'a [u8],
    aligned2: &'a [u8],
    stats: AlignmentStats,
    line_width: usize,
    color: bool,
    legend: bool,
    ruler: bool,
}

impl<'a> AlignmentView<'a> {
    /// Fails with [`AlignError::UnequalLength`] if the two rows differ in length.
    pub fn new(aligned1: &'a [u8], aligned2: &'a [u8]) -> Result<Self, AlignError> {
        let stats = AlignmentStats::from_aligned(aligned1, aligned2)?;

        Ok(Self {
            aligned1,
            aligned2,
            stats,
            line_width: DEFAULT_LINE_WIDTH,
            color: true,
            legend: true,
            ruler: true,
        })
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width.max(1);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_ruler(mut self, ruler: bool) -> Self {
        self.ruler = ruler;
        self
    }

    fn paint<W: Write>(&self, out: &mut W, style: &str, text: &str) -> io::Result<()> {
        if self.color {
            write!(out, "{style}{text}{}", ansi::RESET)
        } else {
            write!(out, "{text}")
        }
    }

    fn write_base<W: Write>(&self, out: &mut W, base: char) -> io::Result<()> {
        let style = match base {
            'A' => ansi::RED,
            'T' => ansi::BLUE,
            'G' => ansi::GREEN,
            'C' => ansi::YELLOW,
            GAP_CHAR => ansi::MAGENTA,
            _ => return write!(out, "{base}"),
        };

        self.paint(out, style, base.encode_utf8(&mut [0; 4]))
    }

    /// Symbols are decoded as UTF-8, so a multi-byte symbol is written whole
    /// (or as a replacement character when split across blocks).
    fn write_row<W: Write>(&self, out: &mut W, row: &[u8]) -> io::Result<()> {
        if !self.color {
            return write!(out, "{}", String::from_utf8_lossy(row));
        }

        for base in String::from_utf8_lossy(row).chars() {
            self.write_base(out, base)?;
        }

        Ok(())
    }

    fn write_op<W: Write>(&self, out: &mut W, op: AlignOp) -> io::Result<()> {
        match op {
            AlignOp::Match => self.paint(out, ansi::BG_GREEN, "|"),
            AlignOp::Mismatch => self.paint(out, ansi::BG_YELLOW, "x"),
            AlignOp::Insertion | AlignOp::Deletion => self.paint(out, ansi::BG_RED, " "),
        }
    }

    /// Column numbers every 10 positions plus a tick line, numbered from 1
    /// at the start of the alignment.
    fn write_ruler<W: Write>(&self, out: &mut W, start: usize, end: usize) -> io::Result<()> {
        let mut numbers = String::from("     ");
        let mut ticks = String::from("     ");
        let mut last_number_end = 0;

        for pos in start + 1..=end {
            let col = pos - start;
            if pos % 10 == 0 {
                let label = pos.to_string();
                let pad = col.saturating_sub(last_number_end + label.len());
                numbers.extend(std::iter::repeat(' ').take(pad));
                numbers.push_str(&label);
                last_number_end = col.max(last_number_end + label.len());
                ticks.push('|');
            } else if pos % 5 == 0 {
                ticks.push('+');
            } else {
                ticks.push('.');
            }
        }

        self.paint(out, ansi::CYAN, numbers.trim_end())?;
        writeln!(out)?;
        self.paint(out, ansi::CYAN, &ticks)?;
        writeln!(out)
    }

    fn write_block<W: Write>(&self, out: &mut W, start: usize, end: usize) -> io::Result<()> {
        if self.ruler {
            self.write_ruler(out, start, end)?;
        }

        self.paint(out, ansi::BOLD, "Seq1 ")?;
        self.write_row(out, &self.aligned1[start..end])?;
        writeln!(out)?;

        write!(out, "     ")?;
        for (&a, &b) in self.aligned1[start..end].iter().zip(&self.aligned2[start..end]) {
            self.write_op(out, AlignOp::classify(a, b))?;
        }
        writeln!(out)?;

        self.paint(out, ansi::BOLD, "Seq2 ")?;
        self.write_row(out, &self.aligned2[start..end])?;
        writeln!(out)?;
        writeln!(out)
    }

    fn write_legend<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Legend:")?;
        for (base, name) in [('A', "Adenine"), ('T', "Thymine"), ('G', "Guanine"), ('C', "Cytosine")] {
            self.write_base(out, base)?;
            write!(out, " : {name}  ")?;
        }
        self.write_base(out, GAP_CHAR)?;
        writeln!(out, " : Gap")?;

        for (op, name) in [(AlignOp::Match, "Match"), (AlignOp::Mismatch, "Mismatch")] {
            self.write_op(out, op)?;
            write!(out, " : {name}  ")?;
        }
        self.write_op(out, AlignOp::Insertion)?;
        writeln!(out, " : Gap")?;
        writeln!(out)
    }

    fn write_stats<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let stats = &self.stats;

        self.paint(out, ansi::BOLD, "Alignment Statistics:")?;
        writeln!(out)?;

        let rows = [
            (ansi::GREEN, "Matches", stats.matches),
            (ansi::YELLOW, "Mismatches", stats.mismatches),
            (ansi::RED, "Gaps", stats.gaps),
        ];
        for (style, name, count) in rows {
            let line = format!("{name}: {count} ({:.1}%)", stats.percentage(count));
            self.paint(out, style, &line)?;
            writeln!(out)?;
        }

        Ok(())
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        if self.legend {
            let title = if self.color {
                format!("{}{}Sequence Alignment Visualization{}", ansi::BOLD, ansi::UNDERLINE, ansi::RESET)
            } else {
                "Sequence Alignment Visualization".to_string()
            };
            writeln!(out, "{title}")?;
            writeln!(out)?;
        }

        writeln!(out, "Length: {} bases", self.aligned1.len())?;
        writeln!(out)?;

        if self.legend {
            self.write_legend(&mut out)?;
        }

        let length = self.aligned1.len();
        for start in (0..length).step_by(self.line_width) {
            let end = (start + self.line_width).min(length);
            self.write_block(&mut out, start, end)?;
        }

        self.write_stats(&mut out)
    }
}
