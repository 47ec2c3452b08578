use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta::{self as fasta, record::{Definition, Sequence}, Record};

use crate::alignment::AlignmentResult;
use crate::errors::AlignError;

/// A named sequence read from a FASTA file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

impl From<Record> for SequenceRecord {
    fn from(record: Record) -> Self {
        let mut sequence = record.sequence().as_ref().to_vec();
        sequence.retain(|c| !c.is_ascii_whitespace());

        Self {
            name: String::from_utf8_lossy(record.name()).into_owned(),
            sequence,
        }
    }
}

/// Wrap `inner` in a gzip decoder when needed.
pub fn decoded_reader<R>(inner: R, is_gzipped: bool) -> Box<dyn BufRead>
where
    R: Read + 'static,
{
    if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(inner)))
    } else {
        Box::new(BufReader::new(inner))
    }
}

/// Open a plain or gzipped (`.gz` suffix) FASTA file.
pub fn open_fasta(path: &Path) -> Result<fasta::io::Reader<Box<dyn BufRead>>, AlignError> {
    let is_gzipped = path
        .file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false);

    let file = File::open(path)
        .map_err(|source| AlignError::FileRead { path: path.to_owned(), source })?;

    Ok(fasta::io::Reader::new(decoded_reader(file, is_gzipped)))
}

/// Read all records, with any whitespace left in the sequence removed.
pub fn read_sequences<R>(mut reader: fasta::io::Reader<R>) -> Result<Vec<SequenceRecord>, AlignError>
where
    R: BufRead,
{
    let records = reader.records()
        .map(|result| result.map(SequenceRecord::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Load the first sequence of a FASTA file, ignoring any records after it.
pub fn load_first_sequence(path: &Path) -> Result<SequenceRecord, AlignError> {
    let mut reader = open_fasta(path)?;
    let record = reader.records()
        .next()
        .ok_or_else(|| AlignError::NoSequences(path.to_owned()))?
        .map_err(|source| AlignError::FileRead { path: path.to_owned(), source })?;

    Ok(record.into())
}

/// Write both aligned rows, gaps included, as FASTA records.
pub fn write_aligned_pair<W>(
    output: W,
    name1: &str,
    name2: &str,
    result: &AlignmentResult,
) -> Result<(), AlignError>
where
    W: Write,
{
    let mut writer = fasta::io::Writer::new(output);

    for (name, aligned) in [(name1, result.aligned1()), (name2, result.aligned2())] {
        let record = Record::new(
            Definition::new(name, None),
            Sequence::from(aligned.to_vec()),
        );

        writer.write_record(&record)?;
    }

    Ok(())
}
