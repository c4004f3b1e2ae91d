//src/fasta.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// One FASTA record: accession (header token before the first whitespace)
/// and the concatenated sequence body.
#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub seq: String,
}

/// Opens a file for buffered reading, wrapping it in a `MultiGzDecoder` when
/// the path ends with ".gz". Shared by the FASTA and UniRef readers.
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

/// Streaming FASTA reader.
///
/// Yields one record at a time in a single forward pass; the file is never
/// held in memory, which matters for the UniParc archive (tens of GB).
/// Wrapped sequence lines are concatenated.
pub struct FastaReader<R: BufRead> {
    reader: R,
    pending_header: Option<String>,
    line: String,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending_header: None,
            line: String::new(),
            done: false,
        }
    }
}

/// Opens a (possibly gzipped) FASTA file as a streaming record iterator.
pub fn open_fasta<P: AsRef<Path>>(path: P) -> io::Result<FastaReader<Box<dyn BufRead>>> {
    Ok(FastaReader::new(open_reader(path)?))
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = io::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Scan forward to the next header unless one was left over from the
        // previous record.
        while self.pending_header.is_none() {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    let trimmed = self.line.trim_end();
                    if let Some(header) = trimmed.strip_prefix('>') {
                        self.pending_header = Some(header.to_string());
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let header = self.pending_header.take()?;
        let mut seq = String::new();

        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(_) => {
                    let trimmed = self.line.trim_end();
                    if let Some(next_header) = trimmed.strip_prefix('>') {
                        self.pending_header = Some(next_header.to_string());
                        break;
                    }
                    seq.push_str(trimmed);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let id = header
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        Some(Ok(FastaRecord { id, seq }))
    }
}
