//src/output.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Append-only sink for the two co-indexed output artifacts: the FASTA
/// sequence archive and the tab-separated metadata table.
///
/// Both phases write through the same instance, so record order in the
/// outputs is exactly resolution order.
pub struct OutputWriter<W: Write> {
    fasta: W,
    tsv: W,
    records: u64,
}

impl OutputWriter<BufWriter<File>> {
    /// Creates (truncating) both output files.
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(
        fasta_path: P,
        tsv_path: Q,
    ) -> io::Result<Self> {
        let fasta = BufWriter::new(File::create(fasta_path)?);
        let tsv = BufWriter::new(File::create(tsv_path)?);
        Ok(Self::from_writers(fasta, tsv))
    }
}

impl<W: Write> OutputWriter<W> {
    pub fn from_writers(fasta: W, tsv: W) -> Self {
        Self {
            fasta,
            tsv,
            records: 0,
        }
    }

    /// Writes one record to both artifacts:
    /// a `>id` / sequence pair to the FASTA sink and an
    /// `id<TAB>protein name<TAB>length` row to the TSV sink.
    pub fn write_record(
        &mut self,
        cluster_id: &str,
        protein_name: &str,
        seq: &str,
    ) -> io::Result<()> {
        writeln!(self.fasta, ">{cluster_id}")?;
        writeln!(self.fasta, "{seq}")?;
        writeln!(self.tsv, "{cluster_id}\t{protein_name}\t{}", seq.len())?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.fasta.flush()?;
        self.tsv.flush()
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Consumes the writer, handing back both sinks.
    pub fn into_parts(self) -> (W, W) {
        (self.fasta, self.tsv)
    }
}
