//src/resolve.rs

use std::io::{self, Write};

use crate::error::ExtractError;
use crate::fasta::FastaRecord;
use crate::output::OutputWriter;
use crate::types::DeferredMap;

/// Pass two: drain the deferred table against the UniParc archive.
///
/// The archive is read exactly once, in a single linear pass; it is too
/// large to index or re-scan. Each accession resolves at most one record:
/// the key is removed on first match, so duplicate accessions later in the
/// stream find nothing. Returns the number of records resolved; keys still
/// in the table afterwards were never seen in the stream.
pub fn resolve_deferred<I, W>(
    records: I,
    deferred: &mut DeferredMap,
    writer: &mut OutputWriter<W>,
) -> Result<u64, ExtractError>
where
    I: IntoIterator<Item = io::Result<FastaRecord>>,
    W: Write,
{
    let mut resolved = 0u64;

    for record in records {
        if deferred.is_empty() {
            break;
        }
        let record = record?;
        if let Some(pending) = deferred.remove(&record.id) {
            writer.write_record(
                &pending.cluster_id,
                &pending.protein_name,
                &record.seq.to_uppercase(),
            )?;
            resolved += 1;
        }
    }

    Ok(resolved)
}
