// src/lib.rs
pub mod error;
pub mod fasta;
pub mod filter;
pub mod output;
pub mod resolve;
pub mod taxdb;
pub mod types;
pub mod uniref;

use std::path::Path;

pub use crate::error::ExtractError;
use crate::filter::filter_entries;
use crate::output::OutputWriter;
use crate::resolve::resolve_deferred;
use crate::taxdb::TaxonomyIndex;

/// Counts from a full extraction run. `unresolved_records` is the number of
/// deferred accessions never seen in the UniParc stream; that is a
/// completeness observation, not an error.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSummary {
    pub entries_seen: u64,
    pub fragments_skipped: u64,
    pub direct_records: u64,
    pub deferred_records: u64,
    pub resolved_records: u64,
    pub unresolved_records: u64,
    pub unexpected_seed_types: u64,
}

impl ExtractionSummary {
    pub fn total_records(&self) -> u64 {
        self.direct_records + self.resolved_records
    }
}

/// Runs the full two-pass extraction.
///
/// 1. Loads the taxonomy parent table into an in-memory ancestor index.
/// 2. Streams the UniRef XML once, writing directly resolvable bacterial and
///    phage clusters and collecting deferred UniParc accessions.
/// 3. Streams the UniParc FASTA once, completing the deferred records.
///
/// The passes are strictly sequential: pass two needs the complete deferred
/// table, because the UniParc archive cannot economically be scanned twice.
/// On error, outputs already flushed remain on disk (partial-output
/// semantics).
pub fn extract_lineage(
    taxonomy_path: &Path,
    uniref_path: &Path,
    uniparc_path: &Path,
    fasta_out: &Path,
    tsv_out: &Path,
) -> Result<ExtractionSummary, ExtractError> {
    let taxonomy = TaxonomyIndex::load(taxonomy_path)?;
    log::info!("taxonomy index loaded: {} nodes", taxonomy.len());

    let mut writer = OutputWriter::create(fasta_out, tsv_out)?;

    let entries = uniref::open_entries(uniref_path)?;
    let (mut deferred, counts) = filter_entries(entries, &taxonomy, &mut writer)?;
    log::info!(
        "pass one complete: {} entries, {} written directly, {} deferred to UniParc",
        counts.entries,
        counts.direct,
        counts.deferred
    );

    let records = fasta::open_fasta(uniparc_path)?;
    let resolved = resolve_deferred(records, &mut deferred, &mut writer)?;
    writer.flush()?;

    let summary = ExtractionSummary {
        entries_seen: counts.entries,
        fragments_skipped: counts.fragments_skipped,
        direct_records: counts.direct,
        deferred_records: counts.deferred,
        resolved_records: resolved,
        unresolved_records: deferred.len() as u64,
        unexpected_seed_types: counts.unexpected_seed_types,
    };
    log::info!(
        "pass two complete: {} seed sequences resolved, {} unresolved",
        summary.resolved_records,
        summary.unresolved_records
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;

    const TAXONOMY: &str = "1\t1\n2\t1\n10\t2\n99\t10\n";

    const UNIREF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<UniRef90 xmlns="http://uniprot.org/uniref">
  <entry id="UniRef90_P12345">
    <name>Cluster: DNA polymerase I</name>
    <property type="common taxon ID" value="99"/>
    <representativeMember>
      <dbReference type="UniProtKB ID" id="DPO1_ECOLI">
        <property type="protein name" value="DNA polymerase I"/>
        <property type="isSeed" value="true"/>
      </dbReference>
      <sequence length="3" checksum="X">MKT</sequence>
    </representativeMember>
  </entry>
  <entry id="UniRef90_L00001">
    <name>Cluster: Tail fiber protein</name>
    <property type="common taxon ID" value="1"/>
    <representativeMember>
      <dbReference type="UniProtKB ID" id="TFP_BPLAM">
        <property type="protein name" value="Tail fiber protein"/>
        <property type="source organism" value="Enterobacteria phage lambda"/>
      </dbReference>
    </representativeMember>
    <member>
      <dbReference type="UniProtKB ID" id="TFP_OTHER">
        <property type="isSeed" value="true"/>
        <property type="UniParc ID" value="UPI000001"/>
      </dbReference>
    </member>
  </entry>
  <entry id="UniRef90_F00001">
    <name>Cluster: Uncharacterized protein (Fragment)</name>
    <property type="common taxon ID" value="99"/>
    <representativeMember>
      <dbReference type="UniProtKB ID" id="YF_ECOLI">
        <property type="isSeed" value="true"/>
      </dbReference>
      <sequence length="2" checksum="X">MK</sequence>
    </representativeMember>
  </entry>
  <entry id="UniRef90_U00001">
    <name>Cluster: Odd seed</name>
    <property type="common taxon ID" value="99"/>
    <representativeMember>
      <dbReference type="UniProtKB ID" id="ODD_ECOLI">
        <property type="protein name" value="Odd seed"/>
      </dbReference>
    </representativeMember>
    <member>
      <dbReference type="UniProtKB ID" id="ODD_MEMBER">
        <property type="isSeed" value="true"/>
      </dbReference>
    </member>
  </entry>
  <entry id="UniRef90_H00001">
    <name>Cluster: Hemoglobin</name>
    <property type="common taxon ID" value="1"/>
    <representativeMember>
      <dbReference type="UniProtKB ID" id="HBB_HUMAN">
        <property type="source organism" value="Homo sapiens"/>
        <property type="isSeed" value="true"/>
      </dbReference>
      <sequence length="2" checksum="X">MV</sequence>
    </representativeMember>
  </entry>
</UniRef90>
"#;

    // UPI000001 appears twice; only the first occurrence may resolve.
    // UPI999999 matches nothing and is ignored.
    const UNIPARC_FASTA: &str =
        ">UPI999999 status=active\nAAAA\n>UPI000001 status=active\nacgtACGT\n>UPI000001\nGGGG\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        taxonomy: PathBuf,
        uniref: PathBuf,
        uniparc: PathBuf,
        fasta_out: PathBuf,
        tsv_out: PathBuf,
    }

    fn write_gz(path: &Path, contents: &str) {
        let file = fs::File::create(path).expect("create gz fixture");
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(contents.as_bytes()).expect("write gz fixture");
        enc.finish().expect("finish gz fixture");
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("temp dir");
        let taxonomy = dir.path().join("nodes.dmp");
        let uniref = dir.path().join("uniref90.xml.gz");
        let uniparc = dir.path().join("uniparc_active.fasta.gz");
        let fasta_out = dir.path().join("psc.faa");
        let tsv_out = dir.path().join("psc.tsv");

        fs::write(&taxonomy, TAXONOMY).expect("write taxonomy");
        write_gz(&uniref, UNIREF_XML);
        write_gz(&uniparc, UNIPARC_FASTA);

        Fixture {
            _dir: dir,
            taxonomy,
            uniref,
            uniparc,
            fasta_out,
            tsv_out,
        }
    }

    fn run(f: &Fixture) -> ExtractionSummary {
        extract_lineage(&f.taxonomy, &f.uniref, &f.uniparc, &f.fasta_out, &f.tsv_out)
            .expect("extraction succeeds")
    }

    #[test]
    fn end_to_end_filters_and_resolves() {
        let f = fixture();
        let summary = run(&f);

        assert_eq!(summary.entries_seen, 5);
        assert_eq!(summary.fragments_skipped, 1);
        assert_eq!(summary.direct_records, 1);
        assert_eq!(summary.deferred_records, 1);
        assert_eq!(summary.resolved_records, 1);
        assert_eq!(summary.unresolved_records, 0);
        assert_eq!(summary.unexpected_seed_types, 1);
        assert_eq!(summary.total_records(), 2);

        let fasta = fs::read_to_string(&f.fasta_out).unwrap();
        let tsv = fs::read_to_string(&f.tsv_out).unwrap();

        // Direct records come first, deferred ones follow in UniParc order.
        assert_eq!(fasta, ">P12345\nMKT\n>L00001\nACGTACGT\n");
        assert_eq!(
            tsv,
            "P12345\tDNA polymerase I\t3\nL00001\tTail fiber protein\t8\n"
        );
    }

    #[test]
    fn metadata_lengths_match_sequence_lines() {
        let f = fixture();
        run(&f);

        let fasta = fs::read_to_string(&f.fasta_out).unwrap();
        let tsv = fs::read_to_string(&f.tsv_out).unwrap();

        let seqs: Vec<&str> = fasta
            .lines()
            .filter(|l| !l.starts_with('>'))
            .collect();
        let rows: Vec<&str> = tsv.lines().collect();
        assert_eq!(seqs.len(), rows.len());
        for (seq, row) in seqs.iter().zip(&rows) {
            let len: usize = row.split('\t').nth(2).unwrap().parse().unwrap();
            assert_eq!(len, seq.len());
        }
    }

    #[test]
    fn cluster_ids_are_unique_across_the_table() {
        let f = fixture();
        run(&f);

        let tsv = fs::read_to_string(&f.tsv_out).unwrap();
        let mut ids: Vec<&str> = tsv
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn reruns_are_byte_identical() {
        let f = fixture();
        run(&f);
        let fasta_first = fs::read(&f.fasta_out).unwrap();
        let tsv_first = fs::read(&f.tsv_out).unwrap();

        run(&f);
        assert_eq!(fs::read(&f.fasta_out).unwrap(), fasta_first);
        assert_eq!(fs::read(&f.tsv_out).unwrap(), tsv_first);
    }

    #[test]
    fn unresolved_accessions_are_counted_not_fatal() {
        let f = fixture();
        // UniParc stream without the pending accession.
        write_gz(&f.uniparc, ">UPI999999\nAAAA\n");

        let summary = run(&f);
        assert_eq!(summary.resolved_records, 0);
        assert_eq!(summary.unresolved_records, 1);

        let fasta = fs::read_to_string(&f.fasta_out).unwrap();
        assert_eq!(fasta, ">P12345\nMKT\n");
    }

    #[test]
    fn missing_input_is_fatal() {
        let f = fixture();
        let missing = f.taxonomy.with_file_name("does-not-exist.dmp");
        let result = extract_lineage(&missing, &f.uniref, &f.uniparc, &f.fasta_out, &f.tsv_out);
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
