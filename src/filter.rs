//src/filter.rs

use std::io::Write;

use ahash::AHashMap;

use crate::error::ExtractError;
use crate::output::OutputWriter;
use crate::taxdb::TaxonomyIndex;
use crate::types::{DeferredMap, DeferredRecord, Entry};

/// The Bacteria superkingdom; entries are kept when their taxon lies under
/// this node.
pub const BACTERIA_TAXON: u32 = 2;

/// Namespace prefix stripped from cluster ids before output.
pub const CLUSTER_PREFIX: &str = "UniRef90_";

/// The only seed reference type the second pass can resolve.
pub const UNIPARC_DB_TYPE: &str = "UniParc ID";

/// Case-insensitive organism-name keyword for the secondary inclusion rule.
const PHAGE_KEYWORD: &str = "phage";

/// Pass-one tallies, reported in the final summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterCounts {
    pub entries: u64,
    pub fragments_skipped: u64,
    pub direct: u64,
    pub deferred: u64,
    pub unexpected_seed_types: u64,
}

/// Pass one: classify every cluster entry, writing directly resolvable
/// records and registering the rest in the deferred table.
///
/// Entries are consumed one at a time and dropped before the next is read.
/// The returned table is final: pass two relies on it being fully populated.
pub fn filter_entries<I, W>(
    entries: I,
    taxonomy: &TaxonomyIndex,
    writer: &mut OutputWriter<W>,
) -> Result<(DeferredMap, FilterCounts), ExtractError>
where
    I: IntoIterator<Item = Result<Entry, ExtractError>>,
    W: Write,
{
    let mut deferred: DeferredMap = AHashMap::new();
    let mut counts = FilterCounts::default();

    for entry in entries {
        let entry = entry?;
        counts.entries += 1;
        if counts.entries % 1_000_000 == 0 {
            log::info!("processed {} entries", counts.entries);
        }

        // Protein fragments never produce output.
        if entry.name.contains("Fragment") {
            counts.fragments_skipped += 1;
            continue;
        }

        let included = taxonomy.is_descendant(entry.common_tax_id, BACTERIA_TAXON)
            || taxonomy.is_descendant(entry.rep_tax_id, BACTERIA_TAXON)
            || entry.rep_organism.to_lowercase().contains(PHAGE_KEYWORD);
        if !included {
            continue;
        }

        let cluster_id = entry.id.strip_prefix(CLUSTER_PREFIX).unwrap_or(&entry.id);

        if entry.rep_is_seed {
            // The representative is the seed; its embedded sequence resolves
            // the record immediately.
            match &entry.rep_sequence {
                Some(seq) => {
                    writer.write_record(cluster_id, &entry.rep_protein_name, &seq.to_uppercase())?;
                    counts.direct += 1;
                }
                None => {
                    log::warn!(
                        "representative of {cluster_id} is marked as seed but carries no sequence"
                    );
                }
            }
        } else if let Some(member) = entry.members.iter().find(|m| m.is_seed) {
            // Only the first seed member counts. Prefer its UniParc ID
            // property, falling back to the reference's own type/id pair.
            let (seed_type, seed_id) = match &member.uniparc_id {
                Some(id) => (UNIPARC_DB_TYPE, id.as_str()),
                None => (member.db_type.as_str(), member.db_id.as_str()),
            };

            if seed_type == UNIPARC_DB_TYPE {
                deferred.insert(
                    seed_id.to_string(),
                    DeferredRecord {
                        cluster_id: cluster_id.to_string(),
                        protein_name: entry.rep_protein_name.clone(),
                    },
                );
                counts.deferred += 1;
            } else {
                // Cannot be resolved by the UniParc pass; dropped with a
                // diagnostic rather than failing the run.
                log::warn!(
                    "unexpected seed reference type: cluster={cluster_id} type={seed_type} id={seed_id}"
                );
                counts.unexpected_seed_types += 1;
            }
        }
    }

    Ok((deferred, counts))
}
