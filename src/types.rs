//src/types.rs

use ahash::AHashMap;

/// Taxon id for entries whose taxonomy annotation is absent or unparsable.
/// `1` is the NCBI root, which never matches a lineage query.
pub const UNKNOWN_TAXON: u32 = 1;

/// One cross-reference from a cluster's member list.
#[derive(Debug, Clone)]
pub struct MemberRef {
    /// Database type of the reference itself, e.g. "UniParc ID" or
    /// "UniProtKB ID".
    pub db_type: String,
    pub db_id: String,
    /// Whether this member is the cluster's seed sequence.
    pub is_seed: bool,
    /// The "UniParc ID" property, when annotated separately from the
    /// reference's own type/id pair.
    pub uniparc_id: Option<String>,
}

/// One cluster entry from the UniRef stream, flattened to plain data.
///
/// Entries are transient: one is materialized per stream element and dropped
/// before the next is read, so peak memory stays bounded regardless of
/// stream length.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full cluster id including the namespace prefix, e.g. "UniRef90_P12345".
    pub id: String,
    /// Display name; names containing "Fragment" mark partial sequences.
    pub name: String,
    pub common_tax_id: u32,
    /// Source organism of the representative member ("" if absent).
    pub rep_organism: String,
    pub rep_tax_id: u32,
    pub rep_protein_name: String,
    /// Whether the representative member is itself the seed.
    pub rep_is_seed: bool,
    /// Embedded representative sequence, present when the representative
    /// is the seed.
    pub rep_sequence: Option<String>,
    /// Member cross-references in document order.
    pub members: Vec<MemberRef>,
}

impl Entry {
    pub fn new(id: String) -> Self {
        Self {
            id,
            name: String::new(),
            common_tax_id: UNKNOWN_TAXON,
            rep_organism: String::new(),
            rep_tax_id: UNKNOWN_TAXON,
            rep_protein_name: String::new(),
            rep_is_seed: false,
            rep_sequence: None,
            members: Vec::new(),
        }
    }
}

/// Output metadata held back until the seed sequence is found in the
/// secondary stream.
#[derive(Debug, Clone)]
pub struct DeferredRecord {
    pub cluster_id: String,
    pub protein_name: String,
}

/// Pending records keyed by UniParc accession. Built by pass one, drained by
/// pass two; passed by reference between the phases.
pub type DeferredMap = AHashMap<String, DeferredRecord>;
