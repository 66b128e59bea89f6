// pipeline/group.rs
// Phase 3: Partition located reflexes into cognate sets

use super::enrich::LocatedReflex;
use indexmap::IndexMap;

/// Field to partition on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    ProtoForm,
    GlottoCode,
}

impl GroupKey {
    fn of<'a>(&self, row: &'a LocatedReflex) -> &'a str {
        match self {
            GroupKey::ProtoForm => &row.protoform,
            GroupKey::GlottoCode => &row.glottocode,
        }
    }
}

/// Group rows by `key`. Keys and the rows under each key keep first-seen order.
pub fn group_by(rows: Vec<LocatedReflex>, key: GroupKey) -> IndexMap<String, Vec<LocatedReflex>> {
    let mut grouped: IndexMap<String, Vec<LocatedReflex>> = IndexMap::new();
    for row in rows {
        let k = key.of(&row).to_string();
        grouped.entry(k).or_default().push(row);
    }
    grouped
}
