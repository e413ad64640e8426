use std::collections::BTreeSet;

use crate::PairId;

/// Expand a comma-separated list of ids and inclusive ranges (`"0-2,5,9-7"`)
/// into a sorted, duplicate-free list.
///
/// Range bounds may be given in either order. Tokens that are not valid
/// non-negative integers are dropped without failing the whole list.
pub fn expand_id_ranges(spec: &str) -> Vec<PairId> {
    let mut ids = BTreeSet::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>())
                else {
                    tracing::debug!(token, "Dropping invalid range token");
                    continue;
                };
                let (low, high) = if start <= end { (start, end) } else { (end, start) };
                ids.extend((low..=high).map(PairId::new));
            }
            None => match token.parse::<u32>() {
                Ok(id) => {
                    ids.insert(PairId::new(id));
                }
                Err(_) => tracing::debug!(token, "Dropping invalid id token"),
            },
        }
    }

    ids.into_iter().collect()
}
