//! Turns sparse bucketed results into dense series.

use std::collections::BTreeMap;

/// Reindex `sparse` over every key in `full_range`, in the order of `full_range`.
///
/// Keys missing from `sparse` get the value produced by `zero`. Keys in `sparse`
/// that are outside of `full_range` are dropped. If a key appears more than once
/// in `sparse`, the last value wins.
pub fn reindex_dense<K, V>(
    sparse: impl IntoIterator<Item = (K, V)>,
    full_range: impl IntoIterator<Item = K>,
    zero: impl Fn() -> V,
) -> Vec<(K, V)>
where
    K: Ord + Copy,
{
    let mut lookup: BTreeMap<K, V> = sparse.into_iter().collect();

    full_range
        .into_iter()
        .map(|key| {
            let value = lookup.remove(&key).unwrap_or_else(&zero);
            (key, value)
        })
        .collect()
}
