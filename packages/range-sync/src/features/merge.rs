//! Merge engine: reconcile two cluster sets under a [`MergePolicy`]
//!
//! Pure functions, no I/O. Sources read in parallel by a caller can be folded
//! here in any order the caller chooses; order matters for `merge` and
//! `override`.

use crate::domain::{ClusterSet, MergePolicy};

/// Combine `added` into `main` according to `policy`.
///
/// `NoMerge` returns only the clusters `added` introduces, not a full set.
/// Use [`fold`] to get the union.
pub fn merge(main: ClusterSet, added: ClusterSet, policy: MergePolicy) -> ClusterSet {
    match policy {
        MergePolicy::Merge => merge_keys(main, added),
        MergePolicy::Override => override_clusters(main, added),
        MergePolicy::NoMerge => new_clusters_only(&main, added),
    }
}

/// Like [`merge`], but `NoMerge` results are unioned back into `main`
pub fn fold(main: ClusterSet, added: ClusterSet, policy: MergePolicy) -> ClusterSet {
    match policy {
        MergePolicy::NoMerge => {
            let fresh = new_clusters_only(&main, added);
            let mut main = main;
            main.extend(fresh);
            main
        }
        _ => merge(main, added, policy),
    }
}

fn merge_keys(mut main: ClusterSet, added: ClusterSet) -> ClusterSet {
    for (name, data) in added {
        match main.get_mut(&name) {
            Some(existing) => existing.extend(data),
            None => {
                main.insert(name, data);
            }
        }
    }
    main
}

fn override_clusters(mut main: ClusterSet, added: ClusterSet) -> ClusterSet {
    main.extend(added);
    main
}

fn new_clusters_only(main: &ClusterSet, added: ClusterSet) -> ClusterSet {
    added
        .into_iter()
        .filter(|(name, _)| !main.contains(name))
        .collect()
}
