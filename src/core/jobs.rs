//! Output-aware job dispatch.
//!
//! Jobs that write the same output file run one after another in input
//! order, so the last one wins with a whole file. Distinct outputs run on
//! the rayon pool when parallel dispatch is requested.

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::warn;

/// Indices of `outputs` grouped by path, groups and members in input order.
pub fn group_by_output(outputs: &[PathBuf]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slots: HashMap<&PathBuf, usize> = HashMap::new();
    for (i, path) in outputs.iter().enumerate() {
        let slot = *slots.entry(path).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }
    groups
}

/// Run `job` over `items`; results come back in input order.
///
/// `output` names the file each item writes. Items sharing a file are
/// never run concurrently and the collision is logged once per file.
pub fn run_by_output<T, R, O, F>(items: &[T], output: O, parallel: bool, job: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    O: Fn(&T) -> PathBuf,
    F: Fn(&T) -> R + Sync,
{
    let outputs: Vec<PathBuf> = items.iter().map(output).collect();
    let groups = group_by_output(&outputs);
    for group in groups.iter().filter(|g| g.len() > 1) {
        warn!(
            "{} is written by {} records, keeping the last",
            outputs[group[0]].display(),
            group.len()
        );
    }

    let run_group = |group: &Vec<usize>| -> Vec<(usize, R)> {
        group.iter().map(|&i| (i, job(&items[i]))).collect()
    };
    let done: Vec<Vec<(usize, R)>> = if parallel {
        groups.par_iter().map(run_group).collect()
    } else {
        groups.iter().map(run_group).collect()
    };

    let mut flat: Vec<(usize, R)> = done.into_iter().flatten().collect();
    flat.sort_by_key(|(i, _)| *i);
    flat.into_iter().map(|(_, r)| r).collect()
}
