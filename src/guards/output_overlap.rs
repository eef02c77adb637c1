//! Output Overlap Guard
//!
//! Detects duplicate output paths so one model cannot silently overwrite another.

use crate::output::OutputPath;
use std::collections::HashMap;

/// A later claim on a path that an earlier model already owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOverlap {
    /// Position of the rejected claim in the input sequence
    pub index: usize,
    /// Position of the claim that keeps the path
    pub owner: usize,
    pub path: OutputPath,
}

/// Walk `claims` in order; the first claim on a path keeps it, every later one is returned.
pub fn find_overlapping_outputs<'a, I>(claims: I) -> Vec<OutputOverlap>
where
    I: IntoIterator<Item = (usize, &'a OutputPath)>,
{
    let mut owners: HashMap<&'a OutputPath, usize> = HashMap::new();
    let mut overlaps = Vec::new();

    for (index, path) in claims {
        match owners.get(path) {
            Some(&owner) => overlaps.push(OutputOverlap {
                index,
                owner,
                path: path.clone(),
            }),
            None => {
                owners.insert(path, index);
            }
        }
    }

    overlaps
}
