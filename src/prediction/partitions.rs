use anyhow::{bail, Result};

/// Lazy enumerator of all ways to partition the items `0..n` into
/// `n / group_size` unordered groups of exactly `group_size`.
///
/// Groupings are generated in a canonical order: each group starts with the
/// smallest index not consumed by earlier groups, and the members chosen to
/// join it advance in lexicographic combination order. That yields every
/// partition exactly once with no dedup pass, and makes "first optimum wins"
/// tie-breaking deterministic for anything folding over the sequence.
///
/// The search space is exponential: 280 groupings for (9, 3) and 2,627,625
/// for (16, 4), which is why nothing here materializes the full collection.
pub struct Partitions {
    n: usize,
    group_size: usize,
    levels: Vec<Level>,
    started: bool,
    done: bool,
}

/// One open group in the backtracking state: the pool it drew from and the
/// combination (as indices into `remaining[1..]`) currently joined to the
/// pool's first item.
struct Level {
    remaining: Vec<usize>,
    comb: Vec<usize>,
}

impl Partitions {
    /// Creates an enumerator over partitions of `0..n`.
    ///
    /// Fails if `group_size` is zero or `n` is zero or not evenly divisible
    /// by `group_size`.
    pub fn new(n: usize, group_size: usize) -> Result<Self> {
        if group_size == 0 {
            bail!("Group size must be at least 1");
        }
        if n == 0 || n % group_size != 0 {
            bail!(
                "Cannot partition {} items into groups of {}: not evenly divisible",
                n,
                group_size
            );
        }
        Ok(Self {
            n,
            group_size,
            levels: Vec::new(),
            started: false,
            done: false,
        })
    }

    /// Opens groups greedily from `remaining` until the pool is exhausted,
    /// each with its first (lexicographically smallest) combination.
    fn push_levels_from(&mut self, mut remaining: Vec<usize>) {
        while !remaining.is_empty() {
            let comb: Vec<usize> = (0..self.group_size - 1).collect();
            let rest = leftover(&remaining, &comb);
            self.levels.push(Level { remaining, comb });
            remaining = rest;
        }
    }

    /// Advances the deepest level to its next combination, backtracking to
    /// shallower levels on overflow. Returns false when exhausted.
    fn advance(&mut self) -> bool {
        loop {
            let rest = match self.levels.last_mut() {
                None => return false,
                Some(level) => {
                    let m = level.remaining.len() - 1;
                    let k = level.comb.len();
                    let pivot = (0..k).rev().find(|&i| level.comb[i] < m - k + i);
                    match pivot {
                        Some(i) => {
                            level.comb[i] += 1;
                            for j in i + 1..k {
                                level.comb[j] = level.comb[j - 1] + 1;
                            }
                            Some(leftover(&level.remaining, &level.comb))
                        }
                        None => None,
                    }
                }
            };
            match rest {
                Some(rest) => {
                    self.push_levels_from(rest);
                    return true;
                }
                None => {
                    self.levels.pop();
                }
            }
        }
    }

    fn current(&self) -> Vec<Vec<usize>> {
        self.levels
            .iter()
            .map(|level| {
                let mut group = vec![level.remaining[0]];
                group.extend(level.comb.iter().map(|&c| level.remaining[c + 1]));
                group
            })
            .collect()
    }
}

/// Items of `remaining` not consumed by the group anchored at
/// `remaining[0]` with members `comb`.
fn leftover(remaining: &[usize], comb: &[usize]) -> Vec<usize> {
    let mut used = vec![false; remaining.len()];
    used[0] = true;
    for &c in comb {
        used[c + 1] = true;
    }
    remaining
        .iter()
        .enumerate()
        .filter(|(i, _)| !used[*i])
        .map(|(_, &item)| item)
        .collect()
}

impl Iterator for Partitions {
    type Item = Vec<Vec<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            let pool: Vec<usize> = (0..self.n).collect();
            self.push_levels_from(pool);
        } else if !self.advance() {
            self.done = true;
            return None;
        }
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Canonical form for dedup checks: sorted groups, sorted within groups.
    fn canonical(mut grouping: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        for group in &mut grouping {
            group.sort_unstable();
        }
        grouping.sort();
        grouping
    }

    #[test]
    fn test_nine_items_in_threes_yields_280_groupings() {
        let partitions = Partitions::new(9, 3).unwrap();
        assert_eq!(partitions.count(), 280);
    }

    #[test]
    fn test_groupings_are_distinct_and_well_formed() {
        let mut seen = HashSet::new();
        for grouping in Partitions::new(9, 3).unwrap() {
            assert_eq!(grouping.len(), 3);
            let mut items: Vec<usize> = grouping.iter().flatten().copied().collect();
            items.sort_unstable();
            assert_eq!(items, (0..9).collect::<Vec<_>>());
            assert!(seen.insert(canonical(grouping)));
        }
        assert_eq!(seen.len(), 280);
    }

    #[test]
    fn test_twelve_items_in_fours() {
        // 12! / (4!^3 * 3!) = 5775
        let partitions = Partitions::new(12, 4).unwrap();
        assert_eq!(partitions.count(), 5775);
    }

    #[test]
    #[ignore = "counts 2.6M groupings, slow in debug builds"]
    fn test_sixteen_items_in_fours_yields_2627625_groupings() {
        let partitions = Partitions::new(16, 4).unwrap();
        assert_eq!(partitions.count(), 2_627_625);
    }

    #[test]
    fn test_first_grouping_is_canonical_order() {
        let mut partitions = Partitions::new(6, 3).unwrap();
        assert_eq!(
            partitions.next().unwrap(),
            vec![vec![0, 1, 2], vec![3, 4, 5]]
        );
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        let a: Vec<_> = Partitions::new(9, 3).unwrap().collect();
        let b: Vec<_> = Partitions::new(9, 3).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_indivisible_item_counts() {
        assert!(Partitions::new(10, 3).is_err());
        assert!(Partitions::new(0, 3).is_err());
        assert!(Partitions::new(9, 0).is_err());
    }
}
