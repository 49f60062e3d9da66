//! Lazy combinatorial enumerators.
//!
//! `ChoiceGenerator` walks the k-subsets of {0..n} in lexicographic
//! order; `CombinationGenerator` walks a mixed-radix counter. Both are
//! plain iterators so callers can bail out early, which matters when a
//! single independence hit is enough to stop a sepset search.

use petgraph::graph::NodeIndex;
use smallvec::SmallVec;

/// Index tuple yielded by the enumerators. Inline up to 8 entries;
/// conditioning sets rarely get deeper than that.
pub type Choice = SmallVec<[usize; 8]>;

/// Lexicographic enumeration of the k-element subsets of {0, .., n-1}.
///
/// k == 0 yields a single empty choice; k > n yields nothing.
#[derive(Debug)]
pub struct ChoiceGenerator {
    n: usize,
    k: usize,
    current: Option<Choice>,
}

impl ChoiceGenerator {
    pub fn new(n: usize, k: usize) -> Self {
        Self { n, k, current: None }
    }

    fn advance(&mut self) -> bool {
        match self.current.as_mut() {
            None => {
                if self.k > self.n {
                    return false;
                }
                self.current = Some((0..self.k).collect());
                true
            }
            Some(choice) => {
                // Rightmost position that can still move up.
                let mut i = self.k;
                loop {
                    if i == 0 {
                        return false;
                    }
                    i -= 1;
                    if choice[i] < self.n - self.k + i {
                        break;
                    }
                }
                choice[i] += 1;
                for j in i + 1..self.k {
                    choice[j] = choice[j - 1] + 1;
                }
                true
            }
        }
    }
}

impl Iterator for ChoiceGenerator {
    type Item = Choice;

    fn next(&mut self) -> Option<Choice> {
        if self.advance() {
            self.current.clone()
        } else {
            None
        }
    }
}

/// Mixed-radix counter: yields every tuple (v0, .., vm) with
/// vi < dims[i], least significant digit last. Empty dims yields a
/// single empty tuple.
#[derive(Debug)]
pub struct CombinationGenerator {
    dims: Vec<usize>,
    current: Option<Choice>,
}

impl CombinationGenerator {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims, current: None }
    }
}

impl Iterator for CombinationGenerator {
    type Item = Choice;

    fn next(&mut self) -> Option<Choice> {
        match self.current.as_mut() {
            None => {
                if self.dims.iter().any(|&d| d == 0) {
                    return None;
                }
                self.current = Some(self.dims.iter().map(|_| 0).collect());
                self.current.clone()
            }
            Some(current) => {
                let mut i = self.dims.len();
                loop {
                    if i == 0 {
                        return None;
                    }
                    i -= 1;
                    if current[i] + 1 < self.dims[i] {
                        break;
                    }
                }
                current[i] += 1;
                for digit in current.iter_mut().skip(i + 1) {
                    *digit = 0;
                }
                Some(current.clone())
            }
        }
    }
}

/// Caps a conditioning-set depth at the number of available candidates.
/// `None` means unbounded, represented by a large sentinel.
pub fn bounded_depth(depth: Option<usize>, n: usize) -> usize {
    depth.unwrap_or(1000).min(n)
}

/// Materializes the chosen nodes from a candidate slice.
pub fn pick(choice: &Choice, items: &[NodeIndex]) -> Vec<NodeIndex> {
    choice.iter().map(|&i| items[i]).collect()
}

/// All subsets of the given nodes, smallest first within each size.
pub fn power_set(items: &[NodeIndex]) -> Vec<Vec<NodeIndex>> {
    let mut subsets = Vec::with_capacity(1 << items.len().min(16));
    for k in 0..=items.len() {
        for choice in ChoiceGenerator::new(items.len(), k) {
            subsets.push(pick(&choice, items));
        }
    }
    subsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(n: usize, k: usize) -> Vec<Vec<usize>> {
        ChoiceGenerator::new(n, k).map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_choice_generator_lexicographic() {
        assert_eq!(
            collect(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn test_choice_generator_edge_sizes() {
        assert_eq!(collect(3, 0), vec![Vec::<usize>::new()]);
        assert_eq!(collect(2, 3), Vec::<Vec<usize>>::new());
        assert_eq!(collect(3, 3), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_combination_generator_counts() {
        let all: Vec<_> = CombinationGenerator::new(vec![2, 3]).collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].to_vec(), vec![0, 0]);
        assert_eq!(all[5].to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_combination_generator_empty_dims() {
        let all: Vec<_> = CombinationGenerator::new(vec![]).collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_empty());
        assert_eq!(CombinationGenerator::new(vec![2, 0]).count(), 0);
    }

    #[test]
    fn test_bounded_depth() {
        assert_eq!(bounded_depth(None, 5), 5);
        assert_eq!(bounded_depth(Some(2), 5), 2);
        assert_eq!(bounded_depth(Some(9), 5), 5);
    }

    #[test]
    fn test_power_set_size() {
        let items: Vec<NodeIndex> = (0..3).map(NodeIndex::new).collect();
        let subsets = power_set(&items);
        assert_eq!(subsets.len(), 8);
        assert!(subsets[0].is_empty());
        assert_eq!(subsets[7], items);
    }
}
