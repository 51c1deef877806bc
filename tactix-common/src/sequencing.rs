//! Puzzle sequencing engine
//!
//! Turns a snapshot of the puzzle store into the two practice orders served
//! to learners:
//!
//! - **ordered**: categories in ascending key order (uncategorized last), each
//!   category's puzzles by ascending id, capped at `cap` entries. Deterministic.
//! - **random**: puzzles picked greedily from the category with the most
//!   remaining stock so that no two adjacent entries share a category. When
//!   only one category still has stock and it matches the previous entry, the
//!   sequence ends early instead of repeating.
//!
//! The engine is pure: it holds no state between calls and draws randomness
//! only from the generator it is handed.

use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use tracing::debug;

use crate::models::{CategoryKey, Puzzle};

/// Puzzles partitioned by category key, each partition sorted by ascending id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryGroups {
    groups: BTreeMap<CategoryKey, Vec<Puzzle>>,
}

impl CategoryGroups {
    /// Partition a store snapshot by category
    pub fn from_snapshot(snapshot: &[Puzzle]) -> Self {
        let mut groups: BTreeMap<CategoryKey, Vec<Puzzle>> = BTreeMap::new();
        for puzzle in snapshot {
            groups
                .entry(puzzle.category_key())
                .or_default()
                .push(puzzle.clone());
        }
        for puzzles in groups.values_mut() {
            puzzles.sort_by_key(|p| p.id);
        }
        Self { groups }
    }

    /// Iterate partitions in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &[Puzzle])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn get(&self, key: &CategoryKey) -> Option<&[Puzzle]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn category_count(&self) -> usize {
        self.groups.len()
    }

    pub fn puzzle_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Browse order: whole categories back to back, truncated to `cap`
pub fn build_ordered(groups: &CategoryGroups, cap: usize) -> Vec<Puzzle> {
    groups
        .iter()
        .flat_map(|(_, puzzles)| puzzles.iter().cloned())
        .take(cap)
        .collect()
}

/// Output of the diversity scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct DiverseSchedule {
    pub puzzles: Vec<Puzzle>,
    /// True when scheduling stopped before `cap` with puzzles still unused,
    /// because the only category left was the one just emitted.
    pub stopped_early: bool,
}

/// Heap entry: a category and how many of its puzzles are still unused
///
/// Max-heap order is stock descending, then key ascending, so equal-stock
/// categories always pop in the same order for a given seed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stock {
    remaining: usize,
    key: CategoryKey,
}

impl Ord for Stock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| Reverse(&self.key).cmp(&Reverse(&other.key)))
    }
}

impl PartialOrd for Stock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Practice order: adjacency-repeat-free interleaving, capped at `cap`
pub fn build_diverse<R: Rng + ?Sized>(
    groups: &CategoryGroups,
    cap: usize,
    rng: &mut R,
) -> DiverseSchedule {
    // Shuffling decides which puzzle a category yields, not the interleaving.
    let mut pools: BTreeMap<CategoryKey, Vec<Puzzle>> = groups
        .iter()
        .map(|(key, puzzles)| {
            let mut pool = puzzles.to_vec();
            pool.shuffle(rng);
            (key.clone(), pool)
        })
        .collect();

    let mut heap: BinaryHeap<Stock> = pools
        .iter()
        .filter(|(_, pool)| !pool.is_empty())
        .map(|(key, pool)| Stock {
            remaining: pool.len(),
            key: key.clone(),
        })
        .collect();

    let mut output: Vec<Puzzle> = Vec::with_capacity(cap.min(groups.puzzle_count()));
    let mut previous: Option<CategoryKey> = None;
    let mut stopped_early = false;

    while output.len() < cap {
        let Some(first) = heap.pop() else {
            break;
        };

        let pick = if previous.as_ref() != Some(&first.key) {
            first
        } else {
            match heap.pop() {
                Some(second) => {
                    // First choice sits this round out with its stock untouched
                    heap.push(first);
                    second
                }
                None => {
                    debug!(
                        category = %first.key,
                        remaining = first.remaining,
                        emitted = output.len(),
                        "Diverse schedule stopped early: only the previous category has stock"
                    );
                    stopped_early = true;
                    break;
                }
            }
        };

        let Some(puzzle) = pools.get_mut(&pick.key).and_then(Vec::pop) else {
            // Heap and pools are built together; a missing pool means no stock
            continue;
        };
        output.push(puzzle);

        let remaining = pick.remaining - 1;
        if remaining > 0 {
            heap.push(Stock {
                remaining,
                key: pick.key.clone(),
            });
        }
        previous = Some(pick.key);
    }

    DiverseSchedule {
        puzzles: output,
        stopped_early,
    }
}

/// Both practice orders built from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleSequence {
    pub ordered: Vec<Puzzle>,
    pub random: Vec<Puzzle>,
    pub random_stopped_early: bool,
}

/// Group the snapshot once and build both orders from the same grouping
pub fn build_sequence<R: Rng + ?Sized>(
    snapshot: &[Puzzle],
    cap: usize,
    rng: &mut R,
) -> PuzzleSequence {
    let groups = CategoryGroups::from_snapshot(snapshot);
    let ordered = build_ordered(&groups, cap);
    let diverse = build_diverse(&groups, cap, rng);

    debug!(
        puzzles = snapshot.len(),
        categories = groups.category_count(),
        ordered = ordered.len(),
        random = diverse.puzzles.len(),
        "Built puzzle sequence"
    );

    PuzzleSequence {
        ordered,
        random: diverse.puzzles,
        random_stopped_early: diverse.stopped_early,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SideToMove;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn puzzle(id: i64, category: Option<&str>) -> Puzzle {
        Puzzle {
            id,
            initial_position: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
                .to_string(),
            side_to_move: SideToMove::White,
            moves: vec!["e2e4".to_string()],
            category: category.map(str::to_string),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    /// Build a snapshot from (category, count) pairs with consecutive ids
    fn snapshot(layout: &[(Option<&str>, usize)]) -> Vec<Puzzle> {
        let mut id = 0;
        let mut out = Vec::new();
        for (category, count) in layout {
            for _ in 0..*count {
                id += 1;
                out.push(puzzle(id, *category));
            }
        }
        out
    }

    fn keys(puzzles: &[Puzzle]) -> Vec<CategoryKey> {
        puzzles.iter().map(Puzzle::category_key).collect()
    }

    fn assert_no_adjacent_repeat(puzzles: &[Puzzle]) {
        for pair in puzzles.windows(2) {
            assert_ne!(
                pair[0].category_key(),
                pair[1].category_key(),
                "adjacent repeat at ids {} / {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    #[test]
    fn test_grouping_sorts_each_partition_by_id() {
        let snap = vec![
            puzzle(5, Some("fork")),
            puzzle(2, Some("pin")),
            puzzle(3, Some("fork")),
            puzzle(1, None),
            puzzle(4, Some("")),
        ];
        let groups = CategoryGroups::from_snapshot(&snap);

        assert_eq!(groups.category_count(), 3);
        assert_eq!(groups.puzzle_count(), 5);

        let fork: Vec<i64> = groups
            .get(&CategoryKey::Named("fork".to_string()))
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(fork, vec![3, 5]);

        let uncategorized: Vec<i64> = groups
            .get(&CategoryKey::Uncategorized)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(uncategorized, vec![1, 4]);
    }

    #[test]
    fn test_ordered_blocks_are_contiguous_and_sorted() {
        let snap = vec![
            puzzle(7, Some("skewer")),
            puzzle(1, None),
            puzzle(3, Some("fork")),
            puzzle(2, Some("skewer")),
            puzzle(6, Some("fork")),
            puzzle(4, Some("deflection")),
        ];
        let groups = CategoryGroups::from_snapshot(&snap);
        let ordered = build_ordered(&groups, 21);

        let ids: Vec<i64> = ordered.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 3, 6, 2, 7, 1]);
    }

    #[test]
    fn test_ordered_is_deterministic_and_capped() {
        let snap = snapshot(&[(Some("a"), 10), (Some("b"), 10), (None, 10)]);
        let groups = CategoryGroups::from_snapshot(&snap);

        let first = build_ordered(&groups, 21);
        let second = build_ordered(&CategoryGroups::from_snapshot(&snap), 21);
        assert_eq!(first, second);
        assert_eq!(first.len(), 21);
        // a: 1..=10, b: 11..=20, then the first uncategorized puzzle
        assert_eq!(first.last().unwrap().id, 21);
    }

    #[test]
    fn test_empty_snapshot_yields_empty_orders() {
        let mut rng = StdRng::seed_from_u64(1);
        let seq = build_sequence(&[], 21, &mut rng);
        assert!(seq.ordered.is_empty());
        assert!(seq.random.is_empty());
        assert!(!seq.random_stopped_early);
    }

    #[test]
    fn test_single_category_random_has_at_most_one_entry() {
        let snap = snapshot(&[(Some("mate"), 5)]);
        let mut rng = StdRng::seed_from_u64(7);
        let groups = CategoryGroups::from_snapshot(&snap);
        let diverse = build_diverse(&groups, 21, &mut rng);

        assert_eq!(diverse.puzzles.len(), 1);
        assert!(diverse.stopped_early);
        assert_eq!(build_ordered(&groups, 21).len(), 5);
    }

    #[test]
    fn test_skewed_stock_truncates_instead_of_repeating() {
        // A: 3, B: 1 -> A B A, then only A remains right after an A
        let snap = snapshot(&[(Some("A"), 3), (Some("B"), 1)]);
        let mut rng = StdRng::seed_from_u64(3);
        let diverse = build_diverse(&CategoryGroups::from_snapshot(&snap), 21, &mut rng);

        let a = CategoryKey::Named("A".to_string());
        let b = CategoryKey::Named("B".to_string());
        assert_eq!(keys(&diverse.puzzles), vec![a.clone(), b, a]);
        assert!(diverse.stopped_early);
    }

    #[test]
    fn test_fewer_puzzles_than_cap_is_not_padded() {
        let snap = snapshot(&[(Some("a"), 2), (Some("b"), 2), (None, 1)]);
        let mut rng = StdRng::seed_from_u64(11);
        let seq = build_sequence(&snap, 21, &mut rng);

        assert_eq!(seq.ordered.len(), 5);
        assert_eq!(seq.random.len(), 5);
        assert!(!seq.random_stopped_early);
        assert_no_adjacent_repeat(&seq.random);
    }

    #[test]
    fn test_random_respects_cap() {
        let snap = snapshot(&[(Some("a"), 15), (Some("b"), 15), (Some("c"), 15)]);
        let mut rng = StdRng::seed_from_u64(5);
        let seq = build_sequence(&snap, 21, &mut rng);

        assert_eq!(seq.ordered.len(), 21);
        assert_eq!(seq.random.len(), 21);
        assert!(!seq.random_stopped_early);
    }

    #[test]
    fn test_random_properties_across_seeds() {
        let snap = snapshot(&[
            (Some("fork"), 6),
            (Some("pin"), 4),
            (Some("skewer"), 3),
            (Some("mate"), 2),
            (None, 3),
        ]);
        let snapshot_ids: HashSet<i64> = snap.iter().map(|p| p.id).collect();
        let groups = CategoryGroups::from_snapshot(&snap);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let diverse = build_diverse(&groups, 21, &mut rng);

            // Largest stock (6) never exceeds the rest plus one, so all 18 fit
            assert_eq!(diverse.puzzles.len(), 18, "seed {}", seed);
            assert!(!diverse.stopped_early);
            assert_no_adjacent_repeat(&diverse.puzzles);

            let ids: HashSet<i64> = diverse.puzzles.iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), diverse.puzzles.len(), "duplicate id, seed {}", seed);
            assert!(ids.is_subset(&snapshot_ids));
        }
    }

    #[test]
    fn test_early_stop_only_when_one_category_dominates() {
        // 8 of one category against 3 others: at most 3 + 4 = 7 entries fit
        let snap = snapshot(&[(Some("back-rank"), 8), (Some("fork"), 2), (Some("pin"), 1)]);
        let groups = CategoryGroups::from_snapshot(&snap);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let diverse = build_diverse(&groups, 21, &mut rng);
            assert!(diverse.stopped_early);
            assert_eq!(diverse.puzzles.len(), 7);
            assert_no_adjacent_repeat(&diverse.puzzles);
        }
    }

    #[test]
    fn test_category_interleaving_ignores_seed() {
        // Shuffling picks puzzles within a category; the tie-break fixes the
        // order of categories, so the category sequence is seed independent.
        let snap = snapshot(&[(Some("b"), 3), (Some("a"), 3), (Some("c"), 2)]);
        let groups = CategoryGroups::from_snapshot(&snap);

        let reference = keys(&build_diverse(&groups, 21, &mut StdRng::seed_from_u64(0)).puzzles);
        for seed in 1..30 {
            let run = keys(&build_diverse(&groups, 21, &mut StdRng::seed_from_u64(seed)).puzzles);
            assert_eq!(run, reference);
        }

        let named = |s: &str| CategoryKey::Named(s.to_string());
        assert_eq!(reference[0], named("a"));
        assert_eq!(reference[1], named("b"));
    }

    #[test]
    fn test_same_seed_reproduces_random_order() {
        let snap = snapshot(&[(Some("a"), 5), (Some("b"), 4), (None, 4)]);
        let first = build_sequence(&snap, 21, &mut StdRng::seed_from_u64(42));
        let second = build_sequence(&snap, 21, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_uncategorized_participates_in_interleaving() {
        let snap = snapshot(&[(None, 2), (Some("a"), 2)]);
        let diverse = build_diverse(
            &CategoryGroups::from_snapshot(&snap),
            21,
            &mut StdRng::seed_from_u64(9),
        );
        assert_eq!(diverse.puzzles.len(), 4);
        assert_no_adjacent_repeat(&diverse.puzzles);
        // Equal stock: named "a" wins the tie over the sentinel
        assert_eq!(diverse.puzzles[0].category_key(), CategoryKey::Named("a".to_string()));
    }

    #[test]
    fn test_zero_cap_yields_nothing() {
        let snap = snapshot(&[(Some("a"), 2), (Some("b"), 2)]);
        let seq = build_sequence(&snap, 0, &mut StdRng::seed_from_u64(1));
        assert!(seq.ordered.is_empty());
        assert!(seq.random.is_empty());
    }
}
