//! Position allocation using sparse floating-point keys.
//!
//! Items carry a double-precision position; inserting between two neighbors
//! takes their arithmetic mean, so a single insertion never rewrites the
//! rest of the container. Repeated insertion between the same neighbors
//! eventually exhausts floating-point resolution, which is why
//! [`needs_rebalance`] and [`rebalance`] exist: the dispatcher renumbers the
//! container with fresh evenly spaced keys once adjacent gaps collapse.

use crate::types::{Item, ItemId};
use std::cmp::Ordering;

/// Position assigned to the first item of an empty container
pub const POSITION_SEED: f64 = 1000.0;

/// Spacing used when appending/prepending and when renumbering
pub const POSITION_GAP: f64 = 1000.0;

/// Adjacent positions closer than this trigger a renumber
pub const REBALANCE_EPSILON: f64 = 1e-6;

/// Which side of the anchor the item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Before,
    After,
}

/// Drop anchor within the target container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Insert relative to this item
    Item(ItemId),
    /// Append at the end (also the only valid anchor for an empty container)
    End,
}

/// Total order of items within a container: position ascending, identifier
/// as the stable tie-break. Every cache sorts with this.
pub fn order(a: &Item, b: &Item) -> Ordering {
    a.position
        .total_cmp(&b.position)
        .then_with(|| a.id.cmp(&b.id))
}

/// Compute the position for dropping `source` at `anchor`/`edge` among
/// `items` (the target container's current sorted snapshot).
///
/// The source item, if present in `items`, is ignored while locating the
/// anchor so that moving an item relative to its own neighbors behaves. An
/// anchor that cannot be found is treated as append-to-end, never an error.
pub fn allocate(items: &[Item], source: Option<&ItemId>, anchor: &Anchor, edge: Edge) -> f64 {
    let working: Vec<&Item> = items
        .iter()
        .filter(|item| Some(&item.id) != source)
        .collect();

    if working.is_empty() {
        return POSITION_SEED;
    }

    let insert_at = match anchor {
        Anchor::End => working.len(),
        Anchor::Item(id) => match working.iter().position(|item| &item.id == id) {
            Some(index) => match edge {
                Edge::Before => index,
                Edge::After => index + 1,
            },
            // Anchor vanished under us (concurrent removal): append.
            None => working.len(),
        },
    };

    if insert_at == 0 {
        working[0].position - POSITION_GAP
    } else if insert_at >= working.len() {
        working[working.len() - 1].position + POSITION_GAP
    } else {
        midpoint(working[insert_at - 1].position, working[insert_at].position)
    }
}

fn midpoint(lower: f64, upper: f64) -> f64 {
    lower + (upper - lower) / 2.0
}

/// True when any adjacent pair of positions is too close for further
/// midpoint insertions. `items` must be sorted by [`order`].
pub fn needs_rebalance(items: &[Item]) -> bool {
    items
        .windows(2)
        .any(|pair| (pair[1].position - pair[0].position).abs() < REBALANCE_EPSILON)
}

/// Fresh evenly spaced positions for every item, preserving current order.
/// `items` must be sorted by [`order`]. Returns only the assignments; the
/// caller persists them and lets events carry them to other participants.
///
/// Every fresh value is strictly above every current position, so applying
/// the assignments one at a time in reverse (last item first) keeps the
/// container correctly ordered at each intermediate step — a renumber
/// interrupted by a persistence failure leaves the order intact.
pub fn rebalance(items: &[Item]) -> Vec<(ItemId, f64)> {
    let base = items
        .last()
        .map(|item| POSITION_SEED.max(item.position.floor() + POSITION_GAP))
        .unwrap_or(POSITION_SEED);
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (item.id.clone(), base + index as f64 * POSITION_GAP))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerKey;

    fn card(id: &str, position: f64) -> Item {
        Item::with_id(id, ContainerKey::list_cards("b", "l"), id, position)
    }

    #[test]
    fn test_empty_container_returns_seed() {
        assert_eq!(allocate(&[], None, &Anchor::End, Edge::After), POSITION_SEED);
    }

    #[test]
    fn test_empty_after_removing_source_returns_seed() {
        let items = vec![card("a", 1000.0)];
        let a = ItemId::from("a");
        let got = allocate(&items, Some(&a), &Anchor::End, Edge::After);
        assert_eq!(got, POSITION_SEED);
    }

    #[test]
    fn test_head_insertion_is_below_first() {
        let items = vec![card("a", 1000.0), card("b", 2000.0)];
        let a = Anchor::Item(ItemId::from("a"));
        let got = allocate(&items, None, &a, Edge::Before);
        assert!(got < 1000.0);
    }

    #[test]
    fn test_tail_insertion_is_above_last() {
        let items = vec![card("a", 1000.0), card("b", 2000.0)];
        let b = Anchor::Item(ItemId::from("b"));
        let got = allocate(&items, None, &b, Edge::After);
        assert!(got > 2000.0);
    }

    #[test]
    fn test_midpoint_law() {
        let items = vec![card("a", 1000.0), card("b", 2000.0)];
        let a = Anchor::Item(ItemId::from("a"));
        let got = allocate(&items, None, &a, Edge::After);
        assert_eq!(got, 1500.0);
        assert!(1000.0 < got && got < 2000.0);
    }

    #[test]
    fn test_missing_anchor_appends() {
        let items = vec![card("a", 1000.0), card("b", 2000.0)];
        let gone = Anchor::Item(ItemId::from("vanished"));
        let got = allocate(&items, None, &gone, Edge::Before);
        assert!(got > 2000.0);
    }

    #[test]
    fn test_source_excluded_from_anchor_search() {
        // Moving "b" to just after "a" when they are already adjacent must
        // still land strictly between "a" and "c".
        let items = vec![card("a", 1000.0), card("b", 2000.0), card("c", 3000.0)];
        let b = ItemId::from("b");
        let a = Anchor::Item(ItemId::from("a"));
        let got = allocate(&items, Some(&b), &a, Edge::After);
        assert!(1000.0 < got && got < 3000.0);
    }

    #[test]
    fn test_order_breaks_ties_by_id() {
        let x = card("x", 1000.0);
        let y = card("y", 1000.0);
        assert_eq!(order(&x, &y), Ordering::Less);
        assert_eq!(order(&y, &x), Ordering::Greater);
    }

    #[test]
    fn test_needs_rebalance_after_gap_exhaustion() {
        let mut items = vec![card("a", 1000.0), card("b", 2000.0)];
        assert!(!needs_rebalance(&items));

        // Keep inserting between the first two until resolution runs out.
        let mut n = 0;
        loop {
            let anchor = Anchor::Item(items[0].id.clone());
            let pos = allocate(&items, None, &anchor, Edge::After);
            items.insert(1, card(&format!("new{}", n), pos));
            items.sort_by(order);
            n += 1;
            if needs_rebalance(&items) {
                break;
            }
            assert!(n < 100, "midpoints should exhaust well within 100 steps");
        }
    }

    #[test]
    fn test_rebalance_preserves_order_and_restores_gaps() {
        let items = vec![
            card("a", 1.0),
            card("b", 1.0 + 1e-9),
            card("c", 1.0 + 2e-9),
        ];
        let fresh = rebalance(&items);
        assert_eq!(fresh.len(), 3);
        assert_eq!(fresh[0], (ItemId::from("a"), 1001.0));
        assert_eq!(fresh[1], (ItemId::from("b"), 2001.0));
        assert_eq!(fresh[2], (ItemId::from("c"), 3001.0));
    }

    #[test]
    fn test_rebalance_values_exceed_every_current_position() {
        let items = vec![card("a", 500.0), card("b", 80_000.5)];
        let fresh = rebalance(&items);
        let max_old = 80_000.5;
        assert!(fresh.iter().all(|(_, position)| *position > max_old));
        assert!(fresh[0].1 < fresh[1].1);
    }
}
