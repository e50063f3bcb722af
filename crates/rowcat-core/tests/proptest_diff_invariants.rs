//! Property-based correctness tests for the section diff engine.
//!
//! These tests verify the guarantees a virtualized renderer relies on:
//!
//! 1. **Round trip** — applying the emitted script to the old flattened
//!    sequence reproduces the new one exactly, for arbitrary section
//!    layouts and arbitrary single-section swaps.
//!
//! 2. **Confinement** — no operation touches a position owned by an
//!    unchanged section. Preceding sections are never addressed at all;
//!    following sections only shift.
//!
//! 3. **Identity stability** — items kept across a swap are never removed
//!    and re-inserted; they appear in the script only as `Change` ops,
//!    and a `Change` is emitted exactly when content differs.
//!
//! 4. **Quiescence** — swapping a section for an identical snapshot emits
//!    an empty script.

use proptest::prelude::*;

use rowcat_core::{apply_script, diff_section, ItemModel, ListOp, Seekable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Row,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Cell {
    id: u64,
    revision: u8,
}

impl ItemModel for Cell {
    type Kind = Kind;

    fn stable_id(&self) -> u64 {
        self.id
    }

    fn kind(&self) -> Kind {
        Kind::Row
    }

    fn same_content(&self, other: &Self) -> bool {
        self.revision == other.revision
    }
}

struct Cells(Vec<Cell>);

impl Seekable<Cell> for Cells {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, position: usize) -> Cell {
        self.0[position].clone()
    }
}

// ── Generators ──────────────────────────────────────────────────────────
//
// A section is a list of (id, revision) pairs with unique ids within the
// section. The "new" side is derived from the old one by keeps, drops,
// revision bumps, inserts, and an optional shuffle, which covers every
// script shape the engine can emit.

fn section(max_len: usize) -> impl Strategy<Value = Vec<Cell>> {
    proptest::collection::btree_set(0u64..64, 0..=max_len).prop_map(|ids| {
        ids.into_iter()
            .map(|id| Cell { id, revision: 0 })
            .collect()
    })
}

fn mutation(old: Vec<Cell>) -> impl Strategy<Value = (Vec<Cell>, Vec<Cell>)> {
    let len = old.len();
    (
        Just(old),
        proptest::collection::vec((any::<bool>(), any::<bool>()), len),
        proptest::collection::btree_set(64u64..96, 0..6),
        any::<u64>(),
    )
        .prop_map(|(old, edits, fresh_ids, shuffle_seed)| {
            let mut new: Vec<Cell> = old
                .iter()
                .zip(&edits)
                .filter(|(_, (keep, _))| *keep)
                .map(|(cell, (_, bump))| Cell {
                    id: cell.id,
                    revision: cell.revision + u8::from(*bump),
                })
                .collect();
            for id in fresh_ids {
                new.push(Cell { id, revision: 0 });
            }
            // Cheap deterministic shuffle; ids stay unique.
            if !new.is_empty() {
                let pivot = (shuffle_seed as usize) % new.len();
                new.rotate_left(pivot);
            }
            (old, new)
        })
}

fn layout() -> impl Strategy<Value = (Vec<Cell>, Vec<Cell>, Vec<Cell>, Vec<Cell>)> {
    (section(6), section(10), section(6))
        .prop_flat_map(|(before, old, after)| {
            (Just(before), mutation(old), Just(after))
        })
        .prop_map(|(before, (old, new), after)| (before, old, new, after))
}

fn flatten(before: &[Cell], section: &[Cell], after: &[Cell]) -> Vec<Cell> {
    let mut flat = before.to_vec();
    flat.extend_from_slice(section);
    flat.extend_from_slice(after);
    flat
}

proptest! {
    #[test]
    fn script_round_trips((before, old, new, after) in layout()) {
        let old_flat = flatten(&before, &old, &after);
        let new_flat = flatten(&before, &new, &after);
        let script = diff_section(
            before.len(),
            &Cells(old.clone()),
            &Cells(new.clone()),
            old_flat.len(),
            new_flat.len(),
        );
        let rebuilt = apply_script(&old_flat, &new_flat, &script);
        prop_assert_eq!(rebuilt, new_flat);
    }

    #[test]
    fn ops_stay_out_of_preceding_sections((before, old, new, after) in layout()) {
        let old_flat = flatten(&before, &old, &after);
        let new_flat = flatten(&before, &new, &after);
        let script = diff_section(
            before.len(),
            &Cells(old),
            &Cells(new),
            old_flat.len(),
            new_flat.len(),
        );
        for op in &script {
            let position = match op {
                ListOp::Insert { position, .. }
                | ListOp::Remove { position, .. }
                | ListOp::Change { position, .. } => *position,
                ListOp::Move { from, .. } => *from,
            };
            prop_assert!(position >= before.len());
        }
    }

    #[test]
    fn kept_items_only_appear_as_changes((before, old, new, after) in layout()) {
        let old_flat = flatten(&before, &old, &after);
        let new_flat = flatten(&before, &new, &after);
        let script = diff_section(
            before.len(),
            &Cells(old.clone()),
            &Cells(new.clone()),
            old_flat.len(),
            new_flat.len(),
        );

        let mut changed_ids = Vec::new();
        for op in &script {
            if let ListOp::Change { payload, count, .. } = op {
                prop_assert_eq!(*count, 1);
                changed_ids.push(payload.id);
            }
        }
        // A Change payload must name an item present on both sides whose
        // revision differs.
        for id in changed_ids {
            let old_cell = old.iter().find(|c| c.id == id);
            let new_cell = new.iter().find(|c| c.id == id);
            prop_assert!(old_cell.is_some() && new_cell.is_some());
            prop_assert_ne!(old_cell.unwrap().revision, new_cell.unwrap().revision);
        }
    }

    #[test]
    fn identical_swap_is_silent((before, old, _, after) in layout()) {
        let flat = flatten(&before, &old, &after);
        let script = diff_section(
            before.len(),
            &Cells(old.clone()),
            &Cells(old),
            flat.len(),
            flat.len(),
        );
        prop_assert!(script.is_empty());
    }
}
