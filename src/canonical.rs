// Copyright (c) 2018 Fabian Schuiki

//! Construction of the canonical collection of item sets.
//!
//! Starting from the closure of the augmented start item, states are
//! processed in creation order. For every symbol that appears after a marker
//! in a state, the goto set either matches an existing state, in which case
//! a transition links to it, or becomes a new state at the end of the list.
//! The construction records a snapshot of the entire collection at each
//! step, for replay by the caller.

use indexmap::IndexSet;

use Pretty;
use first::FirstSets;
use grammar::{Grammar, Symbol};
use history::{Active, History};
use item_set::{closure, goto, Item, ItemSet, ItemSetId, ItemSets, Variant};

/// A canonical collection and the history of its construction.
#[derive(Debug, Clone)]
pub struct Collection {
    sets: ItemSets,
    history: History<Vec<ItemSet>>,
}

impl Collection {
    /// Build the canonical collection of a grammar for the given variant.
    pub fn compute(grammar: &Grammar, first: &FirstSets, variant: Variant) -> Collection {
        construct(grammar, first, variant)
    }

    /// The item sets of the collection.
    pub fn sets(&self) -> &ItemSets {
        &self.sets
    }

    /// The snapshot history of the construction.
    pub fn history(&self) -> &History<Vec<ItemSet>> {
        &self.history
    }

    /// Get a pretty printer for the collection.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a ItemSets> {
        self.sets.pretty(grammar)
    }
}

/// The meat of this module.
fn construct(grammar: &Grammar, first: &FirstSets, variant: Variant) -> Collection {
    let mut history = History::new();
    let mut sets: Vec<ItemSet> = Vec::new();

    // State 0 is the closure of the augmented start item. Its lookahead is
    // the end of input, which doubles as the placeholder for the variants
    // that ignore it.
    let initial = ItemSet {
        id: ItemSetId::from_usize(0),
        items: closure(vec![Item::start()], grammar, first, variant),
        transitions: Default::default(),
    };
    sets.push(initial);
    history.record(
        "Initialized state i0 with the closure of the start item.",
        sets.clone(),
        Active::none(),
    );

    let mut index = 0;
    while index < sets.len() {
        let id = sets[index].id();
        history.record(
            format!("Processing state {}.", id),
            sets.clone(),
            Active::set(id),
        );

        // Enumerate the symbols after the markers in first-encountered
        // order, so the transitions of a state are discovered top to bottom.
        let symbols: IndexSet<Symbol> = sets[index]
            .items()
            .iter()
            .filter_map(|item| item.next_symbol(grammar))
            .collect();

        for symbol in symbols {
            if sets[index].transition(symbol).is_some() {
                continue;
            }
            let next = goto(&sets[index].items, symbol, grammar, first, variant);
            if next.is_empty() {
                continue;
            }
            history.record(
                format!("Computed goto({}, {}).", id, symbol.pretty(grammar)),
                sets.clone(),
                Active::set(id).with_symbol(symbol),
            );

            let existing = sets.iter()
                .position(|set| set.same_items(&next))
                .map(ItemSetId::from_usize);
            match existing {
                Some(target) => {
                    sets[index].transitions.insert(symbol, target);
                    history.record(
                        format!(
                            "Linked state {} to existing state {} on {}.",
                            id,
                            target,
                            symbol.pretty(grammar)
                        ),
                        sets.clone(),
                        Active::set(id).with_symbol(symbol).with_target(target),
                    );
                }
                None => {
                    let target = ItemSetId::from_usize(sets.len());
                    trace!(
                        "state {} --{}--> new state {}",
                        id,
                        symbol.pretty(grammar),
                        target
                    );
                    sets.push(ItemSet {
                        id: target,
                        items: next,
                        transitions: Default::default(),
                    });
                    sets[index].transitions.insert(symbol, target);
                    history.record(
                        format!(
                            "Created state {} from goto({}, {}).",
                            target,
                            id,
                            symbol.pretty(grammar)
                        ),
                        sets.clone(),
                        Active::set(id).with_symbol(symbol).with_target(target),
                    );
                }
            }
        }
        index += 1;
    }

    debug!("canonical {} collection has {} states", variant, sets.len());
    history.record(
        "Canonical collection construction complete.",
        sets.clone(),
        Active::none(),
    );

    Collection {
        sets: ItemSets {
            variant: variant,
            sets: sets,
        },
        history: history,
    }
}
