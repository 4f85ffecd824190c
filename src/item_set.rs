// Copyright (c) 2018 Fabian Schuiki

//! Item sets derived from a grammar.
//!
//! An item is a rule with a marker denoting how far parsing has proceeded,
//! plus a lookahead terminal. The closure and goto operations over sets of
//! items are shared by the LR(0), SLR(1), and LR(1) constructions; an
//! explicit variant selects the lookahead discipline.

use std::fmt;

use indexmap::{self, IndexMap};

use Pretty;
use first::FirstSets;
use grammar::{self, Grammar, RuleId, Symbol, TerminalId};

/// The lookahead discipline of an item set construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// LR(0): no lookahead; reductions apply on every column.
    Lr0,
    /// SLR(1): no lookahead in the items; reductions apply on the follow set
    /// of the reduced nonterminal.
    Slr1,
    /// LR(1): a lookahead terminal is part of each item; reductions apply on
    /// that terminal only.
    Lr1,
}

impl Variant {
    /// Whether items of this variant carry a meaningful lookahead.
    pub fn uses_lookahead(self) -> bool {
        match self {
            Variant::Lr1 => true,
            _ => false,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Variant::Lr0 => write!(f, "LR(0)"),
            Variant::Slr1 => write!(f, "SLR(1)"),
            Variant::Lr1 => write!(f, "LR(1)"),
        }
    }
}

/// A single item.
///
/// For the LR(0) and SLR(1) variants the lookahead field holds the end of
/// input terminal as an unused placeholder, which keeps item comparison
/// uniform across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    /// The rule of the item.
    pub(crate) rule: RuleId,
    /// The lookahead terminal.
    pub(crate) lookahead: TerminalId,
    /// The position of the marker within the rule.
    pub(crate) marker: usize,
}

impl Item {
    /// Create an item with the marker at the start of a rule.
    pub fn new(rule: RuleId, lookahead: TerminalId) -> Item {
        Item {
            rule: rule,
            lookahead: lookahead,
            marker: 0,
        }
    }

    /// The initial item `S' -> .S` of the augmented grammar.
    pub fn start() -> Item {
        Item::new(grammar::ACCEPT, grammar::END)
    }

    /// Get the rule this item represents.
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Get the lookahead terminal of this item.
    pub fn lookahead(&self) -> TerminalId {
        self.lookahead
    }

    /// Get the position of the marker within the rule.
    pub fn marker(&self) -> usize {
        self.marker
    }

    /// The symbol immediately after the marker, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        if self.rule == grammar::ACCEPT {
            if self.marker == 0 {
                Some(Symbol::Nonterminal(grammar.start_symbol()))
            } else {
                None
            }
        } else {
            grammar.rule(self.rule).symbols().get(self.marker).cloned()
        }
    }

    /// The symbols strictly after the marker and the following symbol.
    ///
    /// This is the `beta` of the LR(1) lookahead computation.
    pub fn tail<'a>(&self, grammar: &'a Grammar) -> &'a [Symbol] {
        if self.rule == grammar::ACCEPT {
            &[]
        } else {
            let symbols = grammar.rule(self.rule).symbols();
            symbols.get(self.marker + 1..).unwrap_or(&[])
        }
    }

    /// Whether the marker sits at the end of the rule.
    pub fn complete(&self, grammar: &Grammar) -> bool {
        self.next_symbol(grammar).is_none()
    }

    /// The item with the marker advanced by one symbol.
    pub fn advanced(&self) -> Item {
        Item {
            marker: self.marker + 1,
            ..*self
        }
    }

    // Deterministic ordering: rule declaration order with the augmented rule
    // first, then marker, then lookahead.
    fn order_key(&self) -> (usize, usize, usize) {
        let rule = if self.rule == grammar::ACCEPT {
            0
        } else {
            self.rule.as_usize() + 1
        };
        (rule, self.marker, self.lookahead.as_usize())
    }

    /// Get a pretty printer for this item.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.item.rule == grammar::ACCEPT {
            let start = self.ctx.start_symbol();
            write!(f, "[{}' ->", start.pretty(self.ctx))?;
            if self.item.marker == 0 {
                write!(f, " .")?;
            }
            write!(f, " {}", start.pretty(self.ctx))?;
            if self.item.marker == 1 {
                write!(f, " .")?;
            }
        } else {
            let rule = self.ctx.rule(self.item.rule);
            write!(f, "[{} ->", rule.name().pretty(self.ctx))?;
            let symbols = rule.symbols();
            for symbol in &symbols[0..self.item.marker] {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
            write!(f, " .")?;
            for symbol in &symbols[self.item.marker..] {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
        }
        write!(f, ", {}]", self.item.lookahead.pretty(self.ctx))?;
        Ok(())
    }
}

/// A unique item set identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemSetId(usize);

impl ItemSetId {
    /// Create an item set id from a usize.
    pub fn from_usize(id: usize) -> ItemSetId {
        ItemSetId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItemSetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// An item set, also a state of the canonical collection.
///
/// The items are kept sorted by their deterministic order and carry set
/// semantics: no duplicates, equality independent of insertion order. The
/// transitions map symbols to destination states in first-encountered order.
#[derive(Debug, Clone)]
pub struct ItemSet {
    pub(crate) id: ItemSetId,
    pub(crate) items: Vec<Item>,
    pub(crate) transitions: IndexMap<Symbol, ItemSetId>,
}

/// An iterator over the transitions of an item set.
pub type TransitionsIter<'a> = indexmap::map::Iter<'a, Symbol, ItemSetId>;

impl ItemSet {
    /// Get the unique identifier of this item set.
    pub fn id(&self) -> ItemSetId {
        self.id
    }

    /// Get the items in the set.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The destination of the transition on a symbol, if any.
    pub fn transition(&self, symbol: Symbol) -> Option<ItemSetId> {
        self.transitions.get(&symbol).cloned()
    }

    /// An iterator over the transitions in first-encountered order.
    pub fn transitions(&self) -> TransitionsIter {
        self.transitions.iter()
    }

    /// Whether this set holds the same items as another.
    ///
    /// Both sets keep their items sorted, so a direct comparison implements
    /// order-independent set equality.
    pub fn same_items(&self, items: &[Item]) -> bool {
        self.items == items
    }

    /// Get a pretty printer for this item set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}:", self.item.id)?;
        for item in &self.item.items {
            writeln!(f, "    {}", item.pretty(self.ctx))?;
        }
        for (symbol, target) in self.item.transitions() {
            writeln!(f, "    {} -> {}", symbol.pretty(self.ctx), target)?;
        }
        Ok(())
    }
}

/// The item sets of a canonical collection.
#[derive(Debug, Clone)]
pub struct ItemSets {
    pub(crate) variant: Variant,
    pub(crate) sets: Vec<ItemSet>,
}

impl ItemSets {
    /// The variant this collection was built for.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// All item sets in the collection, in creation order.
    pub fn all(&self) -> &[ItemSet] {
        &self.sets
    }

    /// Access a single item set.
    pub fn get(&self, id: ItemSetId) -> &ItemSet {
        &self.sets[id.as_usize()]
    }

    /// The number of item sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Get a pretty printer for the collection.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for set in &self.item.sets {
            write!(f, "{}", set.pretty(self.ctx))?;
        }
        Ok(())
    }
}

/// Compute the closure of a set of items.
///
/// Every item whose marker sits before a nonterminal spawns the items of
/// that nonterminal's rules with the marker at the start. The lookahead of
/// the spawned items depends on the variant: LR(0) and SLR(1) use the
/// placeholder, LR(1) uses the first terminals of the spawning item's tail,
/// extended by the item's own lookahead if the tail can derive the empty
/// string. The result is deduplicated and sorted deterministically.
pub fn closure(
    mut items: Vec<Item>,
    grammar: &Grammar,
    first: &FirstSets,
    variant: Variant,
) -> Vec<Item> {
    let mut index = 0;
    while index < items.len() {
        let item = items[index];
        index += 1;
        let target = match item.next_symbol(grammar) {
            Some(Symbol::Nonterminal(id)) => id,
            _ => continue,
        };
        let lookaheads = spawned_lookaheads(&item, grammar, first, variant);
        for &rule in grammar.rules_for_nonterminal(target) {
            let rule = grammar.canonical_rule(rule);
            for &lookahead in &lookaheads {
                let spawned = Item::new(rule, lookahead);
                if !items.contains(&spawned) {
                    items.push(spawned);
                }
            }
        }
    }
    items.sort_by_key(Item::order_key);
    items
}

/// The lookaheads of the items spawned by expanding the nonterminal after
/// the marker of `item`.
fn spawned_lookaheads(
    item: &Item,
    grammar: &Grammar,
    first: &FirstSets,
    variant: Variant,
) -> Vec<TerminalId> {
    if !variant.uses_lookahead() {
        return vec![grammar::END];
    }
    let seq = first.of_sequence(item.tail(grammar));
    let mut lookaheads = seq.symbols;
    if seq.nullable {
        lookaheads.insert(item.lookahead.as_usize());
    }
    lookaheads.iter().map(TerminalId::from_usize).collect()
}

/// Compute the goto of a set of items over a symbol.
///
/// Advances every item whose marker sits before the given symbol, then
/// closes the advanced set. Returns an empty vector if no item matches,
/// signalling the absence of a transition.
pub fn goto(
    items: &[Item],
    symbol: Symbol,
    grammar: &Grammar,
    first: &FirstSets,
    variant: Variant,
) -> Vec<Item> {
    let advanced: Vec<Item> = items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Item::advanced)
        .collect();
    if advanced.is_empty() {
        return advanced;
    }
    closure(advanced, grammar, first, variant)
}
