// Copyright (c) 2018 Fabian Schuiki

//! Parsing tables with tagged actions.
//!
//! A parsing table maps a row key and a column symbol to an action. The
//! LL(1) table is keyed by nonterminal and holds the production to expand;
//! the LR tables are keyed by state and hold shift, reduce, goto, and accept
//! actions. Conflicting LR actions are preserved as an ordered list rather
//! than discarded, with a deterministic primary alternative.

use std::fmt;

use indexmap::{self, IndexMap};

use Pretty;
use first::FirstFollow;
use grammar::{self, Grammar, NonterminalId, RuleId, Symbol, TerminalId};
use item_set::{ItemSetId, ItemSets, Variant};

/// An action to be taken upon encountering a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Shift the symbol and go to the given state.
    Shift(ItemSetId),
    /// Reduce with the given rule. In an LL(1) table this is the production
    /// to expand the row's nonterminal with.
    Reduce(RuleId),
    /// Go to the given state after a reduction.
    Goto(ItemSetId),
    /// Accept the input.
    Accept,
    /// Two or more of the above compete for the same cell. The first entry
    /// is the primary alternative: a shift wins over reductions, otherwise
    /// the first-registered action wins.
    Conflict(Vec<Action>),
}

impl Action {
    /// The action a deterministic driver resolves this cell to.
    pub fn primary(&self) -> &Action {
        match *self {
            Action::Conflict(ref actions) => &actions[0],
            ref action => action,
        }
    }

    /// Whether this cell holds more than one action.
    pub fn is_conflict(&self) -> bool {
        match *self {
            Action::Conflict(_) => true,
            _ => false,
        }
    }

    /// All alternatives of this cell, the primary one first.
    pub fn alternatives(&self) -> &[Action] {
        match *self {
            Action::Conflict(ref actions) => actions,
            ref action => ::std::slice::from_ref(action),
        }
    }

    // Fold another action into this cell, preserving both.
    fn combine(self, action: Action) -> Action {
        let mut alternatives = match self {
            Action::Conflict(actions) => actions,
            other => vec![other],
        };
        if !alternatives.contains(&action) {
            match action {
                // A shift stays the primary alternative of a cell.
                Action::Shift(_) => alternatives.insert(0, action),
                _ => alternatives.push(action),
            }
        }
        match alternatives.len() {
            1 => alternatives.swap_remove(0),
            _ => Action::Conflict(alternatives),
        }
    }

    /// Get a pretty printer for this action.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Action> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Action::Shift(id) => write!(f, "s{}", id.as_usize()),
            Action::Reduce(rule) => write!(f, "r({})", rule.pretty(self.ctx)),
            Action::Goto(id) => write!(f, "{}", id.as_usize()),
            Action::Accept => write!(f, "acc"),
            Action::Conflict(ref actions) => {
                for (index, action) in actions.iter().enumerate() {
                    if index > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{}", action.pretty(self.ctx))?;
                }
                Ok(())
            }
        }
    }
}

/// The key of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// A state of an LR table.
    Set(ItemSetId),
    /// A nonterminal of an LL(1) table.
    Nonterminal(NonterminalId),
}

/// A single table row, mapping column symbols to actions.
pub type Row = IndexMap<Symbol, Action>;

/// An iterator over the rows of a parsing table.
pub type RowsIter<'a> = indexmap::map::Iter<'a, RowKey, Row>;

/// A parsing table.
///
/// Rows exist for every nonterminal (LL) or state (LR) even when empty, and
/// appear in declaration respectively creation order. The headers list the
/// columns in display order: the terminals, the end of input marker, and for
/// LR tables the nonterminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTable {
    headers: Vec<Symbol>,
    rows: IndexMap<RowKey, Row>,
}

impl ParsingTable {
    /// Build the LL(1) predictive table of a grammar.
    ///
    /// For every rule, the production is entered under each terminal that
    /// can begin its right-hand side; if the right-hand side can derive the
    /// empty string, it is also entered under each terminal in the follow
    /// set of the left-hand side. A cell claimed by two rules keeps the one
    /// registered last; the overwrite is deliberate and logged.
    pub fn ll1(grammar: &Grammar, sets: &FirstFollow) -> ParsingTable {
        let mut table = ParsingTable {
            headers: ll_headers(grammar),
            rows: (0..grammar.nonterminal_id_bound())
                .map(|id| (RowKey::Nonterminal(NonterminalId::from_usize(id)), Row::new()))
                .collect(),
        };

        for (index, rule) in grammar.rules().enumerate() {
            let id = RuleId::from_usize(index);
            let lhs = rule.name();
            let seq = sets.first().of_sequence(rule.symbols());
            for term in seq.symbols.iter().map(TerminalId::from_usize) {
                table.overwrite(RowKey::Nonterminal(lhs), term.into(), id, grammar);
            }
            if seq.nullable {
                for term in sets.follow().terminals(lhs) {
                    table.overwrite(RowKey::Nonterminal(lhs), term.into(), id, grammar);
                }
            }
        }

        table
    }

    /// Build the shift-reduce table of a canonical collection.
    ///
    /// Transitions become shift (on terminals) and goto (on nonterminals)
    /// actions. Completed items become reductions; the columns they apply to
    /// depend on the variant the collection was built for. The completed
    /// augmented item becomes accept on the end of input column. Competing
    /// actions are preserved as a conflict cell.
    pub fn lr(grammar: &Grammar, sets: &ItemSets, first_follow: &FirstFollow) -> ParsingTable {
        let variant = sets.variant();
        let mut table = ParsingTable {
            headers: lr_headers(grammar),
            rows: sets.all()
                .iter()
                .map(|set| (RowKey::Set(set.id()), Row::new()))
                .collect(),
        };

        for set in sets.all() {
            let key = RowKey::Set(set.id());
            for (&symbol, &target) in set.transitions() {
                let action = match symbol {
                    Symbol::Terminal(_) => Action::Shift(target),
                    Symbol::Nonterminal(_) => Action::Goto(target),
                };
                table.insert(key, symbol, action);
            }
            for item in set.items() {
                if !item.complete(grammar) {
                    continue;
                }
                if item.rule() == grammar::ACCEPT {
                    if !variant.uses_lookahead() || item.lookahead() == grammar::END {
                        table.insert(key, grammar::END.into(), Action::Accept);
                    }
                    continue;
                }
                let action = Action::Reduce(item.rule());
                match variant {
                    Variant::Lr0 => {
                        // Reduce on every terminal and on the end of input.
                        for term in 1..grammar.terminal_id_bound() {
                            let term = TerminalId::from_usize(term);
                            table.insert(key, term.into(), action.clone());
                        }
                        table.insert(key, grammar::END.into(), action.clone());
                    }
                    Variant::Slr1 => {
                        let lhs = grammar.rule(item.rule()).name();
                        for term in first_follow.follow().terminals(lhs) {
                            table.insert(key, term.into(), action.clone());
                        }
                    }
                    Variant::Lr1 => {
                        table.insert(key, item.lookahead().into(), action.clone());
                    }
                }
            }
        }

        table
    }

    /// The column headers in display order.
    pub fn headers(&self) -> &[Symbol] {
        &self.headers
    }

    /// Look up the action of a cell.
    pub fn action(&self, key: RowKey, symbol: Symbol) -> Option<&Action> {
        self.rows.get(&key).and_then(|row| row.get(&symbol))
    }

    /// Access a full row.
    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.rows.get(&key)
    }

    /// An iterator over the rows in declaration respectively creation order.
    pub fn rows(&self) -> RowsIter {
        self.rows.iter()
    }

    // Insert an action, folding collisions into a conflict cell. Rows are
    // created up front, so the key always resolves.
    fn insert(&mut self, key: RowKey, symbol: Symbol, action: Action) {
        let row = match self.rows.get_mut(&key) {
            Some(row) => row,
            None => return,
        };
        let combined = match row.get(&symbol) {
            Some(existing) => existing.clone().combine(action),
            None => action,
        };
        row.insert(symbol, combined);
    }

    // Insert an LL(1) production, letting the last registered rule win.
    fn overwrite(&mut self, key: RowKey, symbol: Symbol, rule: RuleId, grammar: &Grammar) {
        let row = match self.rows.get_mut(&key) {
            Some(row) => row,
            None => return,
        };
        if let Some(&Action::Reduce(previous)) = row.get(&symbol) {
            if previous != rule {
                debug!(
                    "cell ({:?}, {}) overwritten: {} replaces {}",
                    key,
                    symbol.pretty(grammar),
                    rule.pretty(grammar),
                    previous.pretty(grammar)
                );
            }
        }
        row.insert(symbol, Action::Reduce(rule));
    }

    /// Get a pretty printer for this table.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

// The columns of an LL(1) table: the terminals and the end of input.
fn ll_headers(grammar: &Grammar) -> Vec<Symbol> {
    (1..grammar.terminal_id_bound())
        .map(|id| TerminalId::from_usize(id).into())
        .chain(Some(grammar::END.into()))
        .collect()
}

// The columns of an LR table: the terminals, the end of input, and the
// nonterminals for the goto part.
fn lr_headers(grammar: &Grammar) -> Vec<Symbol> {
    ll_headers(grammar)
        .into_iter()
        .chain((0..grammar.nonterminal_id_bound()).map(|id| NonterminalId::from_usize(id).into()))
        .collect()
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ParsingTable> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, row) in self.item.rows() {
            match *key {
                RowKey::Set(id) => write!(f, "{}:", id)?,
                RowKey::Nonterminal(id) => write!(f, "{}:", id.pretty(self.ctx))?,
            }
            for symbol in self.item.headers() {
                if let Some(action) = row.get(symbol) {
                    write!(
                        f,
                        "  {}: {}",
                        symbol.pretty(self.ctx),
                        action.pretty(self.ctx)
                    )?;
                }
            }
            write!(f, "\n")?;
        }
        Ok(())
    }
}
