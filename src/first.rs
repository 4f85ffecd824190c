// Copyright (c) 2018 Fabian Schuiki

//! First and follow set computation.
//!
//! This module implements the fixed point computation of the first and
//! follow sets for a grammar. The first set of a nonterminal holds all
//! terminals that can begin a string derived from it, plus an epsilon flag
//! if it can derive the empty string. The follow set of a nonterminal holds
//! all terminals that can appear immediately after it in a derivation,
//! including the end of input marker. Since rules may contain other rules
//! and empty productions, both computations iterate until convergence.

use std::fmt;
use std::iter::repeat;

use bit_set::{self, BitSet};

use Pretty;
use grammar::{Grammar, NonterminalId, RuleId, Symbol, TerminalId, END};
use history::{Active, History};

/// All first sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets(Vec<FirstSet>);

/// The first set of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSet {
    /// The first terminals.
    symbols: BitSet,
    /// Whether the nonterminal can derive the empty string.
    has_epsilon: bool,
}

/// All follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets(Vec<BitSet>);

/// The first terminals of a symbol sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFirst {
    /// The terminals that can begin the sequence.
    pub symbols: BitSet,
    /// Whether the entire sequence can derive the empty string.
    pub nullable: bool,
}

/// The combined result of the first/follow analysis.
///
/// Holds the converged sets and the snapshot history of how they grew. The
/// sets are immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    first: FirstSets,
    follow: FollowSets,
    history: History<SetsSnapshot>,
}

/// A deep copy of both set families at one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetsSnapshot {
    /// The first sets at this step.
    pub first: FirstSets,
    /// The follow sets at this step.
    pub follow: FollowSets,
}

impl FirstFollow {
    /// Compute the first and follow sets of a grammar.
    pub fn compute(grammar: &Grammar) -> FirstFollow {
        compute(grammar)
    }

    /// The converged first sets.
    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    /// The converged follow sets.
    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    /// The snapshot history of the computation.
    pub fn history(&self) -> &History<SetsSnapshot> {
        &self.history
    }

    /// Get a pretty printer for the converged sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl FirstSets {
    /// Access the first set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &FirstSet {
        &self.0[id.as_usize()]
    }

    /// Determine the first terminals of a symbol sequence.
    ///
    /// Walks the sequence from the left. A terminal contributes itself and
    /// ends the walk; a nonterminal contributes its first set and ends the
    /// walk unless it can derive the empty string. If the walk falls off the
    /// end of the sequence, the sequence as a whole is nullable. The empty
    /// sequence is trivially nullable.
    pub fn of_sequence(&self, symbols: &[Symbol]) -> SequenceFirst {
        let mut result = SequenceFirst {
            symbols: BitSet::new(),
            nullable: true,
        };
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(id) => {
                    result.symbols.insert(id.as_usize());
                    result.nullable = false;
                }
                Symbol::Nonterminal(id) => {
                    let fs = self.get(id);
                    result.symbols.union_with(&fs.symbols);
                    result.nullable = fs.has_epsilon;
                }
            }
            if !result.nullable {
                break;
            }
        }
        result
    }
}

impl FirstSet {
    /// Whether the set contains a terminal.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// Whether the nonterminal can derive the empty string.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }

    /// An iterator over the terminals in the set, in ascending id order.
    pub fn terminals(&self) -> Terminals {
        Terminals(self.symbols.iter())
    }
}

/// An iterator over the terminals in a set.
pub struct Terminals<'a>(bit_set::Iter<'a, u32>);

impl<'a> Iterator for Terminals<'a> {
    type Item = TerminalId;

    fn next(&mut self) -> Option<TerminalId> {
        self.0.next().map(TerminalId::from_usize)
    }
}

impl FollowSets {
    /// Access the follow set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &BitSet {
        &self.0[id.as_usize()]
    }

    /// Whether the follow set of a nonterminal contains a terminal.
    pub fn contains(&self, id: NonterminalId, term: TerminalId) -> bool {
        self.0[id.as_usize()].contains(term.as_usize())
    }

    /// An iterator over the terminals following a nonterminal, in ascending
    /// id order.
    pub fn terminals(&self, id: NonterminalId) -> Terminals {
        Terminals(self.0[id.as_usize()].iter())
    }
}

/// The meat of this module. Runs both fixed points to convergence, recording
/// a snapshot whenever a rule changed a set.
fn compute(grammar: &Grammar) -> FirstFollow {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();

    let mut first = FirstSets(
        repeat(FirstSet {
            symbols: BitSet::with_capacity(num_term),
            has_epsilon: false,
        }).take(num_nonterm)
            .collect(),
    );
    let mut follow = FollowSets(
        repeat(BitSet::with_capacity(num_term))
            .take(num_nonterm)
            .collect(),
    );
    let mut history = History::new();

    if num_nonterm == 0 {
        return FirstFollow {
            first: first,
            follow: follow,
            history: history,
        };
    }

    // The start symbol is followed by the end of input.
    let start = grammar.start_symbol();
    follow.0[start.as_usize()].insert(END.as_usize());
    history.record(
        format!(
            "Initialized sets. Follow({}) starts with $.",
            start.pretty(grammar)
        ),
        SetsSnapshot {
            first: first.clone(),
            follow: follow.clone(),
        },
        Active::symbol(start),
    );

    // First set fixed point. Each full pass scans the rules in declaration
    // order; the sets only grow, so this converges.
    let mut passes = 0;
    loop {
        let mut changed = false;
        for (index, rule) in grammar.rules().enumerate() {
            let lhs = rule.name();
            let seq = first.of_sequence(rule.symbols());
            let fs = &mut first.0[lhs.as_usize()];
            let before = (fs.symbols.len(), fs.has_epsilon);
            fs.symbols.union_with(&seq.symbols);
            fs.has_epsilon |= seq.nullable;
            if (fs.symbols.len(), fs.has_epsilon) != before {
                changed = true;
                history.record(
                    format!(
                        "Updated First({}) using rule {}",
                        lhs.pretty(grammar),
                        RuleId::from_usize(index).pretty(grammar)
                    ),
                    SetsSnapshot {
                        first: first.clone(),
                        follow: follow.clone(),
                    },
                    Active::symbol(lhs),
                );
            }
        }
        passes += 1;
        if !changed {
            break;
        }
    }
    debug!("first sets converged after {} passes", passes);
    history.record(
        "First sets converged.",
        SetsSnapshot {
            first: first.clone(),
            follow: follow.clone(),
        },
        Active::none(),
    );

    // Follow set fixed point. For every nonterminal occurrence, the first
    // terminals of its trailer follow it; if the trailer can derive the
    // empty string, everything following the rule's left-hand side does too.
    passes = 0;
    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            let lhs = rule.name();
            let symbols = rule.symbols();
            for (pos, symbol) in symbols.iter().enumerate() {
                let target = match *symbol {
                    Symbol::Nonterminal(id) => id,
                    Symbol::Terminal(_) => continue,
                };
                let trailer = first.of_sequence(&symbols[pos + 1..]);
                let before = follow.0[target.as_usize()].len();
                follow.0[target.as_usize()].union_with(&trailer.symbols);
                if trailer.nullable {
                    let from = follow.0[lhs.as_usize()].clone();
                    follow.0[target.as_usize()].union_with(&from);
                }
                if follow.0[target.as_usize()].len() != before {
                    changed = true;
                    history.record(
                        format!(
                            "Updated Follow({}) from its occurrence in a rule of {}",
                            target.pretty(grammar),
                            lhs.pretty(grammar)
                        ),
                        SetsSnapshot {
                            first: first.clone(),
                            follow: follow.clone(),
                        },
                        Active::symbol(target),
                    );
                }
            }
        }
        passes += 1;
        if !changed {
            break;
        }
    }
    debug!("follow sets converged after {} passes", passes);
    history.record(
        "Follow sets converged.",
        SetsSnapshot {
            first: first.clone(),
            follow: follow.clone(),
        },
        Active::none(),
    );

    FirstFollow {
        first: first,
        follow: follow,
        history: history,
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstFollow> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for index in 0..self.ctx.nonterminal_id_bound() {
            let id = NonterminalId::from_usize(index);
            let fs = self.item.first.get(id);
            write!(f, "first({}) = {{", id.pretty(self.ctx))?;
            let mut sep = "";
            for term in fs.terminals() {
                write!(f, "{} {}", sep, term.pretty(self.ctx))?;
                sep = ",";
            }
            if fs.has_epsilon() {
                write!(f, "{} ε", sep)?;
            }
            write!(f, " }}  follow({}) = {{", id.pretty(self.ctx))?;
            sep = "";
            for term in self.item.follow.terminals(id) {
                write!(f, "{} {}", sep, term.pretty(self.ctx))?;
                sep = ",";
            }
            writeln!(f, " }}")?;
        }
        Ok(())
    }
}
