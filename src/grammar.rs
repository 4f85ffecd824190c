// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.
//!
//! A grammar is an ordered list of rules over interned symbols. Rules are
//! written against nonterminal and terminal ids; the name tables live in the
//! grammar itself. Grammars are constructed either programmatically or from
//! a textual description, and are immutable once handed to the analyses.

use std;
use std::fmt;
use std::collections::HashMap;
use Pretty;

/// The textual marker for an empty right-hand side.
pub const EPSILON: &'static str = "ε";

/// The special end of input terminal, displayed as `$`.
pub const END: TerminalId = TerminalId(0);

/// The augmented start rule `S' -> S`.
pub const ACCEPT: RuleId = RuleId(std::usize::MAX);

/// A grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    nonterm_rules: Vec<Vec<RuleId>>,
    term_names: Vec<String>,
    canon: Vec<RuleId>,
}

/// A single rule within a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    name: NonterminalId,
    symbols: Vec<Symbol>,
}

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// A unique rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

/// An iterator over the rules of a grammar.
pub type RulesIter<'a> = std::slice::Iter<'a, Rule>;

/// An iterator over the rule IDs of a grammar.
pub type RuleIdsIter<'a> = std::slice::Iter<'a, RuleId>;

impl Grammar {
    /// Create a new empty grammar.
    pub fn new() -> Grammar {
        Grammar {
            rules: Vec::new(),
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            nonterm_rules: Vec::new(),
            term_names: Vec::new(),
            canon: Vec::new(),
        }
    }

    /// Parse a grammar from its textual description.
    ///
    /// One rule per line, of the form `LHS -> alt1 | alt2 | ...`, with the
    /// symbols of each alternative separated by whitespace. The left-hand
    /// side of the first rule becomes the start symbol. A symbol that never
    /// appears as a left-hand side is a terminal; the marker `ε` denotes an
    /// empty right-hand side. Lines without a `->` separator are skipped.
    pub fn parse(input: &str) -> Grammar {
        let mut grammar = Grammar::new();

        // Gather the raw rules and register every left-hand side, such that
        // right-hand symbols can be classified in the second pass.
        let mut raw: Vec<(NonterminalId, Vec<&str>)> = Vec::new();
        for line in input.lines() {
            let mut parts = line.splitn(2, "->");
            let lhs = parts.next().map(str::trim).unwrap_or("");
            let rhs = match parts.next() {
                Some(rhs) => rhs,
                None => {
                    if !line.trim().is_empty() {
                        debug!("skipping grammar line without separator: {:?}", line);
                    }
                    continue;
                }
            };
            if lhs.is_empty() {
                debug!("skipping grammar line without left-hand side: {:?}", line);
                continue;
            }
            let id = grammar.add_nonterminal(lhs);
            for alt in rhs.split('|') {
                raw.push((id, alt.split_whitespace().collect()));
            }
        }

        // Intern the right-hand sides. Epsilon markers derive nothing and
        // are dropped from the symbol sequence.
        for (lhs, symbols) in raw {
            let symbols = symbols
                .into_iter()
                .filter(|&s| s != EPSILON)
                .map(|s| match grammar.nonterminal(s) {
                    Some(id) => Symbol::Nonterminal(id),
                    None => Symbol::Terminal(grammar.add_terminal(s)),
                })
                .collect();
            grammar.add_rule(Rule::new(lhs, symbols));
        }

        grammar
    }

    /// Add a nonterminal.
    pub fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            self.nonterm_rules.push(Vec::new());
            next_id
        }
    }

    /// Add a terminal.
    pub fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len() + 1);
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    /// Add a rule to the grammar.
    pub fn add_rule(&mut self, rule: Rule) -> RuleId {
        let id = RuleId::from_usize(self.rules.len());
        // Duplicate rules collapse onto their first occurrence, such that
        // items derived from either compare equal.
        let canon = self.rules
            .iter()
            .position(|r| *r == rule)
            .map(RuleId::from_usize)
            .unwrap_or(id);
        self.nonterm_rules[rule.name().as_usize()].push(id);
        self.rules.push(rule);
        self.canon.push(canon);
        id
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        if id == END {
            "$"
        } else {
            &self.term_names[id.as_usize() - 1]
        }
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Look up a terminal by name.
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.terms.get(name).cloned()
    }

    /// The start symbol of the grammar.
    ///
    /// This is the first nonterminal added to the grammar, which for parsed
    /// grammars is the left-hand side of the first rule. Panics if the
    /// grammar has no nonterminals.
    pub fn start_symbol(&self) -> NonterminalId {
        if self.nonterm_names.is_empty() {
            panic!("start_symbol() called on a grammar without nonterminals");
        }
        NonterminalId(0)
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold nonterminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    ///
    /// Basically returns the largest terminal ID + 1. Can be used as capacity
    /// for containers that will hold terminals.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len() + 1
    }

    /// The rules in this grammar.
    pub fn rules(&self) -> RulesIter {
        self.rules.iter()
    }

    /// The rules for a specific nonterminal in the grammar.
    pub fn rules_for_nonterminal(&self, id: NonterminalId) -> RuleIdsIter {
        self.nonterm_rules[id.as_usize()].iter()
    }

    /// Access a single rule of this grammar.
    ///
    /// Panics if the id is the builtin `ACCEPT` rule, which represents the
    /// virtual augmented start rule.
    pub fn rule(&self, id: RuleId) -> &Rule {
        if id == ACCEPT {
            panic!("rule() called for builtin ACCEPT rule");
        }
        &self.rules[id.as_usize()]
    }

    /// Resolve a rule id to the first rule with the same contents.
    pub fn canonical_rule(&self, id: RuleId) -> RuleId {
        if id == ACCEPT {
            ACCEPT
        } else {
            self.canon[id.as_usize()]
        }
    }
}

impl Rule {
    /// Create a new rule.
    pub fn new(name: NonterminalId, symbols: Vec<Symbol>) -> Rule {
        Rule {
            name: name,
            symbols: symbols,
        }
    }

    /// The name of this rule.
    pub fn name(&self) -> NonterminalId {
        self.name
    }

    /// The symbols in this production.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl Symbol {
    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Symbol::Terminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            Symbol::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
        }
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

impl RuleId {
    /// Create a rule id from a usize.
    pub fn from_usize(id: usize) -> RuleId {
        RuleId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this rule.
    ///
    /// The rule is rendered as `LHS -> symbols`, with `ε` standing in for an
    /// empty right-hand side and the builtin `ACCEPT` rule rendered as the
    /// augmented start rule.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, RuleId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.item == ACCEPT {
            let start = self.ctx.start_symbol();
            return write!(
                f,
                "{}' -> {}",
                start.pretty(self.ctx),
                start.pretty(self.ctx)
            );
        }
        let rule = self.ctx.rule(self.item);
        write!(f, "{} ->", rule.name().pretty(self.ctx))?;
        if rule.symbols().is_empty() {
            write!(f, " {}", EPSILON)?;
        }
        for symbol in rule.symbols() {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Grammar> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for index in 0..self.ctx.rules.len() {
            writeln!(f, "{}", RuleId::from_usize(index).pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl Grammar {
    /// Get a pretty printer for the rules of this grammar.
    pub fn pretty<'a>(&'a self) -> Pretty<&'a Grammar, &'a Grammar> {
        Pretty::new(self, self)
    }
}
