// Copyright (c) 2018 Fabian Schuiki

//! Table-driven parse simulation.
//!
//! The drivers in this module consume a finished parsing table and a token
//! sequence and execute the corresponding stack machine step by step. Every
//! step appends a record to a trace: the stack contents, the remaining
//! input, the action taken, and a deep copy of the parse tree built so far.
//! Failures terminate the simulation and appear as the action of the final
//! step; they are never raised as errors. A step fuse guards against
//! non-terminating simulations driven by malformed tables.

use std::error::Error;
use std::fmt;

use Pretty;
use grammar::{self, Grammar, NonterminalId, RuleId, Symbol, TerminalId};
use item_set::ItemSetId;
use table::{Action, ParsingTable, RowKey};

/// The step fuse of the LL(1) driver.
pub const LL_STEP_LIMIT: usize = 100;

/// The step fuse of the LR driver.
pub const LR_STEP_LIMIT: usize = 200;

/// An input symbol that is not a terminal of the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSymbol {
    name: String,
}

impl UnknownSymbol {
    /// The offending symbol.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown input symbol `{}`", self.name)
    }
}

impl Error for UnknownSymbol {}

/// Resolve a whitespace-separated string of tokens against the terminals of
/// a grammar.
///
/// The end of input marker is appended by the drivers and must not be part
/// of the input.
pub fn tokenize(grammar: &Grammar, input: &str) -> Result<Vec<TerminalId>, UnknownSymbol> {
    input
        .split_whitespace()
        .map(|token| {
            grammar.terminal(token).ok_or_else(|| UnknownSymbol {
                name: token.into(),
            })
        })
        .collect()
}

/// The label of a parse tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLabel {
    /// A terminal leaf.
    Terminal(TerminalId),
    /// A nonterminal with children.
    Nonterminal(NonterminalId),
    /// The leaf standing in for an empty production.
    Epsilon,
}

impl NodeLabel {
    fn of(symbol: Symbol) -> NodeLabel {
        match symbol {
            Symbol::Terminal(id) => NodeLabel::Terminal(id),
            Symbol::Nonterminal(id) => NodeLabel::Nonterminal(id),
        }
    }

    /// Get a pretty printer for this label.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a NodeLabel> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            NodeLabel::Terminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            NodeLabel::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            NodeLabel::Epsilon => write!(f, "{}", grammar::EPSILON),
        }
    }
}

/// A node of a parse tree.
///
/// Trees in traces are owned deep copies; they never alias the driver's
/// working state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    label: NodeLabel,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: NodeLabel) -> TreeNode {
        TreeNode {
            label: label,
            children: Vec::new(),
        }
    }

    /// The label of this node.
    pub fn label(&self) -> NodeLabel {
        self.label
    }

    /// The children of this node, in left-to-right order.
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Get a pretty printer for the tree rooted at this node.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a TreeNode> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_tree(f, self.ctx, self.item, 0)
    }
}

fn fmt_tree(f: &mut fmt::Formatter, grammar: &Grammar, node: &TreeNode, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    writeln!(f, "{}", node.label.pretty(grammar))?;
    for child in node.children() {
        fmt_tree(f, grammar, child, depth + 1)?;
    }
    Ok(())
}

// The working tree of the LL driver. Expansion attaches children to nodes
// that already sit inside the tree, hence nodes live in an index arena.
struct Arena {
    labels: Vec<NodeLabel>,
    children: Vec<Vec<usize>>,
}

impl Arena {
    fn new() -> Arena {
        Arena {
            labels: Vec::new(),
            children: Vec::new(),
        }
    }

    fn add(&mut self, label: NodeLabel) -> usize {
        self.labels.push(label);
        self.children.push(Vec::new());
        self.labels.len() - 1
    }

    fn attach(&mut self, parent: usize, child: usize) {
        self.children[parent].push(child);
    }

    fn freeze(&self, index: usize) -> TreeNode {
        TreeNode {
            label: self.labels[index],
            children: self.children[index]
                .iter()
                .map(|&child| self.freeze(child))
                .collect(),
        }
    }
}

/// One step of an LL(1) simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlStep {
    /// The symbol stack, bottom first. The end of input marker sits at the
    /// bottom.
    pub stack: Vec<Symbol>,
    /// The remaining input, including the end of input marker.
    pub input: Vec<TerminalId>,
    /// The action this step took.
    pub action: LlAction,
    /// The parse tree after this step.
    pub tree: TreeNode,
}

/// The action of an LL(1) simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlAction {
    /// The initial state before any step.
    Start,
    /// The terminal on top of the stack matched the input.
    Match(TerminalId),
    /// The nonterminal on top of the stack was expanded with a rule.
    Expand(RuleId),
    /// The input was accepted.
    Accept,
    /// The terminal on top of the stack did not match the input.
    TerminalMismatch {
        /// The terminal the stack demanded.
        expected: TerminalId,
        /// The terminal the input supplied.
        found: TerminalId,
    },
    /// The table has no production for the stack top and input.
    NoTableEntry {
        /// The nonterminal on top of the stack.
        nonterminal: NonterminalId,
        /// The current input terminal.
        terminal: TerminalId,
    },
    /// The step fuse blew before the simulation concluded.
    Truncated,
}

impl LlAction {
    /// Whether this action terminated the simulation unsuccessfully.
    pub fn is_error(&self) -> bool {
        match *self {
            LlAction::TerminalMismatch { .. }
            | LlAction::NoTableEntry { .. }
            | LlAction::Truncated => true,
            _ => false,
        }
    }

    /// Get a pretty printer for this action.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a LlAction> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            LlAction::Start => write!(f, "Start"),
            LlAction::Match(term) => write!(f, "Match {}", term.pretty(self.ctx)),
            LlAction::Expand(rule) => write!(f, "Expand {}", rule.pretty(self.ctx)),
            LlAction::Accept => write!(f, "Accept"),
            LlAction::TerminalMismatch { expected, found } => write!(
                f,
                "Error: terminal mismatch (expected {}, found {})",
                expected.pretty(self.ctx),
                found.pretty(self.ctx)
            ),
            LlAction::NoTableEntry {
                nonterminal,
                terminal,
            } => write!(
                f,
                "Error: no table entry for ({}, {})",
                nonterminal.pretty(self.ctx),
                terminal.pretty(self.ctx)
            ),
            LlAction::Truncated => write!(f, "Error: step limit reached"),
        }
    }
}

/// The trace of an LL(1) simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlTrace {
    steps: Vec<LlStep>,
}

impl LlTrace {
    /// The recorded steps, oldest first.
    pub fn steps(&self) -> &[LlStep] {
        &self.steps
    }

    /// Whether the simulation accepted its input.
    pub fn accepted(&self) -> bool {
        match self.steps.last() {
            Some(step) => step.action == LlAction::Accept,
            None => false,
        }
    }

    /// The parse tree of the final step.
    ///
    /// Panics if the trace is empty, which cannot happen for traces produced
    /// by the driver.
    pub fn tree(&self) -> &TreeNode {
        &self.steps[self.steps.len() - 1].tree
    }

    /// Get a pretty printer for this trace.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a LlTrace> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, step) in self.item.steps().iter().enumerate() {
            write!(f, "#{}", index)?;
            write!(f, " stack:")?;
            for symbol in &step.stack {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
            write!(f, " | input:")?;
            for term in &step.input {
                write!(f, " {}", term.pretty(self.ctx))?;
            }
            writeln!(f, " | {}", step.action.pretty(self.ctx))?;
        }
        Ok(())
    }
}

/// Simulate an LL(1) parse of a token sequence.
///
/// The symbol stack starts as `[$, S]`. Terminals on the stack are matched
/// against the input; nonterminals are expanded through the table, pushing
/// the production's symbols in reverse and growing the parse tree downward
/// from the expanded node. The simulation stops on acceptance, on the
/// errors of the contract, or when the step fuse blows.
pub fn simulate_ll(grammar: &Grammar, table: &ParsingTable, tokens: &[TerminalId]) -> LlTrace {
    let mut input = tokens.to_vec();
    input.push(grammar::END);

    let start = grammar.start_symbol();
    let mut arena = Arena::new();
    let root = arena.add(NodeLabel::Nonterminal(start));
    let mut stack: Vec<(Symbol, Option<usize>)> = vec![
        (Symbol::Terminal(grammar::END), None),
        (Symbol::Nonterminal(start), Some(root)),
    ];
    let mut position = 0;
    let mut trace = LlTrace { steps: Vec::new() };

    record_ll(&mut trace, &stack, &input, position, &arena, root, LlAction::Start);

    let mut concluded = false;
    for _ in 0..LL_STEP_LIMIT {
        let (top, node) = match stack.last() {
            Some(&entry) => entry,
            None => break,
        };
        let lookahead = input.get(position).cloned().unwrap_or(grammar::END);

        match top {
            Symbol::Terminal(term) => {
                if term == grammar::END && lookahead == grammar::END {
                    record_ll(
                        &mut trace,
                        &stack,
                        &input,
                        position,
                        &arena,
                        root,
                        LlAction::Accept,
                    );
                    concluded = true;
                    break;
                }
                if term == lookahead {
                    stack.pop();
                    position += 1;
                    record_ll(
                        &mut trace,
                        &stack,
                        &input,
                        position,
                        &arena,
                        root,
                        LlAction::Match(term),
                    );
                } else {
                    record_ll(
                        &mut trace,
                        &stack,
                        &input,
                        position,
                        &arena,
                        root,
                        LlAction::TerminalMismatch {
                            expected: term,
                            found: lookahead,
                        },
                    );
                    concluded = true;
                    break;
                }
            }
            Symbol::Nonterminal(nonterminal) => {
                let action = table
                    .action(RowKey::Nonterminal(nonterminal), Symbol::Terminal(lookahead))
                    .map(Action::primary);
                let rule = match action {
                    Some(&Action::Reduce(rule)) => rule,
                    _ => {
                        record_ll(
                            &mut trace,
                            &stack,
                            &input,
                            position,
                            &arena,
                            root,
                            LlAction::NoTableEntry {
                                nonterminal: nonterminal,
                                terminal: lookahead,
                            },
                        );
                        concluded = true;
                        break;
                    }
                };
                stack.pop();
                let symbols = grammar.rule(rule).symbols();
                if symbols.is_empty() {
                    let leaf = arena.add(NodeLabel::Epsilon);
                    if let Some(parent) = node {
                        arena.attach(parent, leaf);
                    }
                } else {
                    let children: Vec<usize> = symbols
                        .iter()
                        .map(|&symbol| arena.add(NodeLabel::of(symbol)))
                        .collect();
                    if let Some(parent) = node {
                        for &child in &children {
                            arena.attach(parent, child);
                        }
                    }
                    for (&symbol, &child) in symbols.iter().zip(children.iter()).rev() {
                        stack.push((symbol, Some(child)));
                    }
                }
                record_ll(
                    &mut trace,
                    &stack,
                    &input,
                    position,
                    &arena,
                    root,
                    LlAction::Expand(rule),
                );
            }
        }
    }

    if !concluded {
        record_ll(
            &mut trace,
            &stack,
            &input,
            position,
            &arena,
            root,
            LlAction::Truncated,
        );
    }
    trace
}

fn record_ll(
    trace: &mut LlTrace,
    stack: &[(Symbol, Option<usize>)],
    input: &[TerminalId],
    position: usize,
    arena: &Arena,
    root: usize,
    action: LlAction,
) {
    trace.steps.push(LlStep {
        stack: stack.iter().map(|&(symbol, _)| symbol).collect(),
        input: input[position..].to_vec(),
        action: action,
        tree: arena.freeze(root),
    });
}

/// One step of an LR simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrStep {
    /// The state stack, bottom first.
    pub states: Vec<ItemSetId>,
    /// The symbol stack, bottom first. The end of input marker sits at the
    /// bottom.
    pub symbols: Vec<Symbol>,
    /// The remaining input, including the end of input marker.
    pub input: Vec<TerminalId>,
    /// The action this step took.
    pub action: LrAction,
    /// The forest of subtrees on the stack after this step.
    pub forest: Vec<TreeNode>,
}

/// The action of an LR simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LrAction {
    /// The initial state before any step.
    Start,
    /// A terminal was shifted into a state.
    Shift(TerminalId, ItemSetId),
    /// A rule was reduced.
    Reduce(RuleId),
    /// The input was accepted.
    Accept,
    /// The table has no action for the current state and input.
    NoTransition {
        /// The state on top of the stack.
        state: ItemSetId,
        /// The current input terminal.
        terminal: TerminalId,
    },
    /// A reduction found no goto entry for the uncovered state.
    MissingGoto {
        /// The state the goto was looked up in.
        state: ItemSetId,
        /// The nonterminal that was reduced to.
        nonterminal: NonterminalId,
    },
    /// The step fuse blew before the simulation concluded.
    Truncated,
}

impl LrAction {
    /// Whether this action terminated the simulation unsuccessfully.
    pub fn is_error(&self) -> bool {
        match *self {
            LrAction::NoTransition { .. } | LrAction::MissingGoto { .. } | LrAction::Truncated => {
                true
            }
            _ => false,
        }
    }

    /// Get a pretty printer for this action.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a LrAction> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            LrAction::Start => write!(f, "Start"),
            LrAction::Shift(term, state) => {
                write!(f, "Shift {} into {}", term.pretty(self.ctx), state)
            }
            LrAction::Reduce(rule) => write!(f, "Reduce {}", rule.pretty(self.ctx)),
            LrAction::Accept => write!(f, "Accept"),
            LrAction::NoTransition { state, terminal } => write!(
                f,
                "Error: no action for ({}, {})",
                state,
                terminal.pretty(self.ctx)
            ),
            LrAction::MissingGoto { state, nonterminal } => write!(
                f,
                "Error: no goto for ({}, {})",
                state,
                nonterminal.pretty(self.ctx)
            ),
            LrAction::Truncated => write!(f, "Error: step limit reached"),
        }
    }
}

/// The trace of an LR simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrTrace {
    steps: Vec<LrStep>,
}

impl LrTrace {
    /// The recorded steps, oldest first.
    pub fn steps(&self) -> &[LrStep] {
        &self.steps
    }

    /// Whether the simulation accepted its input.
    pub fn accepted(&self) -> bool {
        match self.steps.last() {
            Some(step) => step.action == LrAction::Accept,
            None => false,
        }
    }

    /// The forest of the final step.
    pub fn forest(&self) -> &[TreeNode] {
        match self.steps.last() {
            Some(step) => &step.forest,
            None => &[],
        }
    }

    /// Get a pretty printer for this trace.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a LrTrace> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for step in self.item.steps() {
            write!(f, "states:")?;
            for state in &step.states {
                write!(f, " {}", state)?;
            }
            write!(f, " | symbols:")?;
            for symbol in &step.symbols {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
            write!(f, " | input:")?;
            for term in &step.input {
                write!(f, " {}", term.pretty(self.ctx))?;
            }
            writeln!(f, " | {}", step.action.pretty(self.ctx))?;
        }
        Ok(())
    }
}

/// Simulate an LR parse of a token sequence.
///
/// The state stack starts as `[i0]` and the symbol stack as `[$]`. Shifts
/// push the input terminal and a leaf node; reductions pop one entry per
/// right-hand symbol from all three stacks, wrap the popped subtrees into a
/// new node (an empty production wraps a single epsilon leaf), and follow
/// the goto entry of the uncovered state. Conflict cells resolve to their
/// primary alternative. The simulation stops on acceptance, on the errors
/// of the contract, or when the step fuse blows.
pub fn simulate_lr(grammar: &Grammar, table: &ParsingTable, tokens: &[TerminalId]) -> LrTrace {
    let mut input = tokens.to_vec();
    input.push(grammar::END);

    let mut states = vec![ItemSetId::from_usize(0)];
    let mut symbols: Vec<Symbol> = vec![Symbol::Terminal(grammar::END)];
    let mut forest: Vec<TreeNode> = Vec::new();
    let mut position = 0;
    let mut trace = LrTrace { steps: Vec::new() };

    record_lr(&mut trace, &states, &symbols, &input, position, &forest, LrAction::Start);

    let mut concluded = false;
    for _ in 0..LR_STEP_LIMIT {
        let state = states[states.len() - 1];
        let lookahead = input.get(position).cloned().unwrap_or(grammar::END);
        let action = table
            .action(RowKey::Set(state), Symbol::Terminal(lookahead))
            .map(Action::primary);

        match action {
            Some(&Action::Shift(target)) => {
                states.push(target);
                symbols.push(Symbol::Terminal(lookahead));
                forest.push(TreeNode::leaf(NodeLabel::Terminal(lookahead)));
                position += 1;
                record_lr(
                    &mut trace,
                    &states,
                    &symbols,
                    &input,
                    position,
                    &forest,
                    LrAction::Shift(lookahead, target),
                );
            }
            Some(&Action::Reduce(rule)) => {
                let lhs = grammar.rule(rule).name();
                let count = grammar.rule(rule).symbols().len();
                if states.len() <= count {
                    record_lr(
                        &mut trace,
                        &states,
                        &symbols,
                        &input,
                        position,
                        &forest,
                        LrAction::MissingGoto {
                            state: state,
                            nonterminal: lhs,
                        },
                    );
                    concluded = true;
                    break;
                }
                let mut children = forest.split_off(forest.len() - count);
                states.truncate(states.len() - count);
                symbols.truncate(symbols.len() - count);
                if children.is_empty() {
                    children.push(TreeNode::leaf(NodeLabel::Epsilon));
                }
                let uncovered = states[states.len() - 1];
                let target = match table
                    .action(RowKey::Set(uncovered), Symbol::Nonterminal(lhs))
                    .map(Action::primary)
                {
                    Some(&Action::Goto(target)) => target,
                    _ => {
                        record_lr(
                            &mut trace,
                            &states,
                            &symbols,
                            &input,
                            position,
                            &forest,
                            LrAction::MissingGoto {
                                state: uncovered,
                                nonterminal: lhs,
                            },
                        );
                        concluded = true;
                        break;
                    }
                };
                states.push(target);
                symbols.push(Symbol::Nonterminal(lhs));
                forest.push(TreeNode {
                    label: NodeLabel::Nonterminal(lhs),
                    children: children,
                });
                record_lr(
                    &mut trace,
                    &states,
                    &symbols,
                    &input,
                    position,
                    &forest,
                    LrAction::Reduce(rule),
                );
            }
            Some(&Action::Accept) => {
                record_lr(
                    &mut trace,
                    &states,
                    &symbols,
                    &input,
                    position,
                    &forest,
                    LrAction::Accept,
                );
                concluded = true;
                break;
            }
            _ => {
                record_lr(
                    &mut trace,
                    &states,
                    &symbols,
                    &input,
                    position,
                    &forest,
                    LrAction::NoTransition {
                        state: state,
                        terminal: lookahead,
                    },
                );
                concluded = true;
                break;
            }
        }
    }

    if !concluded {
        record_lr(
            &mut trace,
            &states,
            &symbols,
            &input,
            position,
            &forest,
            LrAction::Truncated,
        );
    }
    trace
}

fn record_lr(
    trace: &mut LrTrace,
    states: &[ItemSetId],
    symbols: &[Symbol],
    input: &[TerminalId],
    position: usize,
    forest: &[TreeNode],
    action: LrAction,
) {
    trace.steps.push(LrStep {
        states: states.to_vec(),
        symbols: symbols.to_vec(),
        input: input[position..].to_vec(),
        action: action,
        forest: forest.to_vec(),
    });
}
