// Copyright (c) 2018 Fabian Schuiki
extern crate foresight;

use foresight::canonical::Collection;
use foresight::first::FirstFollow;
use foresight::grammar::{Grammar, END};
use foresight::item_set::Variant;
use foresight::sim::{self, LlAction, LrAction, NodeLabel, LL_STEP_LIMIT};
use foresight::table::ParsingTable;

const EXPR: &'static str = "
E -> E + T | T
T -> T * F | F
F -> ( E ) | id
";

const LL_EXPR: &'static str = "
E -> T E2
E2 -> + T E2 | ε
T -> F T2
T2 -> * F T2 | ε
F -> ( E ) | id
";

fn lr_setup(text: &str, variant: Variant) -> (Grammar, ParsingTable) {
    let g = Grammar::parse(text);
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), variant);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);
    (g, table)
}

fn ll_setup(text: &str) -> (Grammar, ParsingTable) {
    let g = Grammar::parse(text);
    let sets = FirstFollow::compute(&g);
    let table = ParsingTable::ll1(&g, &sets);
    (g, table)
}

#[test]
fn tokenize_resolves_terminals() {
    let g = Grammar::parse(EXPR);
    let tokens = sim::tokenize(&g, "id + id").unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], g.terminal("id").unwrap());
    assert_eq!(tokens[1], g.terminal("+").unwrap());
}

#[test]
fn tokenize_rejects_unknown_symbols() {
    let g = Grammar::parse(EXPR);
    let err = sim::tokenize(&g, "id & id").unwrap_err();
    assert_eq!(err.name(), "&");
}

#[test]
fn lr1_round_trip_accepts_a_derivable_sentence() {
    let (g, table) = lr_setup(EXPR, Variant::Lr1);
    let tokens = sim::tokenize(&g, "id + id * id").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    assert!(trace.accepted());

    let last = trace.steps().last().unwrap();
    // All input was consumed except the end of input marker.
    assert_eq!(last.input, vec![END]);
    // A single tree remains on the stack, rooted at the start symbol.
    assert_eq!(trace.forest().len(), 1);
    assert_eq!(
        trace.forest()[0].label(),
        NodeLabel::Nonterminal(g.start_symbol())
    );
}

#[test]
fn lr_tree_reflects_precedence() {
    let (g, table) = lr_setup(EXPR, Variant::Slr1);
    let tokens = sim::tokenize(&g, "id + id * id").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    assert!(trace.accepted());
    // The root expands to E + T, with the multiplication inside the T.
    let root = &trace.forest()[0];
    assert_eq!(root.children().len(), 3);
    assert_eq!(
        root.children()[0].label(),
        NodeLabel::Nonterminal(g.nonterminal("E").unwrap())
    );
    assert_eq!(
        root.children()[1].label(),
        NodeLabel::Terminal(g.terminal("+").unwrap())
    );
    let t = &root.children()[2];
    assert_eq!(t.label(), NodeLabel::Nonterminal(g.nonterminal("T").unwrap()));
    assert_eq!(t.children().len(), 3);
}

#[test]
fn lr_rejects_a_truncated_sentence() {
    let (g, table) = lr_setup(EXPR, Variant::Lr1);
    let tokens = sim::tokenize(&g, "id +").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    assert!(!trace.accepted());
    let last = trace.steps().last().unwrap();
    assert!(last.action.is_error());
    match last.action {
        LrAction::NoTransition { terminal, .. } => assert_eq!(terminal, END),
        ref other => panic!("unexpected final action {:?}", other),
    }
}

#[test]
fn lr_rejects_an_unparsable_sentence() {
    let (g, table) = lr_setup(EXPR, Variant::Slr1);
    let tokens = sim::tokenize(&g, "+ id").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    assert!(!trace.accepted());
    assert!(trace.steps().last().unwrap().action.is_error());
}

#[test]
fn lr_epsilon_reduction_builds_an_epsilon_leaf() {
    let (g, table) = lr_setup("S -> a B\nB -> b | ε", Variant::Lr1);
    let tokens = sim::tokenize(&g, "a").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    assert!(trace.accepted());
    let root = &trace.forest()[0];
    let b = &root.children()[1];
    assert_eq!(b.label(), NodeLabel::Nonterminal(g.nonterminal("B").unwrap()));
    assert_eq!(b.children().len(), 1);
    assert_eq!(b.children()[0].label(), NodeLabel::Epsilon);
}

#[test]
fn lr_trace_starts_with_the_seed_stacks() {
    let (g, table) = lr_setup(EXPR, Variant::Lr1);
    let tokens = sim::tokenize(&g, "id").unwrap();
    let trace = sim::simulate_lr(&g, &table, &tokens);
    let first = &trace.steps()[0];
    assert_eq!(first.action, LrAction::Start);
    assert_eq!(first.states.len(), 1);
    assert_eq!(first.symbols.len(), 1);
    assert!(first.forest.is_empty());
    assert_eq!(first.input.len(), 2);
}

#[test]
fn ll1_round_trip_accepts_a_derivable_sentence() {
    let (g, table) = ll_setup(LL_EXPR);
    let tokens = sim::tokenize(&g, "id + id * id").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(trace.accepted());
    let last = trace.steps().last().unwrap();
    assert_eq!(last.input, vec![END]);
    assert_eq!(
        trace.tree().label(),
        NodeLabel::Nonterminal(g.start_symbol())
    );
    // The root expanded to T E2.
    assert_eq!(trace.tree().children().len(), 2);
}

#[test]
fn ll1_pair_grammar_round_trip() {
    let (g, table) = ll_setup("S -> A A\nA -> a A | b");
    let tokens = sim::tokenize(&g, "a b b").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(trace.accepted());
    assert_eq!(trace.tree().children().len(), 2);
}

#[test]
fn ll1_reports_a_terminal_mismatch() {
    let (g, table) = ll_setup(LL_EXPR);
    // `( id` derives to a point where `)` is demanded but the input ends.
    let tokens = sim::tokenize(&g, "( id").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(!trace.accepted());
    let last = trace.steps().last().unwrap();
    match last.action {
        LlAction::TerminalMismatch { expected, found } => {
            assert_eq!(expected, g.terminal(")").unwrap());
            assert_eq!(found, END);
        }
        ref other => panic!("unexpected final action {:?}", other),
    }
}

#[test]
fn ll1_reports_a_missing_table_entry() {
    let (g, table) = ll_setup(LL_EXPR);
    let tokens = sim::tokenize(&g, "+ id").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(!trace.accepted());
    let last = trace.steps().last().unwrap();
    match last.action {
        LlAction::NoTableEntry { nonterminal, terminal } => {
            assert_eq!(nonterminal, g.start_symbol());
            assert_eq!(terminal, g.terminal("+").unwrap());
        }
        ref other => panic!("unexpected final action {:?}", other),
    }
}

#[test]
fn ll1_step_fuse_reports_truncation() {
    // The table sends `b` through `S -> A S` and `A -> ε` forever, never
    // consuming input; the fuse must end the simulation explicitly.
    let (g, table) = ll_setup("S -> b | A S\nA -> ε");
    let tokens = sim::tokenize(&g, "b").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(!trace.accepted());
    let last = trace.steps().last().unwrap();
    assert_eq!(last.action, LlAction::Truncated);
    // One start step, one step per fused iteration, one truncation report.
    assert_eq!(trace.steps().len(), LL_STEP_LIMIT + 2);
}

#[test]
fn ll1_match_steps_consume_input() {
    let (g, table) = ll_setup("S -> a S | b");
    let tokens = sim::tokenize(&g, "a a b").unwrap();
    let trace = sim::simulate_ll(&g, &table, &tokens);
    assert!(trace.accepted());
    let matches = trace
        .steps()
        .iter()
        .filter(|step| match step.action {
            LlAction::Match(_) => true,
            _ => false,
        })
        .count();
    assert_eq!(matches, 3);
}

#[test]
fn failed_simulations_leave_earlier_results_intact() {
    let g = Grammar::parse(EXPR);
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Lr1);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let before = collection.sets().len();
    let bad = sim::tokenize(&g, "+ +").unwrap();
    let trace = sim::simulate_lr(&g, &table, &bad);
    assert!(!trace.accepted());

    // The grammar, collection, and table are unchanged and reusable.
    assert_eq!(collection.sets().len(), before);
    let good = sim::tokenize(&g, "id").unwrap();
    assert!(sim::simulate_lr(&g, &table, &good).accepted());
}
