// Copyright (c) 2018 Fabian Schuiki
extern crate foresight;

use foresight::grammar::{Grammar, RuleId, Symbol};

const EXPR: &'static str = "
E -> E + T | T
T -> T * F | F
F -> ( E ) | id
";

#[test]
fn parse_expression_grammar() {
    let g = Grammar::parse(EXPR);
    assert_eq!(g.rules().len(), 6);
    assert_eq!(g.nonterminal_id_bound(), 3);
    // Five terminals plus the builtin end of input marker.
    assert_eq!(g.terminal_id_bound(), 6);
    assert_eq!(g.nonterminal_name(g.start_symbol()), "E");
    for name in &["E", "T", "F"] {
        assert!(g.nonterminal(name).is_some(), "{} should be a nonterminal", name);
        assert!(g.terminal(name).is_none());
    }
    for name in &["+", "*", "(", ")", "id"] {
        assert!(g.terminal(name).is_some(), "{} should be a terminal", name);
        assert!(g.nonterminal(name).is_none());
    }
}

#[test]
fn first_lhs_is_start_symbol() {
    let g = Grammar::parse("A -> x\nB -> y");
    assert_eq!(g.nonterminal_name(g.start_symbol()), "A");
}

#[test]
fn rhs_symbols_become_nonterminals_when_defined_later() {
    let g = Grammar::parse("S -> A b\nA -> a");
    assert!(g.nonterminal("A").is_some());
    assert!(g.terminal("A").is_none());
    assert!(g.terminal("a").is_some());
    assert!(g.terminal("b").is_some());
}

#[test]
fn lines_without_separator_are_skipped() {
    let g = Grammar::parse("E - T\nS -> a\n\njunk line\nS -> b");
    assert_eq!(g.rules().len(), 2);
    assert_eq!(g.nonterminal_id_bound(), 1);
    assert_eq!(g.nonterminal_name(g.start_symbol()), "S");
}

#[test]
fn alternatives_split_into_rules() {
    let g = Grammar::parse("S -> a b | c | d e f");
    let lengths: Vec<usize> = g.rules().map(|r| r.symbols().len()).collect();
    assert_eq!(lengths, vec![2, 1, 3]);
}

#[test]
fn epsilon_marker_denotes_empty_production() {
    let g = Grammar::parse("S -> a S | ε");
    assert_eq!(g.rules().len(), 2);
    let empty = g.rules().nth(1).unwrap();
    assert!(empty.symbols().is_empty());
    // Epsilon is not a terminal of the grammar.
    assert!(g.terminal("ε").is_none());
    assert_eq!(
        format!("{}", RuleId::from_usize(1).pretty(&g)),
        "S -> ε"
    );
}

#[test]
fn duplicate_rules_share_a_canonical_id() {
    let g = Grammar::parse("S -> a\nS -> a\nS -> b");
    assert_eq!(g.canonical_rule(RuleId::from_usize(0)), RuleId::from_usize(0));
    assert_eq!(g.canonical_rule(RuleId::from_usize(1)), RuleId::from_usize(0));
    assert_eq!(g.canonical_rule(RuleId::from_usize(2)), RuleId::from_usize(2));
}

#[test]
fn rules_index_by_nonterminal() {
    let g = Grammar::parse(EXPR);
    let t = g.nonterminal("T").unwrap();
    let rules: Vec<String> = g.rules_for_nonterminal(t)
        .map(|&id| format!("{}", id.pretty(&g)))
        .collect();
    assert_eq!(rules, vec!["T -> T * F", "T -> F"]);
}

#[test]
fn symbols_display_their_names() {
    let g = Grammar::parse(EXPR);
    let id = Symbol::Terminal(g.terminal("id").unwrap());
    let e = Symbol::Nonterminal(g.nonterminal("E").unwrap());
    assert_eq!(format!("{}", id.pretty(&g)), "id");
    assert_eq!(format!("{}", e.pretty(&g)), "E");
}
