// Copyright (c) 2018 Fabian Schuiki
extern crate foresight;

use foresight::canonical::Collection;
use foresight::first::FirstFollow;
use foresight::grammar::{Grammar, RuleId, Symbol, END};
use foresight::item_set::{ItemSet, Variant};
use foresight::table::{Action, ParsingTable, RowKey};

const EXPR: &'static str = "
E -> E + T | T
T -> T * F | F
F -> ( E ) | id
";

fn rule_by_text(g: &Grammar, text: &str) -> RuleId {
    (0..g.rules().len())
        .map(RuleId::from_usize)
        .find(|id| format!("{}", id.pretty(g)) == text)
        .expect("no such rule")
}

fn state_with_item<'a>(g: &Grammar, collection: &'a Collection, item: &str) -> &'a ItemSet {
    collection
        .sets()
        .all()
        .iter()
        .find(|set| {
            set.items()
                .iter()
                .any(|i| format!("{}", i.pretty(g)) == item)
        })
        .expect("no state holds the item")
}

fn ll_cell<'a>(table: &'a ParsingTable, g: &Grammar, nt: &str, term: &str) -> Option<&'a Action> {
    table.action(
        RowKey::Nonterminal(g.nonterminal(nt).unwrap()),
        Symbol::Terminal(g.terminal(term).unwrap()),
    )
}

#[test]
fn ll1_table_of_pair_grammar() {
    let g = Grammar::parse("S -> A A\nA -> a A | b");
    let sets = FirstFollow::compute(&g);
    let table = ParsingTable::ll1(&g, &sets);

    let s_aa = rule_by_text(&g, "S -> A A");
    let a_aa = rule_by_text(&g, "A -> a A");
    let a_b = rule_by_text(&g, "A -> b");

    assert_eq!(ll_cell(&table, &g, "S", "a"), Some(&Action::Reduce(s_aa)));
    assert_eq!(ll_cell(&table, &g, "S", "b"), Some(&Action::Reduce(s_aa)));
    assert_eq!(ll_cell(&table, &g, "A", "a"), Some(&Action::Reduce(a_aa)));
    assert_eq!(ll_cell(&table, &g, "A", "b"), Some(&Action::Reduce(a_b)));

    // The grammar is LL(1): no cell holds a conflict, and the end of input
    // column is empty for both nonterminals.
    for (_, row) in table.rows() {
        for (_, action) in row.iter() {
            assert!(!action.is_conflict());
        }
    }
    assert_eq!(
        table.action(
            RowKey::Nonterminal(g.nonterminal("S").unwrap()),
            Symbol::Terminal(END)
        ),
        None
    );
}

#[test]
fn ll1_epsilon_rules_fill_follow_columns() {
    let g = Grammar::parse("E -> T E2\nE2 -> + T E2 | ε\nT -> id");
    let sets = FirstFollow::compute(&g);
    let table = ParsingTable::ll1(&g, &sets);
    let eps = rule_by_text(&g, "E2 -> ε");
    // Follow(E2) = {$}, so the epsilon production lands on the end of input
    // column.
    assert_eq!(
        table.action(
            RowKey::Nonterminal(g.nonterminal("E2").unwrap()),
            Symbol::Terminal(END)
        ),
        Some(&Action::Reduce(eps))
    );
    assert_eq!(
        ll_cell(&table, &g, "E2", "+"),
        Some(&Action::Reduce(rule_by_text(&g, "E2 -> + T E2")))
    );
}

#[test]
fn ll1_conflicts_keep_the_last_rule() {
    // Both alternatives of S start with a, so the cell (S, a) is written
    // twice and the later rule wins.
    let g = Grammar::parse("S -> a b | a c");
    let sets = FirstFollow::compute(&g);
    let table = ParsingTable::ll1(&g, &sets);
    assert_eq!(
        ll_cell(&table, &g, "S", "a"),
        Some(&Action::Reduce(rule_by_text(&g, "S -> a c")))
    );
}

#[test]
fn minimal_lr0_table() {
    let g = Grammar::parse("S -> a");
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Lr0);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let s = Symbol::Nonterminal(g.nonterminal("S").unwrap());
    let a = Symbol::Terminal(g.terminal("a").unwrap());
    let state = |id| RowKey::Set(foresight::item_set::ItemSetId::from_usize(id));

    assert!(match table.action(state(0), a) {
        Some(&Action::Shift(_)) => true,
        _ => false,
    });
    assert!(match table.action(state(0), s) {
        Some(&Action::Goto(_)) => true,
        _ => false,
    });
    assert_eq!(table.action(state(1), Symbol::Terminal(END)), Some(&Action::Accept));
    // LR(0) reduces on every terminal and on the end of input.
    let reduce = Action::Reduce(rule_by_text(&g, "S -> a"));
    assert_eq!(table.action(state(2), a), Some(&reduce));
    assert_eq!(table.action(state(2), Symbol::Terminal(END)), Some(&reduce));
}

#[test]
fn slr1_reduces_only_on_follow() {
    let g = Grammar::parse(EXPR);
    let sets = FirstFollow::compute(&g);

    let lr0 = Collection::compute(&g, sets.first(), Variant::Lr0);
    let lr0_table = ParsingTable::lr(&g, lr0.sets(), &sets);
    let slr = Collection::compute(&g, sets.first(), Variant::Slr1);
    let slr_table = ParsingTable::lr(&g, slr.sets(), &sets);

    let id = Symbol::Terminal(g.terminal("id").unwrap());
    let plus = Symbol::Terminal(g.terminal("+").unwrap());

    // The state holding `F -> id .` reduces unconditionally under LR(0),
    // which collides with nothing here but also fills the id column; under
    // SLR(1) the id column stays empty since id is not in Follow(F).
    let lr0_state = state_with_item(&g, &lr0, "[F -> id ., $]");
    assert!(lr0_table.action(RowKey::Set(lr0_state.id()), id).is_some());
    let slr_state = state_with_item(&g, &slr, "[F -> id ., $]");
    assert!(slr_table.action(RowKey::Set(slr_state.id()), id).is_none());
    assert!(slr_table.action(RowKey::Set(slr_state.id()), plus).is_some());
}

#[test]
fn lr1_reduces_only_on_the_lookahead() {
    let g = Grammar::parse("S -> C C\nC -> c C | d");
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Lr1);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let c = Symbol::Terminal(g.terminal("c").unwrap());
    let d = Symbol::Terminal(g.terminal("d").unwrap());
    let reduce = Action::Reduce(rule_by_text(&g, "C -> d"));

    // The state reached on the first d holds `C -> d .` with lookaheads c
    // and d, but not $.
    let state = state_with_item(&g, &collection, "[C -> d ., c]");
    assert_eq!(table.action(RowKey::Set(state.id()), c), Some(&reduce));
    assert_eq!(table.action(RowKey::Set(state.id()), d), Some(&reduce));
    assert_eq!(table.action(RowKey::Set(state.id()), Symbol::Terminal(END)), None);
}

#[test]
fn reduce_reduce_conflicts_list_both_rules() {
    let g = Grammar::parse("S -> a A d | a B e\nA -> c\nB -> c");
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Lr0);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let a_c = Action::Reduce(rule_by_text(&g, "A -> c"));
    let b_c = Action::Reduce(rule_by_text(&g, "B -> c"));
    let state = state_with_item(&g, &collection, "[A -> c ., $]");
    let d = Symbol::Terminal(g.terminal("d").unwrap());

    let cell = table
        .action(RowKey::Set(state.id()), d)
        .expect("conflict cell missing");
    assert!(cell.is_conflict());
    assert_eq!(cell.alternatives(), &[a_c.clone(), b_c.clone()]);
    // The first-registered reduction is the primary alternative.
    assert_eq!(cell.primary(), &a_c);
}

#[test]
fn shift_reduce_conflicts_keep_the_shift_primary() {
    let g = Grammar::parse("S -> i S e S | i S | x");
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Slr1);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let e = Symbol::Terminal(g.terminal("e").unwrap());
    let state = state_with_item(&g, &collection, "[S -> i S ., $]");
    let cell = table
        .action(RowKey::Set(state.id()), e)
        .expect("conflict cell missing");
    assert!(cell.is_conflict());
    match *cell.primary() {
        Action::Shift(_) => (),
        ref other => panic!("primary action is {:?}, not a shift", other),
    }
    assert_eq!(cell.alternatives().len(), 2);
    assert_eq!(
        cell.alternatives()[1],
        Action::Reduce(rule_by_text(&g, "S -> i S"))
    );
}

#[test]
fn accept_survives_a_colliding_reduction() {
    // In state 1 the augmented item is complete alongside `S -> S .`, so
    // the end of input cell holds both accept and the reduction, with
    // accept as the primary alternative.
    let g = Grammar::parse("S -> S | a");
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Lr0);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);

    let state = state_with_item(&g, &collection, "[S' -> S ., $]");
    let cell = table
        .action(RowKey::Set(state.id()), Symbol::Terminal(END))
        .expect("cell missing");
    assert!(cell.is_conflict());
    assert_eq!(cell.primary(), &Action::Accept);
}

#[test]
fn lr_headers_cover_terminals_end_and_nonterminals() {
    let g = Grammar::parse(EXPR);
    let sets = FirstFollow::compute(&g);
    let collection = Collection::compute(&g, sets.first(), Variant::Slr1);
    let table = ParsingTable::lr(&g, collection.sets(), &sets);
    // 5 terminals + $ + 3 nonterminals.
    assert_eq!(table.headers().len(), 9);
    assert_eq!(table.headers()[5], Symbol::Terminal(END));
    // One row per state, in creation order.
    assert_eq!(table.rows().len(), collection.sets().len());
}
