// Copyright (c) 2018 Fabian Schuiki

//! A grammar analyzer and parsing table constructor.
//!
//! This crate takes a context-free grammar and derives the data structures
//! that drive table-based parsers: first and follow sets, an LL(1) predictive
//! table, and the LR(0)/SLR(1)/LR(1) canonical collections with their
//! shift-reduce tables. Stack-machine drivers consume the finished tables and
//! simulate parses step by step, producing a trace and a parse tree.

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod grammar;
pub mod history;
pub mod first;
pub mod item_set;
pub mod canonical;
pub mod table;
pub mod sim;

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
