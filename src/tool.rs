// Copyright (c) 2018 Fabian Schuiki

//! The command line grammar analyzer.

#[macro_use]
extern crate clap;
extern crate foresight;
extern crate memmap;
extern crate stderrlog;

use std::fs::File;
use std::process;
use std::str;

use clap::{App, Arg};
use memmap::Mmap;

use foresight::canonical::Collection;
use foresight::first::FirstFollow;
use foresight::grammar::Grammar;
use foresight::item_set::Variant;
use foresight::sim;
use foresight::table::ParsingTable;

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::with_name("GRAMMAR")
                .help("The grammar file to analyze")
                .required(true),
        )
        .arg(
            Arg::with_name("algorithm")
                .short("a")
                .long("algorithm")
                .takes_value(true)
                .possible_values(&["ll1", "lr0", "slr1", "lr1"])
                .default_value("lr1")
                .help("The table construction to run"),
        )
        .arg(
            Arg::with_name("parse")
                .short("p")
                .long("parse")
                .takes_value(true)
                .help("A token sequence to simulate a parse of"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase the verbosity"),
        )
        .get_matches();

    stderrlog::new()
        .verbosity(matches.occurrences_of("verbosity") as usize)
        .init()
        .unwrap();

    let path = matches.value_of("GRAMMAR").unwrap();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("unable to open {}: {}", path, err);
            process::exit(1);
        }
    };
    let mmap = match unsafe { Mmap::map(&file) } {
        Ok(mmap) => mmap,
        Err(err) => {
            eprintln!("unable to map {}: {}", path, err);
            process::exit(1);
        }
    };
    let text = match str::from_utf8(&mmap) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{} is not valid UTF-8: {}", path, err);
            process::exit(1);
        }
    };

    let grammar = Grammar::parse(text);
    if grammar.rules().len() == 0 {
        eprintln!("{} contains no grammar rules", path);
        process::exit(1);
    }
    println!("grammar:");
    print!("{}", grammar.pretty());

    let sets = FirstFollow::compute(&grammar);
    println!("");
    print!("{}", sets.pretty(&grammar));

    let algorithm = matches.value_of("algorithm").unwrap();
    let table = match algorithm {
        "ll1" => ParsingTable::ll1(&grammar, &sets),
        _ => {
            let variant = match algorithm {
                "lr0" => Variant::Lr0,
                "slr1" => Variant::Slr1,
                _ => Variant::Lr1,
            };
            let collection = Collection::compute(&grammar, sets.first(), variant);
            println!("");
            println!("{} item sets:", variant);
            print!("{}", collection.pretty(&grammar));
            ParsingTable::lr(&grammar, collection.sets(), &sets)
        }
    };
    println!("");
    println!("{} table:", algorithm);
    print!("{}", table.pretty(&grammar));

    if let Some(input) = matches.value_of("parse") {
        let tokens = match sim::tokenize(&grammar, input) {
            Ok(tokens) => tokens,
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        };
        println!("");
        if algorithm == "ll1" {
            let trace = sim::simulate_ll(&grammar, &table, &tokens);
            print!("{}", trace.pretty(&grammar));
            if let Some(step) = trace.steps().last() {
                println!("");
                print!("{}", step.tree.pretty(&grammar));
            }
        } else {
            let trace = sim::simulate_lr(&grammar, &table, &tokens);
            print!("{}", trace.pretty(&grammar));
            for tree in trace.forest() {
                println!("");
                print!("{}", tree.pretty(&grammar));
            }
        }
    }
}
