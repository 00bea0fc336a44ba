//! A natural-language command parser for interactive fiction.
//!
//! The parser reads a typed command ("put the red ball in the box, then
//! look"), matches it against verb grammars and a world model supplied by
//! the host, asks the player to clear up ambiguity when it must, and hands
//! back a resolved [`parser::Command`].

#![allow(dead_code)]

#[macro_use]
extern crate lazy_static;

pub mod actions;
pub mod config;
pub mod console;
pub mod dictionary;
pub mod error;
pub mod grammar;
pub mod match_list;
pub mod messages;
pub mod multi;
pub mod object_tree;
pub mod parser;
pub mod pronouns;
pub mod routines;
pub mod standard_grammar;
pub mod tokenizer;
pub mod vocabulary;
pub mod world;
