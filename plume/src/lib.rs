//! Crate for reading and writing mapping files, as well as remapping symbols with them.
//!
//! Mapping files come in many formats; this crate reads and writes SRG (`.srg`), CSRG and TSRG
//! (`.csrg`/`.tsrg`), TSRG2, Proguard (`mapping.txt`), Tiny v1 and v2 (`.tiny`) and Parchment
//! JSON files, all into the same [`tree::mappings::Mappings`] collection. See the documentation
//! of the individual format modules for the grammars; [`detect`] picks a format for unlabeled
//! input.
//!
//! The [`remapper`] module builds lookup indices over a collection and resolves class, field and
//! method names across class hierarchies, rewriting descriptors along the way.

mod lines;

pub mod descriptor;
pub mod error;

pub mod srg;
pub mod csrg;
pub mod tsrg2;
pub mod proguard;
pub mod tiny_v1;
pub mod tiny_v2;
pub mod parchment;

pub mod format;
pub mod detect;

pub mod tree;

pub mod remapper;
