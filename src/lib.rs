//! Sysbench script generation for versioned-database system table benchmarks.
//!
//! Script definitions come from a YAML file ([`config`]), each is rendered in
//! memory ([`script`]) with its fixture tables synthesized by `fixture_gen`,
//! and the result is written one file per script ([`writer`]).

pub mod config;
pub mod script;
pub mod writer;
