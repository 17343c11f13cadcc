//! Fixture generator for versioned-database system tables.
//!
//! Produces internally consistent rows for stand-ins of the commit log,
//! diff, history, branch, tag and ancestry tables, all sharing one synthetic
//! commit chain so the generated tables can be joined on commit hash.
//!
//! # Example
//!
//! ```rust
//! use fixture_gen::{FixedClock, FixtureConfig, FixtureGenerator, RandomCommitSource};
//!
//! // Seeded hashes and a pinned clock make the output reproducible
//! let clock = FixedClock::parse("2022-11-23T11:55:17-08:00").unwrap();
//! let source = RandomCommitSource::seeded(42, clock);
//!
//! let mut gen = FixtureGenerator::new(FixtureConfig::new(2, 3), source);
//! gen.register("dolt_history_xy", "dh_xy").unwrap();
//! gen.register("dolt_log", "dl").unwrap();
//!
//! let fixtures = gen.generate().unwrap();
//! assert_eq!(fixtures.table("dl").unwrap().rows, 2);
//! println!("{}", fixtures.render());
//! ```

pub mod cadence;
pub mod commit;
pub mod error;
pub mod generator;
pub mod registry;
pub mod schema;
pub mod value;

pub use cadence::{Step, TableEmitter, TableFixture};
pub use commit::{
    Clock, Commit, CommitSource, FixedClock, RandomCommitSource, RowKey, ScriptedCommitSource,
    SystemClock,
};
pub use error::{FixtureError, Result};
pub use generator::{FixtureConfig, FixtureGenerator, Fixtures};
pub use registry::{Cadence, Registry, RowContext, RowExtractor, TableDescriptor, TableKind};
pub use schema::{CloseStyle, SqlType, TableSchema};
pub use value::{Row, SqlValue};
