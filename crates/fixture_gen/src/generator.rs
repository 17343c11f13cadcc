//! Drives the commit loop across every registered fixture table.
//!
//! Each step draws exactly one commit and presents the same
//! (current, previous) pair to all tables, which keeps commit hashes
//! joinable across the generated tables.

use crate::cadence::{Step, TableEmitter, TableFixture};
use crate::commit::{Commit, CommitSource};
use crate::error::Result;
use crate::registry::{Registry, TableDescriptor};
use std::io::Write;
use tracing::{debug, info};

/// Run shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixtureConfig {
    pub commits: usize,
    pub diffs_per_commit: usize,
}

impl FixtureConfig {
    pub fn new(commits: usize, diffs_per_commit: usize) -> Self {
        Self {
            commits,
            diffs_per_commit,
        }
    }
}

/// Main fixture generator
pub struct FixtureGenerator<S: CommitSource> {
    config: FixtureConfig,
    source: S,
    registry: Registry,
    tables: Vec<TableEmitter>,
}

impl<S: CommitSource> FixtureGenerator<S> {
    pub fn new(config: FixtureConfig, source: S) -> Self {
        Self::with_registry(config, source, Registry::new())
    }

    pub fn with_registry(config: FixtureConfig, source: S, registry: Registry) -> Self {
        Self {
            config,
            source,
            registry,
            tables: Vec::new(),
        }
    }

    /// Resolve `kind` and register it under the output table name `table`
    pub fn register(&mut self, kind: &str, table: &str) -> Result<()> {
        let descriptor = self.registry.resolve(kind, table)?;
        self.add_table(descriptor);
        Ok(())
    }

    /// Register every `(kind, table)` pair in order, stopping at the first
    /// unknown kind
    pub fn register_all<'a, I>(&mut self, tables: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (kind, table) in tables {
            self.register(kind, table)?;
        }
        Ok(())
    }

    pub fn add_table(&mut self, descriptor: TableDescriptor) {
        debug!(
            table = %descriptor.table,
            kind = %descriptor.kind,
            cadence = %descriptor.cadence,
            "registered fixture table"
        );
        self.tables.push(TableEmitter::new(descriptor));
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Run every step and collect the per-table output.
    ///
    /// Nothing is written anywhere; an error leaves no partial document.
    pub fn generate(mut self) -> Result<Fixtures> {
        let FixtureConfig {
            commits,
            diffs_per_commit,
        } = self.config;
        let mut history: Vec<Commit> = Vec::with_capacity(commits);

        for index in 0..commits {
            let current = self.source.next_commit();
            let step = Step {
                index,
                commits,
                diffs_per_commit,
                current: &current,
                previous: history.last(),
            };
            debug!(index, hash = %current.hash, "fixture step");
            for table in &mut self.tables {
                table.emit_step(&step)?;
            }
            history.push(current);
        }

        let tables: Vec<TableFixture> = self.tables.into_iter().map(TableEmitter::finish).collect();
        info!(
            commits,
            diffs_per_commit,
            tables = tables.len(),
            rows = tables.iter().map(|t| t.rows).sum::<usize>(),
            "generated fixtures"
        );

        Ok(Fixtures {
            commits: history,
            tables,
        })
    }
}

/// Generated fixtures for one run, in registration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    /// The commit sequence every table was generated from
    pub commits: Vec<Commit>,
    pub tables: Vec<TableFixture>,
}

impl Fixtures {
    pub fn table(&self, name: &str) -> Option<&TableFixture> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Write each table's schema followed by its data. The sink is neither
    /// flushed nor closed.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        for table in &self.tables {
            w.write_all(table.schema.as_bytes())?;
            w.write_all(table.data.as_bytes())?;
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&table.schema);
            out.push_str(&table.data);
        }
        out
    }
}
