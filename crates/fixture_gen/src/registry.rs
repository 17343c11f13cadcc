//! Fixture table kinds and the registry that resolves them by name.
//!
//! Each kind stands in for one computed system table of the versioned
//! database. A kind fixes the schema, the cadence and how a row is derived
//! from the (current, previous) commit pair.

use crate::commit::{Commit, RowKey};
use crate::error::{FixtureError, Result};
use crate::schema::{CloseStyle, SqlType, TableSchema};
use crate::value::{Row, SqlValue};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Row count and statement batching rule for a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// `d` rows per commit, one statement for the whole run
    PerDiff,
    /// One row per commit, one statement for the whole run
    PerCommit,
    /// Full cumulative snapshot re-emitted as a new statement every commit
    History,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::PerDiff => write!(f, "per-diff"),
            Cadence::PerCommit => write!(f, "per-commit"),
            Cadence::History => write!(f, "history"),
        }
    }
}

/// Supported fixture table kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    DiffView,
    HistoryView,
    CommitLog,
    TableDiffLog,
    Branches,
    Tags,
    Ancestry,
}

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::DiffView,
        TableKind::HistoryView,
        TableKind::CommitLog,
        TableKind::TableDiffLog,
        TableKind::Branches,
        TableKind::Tags,
        TableKind::Ancestry,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TableKind::DiffView => "diff-view",
            TableKind::HistoryView => "history-view",
            TableKind::CommitLog => "commit-log",
            TableKind::TableDiffLog => "table-diff-log",
            TableKind::Branches => "branches",
            TableKind::Tags => "tags",
            TableKind::Ancestry => "ancestry",
        }
    }

    /// System table names this kind stands in for
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            TableKind::DiffView => &["dolt_diff_xy", "dolt_commit_diff_xy"],
            TableKind::HistoryView => &["dolt_history_xy"],
            TableKind::CommitLog => &["dolt_log", "dolt_commits"],
            TableKind::TableDiffLog => &["dolt_diff"],
            TableKind::Branches => &["dolt_branches"],
            TableKind::Tags => &["dolt_tags"],
            TableKind::Ancestry => &["dolt_commit_ancestors"],
        }
    }

    pub fn cadence(&self) -> Cadence {
        match self {
            TableKind::DiffView => Cadence::PerDiff,
            TableKind::HistoryView => Cadence::History,
            _ => Cadence::PerCommit,
        }
    }

    pub fn schema(&self) -> TableSchema {
        match self {
            TableKind::DiffView => TableSchema::new()
                .column("from_commit", SqlType::VarChar(32))
                .column("from_commit_date", SqlType::DateTime)
                .column("to_commit", SqlType::VarChar(32))
                .column("to_commit_date", SqlType::DateTime)
                .column("diff_type", SqlType::VarChar(20))
                .column("to_x", SqlType::Int)
                .column("to_y", SqlType::VarChar(20))
                .column("from_x", SqlType::Int)
                .column("from_y", SqlType::VarChar(20))
                .index("from_commit")
                .index("to_commit")
                .close_style(CloseStyle::IndentedParen),
            TableKind::HistoryView => TableSchema::new()
                .column("commit_hash", SqlType::VarChar(32))
                .column("committer", SqlType::VarChar(20))
                .column("commit_date", SqlType::DateTime)
                .column("x", SqlType::Int)
                .column("y", SqlType::VarChar(20))
                .primary_key(&["commit_hash", "x", "y"])
                .index("commit_hash"),
            TableKind::CommitLog => TableSchema::new()
                .column("commit_hash", SqlType::VarChar(32))
                .column("committer", SqlType::VarChar(20))
                .column("date", SqlType::DateTime)
                .column("email", SqlType::VarChar(100))
                .column("message", SqlType::VarChar(100))
                .primary_key(&["commit_hash"]),
            TableKind::TableDiffLog => TableSchema::new()
                .column("commit_hash", SqlType::VarChar(32))
                .column("table_name", SqlType::VarChar(20))
                .column("committer", SqlType::VarChar(20))
                .column("date", SqlType::DateTime)
                .column("email", SqlType::VarChar(100))
                .column("message", SqlType::VarChar(100))
                .primary_key(&["commit_hash", "table_name"])
                .index("commit_hash"),
            // Column types mirror the established fixture shape, including
            // the swapped email/date types.
            TableKind::Branches => TableSchema::new()
                .column("name", SqlType::VarChar(32))
                .column("hash", SqlType::VarChar(20))
                .column("latest_committer", SqlType::VarChar(20))
                .column("latest_committer_email", SqlType::DateTime)
                .column("latest_commit_date", SqlType::VarChar(100))
                .column("latest_commit_message", SqlType::VarChar(100))
                .primary_key(&["name"])
                .index("hash"),
            TableKind::Tags => TableSchema::new()
                .column("tag_name", SqlType::VarChar(32))
                .column("tag_hash", SqlType::VarChar(20))
                .column("tagger", SqlType::VarChar(20))
                .column("date", SqlType::DateTime)
                .column("email", SqlType::VarChar(100))
                .column("message", SqlType::VarChar(100))
                .primary_key(&["tag_name", "tag_hash"])
                .index("tag_hash"),
            TableKind::Ancestry => TableSchema::new()
                .column("commit_hash", SqlType::VarChar(32))
                .column("parent_hash", SqlType::VarChar(32))
                .column("parent_index", SqlType::Int)
                .primary_key(&["commit_hash", "parent_hash", "parent_index"])
                .index("commit_hash")
                .index("parent_hash"),
        }
    }

    pub fn extractor(&self) -> RowExtractor {
        match self {
            TableKind::DiffView => diff_row,
            TableKind::HistoryView => history_row,
            TableKind::CommitLog => log_row,
            TableKind::TableDiffLog => table_diff_row,
            TableKind::Branches => branch_row,
            TableKind::Tags => tag_row,
            TableKind::Ancestry => ancestry_row,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TableKind {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self> {
        TableKind::ALL
            .into_iter()
            .find(|k| k.id() == s || k.aliases().iter().any(|a| *a == s))
            .ok_or_else(|| FixtureError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// Inputs for deriving one row
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub current: &'a Commit,
    /// `None` before the first commit
    pub previous: Option<&'a Commit>,
    /// Key of the row being written
    pub key: &'a RowKey,
    /// Key of the row this one follows, if any
    pub from_key: Option<&'a RowKey>,
}

/// Derives a row from a context; `Ok(None)` suppresses the row
pub type RowExtractor = fn(&RowContext<'_>) -> Result<Option<Row>>;

fn numeric_key(key: &RowKey) -> Result<i64> {
    key.x
        .parse::<i64>()
        .map_err(|_| FixtureError::NonNumericRowKey { key: key.x.clone() })
}

fn diff_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    let from_x = match ctx.from_key {
        Some(k) => SqlValue::Int(numeric_key(k)?),
        None => SqlValue::Null,
    };
    Ok(Some(vec![
        SqlValue::string_or_null(ctx.previous.map(|c| c.hash.as_str())),
        SqlValue::string_or_null(ctx.previous.map(|c| c.timestamp.as_str())),
        SqlValue::string(&ctx.current.hash),
        SqlValue::string(&ctx.current.timestamp),
        SqlValue::string("added"),
        SqlValue::Int(numeric_key(ctx.key)?),
        SqlValue::string(&ctx.key.y),
        from_x,
        SqlValue::string_or_null(ctx.from_key.map(|k| k.y.as_str())),
    ]))
}

fn history_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    Ok(Some(vec![
        SqlValue::string(&ctx.current.hash),
        SqlValue::string(&ctx.current.committer),
        SqlValue::string(&ctx.current.timestamp),
        SqlValue::Int(numeric_key(ctx.key)?),
        SqlValue::string(&ctx.key.y),
    ]))
}

fn log_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    let c = ctx.current;
    Ok(Some(vec![
        SqlValue::string(&c.hash),
        SqlValue::string(&c.committer),
        SqlValue::string(&c.timestamp),
        SqlValue::string(&c.email),
        SqlValue::string(&c.message),
    ]))
}

fn table_diff_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    let c = ctx.current;
    Ok(Some(vec![
        SqlValue::string(&c.hash),
        SqlValue::string("xy"),
        SqlValue::string(&c.committer),
        SqlValue::string(&c.timestamp),
        SqlValue::string(&c.email),
        SqlValue::string(&c.message),
    ]))
}

fn ref_row(prefix: &str, ctx: &RowContext<'_>) -> Result<Option<Row>> {
    let id = numeric_key(ctx.key)?;
    let c = ctx.current;
    Ok(Some(vec![
        SqlValue::String(format!("{}_{}", prefix, id)),
        SqlValue::string(&c.hash),
        SqlValue::string(&c.committer),
        SqlValue::string(&c.email),
        SqlValue::string(&c.timestamp),
        SqlValue::string(&c.message),
    ]))
}

fn branch_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    ref_row("branch", ctx)
}

fn tag_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    ref_row("tag", ctx)
}

fn ancestry_row(ctx: &RowContext<'_>) -> Result<Option<Row>> {
    let Some(parent) = ctx.previous else {
        return Ok(None);
    };
    Ok(Some(vec![
        SqlValue::string(&ctx.current.hash),
        SqlValue::string(&parent.hash),
        SqlValue::Int(0),
    ]))
}

/// A resolved fixture table: what to create and how to fill it
#[derive(Clone)]
pub struct TableDescriptor {
    pub kind: TableKind,
    /// Output table name
    pub table: String,
    pub schema: TableSchema,
    pub cadence: Cadence,
    pub extractor: RowExtractor,
}

impl TableDescriptor {
    pub fn new(kind: TableKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            schema: kind.schema(),
            cadence: kind.cadence(),
            extractor: kind.extractor(),
        }
    }

    /// The `create table` statement for this table
    pub fn schema_sql(&self) -> String {
        self.schema.render(&self.table)
    }

    pub fn extract(&self, ctx: &RowContext<'_>) -> Result<Option<Row>> {
        (self.extractor)(ctx)
    }
}

impl fmt::Debug for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDescriptor")
            .field("kind", &self.kind)
            .field("table", &self.table)
            .field("cadence", &self.cadence)
            .finish_non_exhaustive()
    }
}

/// Builds a descriptor for a given output table name
pub type DescriptorBuilder = fn(&str) -> TableDescriptor;

/// Named descriptor builders. Unknown names resolve to an error so the
/// caller decides whether that is fatal.
#[derive(Clone)]
pub struct Registry {
    builders: HashMap<String, DescriptorBuilder>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in TableKind::ALL {
            let builder = builtin_builder(kind);
            registry.register(kind.id(), builder);
            for alias in kind.aliases() {
                registry.register(*alias, builder);
            }
        }
        registry
    }
}

fn builtin_builder(kind: TableKind) -> DescriptorBuilder {
    match kind {
        TableKind::DiffView => |t| TableDescriptor::new(TableKind::DiffView, t),
        TableKind::HistoryView => |t| TableDescriptor::new(TableKind::HistoryView, t),
        TableKind::CommitLog => |t| TableDescriptor::new(TableKind::CommitLog, t),
        TableKind::TableDiffLog => |t| TableDescriptor::new(TableKind::TableDiffLog, t),
        TableKind::Branches => |t| TableDescriptor::new(TableKind::Branches, t),
        TableKind::Tags => |t| TableDescriptor::new(TableKind::Tags, t),
        TableKind::Ancestry => |t| TableDescriptor::new(TableKind::Ancestry, t),
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

impl Registry {
    /// The built-in kinds under their ids and system table aliases
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, builder: DescriptorBuilder) {
        self.builders.insert(name.into(), builder);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    pub fn resolve(&self, kind: &str, table: &str) -> Result<TableDescriptor> {
        self.builders
            .get(kind)
            .map(|build| build(table))
            .ok_or_else(|| FixtureError::UnknownKind {
                kind: kind.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str) -> Commit {
        Commit::new(hash, "2022-11-23T11:55:17-08:00")
    }

    fn ctx<'a>(
        current: &'a Commit,
        previous: Option<&'a Commit>,
        key: &'a RowKey,
        from_key: Option<&'a RowKey>,
    ) -> RowContext<'a> {
        RowContext {
            current,
            previous,
            key,
            from_key,
        }
    }

    #[test]
    fn test_resolve_by_id_and_alias() {
        let registry = Registry::new();
        for kind in TableKind::ALL {
            assert_eq!(registry.resolve(kind.id(), "t").unwrap().kind, kind);
            for alias in kind.aliases() {
                assert_eq!(registry.resolve(alias, "t").unwrap().kind, kind);
            }
        }
    }

    #[test]
    fn test_resolve_unknown_kind() {
        let err = Registry::new().resolve("dolt_status", "ds").unwrap_err();
        assert!(matches!(err, FixtureError::UnknownKind { ref kind } if kind == "dolt_status"));
        assert_eq!(err.to_string(), "unknown system table: 'dolt_status'");
    }

    #[test]
    fn test_empty_registry_rejects_builtin_names() {
        assert!(Registry::empty().resolve("commit-log", "dl").is_err());
    }

    #[test]
    fn test_custom_builder() {
        let mut registry = Registry::empty();
        registry.register("log", |t| TableDescriptor::new(TableKind::CommitLog, t));
        assert!(registry.contains("log"));
        assert_eq!(registry.resolve("log", "dl").unwrap().table, "dl");
    }

    #[test]
    fn test_cadences() {
        assert_eq!(TableKind::DiffView.cadence(), Cadence::PerDiff);
        assert_eq!(TableKind::HistoryView.cadence(), Cadence::History);
        for kind in [
            TableKind::CommitLog,
            TableKind::TableDiffLog,
            TableKind::Branches,
            TableKind::Tags,
            TableKind::Ancestry,
        ] {
            assert_eq!(kind.cadence(), Cadence::PerCommit);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("dolt_log".parse::<TableKind>().unwrap(), TableKind::CommitLog);
        assert_eq!("ancestry".parse::<TableKind>().unwrap(), TableKind::Ancestry);
        assert!("dolt_nope".parse::<TableKind>().is_err());
    }

    #[test]
    fn test_history_schema_sql() {
        let descriptor = TableDescriptor::new(TableKind::HistoryView, "dh_xy");
        assert_eq!(
            descriptor.schema_sql(),
            "  con:query([[\n\
             create table dh_xy (\n  \
             commit_hash varchar(32),\n  \
             committer varchar(20),\n  \
             commit_date datetime,\n  \
             x int,\n  \
             y varchar(20),\n  \
             primary key (commit_hash, x, y),\n  \
             index (commit_hash)\n\
             )\n  \
             ]])\n"
        );
    }

    #[test]
    fn test_diff_schema_sql() {
        let descriptor = TableDescriptor::new(TableKind::DiffView, "dd_xy");
        assert_eq!(
            descriptor.schema_sql(),
            "  con:query([[\n\
             create table dd_xy (\n  \
             from_commit varchar(32),\n  \
             from_commit_date datetime,\n  \
             to_commit varchar(32),\n  \
             to_commit_date datetime,\n  \
             diff_type varchar(20),\n  \
             to_x int,\n  \
             to_y varchar(20),\n  \
             from_x int,\n  \
             from_y varchar(20),\n  \
             index (from_commit),\n  \
             index (to_commit)\n  \
             )\n\
             ]])\n"
        );
    }

    #[test]
    fn test_branches_schema_sql() {
        let sql = TableDescriptor::new(TableKind::Branches, "db").schema_sql();
        assert!(sql.contains("  hash varchar(20),\n"));
        assert!(sql.contains("  latest_committer_email datetime,\n"));
        assert!(sql.contains("  latest_commit_date varchar(100),\n"));
        assert!(sql.ends_with("  primary key (name),\n  index (hash)\n)\n  ]])\n"));
    }

    #[test]
    fn test_diff_row_without_parent() {
        let current = commit("c1");
        let key = RowKey::numbered(0);
        let row = diff_row(&ctx(&current, None, &key, None)).unwrap().unwrap();
        assert_eq!(
            crate::value::render_row(&row),
            "  (NULL, NULL, 'c1', '2022-11-23T11:55:17-08:00', 'added', 0, 'row 0', NULL, NULL)"
        );
    }

    #[test]
    fn test_diff_row_with_parent() {
        let current = commit("c2");
        let parent = commit("c1");
        let key = RowKey::numbered(3);
        let from = RowKey::numbered(2);
        let row = diff_row(&ctx(&current, Some(&parent), &key, Some(&from)))
            .unwrap()
            .unwrap();
        assert_eq!(row[0], SqlValue::string("c1"));
        assert_eq!(row[7], SqlValue::Int(2));
        assert_eq!(row[8], SqlValue::string("row 2"));
    }

    #[test]
    fn test_branch_and_tag_names() {
        let current = commit("c1");
        let key = RowKey::numbered(6);
        let branch = branch_row(&ctx(&current, None, &key, None)).unwrap().unwrap();
        let tag = tag_row(&ctx(&current, None, &key, None)).unwrap().unwrap();
        assert_eq!(branch[0], SqlValue::string("branch_6"));
        assert_eq!(tag[0], SqlValue::string("tag_6"));
        assert_eq!(branch[1], SqlValue::string("c1"));
    }

    #[test]
    fn test_non_numeric_key_is_rejected() {
        let current = commit("c1");
        let key = RowKey::new("NULL", "NULL");
        for extractor in [branch_row as RowExtractor, tag_row] {
            let err = extractor(&ctx(&current, None, &key, None)).unwrap_err();
            assert!(matches!(err, FixtureError::NonNumericRowKey { ref key } if key == "NULL"));
        }
    }

    #[test]
    fn test_ancestry_suppressed_without_parent() {
        let current = commit("c1");
        let key = RowKey::numbered(0);
        assert!(ancestry_row(&ctx(&current, None, &key, None))
            .unwrap()
            .is_none());

        let parent = commit("c0");
        let row = ancestry_row(&ctx(&current, Some(&parent), &key, None))
            .unwrap()
            .unwrap();
        assert_eq!(crate::value::render_row(&row), "  ('c1', 'c0', 0)");
    }
}
