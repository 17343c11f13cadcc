//! Per-table statement batching.
//!
//! A [`TableEmitter`] owns one table's output buffer and turns each
//! orchestrator step into rows according to the table's [`Cadence`].
//! Statements are opened on their first row, so a cadence that yields no
//! rows for a table leaves no empty `insert` behind.

use crate::commit::{Commit, RowKey};
use crate::error::Result;
use crate::registry::{Cadence, RowContext, TableDescriptor, TableKind};
use crate::value::{render_row, Row};
use std::fmt::Write as _;

const STATEMENT_CLOSE: &str = ";\n]])\n";
const ROW_SEPARATOR: &str = ",\n";

/// One orchestrator step, shared by every table
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    /// Commit index in `[0, commits)`
    pub index: usize,
    pub commits: usize,
    pub diffs_per_commit: usize,
    pub current: &'a Commit,
    pub previous: Option<&'a Commit>,
}

impl Step<'_> {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.commits
    }

    /// Row key carried by the current commit: the first diff row it
    /// introduces. Without diffs each commit still gets its own key so
    /// branch and tag names stay unique.
    pub fn commit_key(&self) -> RowKey {
        RowKey::numbered(self.index * self.diffs_per_commit.max(1))
    }
}

/// Accumulated output for one table
#[derive(Debug)]
pub struct TableEmitter {
    descriptor: TableDescriptor,
    buf: String,
    open: bool,
    rows_in_statement: usize,
    statements: usize,
    rows: usize,
    /// Last diff key written, tracked across the whole run
    last_diff_key: Option<RowKey>,
}

impl TableEmitter {
    pub fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            buf: String::new(),
            open: false,
            rows_in_statement: 0,
            statements: 0,
            rows: 0,
            last_diff_key: None,
        }
    }

    pub fn emit_step(&mut self, step: &Step<'_>) -> Result<()> {
        match self.descriptor.cadence {
            Cadence::PerDiff => self.emit_per_diff(step),
            Cadence::PerCommit => self.emit_per_commit(step),
            Cadence::History => self.emit_history(step),
        }
    }

    fn emit_per_diff(&mut self, step: &Step<'_>) -> Result<()> {
        let d = step.diffs_per_commit;
        for j in step.index * d..(step.index + 1) * d {
            let key = RowKey::numbered(j);
            // Before any row exists the "from" side is the NULL sentinel on
            // the first commit, and the preceding key afterwards.
            let from_key = match (&self.last_diff_key, step.previous) {
                (Some(last), _) => Some(last.clone()),
                (None, Some(_)) => j.checked_sub(1).map(RowKey::numbered),
                (None, None) => None,
            };
            let ctx = RowContext {
                current: step.current,
                previous: step.previous,
                key: &key,
                from_key: from_key.as_ref(),
            };
            if let Some(row) = self.descriptor.extract(&ctx)? {
                self.push_row(&row);
            }
            self.last_diff_key = Some(key);
        }
        if step.is_last() {
            self.close_statement();
        }
        Ok(())
    }

    fn emit_per_commit(&mut self, step: &Step<'_>) -> Result<()> {
        let key = step.commit_key();
        let ctx = RowContext {
            current: step.current,
            previous: step.previous,
            key: &key,
            from_key: None,
        };
        if let Some(row) = self.descriptor.extract(&ctx)? {
            self.push_row(&row);
        }
        if step.is_last() {
            self.close_statement();
        }
        Ok(())
    }

    fn emit_history(&mut self, step: &Step<'_>) -> Result<()> {
        let mut previous_key: Option<RowKey> = None;
        for j in 0..step.diffs_per_commit * (step.index + 1) {
            let key = RowKey::numbered(j);
            let ctx = RowContext {
                current: step.current,
                previous: step.previous,
                key: &key,
                from_key: previous_key.as_ref(),
            };
            if let Some(row) = self.descriptor.extract(&ctx)? {
                self.push_row(&row);
            }
            previous_key = Some(key);
        }
        self.close_statement();
        Ok(())
    }

    fn push_row(&mut self, row: &Row) {
        if !self.open {
            let _ = write!(
                self.buf,
                "  con:query([[\ninsert into {} values\n",
                self.descriptor.table
            );
            self.open = true;
            self.rows_in_statement = 0;
            self.statements += 1;
        } else if self.rows_in_statement > 0 {
            self.buf.push_str(ROW_SEPARATOR);
        }
        self.buf.push_str(&render_row(row));
        self.rows_in_statement += 1;
        self.rows += 1;
    }

    fn close_statement(&mut self) {
        if self.open {
            self.buf.push_str(STATEMENT_CLOSE);
            self.open = false;
        }
    }

    /// Close any dangling statement and hand back the finished table
    pub fn finish(mut self) -> TableFixture {
        self.close_statement();
        TableFixture {
            name: self.descriptor.table.clone(),
            kind: self.descriptor.kind,
            schema: self.descriptor.schema_sql(),
            data: self.buf,
            statements: self.statements,
            rows: self.rows,
        }
    }
}

/// Schema and data text for one generated table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFixture {
    pub name: String,
    pub kind: TableKind,
    pub schema: String,
    pub data: String,
    pub statements: usize,
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TableKind;

    fn commits(n: usize) -> Vec<Commit> {
        (0..n)
            .map(|i| Commit::new(format!("c{}", i), "2022-11-23T11:55:17-08:00"))
            .collect()
    }

    fn run(kind: TableKind, commits: &[Commit], d: usize) -> TableFixture {
        let mut emitter = TableEmitter::new(TableDescriptor::new(kind, "t"));
        for (i, current) in commits.iter().enumerate() {
            let step = Step {
                index: i,
                commits: commits.len(),
                diffs_per_commit: d,
                current,
                previous: i.checked_sub(1).map(|p| &commits[p]),
            };
            emitter.emit_step(&step).unwrap();
        }
        emitter.finish()
    }

    fn data_rows(data: &str) -> Vec<&str> {
        data.lines().filter(|l| l.starts_with("  (")).collect()
    }

    #[test]
    fn test_per_commit_single_statement() {
        let fixture = run(TableKind::CommitLog, &commits(3), 2);
        assert_eq!(fixture.statements, 1);
        assert_eq!(fixture.rows, 3);
        assert_eq!(
            fixture.data,
            "  con:query([[\n\
             insert into t values\n  \
             ('c0', 'Max Hoffman', '2022-11-23T11:55:17-08:00', 'max@dolthub.com', 'a commit message'),\n  \
             ('c1', 'Max Hoffman', '2022-11-23T11:55:17-08:00', 'max@dolthub.com', 'a commit message'),\n  \
             ('c2', 'Max Hoffman', '2022-11-23T11:55:17-08:00', 'max@dolthub.com', 'a commit message');\n\
             ]])\n"
        );
    }

    #[test]
    fn test_history_statement_per_step() {
        let fixture = run(TableKind::HistoryView, &commits(3), 2);
        assert_eq!(fixture.statements, 3);
        assert_eq!(fixture.rows, 2 + 4 + 6);

        let statements: Vec<&str> = fixture
            .data
            .split("  con:query([[\n")
            .filter(|s| !s.is_empty())
            .collect();
        for (i, stmt) in statements.iter().enumerate() {
            let rows = data_rows(stmt);
            assert_eq!(rows.len(), 2 * (i + 1));
            let hash = format!("('c{}',", i);
            assert!(rows.iter().all(|r| r.trim_start().starts_with(&hash)));
            assert!(stmt.ends_with(";\n]])\n"));
        }
    }

    #[test]
    fn test_per_diff_single_statement_spanning_run() {
        let fixture = run(TableKind::DiffView, &commits(3), 2);
        assert_eq!(fixture.statements, 1);
        assert_eq!(fixture.rows, 6);
        assert_eq!(fixture.data.matches("insert into").count(), 1);
        assert_eq!(fixture.data.matches(";\n]])\n").count(), 1);
        assert!(fixture.data.ends_with("'row 5', 4, 'row 4');\n]])\n"));
    }

    #[test]
    fn test_per_diff_first_commit_boundary() {
        let fixture = run(TableKind::DiffView, &commits(2), 3);
        let rows = data_rows(&fixture.data);
        assert_eq!(
            rows[0],
            "  (NULL, NULL, 'c0', '2022-11-23T11:55:17-08:00', 'added', 0, 'row 0', NULL, NULL),"
        );
        // Later rows of the first commit link to the previous row even
        // though the commit side is still NULL.
        assert_eq!(
            rows[1],
            "  (NULL, NULL, 'c0', '2022-11-23T11:55:17-08:00', 'added', 1, 'row 1', 0, 'row 0'),"
        );
        assert_eq!(
            rows[3],
            "  ('c0', '2022-11-23T11:55:17-08:00', 'c1', '2022-11-23T11:55:17-08:00', 'added', 3, 'row 3', 2, 'row 2'),"
        );
    }

    #[test]
    fn test_per_diff_fallback_without_tracked_key() {
        // A table joining mid-run has no tracked key yet and falls back to j-1.
        let cs = commits(2);
        let mut emitter = TableEmitter::new(TableDescriptor::new(TableKind::DiffView, "t"));
        let step = Step {
            index: 1,
            commits: 2,
            diffs_per_commit: 2,
            current: &cs[1],
            previous: Some(&cs[0]),
        };
        emitter.emit_step(&step).unwrap();
        let fixture = emitter.finish();
        let rows = data_rows(&fixture.data);
        assert!(rows[0].ends_with("'added', 2, 'row 2', 1, 'row 1'),"));
        assert!(rows[1].ends_with("'added', 3, 'row 3', 2, 'row 2');"));
    }

    #[test]
    fn test_ancestry_skips_first_commit() {
        let fixture = run(TableKind::Ancestry, &commits(3), 1);
        assert_eq!(fixture.rows, 2);
        assert_eq!(
            fixture.data,
            "  con:query([[\ninsert into t values\n  ('c1', 'c0', 0),\n  ('c2', 'c1', 0);\n]])\n"
        );
    }

    #[test]
    fn test_ancestry_single_commit_has_no_statement() {
        let fixture = run(TableKind::Ancestry, &commits(1), 1);
        assert_eq!(fixture.statements, 0);
        assert!(fixture.data.is_empty());
    }

    #[test]
    fn test_zero_diffs_leave_no_statements() {
        assert!(run(TableKind::DiffView, &commits(2), 0).data.is_empty());
        assert!(run(TableKind::HistoryView, &commits(2), 0).data.is_empty());
    }

    #[test]
    fn test_branches_use_commit_key() {
        let fixture = run(TableKind::Branches, &commits(3), 4);
        let rows = data_rows(&fixture.data);
        assert!(rows[0].starts_with("  ('branch_0', 'c0',"));
        assert!(rows[1].starts_with("  ('branch_4', 'c1',"));
        assert!(rows[2].starts_with("  ('branch_8', 'c2',"));
    }

    #[test]
    fn test_refs_without_diffs_keep_unique_names() {
        let branches = run(TableKind::Branches, &commits(3), 0);
        let rows = data_rows(&branches.data);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("  ('branch_0', 'c0',"));
        assert!(rows[1].starts_with("  ('branch_1', 'c1',"));
        assert!(rows[2].starts_with("  ('branch_2', 'c2',"));

        let tags = run(TableKind::Tags, &commits(3), 0);
        let rows = data_rows(&tags.data);
        assert!(rows[2].starts_with("  ('tag_2', 'c2',"));
    }
}
