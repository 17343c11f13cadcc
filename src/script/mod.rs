//! Sysbench Lua script generation.
//!
//! A script has five lifecycle blocks: `thread_init`, `event`,
//! `thread_done`, `cleanup` and `prepare`. Only `prepare` carries data; with
//! a `dummy` mapping it holds synthesized system-table fixtures, otherwise it
//! builds a real commit history through stored procedures.

use crate::config::ScriptDef;
use fixture_gen::{CommitSource, FixtureGenerator, Fixtures};
use std::fmt::Write as _;
use std::io::Write;

/// Table the real-commit path writes into, always dropped on cleanup
pub const BASE_TABLE: &str = "xy";

/// A fully rendered script
#[derive(Debug, Clone)]
pub struct RenderedScript {
    pub name: String,
    pub text: String,
    /// Fixtures behind the `prepare` block, when synthesized
    pub fixtures: Option<Fixtures>,
}

impl RenderedScript {
    pub fn fixture_rows(&self) -> usize {
        self.fixtures
            .as_ref()
            .map_or(0, |f| f.tables.iter().map(|t| t.rows).sum())
    }

    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(self.text.as_bytes())
    }
}

/// Renders one script definition
pub struct ScriptGen<'a> {
    def: &'a ScriptDef,
}

impl<'a> ScriptGen<'a> {
    pub fn new(def: &'a ScriptDef) -> Self {
        Self { def }
    }

    /// Render the whole script in memory. Fails before producing any text
    /// if a fixture kind is unknown.
    pub fn render<S: CommitSource>(&self, source: S) -> fixture_gen::Result<RenderedScript> {
        let fixtures = match &self.def.dummy {
            Some(dummy) => {
                let mut gen = FixtureGenerator::new(self.def.fixture_config(), source);
                gen.register_all(dummy.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
                Some(gen.generate()?)
            }
            None => None,
        };

        let mut out = String::new();
        self.thread_init(&mut out);
        self.event(&mut out);
        self.thread_done(&mut out);
        self.cleanup(&mut out);
        match &fixtures {
            Some(fixtures) => self.prepare_dummy(&mut out, fixtures),
            None => self.prepare_sys(&mut out),
        }

        Ok(RenderedScript {
            name: self.def.name.clone(),
            text: out,
            fixtures,
        })
    }

    fn thread_init(&self, out: &mut String) {
        out.push_str("function thread_init()\n");
        out.push_str("  drv = sysbench.sql.driver()\n");
        out.push_str("  con = drv:connect()\n");
        let _ = writeln!(out, "  stmt = con:prepare('{}')", lua_escape(&self.def.query));
        out.push_str("end\n\n");
    }

    fn event(&self, out: &mut String) {
        out.push_str("function event()\n");
        out.push_str("  stmt:execute()\n");
        out.push_str("end\n\n");
    }

    fn thread_done(&self, out: &mut String) {
        out.push_str("function thread_done()\n");
        out.push_str("  stmt:close()\n");
        out.push_str("  con:disconnect()\n");
        out.push_str("end\n\n");
    }

    fn cleanup(&self, out: &mut String) {
        out.push_str("function cleanup()\n");
        out.push_str("  local drv = sysbench.sql.driver()\n");
        out.push_str("  local con = drv:connect()\n");
        for table in self.def.dummy_tables() {
            let _ = writeln!(out, "  con:query(\"DROP TABLE IF EXISTS {}\")", table);
        }
        let _ = writeln!(out, "  con:query(\"DROP TABLE IF EXISTS {}\")", BASE_TABLE);
        out.push_str("end\n\n");
    }

    fn prepare_header(out: &mut String) {
        out.push_str("function prepare()\n");
        out.push_str("  sysbench.opt.threads = 1\n");
        out.push_str("  local drv = sysbench.sql.driver()\n");
        out.push_str("  local con = drv:connect()\n");
    }

    fn prepare_dummy(&self, out: &mut String, fixtures: &Fixtures) {
        Self::prepare_header(out);
        out.push_str(&fixtures.render());
        out.push_str("end\n\n");
    }

    /// Build `commits` real commits of `diffs_per_commit` rows each
    fn prepare_sys(&self, out: &mut String) {
        Self::prepare_header(out);

        for i in 0..self.def.branches {
            let _ = writeln!(out, "  con:query(\"call dolt_checkout('-b', 'branch_{}')\")", i);
            let _ = writeln!(out, "  con:query(\"call dolt_tag('tag_{}', 'head')\")", i);
        }

        let _ = writeln!(
            out,
            "  con:query(\"create table {} (x int primary key, y varchar(20));\")",
            BASE_TABLE
        );

        let d = self.def.diffs_per_commit;
        for i in 0..self.def.commits {
            if d > 0 {
                out.push_str("  con:query([[\n");
                let _ = writeln!(out, "insert into {} values", BASE_TABLE);
                let rows: Vec<String> = (i * d..(i + 1) * d)
                    .map(|id| format!("    ({}, 'row {}')", id, id))
                    .collect();
                out.push_str(&rows.join(",\n"));
                out.push_str(";\n");
                out.push_str("  ]])\n");
            }
            out.push_str("  con:query(\"call dolt_add('.');\")\n");
            let _ = writeln!(out, "  con:query(\"call dolt_commit('-m', 'commit {}');\")", i);
        }
        out.push_str("end\n\n");
    }
}

/// Escape text for a single-quoted Lua string
fn lua_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}
