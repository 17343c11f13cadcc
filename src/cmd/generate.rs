//! Generate command CLI handler.

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use fixture_gen::{Clock, FixedClock, RandomCommitSource, SystemClock};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use systab_bench::config::{ScriptDef, ScriptsDef};
use systab_bench::script::{RenderedScript, ScriptGen};
use systab_bench::writer::WriterPool;

pub struct GenerateArgs {
    pub file: PathBuf,
    pub output: PathBuf,
    pub script: Option<String>,
    pub seed: Option<u64>,
    pub timestamp: Option<String>,
    pub stdout: bool,
    pub dry_run: bool,
    pub progress: bool,
}

/// Clock selected on the command line
#[derive(Clone, Copy)]
enum RunClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for RunClock {
    fn now(&mut self) -> DateTime<FixedOffset> {
        match self {
            RunClock::System(c) => c.now(),
            RunClock::Fixed(c) => c.now(),
        }
    }
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let defs = ScriptsDef::load(&args.file)?;

    // Keep each script's position in the file so its seed does not depend
    // on which scripts were selected.
    let selected: Vec<(usize, &ScriptDef)> = match &args.script {
        Some(name) => {
            let idx = defs
                .scripts
                .iter()
                .position(|s| &s.name == name)
                .with_context(|| {
                    let available: Vec<&str> =
                        defs.scripts.iter().map(|s| s.name.as_str()).collect();
                    format!(
                        "Unknown script '{}'. Available: {}",
                        name,
                        available.join(", ")
                    )
                })?;
            vec![(idx, &defs.scripts[idx])]
        }
        None => defs.scripts.iter().enumerate().collect(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, scripts = selected.len(), "generating scripts");

    let clock = match &args.timestamp {
        Some(ts) => RunClock::Fixed(
            FixedClock::parse(ts).with_context(|| format!("Invalid --timestamp '{}'", ts))?,
        ),
        None => RunClock::System(SystemClock),
    };

    let pb = if args.progress && !args.stdout {
        let pb = ProgressBar::new(selected.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        Some(pb)
    } else {
        None
    };

    // Render everything before touching the output so a bad script leaves
    // no partial files behind.
    let mut rendered: Vec<RenderedScript> = Vec::with_capacity(selected.len());
    for (idx, def) in selected {
        if let Some(pb) = &pb {
            pb.set_message(def.name.clone());
        }
        let source = RandomCommitSource::seeded(seed.wrapping_add(idx as u64), clock);
        let script = ScriptGen::new(def)
            .render(source)
            .with_context(|| format!("Failed to generate script '{}'", def.name))?;
        tracing::debug!(
            script = %script.name,
            bytes = script.text.len(),
            rows = script.fixture_rows(),
            "rendered script"
        );
        rendered.push(script);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if args.stdout {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for script in &rendered {
            script.write_to(&mut out)?;
        }
        out.flush()?;
    } else if !args.dry_run {
        let mut pool = WriterPool::new(args.output.clone());
        pool.ensure_output_dir().with_context(|| {
            format!("Failed to create output directory: {}", args.output.display())
        })?;
        for script in &rendered {
            let path = pool
                .write_script(script)
                .with_context(|| format!("Failed to write script '{}'", script.name))?;
            tracing::debug!(path = %path.display(), "wrote script");
        }
        pool.close_all()?;
    }

    if args.progress || args.dry_run {
        eprintln!();
        eprintln!("Generate Statistics:");
        eprintln!("  Scripts: {}", rendered.len());
        eprintln!("  Seed: {}", seed);
        for script in &rendered {
            match &script.fixtures {
                Some(fixtures) => eprintln!(
                    "  {}: {} fixture tables, {} rows, {} commits",
                    script.name,
                    fixtures.tables.len(),
                    script.fixture_rows(),
                    fixtures.commits.len()
                ),
                None => eprintln!("  {}: real commits", script.name),
            }
        }
        if args.dry_run {
            eprintln!("  (dry run, nothing written)");
        } else if !args.stdout {
            eprintln!("  Output: {}", args.output.display());
        }
        eprintln!("  Elapsed: {:.2?}", start.elapsed());
    }

    Ok(())
}
