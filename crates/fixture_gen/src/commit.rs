//! Synthetic commit identities.
//!
//! Every fixture table in a run draws from the same commit sequence, so the
//! source is an explicit value owned by the generator rather than global state.
//! Swap in a seeded RNG and a [`FixedClock`] to get byte-identical output.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Alphabet for commit hashes (no `0`, matching the target's hash encoding)
const HASH_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz123456789";

/// Length of a generated commit hash
pub const HASH_LEN: usize = 32;

pub const COMMITTER: &str = "Max Hoffman";
pub const COMMITTER_EMAIL: &str = "max@dolthub.com";
pub const COMMIT_MESSAGE: &str = "a commit message";

/// A synthetic commit. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    /// RFC 3339 timestamp with offset, second precision
    pub timestamp: String,
    pub committer: String,
    pub email: String,
    pub message: String,
}

impl Commit {
    pub fn new(hash: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            timestamp: timestamp.into(),
            committer: COMMITTER.to_string(),
            email: COMMITTER_EMAIL.to_string(),
            message: COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Row key/value pair attached to a commit at a given step (the `x`/`y`
/// columns of the versioned table). Kept as text because that is how it is
/// rendered; numeric access goes through [`crate::TableDescriptor`] extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    pub x: String,
    pub y: String,
}

impl RowKey {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Key `n` with its canonical value `row n`
    pub fn numbered(n: usize) -> Self {
        Self::new(n.to_string(), format!("row {}", n))
    }
}

/// Produces a fresh commit on demand
pub trait CommitSource {
    fn next_commit(&mut self) -> Commit;
}

/// Source of commit timestamps
pub trait Clock {
    fn now(&mut self) -> DateTime<FixedOffset>;
}

/// Local wall clock, keeping the local offset
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&mut self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Format a timestamp the way commit dates are rendered (`Z` for UTC)
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Random hashes from an injected RNG, timestamps from an injected clock
pub struct RandomCommitSource<R: Rng, C: Clock> {
    rng: R,
    clock: C,
}

impl<R: Rng, C: Clock> RandomCommitSource<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    fn hash(&mut self) -> String {
        (0..HASH_LEN)
            .map(|_| HASH_ALPHABET[self.rng.random_range(0..HASH_ALPHABET.len())] as char)
            .collect()
    }
}

impl<C: Clock> RandomCommitSource<ChaCha8Rng, C> {
    /// Deterministic hashes for a given seed
    pub fn seeded(seed: u64, clock: C) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed), clock)
    }
}

impl<R: Rng, C: Clock> CommitSource for RandomCommitSource<R, C> {
    fn next_commit(&mut self) -> Commit {
        let hash = self.hash();
        let timestamp = format_timestamp(&self.clock.now());
        Commit::new(hash, timestamp)
    }
}

/// Replays a fixed list of commits.
///
/// After the last commit the list starts over from the first, so a run
/// longer than the list repeats commit identities. Size the list to at least
/// the number of commits the run draws when distinct hashes matter.
#[derive(Debug, Clone)]
pub struct ScriptedCommitSource {
    commits: Vec<Commit>,
    next: usize,
}

impl ScriptedCommitSource {
    /// `None` if `commits` is empty
    pub fn new(commits: Vec<Commit>) -> Option<Self> {
        if commits.is_empty() {
            return None;
        }
        Some(Self { commits, next: 0 })
    }

    /// Commits with hashes `c0`, `c1`, ... all stamped with `timestamp`.
    /// A `count` of zero still yields one commit.
    pub fn numbered(count: usize, timestamp: &str) -> Self {
        Self {
            commits: (0..count.max(1))
                .map(|i| Commit::new(format!("c{}", i), timestamp))
                .collect(),
            next: 0,
        }
    }
}

impl CommitSource for ScriptedCommitSource {
    fn next_commit(&mut self) -> Commit {
        let commit = self.commits[self.next % self.commits.len()].clone();
        self.next += 1;
        commit
    }
}

impl<S: CommitSource + ?Sized> CommitSource for &mut S {
    fn next_commit(&mut self) -> Commit {
        (**self).next_commit()
    }
}

impl<S: CommitSource + ?Sized> CommitSource for Box<S> {
    fn next_commit(&mut self) -> Commit {
        (**self).next_commit()
    }
}
