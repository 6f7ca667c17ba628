//! Interpreter state bound by special parameters.
//!
//! Every cell a special parameter redirects to lives here, in one explicit
//! context object passed by reference into the dispatch layer. Nothing in
//! this crate touches process-wide statics, so two engines in one process
//! never observe each other.

use std::time::Instant;

use crate::environ::Environ;

/// The linear congruential generator behind `RANDOM`.
///
/// The classic 31-bit recurrence, so a fixed seed yields the same sequence
/// the C library's `rand()` contract promises: values in `0..=32767`.
#[derive(Clone, Debug)]
pub struct Prng {
    state: u32,
}

impl Prng {
    pub fn new(seed: u32) -> Prng {
        Prng {
            state: seed & 0x7fff_ffff,
        }
    }

    /// Reseed, as assignment to `RANDOM` does.
    pub fn seed(&mut self, seed: u32) {
        self.state = seed & 0x7fff_ffff;
    }

    /// Next value in `0..=32767`. Advances the state.
    pub fn next(&mut self) -> i64 {
        self.state = self
            .state
            .wrapping_mul(1_103_515_245)
            .wrapping_add(12345)
            & 0x7fff_ffff;
        i64::from((self.state >> 16) & 0x7fff)
    }
}

impl Default for Prng {
    fn default() -> Prng {
        Prng::new(1)
    }
}

/// The monotonic clock behind `SECONDS`.
///
/// Reads are `started.elapsed() + offset`; assigning `SECONDS=n` shifts
/// the offset so the next read starts from `n`. The raw offset is what a
/// localized `SECONDS` stashes and restores, so time keeps flowing while
/// the local is live.
#[derive(Clone, Debug)]
pub struct SecondsClock {
    started: Instant,
    offset: f64,
}

impl SecondsClock {
    pub fn new() -> SecondsClock {
        SecondsClock {
            started: Instant::now(),
            offset: 0.0,
        }
    }

    /// Current reading in seconds.
    pub fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() + self.offset
    }

    /// Make the next reading start from `value`.
    pub fn set(&mut self, value: f64) {
        self.offset = value - self.started.elapsed().as_secs_f64();
    }

    /// The raw origin, for scope stash and restore.
    pub fn raw_offset(&self) -> f64 {
        self.offset
    }

    pub fn restore_raw(&mut self, offset: f64) {
        self.offset = offset;
    }
}

impl Default for SecondsClock {
    fn default() -> SecondsClock {
        SecondsClock::new()
    }
}

/// Process identity cells bound by `UID`/`EUID`/`GID`/`EGID`/`USERNAME`.
///
/// Real id changes need privileges; `allow_id_changes` stands in for that
/// check so the failure path is exercisable. A failed change leaves the
/// cell untouched.
#[derive(Clone, Debug)]
pub struct ProcessIds {
    pub uid: i64,
    pub euid: i64,
    pub gid: i64,
    pub egid: i64,
    pub ppid: i64,
    pub username: String,
    pub allow_id_changes: bool,
}

impl ProcessIds {
    pub fn set_uid(&mut self, id: i64) -> bool {
        self.change(|s| s.uid = id)
    }

    pub fn set_euid(&mut self, id: i64) -> bool {
        self.change(|s| s.euid = id)
    }

    pub fn set_gid(&mut self, id: i64) -> bool {
        self.change(|s| s.gid = id)
    }

    pub fn set_egid(&mut self, id: i64) -> bool {
        self.change(|s| s.egid = id)
    }

    /// Change identity by user name, the `USERNAME` side effect.
    pub fn set_username(&mut self, name: &str) -> bool {
        let name = name.to_owned();
        self.change(|s| s.username = name)
    }

    fn change(&mut self, apply: impl FnOnce(&mut ProcessIds)) -> bool {
        if !self.allow_id_changes {
            return false;
        }
        apply(self);
        true
    }
}

impl Default for ProcessIds {
    fn default() -> ProcessIds {
        ProcessIds {
            uid: 0,
            euid: 0,
            gid: 0,
            egid: 0,
            ppid: 0,
            username: String::new(),
            allow_id_changes: true,
        }
    }
}

/// Counters for side effects whose real form lives outside this crate.
/// Each special binding that triggers one bumps its counter, which is what
/// the tests observe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideEffects {
    /// `HOME` changed: the named-directory cache was reindexed.
    pub dir_reindexes: u64,
    /// `TERM`/`TERMINFO`/`TERMINFO_DIRS` changed: terminal reinitialized.
    pub term_reinits: u64,
    /// `WORDCHARS` changed: the character type table was rebuilt.
    pub typtab_rebuilds: u64,
    /// `path` changed: the command hash table was invalidated.
    pub cmd_hash_invalidations: u64,
}

/// The interpreter context object.
///
/// Holds every cell the special registry binds, the environment mirror,
/// and the side-effect counters.
#[derive(Clone, Debug)]
pub struct InterpreterState {
    pub prng: Prng,
    pub seconds: SecondsClock,
    pub ids: ProcessIds,
    pub home: String,
    pub term: String,
    pub terminfo: String,
    pub terminfo_dirs: String,
    pub ifs: String,
    pub wordchars: String,
    pub shlvl: i64,
    pub optind: i64,
    pub path: Vec<String>,
    pub cdpath: Vec<String>,
    pub fpath: Vec<String>,
    pub env: Environ,
    pub effects: SideEffects,
}

impl InterpreterState {
    pub fn new() -> InterpreterState {
        InterpreterState {
            prng: Prng::default(),
            seconds: SecondsClock::new(),
            ids: ProcessIds::default(),
            home: String::new(),
            term: String::new(),
            terminfo: String::new(),
            terminfo_dirs: String::new(),
            ifs: " \t\n".to_owned(),
            wordchars: "*?_-.[]~=/&;!#$%^(){}<>".to_owned(),
            shlvl: 1,
            optind: 1,
            path: Vec::new(),
            cdpath: Vec::new(),
            fpath: Vec::new(),
            env: Environ::new(),
            effects: SideEffects::default(),
        }
    }
}

impl Default for InterpreterState {
    fn default() -> InterpreterState {
        InterpreterState::new()
    }
}
