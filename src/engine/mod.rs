//! Betting engine implementations. `nl` is the only variant this
//! crate ships; kept as its own module so a future ruleset (e.g.
//! pot-limit Omaha) could sit alongside it without disturbing callers
//! that import through `engine::nl`.

pub mod nl;
