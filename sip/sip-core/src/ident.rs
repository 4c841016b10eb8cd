//! Random protocol tokens (branch, tag, Call-ID, CSeq).
//!
//! These only have to be unique, not unpredictable, so any [`Rng`] will do. Tests
//! inject a seeded generator to get reproducible messages.

use rand::rngs::ThreadRng;
use rand::{Rng, rng};

/// Magic cookie every RFC 3261 branch parameter starts with
pub const RFC3261_BRANCH_PREFIX: &str = "z9hG4bK";

/// Lowercase alphanumerics without the easily confused `l`, `o`, `0` and `1`
const ALPHABET: &[u8] = b"abcdefghijkmnpqrstuvwxyz23456789";

const BRANCH_LEN: usize = 8;
const TAG_LEN: usize = 8;
const CALL_ID_LEN: usize = 10;
const MAX_SEQUENCE_NUMBER: u32 = 999;

#[derive(Debug)]
pub struct IdGenerator<R> {
    rng: R,
}

impl IdGenerator<ThreadRng> {
    /// Generator backed by the thread local random number generator
    pub fn thread_local() -> Self {
        Self::new(rng())
    }
}

impl<R: Rng> IdGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn random_token(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(ALPHABET[self.rng.random_range(0..ALPHABET.len())]))
            .collect()
    }

    pub fn branch(&mut self) -> String {
        format!("{RFC3261_BRANCH_PREFIX}{}", self.random_token(BRANCH_LEN))
    }

    pub fn tag(&mut self) -> String {
        self.random_token(TAG_LEN)
    }

    pub fn call_id(&mut self) -> String {
        self.random_token(CALL_ID_LEN)
    }

    pub fn sequence_number(&mut self) -> u32 {
        self.rng.random_range(0..MAX_SEQUENCE_NUMBER)
    }
}

/// The random tokens of a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifiers {
    pub branch: String,
    pub tag: String,
    pub call_id: String,
    pub cseq: u32,
}

impl Identifiers {
    pub fn generate<R: Rng>(generator: &mut IdGenerator<R>) -> Self {
        Self {
            branch: generator.branch(),
            tag: generator.tag(),
            call_id: generator.call_id(),
            cseq: generator.sequence_number(),
        }
    }
}
