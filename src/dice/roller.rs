use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const FACES: u8 = 6;

const DOMAIN_TAG: &[u8] = b"tablestakes/dice/v1";

// Largest multiple of FACES representable in a u64; draws at or above it are rejected
const ACCEPT_BELOW: u64 = u64::MAX - (u64::MAX % FACES as u64);

/// Where a roll gets its randomness from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seed", rename_all = "snake_case")]
pub enum DiceSource {
    /// Reproducible: same seed, same faces
    Seeded(u64),
    /// Fresh entropy on every call
    Entropy,
}

impl From<Option<u64>> for DiceSource {
    fn from(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => DiceSource::Seeded(seed),
            None => DiceSource::Entropy,
        }
    }
}

impl DiceSource {
    pub fn roll(&self) -> u8 {
        self.roll_die(0)
    }

    /// Rolls die number `index` of a throw
    pub fn roll_die(&self, index: u32) -> u8 {
        match self {
            DiceSource::Seeded(seed) => seeded_face(*seed, index).0,
            DiceSource::Entropy => rand::rng().random_range(1..=FACES),
        }
    }

    pub fn roll_many(&self, count: u32) -> Vec<u8> {
        (0..count).map(|index| self.roll_die(index)).collect()
    }
}

/// Rolls one die; `None` means non-reproducible entropy
pub fn roll(seed: Option<u64>) -> u8 {
    DiceSource::from(seed).roll()
}

/// Rolls `count` dice from one seed, die `i` derived from `(seed, i)`
pub fn roll_many(seed: Option<u64>, count: u32) -> Vec<u8> {
    DiceSource::from(seed).roll_many(count)
}

/// Everything a third party needs to recompute a seeded roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollProof {
    pub seed: u64,
    pub index: u32,
    /// Hex SHA-256 digest that produced the accepted draw
    pub digest: String,
    pub value: u8,
}

pub fn prove(seed: u64, index: u32) -> RollProof {
    let (value, digest) = seeded_face(seed, index);
    RollProof {
        seed,
        index,
        digest: hex::encode(digest),
        value,
    }
}

pub fn verify(proof: &RollProof) -> bool {
    let (value, digest) = seeded_face(proof.seed, proof.index);
    value == proof.value && hex::encode(digest) == proof.digest
}

fn seeded_face(seed: u64, index: u32) -> (u8, [u8; 32]) {
    let mut attempt: u32 = 0;
    loop {
        let digest = draw(seed, index, attempt);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let sample = u64::from_be_bytes(head);

        // A rejection needs a draw in the top 4 values of the u64 range
        if sample < ACCEPT_BELOW {
            return ((sample % FACES as u64) as u8 + 1, digest);
        }
        attempt = attempt.wrapping_add(1);
    }
}

fn draw(seed: u64, index: u32, attempt: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(seed.to_be_bytes());
    hasher.update(index.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    hasher.finalize().into()
}
