//! Dice rolls for in-game resolution.
//!
//! A seeded roll is a pure function of `(seed, die index)`: SHA-256 over a
//! fixed domain tag, the seed and the die index, reduced to a face with
//! rejection sampling so every face is equally likely. Anyone holding the
//! published seed can recompute the outcome with [`verify`].
//!
//! Unseeded rolls draw from the thread-local entropy source and cannot be
//! replayed.

// Public API - what other modules can use
pub use handlers::roll_dice;
pub use roller::{prove, roll, roll_many, verify, DiceSource, RollProof, FACES};

// Internal modules
mod handlers;
mod roller;
pub mod types;
