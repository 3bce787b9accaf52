//! # Algorithms
//!
//! Pure protocol steps: generation, sifting, integrity sampling, the
//! security gate and key assembly. All randomness comes from the caller's RNG.

pub mod generator;
pub mod key_assembly;
pub mod sampling;
pub mod security_gate;
pub mod sifting;

pub use generator::{generate_batch, protocol_rng, random_bases, random_bits};
pub use key_assembly::assemble_key;
pub use sampling::estimate_qber;
pub use security_gate::SecurityGate;
pub use sifting::sift;
