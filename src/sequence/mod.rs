// ==========================================
// Asset Ledger - sequential code generation
// ==========================================
// Per-key monotonic counters with at-most-once issuance under
// concurrent access. The only intentionally blocking section in the
// core; the critical section is read, increment, write, release.
// ==========================================

pub mod generator;

pub use generator::{
    zero_padded, CounterKey, GeneratedCode, SequenceError, SequenceGenerator, SequenceResult,
};
