// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe one inference call:
// what comes in (ImageMatrix), what goes out (Prediction),
// and the trait the service layer programs against.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO HTTP or file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// The validated 14×7 model input
pub mod matrix;

/// Raw head outputs and the post-processed schedule/quantity
pub mod prediction;

/// Core abstractions (traits) that other layers implement
pub mod traits;
