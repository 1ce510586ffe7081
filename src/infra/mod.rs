// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   checkpoint.rs — loading weights into the model (PyTorch
//                   state dicts and Burnpack files through
//                   burn-store), plus writing converted
//                   checkpoints and their architecture JSON.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model weight loading and checkpoint conversion
pub mod checkpoint;
