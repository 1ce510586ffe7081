// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for each CLI subcommand.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Where weights and architecture come from
pub mod model_source;

// Load the model and run the HTTP service
pub mod serve_use_case;

// One-shot prediction from a JSON file
pub mod predict_use_case;

// PyTorch → Burnpack checkpoint conversion
pub mod convert_use_case;
