// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code apart
// from weight loading in infra::checkpoint.
//
//   model.rs      — ViT trunk + dual irrigation head
//                   • (2,1) patch embedding over a 14×7 grid
//                   • CLS token + learned position embedding
//                   • pre-norm encoder blocks (fused qkv attention, GELU MLP)
//                   • sigmoid schedule / relu quantity projections
//
//   inferencer.rs — wraps a loaded model behind the Forecaster trait:
//                   ImageMatrix → [1,1,14,7] tensor → RawPrediction
//
// Reference: Burn Book §3 (Building Blocks)
//            Dosovitskiy et al. (2021) An Image is Worth 16x16 Words

/// Vision transformer architecture and irrigation head
pub mod model;

/// Inference engine — one forward pass per request
pub mod inferencer;
