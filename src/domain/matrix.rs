// ============================================================
// Layer 3 — ImageMatrix Domain Type
// ============================================================
// The model input: 14 time slots (rows) × 7 features (columns).
// The upstream backend normalises every feature into [0, 1]
// before calling us, but we accept any number f32 can hold.
//
// Parsing happens straight from the untyped JSON body so that
// every rejection is reported in a fixed order:
//   1. no "image_data" field           → MissingImageData
//   2. not 14 rows / row 0 not 7 wide  → InvalidShape
//   3. ragged later row, non-numeric   → InvalidData(detail)
//
// Only row 0's width is a shape error. A later row of the
// wrong width is a data error, the same category as a cell
// that can't be read as a number.

use serde_json::Value;
use thiserror::Error;

/// Number of time slots (days) the model sees and predicts.
pub const SLOTS: usize = 14;

/// Number of features per time slot.
pub const FEATURES: usize = 7;

/// Name of the request field carrying the matrix.
pub const IMAGE_DATA_FIELD: &str = "image_data";

/// Reasons an incoming payload can't become an [`ImageMatrix`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Missing \"image_data\" in request body.")]
    MissingImageData,

    #[error("Input \"image_data\" must be a 14x7 matrix.")]
    InvalidShape,

    #[error("Failed to process input data: {0}")]
    InvalidData(String),
}

/// A validated 14×7 single-sample input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMatrix([[f32; FEATURES]; SLOTS]);

impl ImageMatrix {
    /// Wrap already-validated cells.
    #[cfg(test)]
    pub fn new(cells: [[f32; FEATURES]; SLOTS]) -> Self {
        Self(cells)
    }

    /// Parse a request body of the form `{"image_data": [[..]; 14]}`.
    pub fn from_payload(payload: &Value) -> Result<Self, InputError> {
        let data = payload
            .as_object()
            .and_then(|body| body.get(IMAGE_DATA_FIELD))
            .ok_or(InputError::MissingImageData)?;
        Self::from_value(data)
    }

    /// Parse the matrix itself (the value of `image_data`).
    pub fn from_value(data: &Value) -> Result<Self, InputError> {
        let rows = data
            .as_array()
            .filter(|rows| rows.len() == SLOTS)
            .ok_or(InputError::InvalidShape)?;

        if rows[0].as_array().map(Vec::len) != Some(FEATURES) {
            return Err(InputError::InvalidShape);
        }

        let mut cells = [[0.0_f32; FEATURES]; SLOTS];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_array().ok_or_else(|| {
                InputError::InvalidData(format!("row {r} is not a sequence (found {})", kind(row)))
            })?;
            if row.len() != FEATURES {
                return Err(InputError::InvalidData(format!(
                    "expected sequence of length {FEATURES} at row {r} (got {})",
                    row.len()
                )));
            }
            for (c, cell) in row.iter().enumerate() {
                cells[r][c] = coerce(cell).ok_or_else(|| match cell {
                    Value::Number(n) => InputError::InvalidData(format!(
                        "value at row {r}, column {c} ({n}) overflows f32"
                    )),
                    _ => InputError::InvalidData(format!(
                        "value at row {r}, column {c} must be a number (found {})",
                        kind(cell)
                    )),
                })?;
            }
        }

        Ok(Self(cells))
    }

    /// The cells, one array per time slot.
    #[cfg(test)]
    pub fn rows(&self) -> &[[f32; FEATURES]; SLOTS] {
        &self.0
    }

    /// Row-major copy of all 98 values, ready for a `[1, 1, 14, 7]` tensor.
    pub fn to_flat_vec(&self) -> Vec<f32> {
        self.0.iter().flatten().copied().collect()
    }
}

/// Numbers and booleans coerce to f32, everything else is rejected.
/// Numbers outside f32 range are rejected rather than becoming inf.
fn coerce(cell: &Value) -> Option<f32> {
    match cell {
        Value::Number(n) => n.as_f64().map(|v| v as f32).filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(value: Value) -> Value {
        Value::Array(vec![Value::Array(vec![value; FEATURES]); SLOTS])
    }

    #[test]
    fn test_parses_valid_matrix() {
        let payload = json!({ "image_data": grid(json!(0.25)) });
        let m = ImageMatrix::from_payload(&payload).unwrap();
        assert_eq!(m.rows()[13][6], 0.25);
        assert_eq!(m.to_flat_vec().len(), SLOTS * FEATURES);
    }

    #[test]
    fn test_flat_vec_is_row_major() {
        let mut cells = [[0.0; FEATURES]; SLOTS];
        cells[0][1] = 1.0;
        cells[1][0] = 2.0;
        let flat = ImageMatrix::new(cells).to_flat_vec();
        assert_eq!(flat[1], 1.0);
        assert_eq!(flat[FEATURES], 2.0);
    }

    #[test]
    fn test_empty_object_is_missing() {
        assert_eq!(
            ImageMatrix::from_payload(&json!({})),
            Err(InputError::MissingImageData)
        );
    }

    #[test]
    fn test_non_object_body_is_missing() {
        assert_eq!(
            ImageMatrix::from_payload(&json!([1, 2, 3])),
            Err(InputError::MissingImageData)
        );
        assert_eq!(
            ImageMatrix::from_payload(&Value::Null),
            Err(InputError::MissingImageData)
        );
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let payload = json!({ "image_data": [[1, 2, 3]] });
        assert_eq!(ImageMatrix::from_payload(&payload), Err(InputError::InvalidShape));
    }

    #[test]
    fn test_null_image_data_is_a_shape_error() {
        let payload = json!({ "image_data": null });
        assert_eq!(ImageMatrix::from_payload(&payload), Err(InputError::InvalidShape));
    }

    #[test]
    fn test_first_row_width_is_a_shape_error() {
        let mut data = grid(json!(1));
        data[0] = json!([1, 2, 3, 4, 5, 6]);
        assert_eq!(ImageMatrix::from_value(&data), Err(InputError::InvalidShape));
    }

    #[test]
    fn test_later_row_width_is_a_data_error() {
        let mut data = grid(json!(1));
        data[5] = json!([1, 2, 3]);
        match ImageMatrix::from_value(&data) {
            Err(InputError::InvalidData(detail)) => assert!(detail.contains("row 5")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_string_cell_is_a_data_error() {
        let mut data = grid(json!(1));
        data[2][3] = json!("wet");
        let err = ImageMatrix::from_value(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to process input data: value at row 2, column 3 must be a number (found string)"
        );
    }

    #[test]
    fn test_number_beyond_f32_is_a_data_error() {
        let mut data = grid(json!(1));
        data[0][0] = json!(1e39);
        match ImageMatrix::from_value(&data) {
            Err(InputError::InvalidData(detail)) => {
                assert!(detail.contains("row 0, column 0"));
                assert!(detail.contains("overflows f32"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_large_number_within_f32_is_accepted() {
        let mut data = grid(json!(1));
        data[0][0] = json!(3.0e38);
        let m = ImageMatrix::from_value(&data).unwrap();
        assert!(m.rows()[0][0].is_finite());
    }

    #[test]
    fn test_booleans_coerce() {
        let data = grid(json!(true));
        let m = ImageMatrix::from_value(&data).unwrap();
        assert!(m.to_flat_vec().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_error_messages_match_wire_format() {
        assert_eq!(
            InputError::MissingImageData.to_string(),
            "Missing \"image_data\" in request body."
        );
        assert_eq!(
            InputError::InvalidShape.to_string(),
            "Input \"image_data\" must be a 14x7 matrix."
        );
    }
}
