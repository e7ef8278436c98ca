//! GDELT V2Tone decoding.
//!
//! Format: `tone,positive_score,negative_score,polarity,activity_ref,self_ref`.
//! Only `tone` feeds the pipeline; the rest is parsed for validation.

use esgsense_core::ToneInput;
use serde::Serialize;

/// Number of fields in a well-formed tone string.
pub const TONE_FIELDS: usize = 6;

/// Fully decoded tone tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneVector {
    pub tone: f64,
    pub positive_score: f64,
    pub negative_score: f64,
    pub polarity: f64,
    pub activity_reference: f64,
    pub self_reference: f64,
}

impl ToneVector {
    /// Parse all six fields. `None` unless every field is a number.
    pub fn parse(raw: &str) -> Option<ToneVector> {
        let fields: Vec<f64> = raw
            .split(',')
            .map(|f| f.trim().parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        if fields.len() != TONE_FIELDS {
            return None;
        }
        Some(ToneVector {
            tone: fields[0],
            positive_score: fields[1],
            negative_score: fields[2],
            polarity: fields[3],
            activity_reference: fields[4],
            self_reference: fields[5],
        })
    }
}

/// Extract the sentiment score (field 0). `None` means Missing.
pub fn parse_tone(raw: Option<&ToneInput>) -> Option<f64> {
    let score = match raw? {
        ToneInput::Numeric(value) => *value,
        ToneInput::Text(text) => {
            let first = text.split(',').next()?.trim();
            if first.is_empty() {
                return None;
            }
            first.parse::<f64>().ok()?
        }
    };
    if score.is_nan() {
        None
    } else {
        Some(score)
    }
}
