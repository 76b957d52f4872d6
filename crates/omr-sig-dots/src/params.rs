use omr_sig_core::grades::INTRINSIC_RATIO;
use omr_sig_graph::RelationParams;
use serde::{Deserialize, Serialize};

/// Configuration of the dot resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotParams {
    /// Ratio applied to the classifier grade of a dot glyph.
    pub intrinsic_ratio: f64,
    /// Gap limits of the relations a dot may take part in.
    pub relations: RelationParams,
    /// Target ordinate of a dot within the upper half-box of an arc lying
    /// below it, as a fraction of the half-box height.
    pub fermata_below_target: f32,
    /// Target ordinate of a dot within the lower half-box of an arc lying
    /// above it.
    pub fermata_above_target: f32,
}

impl Default for DotParams {
    fn default() -> Self {
        Self {
            intrinsic_ratio: INTRINSIC_RATIO,
            relations: RelationParams::default(),
            fermata_below_target: 0.25,
            fermata_above_target: 0.75,
        }
    }
}

impl DotParams {
    /// Intrinsic grade of an inter built from a dot evaluated at `grade`.
    #[inline]
    pub fn intrinsic_grade(&self, grade: f64) -> f64 {
        omr_sig_core::grades::intrinsic_grade(self.intrinsic_ratio, grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: DotParams = serde_json::from_str(r#"{"intrinsic_ratio": 0.5}"#).unwrap();
        assert_eq!(params.intrinsic_ratio, 0.5);
        assert_eq!(params.fermata_above_target, 0.75);
        assert_eq!(params.relations, RelationParams::default());
    }
}
