//! Refine parameters.
//!
//! A string-keyed bag of options consulted by primitives while they refine.
//! Unknown keys are kept so that callers can pass their own options through;
//! the well-known keys have typed getters with defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{Error, Result};

pub const LOD_SCALE: &str = "lod_scale";
pub const QUADRIC_DIVISIONS: &str = "quadric_divisions";
pub const FACESET_MODE: &str = "faceset_mode";
pub const MAX_POLY_MESH_SIZE: &str = "max_poly_mesh_size";
pub const MAX_DEPTH: &str = "max_depth";
pub const MAX_PRIMITIVES: &str = "max_primitives";
pub const VIEWPORT_LOD: &str = "viewport_lod";
pub const ALLOW_THREADING: &str = "allow_threading";

pub const DEFAULT_QUADRIC_DIVISIONS: usize = 16;
pub const DEFAULT_MAX_POLY_MESH_SIZE: usize = 100_000;
pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_PRIMITIVES: usize = 1_000_000;

/// Which face sets polygon meshes produce while refining.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacesetMode {
    /// Drop face sets
    None,
    /// Keep face sets with at least one face
    #[default]
    NonEmpty,
    /// Keep every face set
    All,
}

impl FacesetMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "non_empty" | "nonempty" => Some(Self::NonEmpty),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Level of detail requested by an interactive viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportLod {
    /// Full geometry
    #[default]
    Full,
    /// Meshes and curves reduced to their points
    Points,
    /// Nothing is refined
    Hidden,
}

impl ViewportLod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "full" => Some(Self::Full),
            "points" => Some(Self::Points),
            "hidden" => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// String-keyed refine options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefineParms {
    values: BTreeMap<String, Value>,
}

impl RefineParms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object and check the well-known keys.
    pub fn from_json(json: &str) -> Result<Self> {
        let parms: Self = serde_json::from_str(json)?;
        parms.validate()?;
        Ok(parms)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fail on a well-known key holding a value of the wrong kind.
    pub fn validate(&self) -> Result<()> {
        let bad = |key: &str| {
            let value = self.values.get(key).map(Value::to_string).unwrap_or_default();
            Err(Error::InvalidParm {
                key: key.to_string(),
                value,
            })
        };
        for (key, value) in &self.values {
            let ok = match key.as_str() {
                LOD_SCALE => value.as_f64().is_some_and(|v| v > 0.0),
                QUADRIC_DIVISIONS | MAX_POLY_MESH_SIZE | MAX_DEPTH | MAX_PRIMITIVES => {
                    value.as_u64().is_some_and(|v| v > 0)
                }
                ALLOW_THREADING => value.is_boolean(),
                FACESET_MODE => value.as_str().and_then(FacesetMode::from_name).is_some(),
                VIEWPORT_LOD => value.as_str().and_then(ViewportLod::from_name).is_some(),
                _ => true,
            };
            if !ok {
                return bad(key);
            }
        }
        Ok(())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .map_or(default, |v| v as usize)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Scale applied to tessellation density. Default 1.
    pub fn lod_scale(&self) -> f64 {
        self.get_f64(LOD_SCALE, 1.0).max(f64::EPSILON)
    }

    /// Segments around a quadric at `lod_scale == 1`, never below 3.
    pub fn quadric_divisions(&self) -> usize {
        let base = self.get_usize(QUADRIC_DIVISIONS, DEFAULT_QUADRIC_DIVISIONS) as f64;
        ((base * self.lod_scale()).round() as usize).max(3)
    }

    pub fn faceset_mode(&self) -> FacesetMode {
        FacesetMode::from_name(self.get_str(FACESET_MODE, "")).unwrap_or_default()
    }

    /// Faces above which a polygon mesh splits into pieces.
    pub fn max_poly_mesh_size(&self) -> usize {
        self.get_usize(MAX_POLY_MESH_SIZE, DEFAULT_MAX_POLY_MESH_SIZE).max(1)
    }

    /// Refinement passes before the driver gives up.
    pub fn max_depth(&self) -> usize {
        self.get_usize(MAX_DEPTH, DEFAULT_MAX_DEPTH)
    }

    /// Ceiling on primitives alive in one pass.
    pub fn max_primitives(&self) -> usize {
        self.get_usize(MAX_PRIMITIVES, DEFAULT_MAX_PRIMITIVES)
    }

    pub fn viewport_lod(&self) -> ViewportLod {
        ViewportLod::from_name(self.get_str(VIEWPORT_LOD, "")).unwrap_or_default()
    }

    pub fn allow_threading(&self) -> bool {
        self.get_bool(ALLOW_THREADING, true)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let parms = RefineParms::new();
        assert_eq!(parms.lod_scale(), 1.0);
        assert_eq!(parms.quadric_divisions(), DEFAULT_QUADRIC_DIVISIONS);
        assert_eq!(parms.faceset_mode(), FacesetMode::NonEmpty);
        assert_eq!(parms.viewport_lod(), ViewportLod::Full);
        assert_eq!(parms.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(parms.allow_threading());
    }

    #[test]
    fn test_lod_scales_divisions() {
        let parms = RefineParms::new().with(LOD_SCALE, 0.5);
        assert_eq!(parms.quadric_divisions(), 8);
        let tiny = RefineParms::new().with(LOD_SCALE, 0.01);
        assert_eq!(tiny.quadric_divisions(), 3);
    }

    #[test]
    fn test_from_json() {
        let parms = RefineParms::from_json(
            r#"{"max_poly_mesh_size": 10, "faceset_mode": "all", "allow_threading": false, "custom": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(parms.max_poly_mesh_size(), 10);
        assert_eq!(parms.faceset_mode(), FacesetMode::All);
        assert!(!parms.allow_threading());
        assert!(parms.contains("custom"));

        let again = RefineParms::from_json(&parms.to_json().unwrap()).unwrap();
        assert_eq!(again, parms);
    }

    #[test]
    fn test_invalid_values() {
        let err = RefineParms::from_json(r#"{"max_depth": "deep"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidParm { ref key, .. } if key == "max_depth"));
        assert!(matches!(
            RefineParms::from_json(r#"{"viewport_lod": "fancy"}"#),
            Err(Error::InvalidParm { .. })
        ));
        assert!(matches!(RefineParms::from_json("[1]"), Err(Error::Json(_))));
    }

    #[test]
    fn test_wrong_kind_falls_back() {
        let mut parms = RefineParms::new();
        parms.set(MAX_DEPTH, "three");
        assert_eq!(parms.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(parms.validate().is_err());
    }
}
