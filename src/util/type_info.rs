//! TypeInfo - semantic interpretation of a tuple.

use std::fmt;

/// Semantic interpretation attached to a data array.
///
/// TypeInfo never changes how values are stored; it tells consumers how a
/// tuple should transform (points translate, vectors and normals don't, etc).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeInfo {
    /// Plain data
    #[default]
    None,
    /// Position (transforms with translation)
    Point,
    /// Homogeneous position, 4 components
    HPoint,
    /// Direction
    Vector,
    /// Surface normal
    Normal,
    /// Color
    Color,
    /// 3x3 matrix, 9 components
    Matrix3,
    /// 4x4 matrix, 16 components
    Matrix,
    /// Rotation quaternion
    Quaternion,
    /// Texture coordinate
    Texture,
    /// Integer indices into another array
    Index,
    /// Internal data not exported to consumers
    Hidden,
}

impl TypeInfo {
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Point => "point",
            Self::HPoint => "hpoint",
            Self::Vector => "vector",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::Matrix3 => "matrix3",
            Self::Matrix => "matrix",
            Self::Quaternion => "quaternion",
            Self::Texture => "texture",
            Self::Index => "index",
            Self::Hidden => "hidden",
        }
    }

    /// Parse a type info name. Returns None for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" | "" => Self::None,
            "point" | "pos" => Self::Point,
            "hpoint" => Self::HPoint,
            "vector" | "vec" => Self::Vector,
            "normal" => Self::Normal,
            "color" | "colour" => Self::Color,
            "matrix3" => Self::Matrix3,
            "matrix" | "matrix4" => Self::Matrix,
            "quaternion" | "quat" => Self::Quaternion,
            "texture" | "uv" => Self::Texture,
            "index" => Self::Index,
            "hidden" => Self::Hidden,
            _ => return None,
        })
    }

    /// Tuple size this interpretation expects, if it fixes one.
    pub const fn expected_tuple_size(self) -> Option<usize> {
        match self {
            Self::Point | Self::Vector | Self::Normal => Some(3),
            Self::HPoint | Self::Quaternion => Some(4),
            Self::Matrix3 => Some(9),
            Self::Matrix => Some(16),
            _ => None,
        }
    }

    /// Returns true if values of this kind change under a spatial transform.
    pub const fn is_transformable(self) -> bool {
        matches!(
            self,
            Self::Point | Self::HPoint | Self::Vector | Self::Normal | Self::Matrix
        )
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_info_names() {
        assert_eq!(TypeInfo::from_name("normal"), Some(TypeInfo::Normal));
        assert_eq!(TypeInfo::from_name(TypeInfo::Matrix.name()), Some(TypeInfo::Matrix));
        assert_eq!(TypeInfo::from_name("sideways"), None);
        assert_eq!(TypeInfo::Point.expected_tuple_size(), Some(3));
        assert!(!TypeInfo::Color.is_transformable());
    }
}
