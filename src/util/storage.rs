//! Storage kinds - the physical scalar type backing a data array.

use std::fmt;

/// Physical scalar storage of a data array.
///
/// Every data array stores its components as exactly one of these kinds.
/// Numeric kinds can be read through any accessor width; strings are only
/// readable through the string accessors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Storage {
    /// Unsigned 8-bit integer
    Uint8 = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 16-bit integer
    Uint16 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 32-bit integer
    Uint32 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 64-bit integer
    Uint64 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// 16-bit floating point (IEEE 754 half precision)
    Real16 = 8,
    /// 32-bit floating point
    Real32 = 9,
    /// 64-bit floating point
    Real64 = 10,
    /// UTF-8 string
    String = 11,
    /// Uninitialized storage
    #[default]
    Invalid = 127,
}

impl Storage {
    /// Number of valid storage kinds (excluding Invalid).
    pub const COUNT: usize = 12;

    /// Size in bytes of one component. Strings report the size of an index.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Real16 => 2,
            Self::Uint32 | Self::Int32 | Self::Real32 => 4,
            Self::Uint64 | Self::Int64 | Self::Real64 => 8,
            Self::String => std::mem::size_of::<i32>(),
            Self::Invalid => 0,
        }
    }

    /// Canonical name, as accepted by attribute declarations.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Real16 => "fpreal16",
            Self::Real32 => "fpreal32",
            Self::Real64 => "fpreal64",
            Self::String => "string",
            Self::Invalid => "invalid",
        }
    }

    /// Parse a storage name. Accepts the canonical names and a few aliases.
    pub fn from_name(name: &str) -> Self {
        match name {
            "uint8" | "u8" => Self::Uint8,
            "int8" | "i8" => Self::Int8,
            "uint16" | "u16" => Self::Uint16,
            "int16" | "i16" => Self::Int16,
            "uint32" | "u32" => Self::Uint32,
            "int32" | "i32" | "int" => Self::Int32,
            "uint64" | "u64" => Self::Uint64,
            "int64" | "i64" => Self::Int64,
            "fpreal16" | "real16" | "half" | "f16" => Self::Real16,
            "fpreal32" | "real32" | "float" | "f32" => Self::Real32,
            "fpreal64" | "real64" | "double" | "f64" => Self::Real64,
            "string" | "str" => Self::String,
            _ => Self::Invalid,
        }
    }

    /// Returns true for any integer or floating point kind.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::String | Self::Invalid)
    }

    /// Returns true for the integer kinds.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Int8
                | Self::Uint16
                | Self::Int16
                | Self::Uint32
                | Self::Int32
                | Self::Uint64
                | Self::Int64
        )
    }

    /// Returns true for unsigned integer kinds.
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
    }

    /// Returns true for floating point kinds.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Real16 | Self::Real32 | Self::Real64)
    }

    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// The wider of two storages, used when several arrays are combined.
    ///
    /// Every value of either input is representable in the result. Strings
    /// never mix with numbers, and `Uint64` never mixes with a signed
    /// integer; both yield Invalid.
    pub fn promote(self, other: Self) -> Self {
        if self == other {
            return self;
        }
        if self.is_string() || other.is_string() || !self.is_valid() || !other.is_valid() {
            return Self::Invalid;
        }
        if self.is_float() || other.is_float() {
            // integers join a float wide enough to hold them exactly
            let exact = |s: Self| match s {
                _ if s.is_float() => s.num_bytes(),
                Self::Uint8 | Self::Int8 => 2,
                Self::Uint16 | Self::Int16 => 4,
                _ => 8,
            };
            return match exact(self).max(exact(other)) {
                2 => Self::Real16,
                4 => Self::Real32,
                _ => Self::Real64,
            };
        }
        if self.is_unsigned() == other.is_unsigned() {
            let bytes = self.num_bytes().max(other.num_bytes());
            return match (bytes, self.is_unsigned()) {
                (1, true) => Self::Uint8,
                (1, false) => Self::Int8,
                (2, true) => Self::Uint16,
                (2, false) => Self::Int16,
                (4, true) => Self::Uint32,
                (4, false) => Self::Int32,
                (_, true) => Self::Uint64,
                (_, false) => Self::Int64,
            };
        }
        // mixed signedness: a signed kind twice as wide as the unsigned one
        let (unsigned, signed) = if self.is_unsigned() { (self, other) } else { (other, self) };
        match (unsigned.num_bytes() * 2).max(signed.num_bytes()) {
            2 => Self::Int16,
            4 => Self::Int32,
            8 => Self::Int64,
            // no integer kind holds every u64 and every negative value
            _ => Self::Invalid,
        }
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
