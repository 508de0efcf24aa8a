//! Width-generic scalar conversion.
//!
//! Arrays answer one widest-possible read ([`Scalar`]); the [`Numeric`] trait
//! converts that read into any concrete component type. Narrowing follows C
//! cast rules: integers truncate, floats convert through `i64` before
//! narrowing to an integer type.

use std::fmt;

use bytemuck::Pod;
use half::f16;

use super::Storage;

/// The widest native read of a single component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Uint(u64),
    Real(f64),
}

impl Scalar {
    pub const ZERO: Self = Self::Int(0);

    #[inline]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => v,
            Self::Uint(v) => v as i64,
            Self::Real(v) => v as i64,
        }
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        match self {
            Self::Int(v) => v as u64,
            Self::Uint(v) => v,
            Self::Real(v) => v as i64 as u64,
        }
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Uint(v) => v as f64,
            Self::Real(v) => v,
        }
    }

    /// Value equality across variants. Integers compare exactly; a real on
    /// either side compares as f64.
    #[inline]
    pub fn same_value(self, other: Self) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }

    #[inline]
    fn as_i128(self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(v as i128),
            Self::Uint(v) => Some(v as i128),
            Self::Real(_) => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Uint(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
        }
    }
}

/// A component type that a data array can store or be read as.
pub trait Numeric: Pod + Default + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Storage kind of an array holding this type.
    const STORAGE: Storage;

    /// Convert from the widest native read.
    fn from_scalar(v: Scalar) -> Self;

    /// Widen to a scalar.
    fn to_scalar(self) -> Scalar;

    /// Borrow the destination slice if `dest` holds this exact type.
    fn fill_slice<'a>(dest: &'a mut FillDest<'_>) -> Option<&'a mut [Self]>;

    /// Wrap a slice of this type as a fill destination.
    fn fill_dest(slice: &mut [Self]) -> FillDest<'_>;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_scalar().as_f64()
    }
}

/// Type-tagged destination buffer for bulk extraction.
///
/// Data arrays fill these without knowing the caller's component type at
/// compile time; implementations that store the same type can copy slices
/// directly.
#[derive(Debug)]
pub enum FillDest<'a> {
    Uint8(&'a mut [u8]),
    Int8(&'a mut [i8]),
    Uint16(&'a mut [u16]),
    Int16(&'a mut [i16]),
    Uint32(&'a mut [u32]),
    Int32(&'a mut [i32]),
    Uint64(&'a mut [u64]),
    Int64(&'a mut [i64]),
    Real16(&'a mut [f16]),
    Real32(&'a mut [f32]),
    Real64(&'a mut [f64]),
}

impl FillDest<'_> {
    /// Number of components the destination holds.
    pub fn len(&self) -> usize {
        match self {
            Self::Uint8(s) => s.len(),
            Self::Int8(s) => s.len(),
            Self::Uint16(s) => s.len(),
            Self::Int16(s) => s.len(),
            Self::Uint32(s) => s.len(),
            Self::Int32(s) => s.len(),
            Self::Uint64(s) => s.len(),
            Self::Int64(s) => s.len(),
            Self::Real16(s) => s.len(),
            Self::Real32(s) => s.len(),
            Self::Real64(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> Storage {
        match self {
            Self::Uint8(_) => Storage::Uint8,
            Self::Int8(_) => Storage::Int8,
            Self::Uint16(_) => Storage::Uint16,
            Self::Int16(_) => Storage::Int16,
            Self::Uint32(_) => Storage::Uint32,
            Self::Int32(_) => Storage::Int32,
            Self::Uint64(_) => Storage::Uint64,
            Self::Int64(_) => Storage::Int64,
            Self::Real16(_) => Storage::Real16,
            Self::Real32(_) => Storage::Real32,
            Self::Real64(_) => Storage::Real64,
        }
    }

    /// Reborrow the components from `start` onwards.
    pub fn tail(&mut self, start: usize) -> FillDest<'_> {
        match self {
            Self::Uint8(s) => FillDest::Uint8(&mut s[start..]),
            Self::Int8(s) => FillDest::Int8(&mut s[start..]),
            Self::Uint16(s) => FillDest::Uint16(&mut s[start..]),
            Self::Int16(s) => FillDest::Int16(&mut s[start..]),
            Self::Uint32(s) => FillDest::Uint32(&mut s[start..]),
            Self::Int32(s) => FillDest::Int32(&mut s[start..]),
            Self::Uint64(s) => FillDest::Uint64(&mut s[start..]),
            Self::Int64(s) => FillDest::Int64(&mut s[start..]),
            Self::Real16(s) => FillDest::Real16(&mut s[start..]),
            Self::Real32(s) => FillDest::Real32(&mut s[start..]),
            Self::Real64(s) => FillDest::Real64(&mut s[start..]),
        }
    }

    /// Store one component, converting to the destination type.
    #[inline]
    pub fn set(&mut self, index: usize, v: Scalar) {
        match self {
            Self::Uint8(s) => s[index] = u8::from_scalar(v),
            Self::Int8(s) => s[index] = i8::from_scalar(v),
            Self::Uint16(s) => s[index] = u16::from_scalar(v),
            Self::Int16(s) => s[index] = i16::from_scalar(v),
            Self::Uint32(s) => s[index] = u32::from_scalar(v),
            Self::Int32(s) => s[index] = i32::from_scalar(v),
            Self::Uint64(s) => s[index] = u64::from_scalar(v),
            Self::Int64(s) => s[index] = i64::from_scalar(v),
            Self::Real16(s) => s[index] = f16::from_scalar(v),
            Self::Real32(s) => s[index] = f32::from_scalar(v),
            Self::Real64(s) => s[index] = f64::from_scalar(v),
        }
    }
}

macro_rules! impl_numeric_int {
    ($t:ty, $kind:ident, $variant:ident, $wide:ty) => {
        impl Numeric for $t {
            const STORAGE: Storage = Storage::$kind;

            #[inline]
            fn from_scalar(v: Scalar) -> Self {
                match v {
                    Scalar::Int(x) => x as $t,
                    Scalar::Uint(x) => x as $t,
                    Scalar::Real(x) => (x as i64) as $t,
                }
            }

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self as $wide)
            }

            #[inline]
            fn fill_slice<'a>(dest: &'a mut FillDest<'_>) -> Option<&'a mut [Self]> {
                match dest {
                    FillDest::$kind(s) => Some(&mut **s),
                    _ => None,
                }
            }

            #[inline]
            fn fill_dest(slice: &mut [Self]) -> FillDest<'_> {
                FillDest::$kind(slice)
            }
        }
    };
}

macro_rules! impl_numeric_real {
    ($t:ty, $kind:ident) => {
        impl Numeric for $t {
            const STORAGE: Storage = Storage::$kind;

            #[inline]
            fn from_scalar(v: Scalar) -> Self {
                v.as_f64() as $t
            }

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::Real(self as f64)
            }

            #[inline]
            fn fill_slice<'a>(dest: &'a mut FillDest<'_>) -> Option<&'a mut [Self]> {
                match dest {
                    FillDest::$kind(s) => Some(&mut **s),
                    _ => None,
                }
            }

            #[inline]
            fn fill_dest(slice: &mut [Self]) -> FillDest<'_> {
                FillDest::$kind(slice)
            }
        }
    };
}

impl_numeric_int!(u8, Uint8, Uint, u64);
impl_numeric_int!(i8, Int8, Int, i64);
impl_numeric_int!(u16, Uint16, Uint, u64);
impl_numeric_int!(i16, Int16, Int, i64);
impl_numeric_int!(u32, Uint32, Uint, u64);
impl_numeric_int!(i32, Int32, Int, i64);
impl_numeric_int!(u64, Uint64, Uint, u64);
impl_numeric_int!(i64, Int64, Int, i64);
impl_numeric_real!(f32, Real32);
impl_numeric_real!(f64, Real64);

impl Numeric for f16 {
    const STORAGE: Storage = Storage::Real16;

    #[inline]
    fn from_scalar(v: Scalar) -> Self {
        f16::from_f64(v.as_f64())
    }

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Real(self.to_f64())
    }

    #[inline]
    fn fill_slice<'a>(dest: &'a mut FillDest<'_>) -> Option<&'a mut [Self]> {
        match dest {
            FillDest::Real16(s) => Some(&mut **s),
            _ => None,
        }
    }

    #[inline]
    fn fill_dest(slice: &mut [Self]) -> FillDest<'_> {
        FillDest::Real16(slice)
    }
}
