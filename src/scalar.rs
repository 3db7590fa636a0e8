use std::fmt::{self, Debug};
use std::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    F32,
    F64,
    ComplexF32,
    ComplexF64,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::F32 => "float",
            ValueType::F64 => "double",
            ValueType::ComplexF32 => "float_complex",
            ValueType::ComplexF64 => "double_complex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    I32,
    I64,
}

impl IndexType {
    pub fn name(self) -> &'static str {
        match self {
            IndexType::I32 => "i32",
            IndexType::I64 => "i64",
        }
    }
}

/// Value type a sparse routine can be instantiated with.
///
/// `Pod` is required so buffers can be sized and uploaded as raw bytes.
pub trait Scalar:
    Pod + Debug + PartialEq + Send + Sync + Add<Output = Self> + Mul<Output = Self>
{
    const VALUE_TYPE: ValueType;

    fn zero() -> Self;
    fn one() -> Self;
    /// Uniform sample with every component in `[-1, 1)`.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self;
    /// Largest componentwise absolute difference.
    fn distance(self, other: Self) -> f64;
    /// Largest componentwise magnitude.
    fn magnitude(self) -> f64;
    /// Relative tolerance used when comparing against the host reference.
    fn tolerance() -> f64;
}

impl Scalar for f32 {
    const VALUE_TYPE: ValueType = ValueType::F32;

    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen_range(-1.0..1.0)
    }
    fn distance(self, other: Self) -> f64 {
        (self as f64 - other as f64).abs()
    }
    fn magnitude(self) -> f64 {
        (self as f64).abs()
    }
    fn tolerance() -> f64 {
        1e-4
    }
}

impl Scalar for f64 {
    const VALUE_TYPE: ValueType = ValueType::F64;

    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen_range(-1.0..1.0)
    }
    fn distance(self, other: Self) -> f64 {
        (self - other).abs()
    }
    fn magnitude(self) -> f64 {
        self.abs()
    }
    fn tolerance() -> f64 {
        1e-10
    }
}

macro_rules! complex_type {
    ($name:ident, $real:ty, $tag:expr, $tol:expr) => {
        #[repr(C)]
        #[derive(Clone, Copy, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            pub re: $real,
            pub im: $real,
        }

        impl $name {
            pub const fn new(re: $real, im: $real) -> Self {
                Self { re, im }
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}{:+}i)", self.re, self.im)
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self::new(self.re + rhs.re, self.im + rhs.im)
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self::new(
                    self.re * rhs.re - self.im * rhs.im,
                    self.re * rhs.im + self.im * rhs.re,
                )
            }
        }

        impl Scalar for $name {
            const VALUE_TYPE: ValueType = $tag;

            fn zero() -> Self {
                Self::new(0.0, 0.0)
            }
            fn one() -> Self {
                Self::new(1.0, 0.0)
            }
            fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            }
            fn distance(self, other: Self) -> f64 {
                let re = (self.re as f64 - other.re as f64).abs();
                let im = (self.im as f64 - other.im as f64).abs();
                re.max(im)
            }
            fn magnitude(self) -> f64 {
                (self.re as f64).abs().max((self.im as f64).abs())
            }
            fn tolerance() -> f64 {
                $tol
            }
        }
    };
}

complex_type!(Complex32, f32, ValueType::ComplexF32, 1e-4);
complex_type!(Complex64, f64, ValueType::ComplexF64, 1e-10);

/// Integer type used for CSR row offsets, column indices and sparse vector indices.
pub trait SparseIndex: Pod + Debug + Eq + Ord + Send + Sync {
    const INDEX_TYPE: IndexType;

    fn from_usize(v: usize) -> Option<Self>;
    fn to_i64(self) -> i64;
}

impl SparseIndex for i32 {
    const INDEX_TYPE: IndexType = IndexType::I32;

    fn from_usize(v: usize) -> Option<Self> {
        i32::try_from(v).ok()
    }
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl SparseIndex for i64 {
    const INDEX_TYPE: IndexType = IndexType::I64;

    fn from_usize(v: usize) -> Option<Self> {
        i64::try_from(v).ok()
    }
    fn to_i64(self) -> i64 {
        self
    }
}
