use std::ops::{Add, Mul, Sub};

use crate::foundation::error::{NetherError, NetherResult};

/// Immutable 3-component `f64` vector.
///
/// All operations return new values. Scalar division is the only fallible operation and is
/// exposed as [`Vec3::div`] rather than through `std::ops::Div`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// First component.
    pub x: f64,
    /// Second component.
    pub y: f64,
    /// Third component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Build a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector with all three components set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Divide every component by `s`; fails if `s` is exactly zero.
    pub fn div(self, s: f64) -> NetherResult<Self> {
        if s == 0.0 {
            return Err(NetherError::invalid_operation(
                "Vec3::div: divisor must not be zero",
            ));
        }
        Ok(Self::new(self.x / s, self.y / s, self.z / s))
    }

    /// Round each component to the nearest integer, ties to even.
    pub fn round(self) -> Self {
        self.map(f64::round_ties_even)
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Element-wise cosine.
    pub fn cos(self) -> Self {
        self.map(f64::cos)
    }

    /// Element-wise hyperbolic tangent.
    pub fn tanh(self) -> Self {
        self.map(f64::tanh)
    }

    /// Swizzle `(x, y, y)`.
    pub fn xyy(self) -> Self {
        Self::new(self.x, self.y, self.y)
    }

    /// Swizzle `(z, z, x)`.
    pub fn zzx(self) -> Self {
        Self::new(self.z, self.z, self.x)
    }

    /// Swizzle `(y, z, x)`.
    pub fn yzx(self) -> Self {
        Self::new(self.y, self.z, self.x)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul for Vec3 {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Self::new(self.x * o.x, self.y * o.y, self.z * o.z)
    }
}

/// Immutable 4-component `f64` vector, used as the shader's color accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4 {
    /// First component (red).
    pub x: f64,
    /// Second component (green).
    pub y: f64,
    /// Third component (blue).
    pub z: f64,
    /// Fourth component.
    pub w: f64,
}

impl Vec4 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Build a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Divide every component by `s`; fails if `s` is exactly zero.
    pub fn div(self, s: f64) -> NetherResult<Self> {
        if s == 0.0 {
            return Err(NetherError::invalid_operation(
                "Vec4::div: divisor must not be zero",
            ));
        }
        Ok(Self::new(self.x / s, self.y / s, self.z / s, self.w / s))
    }

    /// Round each component to the nearest integer, ties to even.
    pub fn round(self) -> Self {
        self.map(f64::round_ties_even)
    }

    /// Element-wise cosine.
    pub fn cos(self) -> Self {
        self.map(f64::cos)
    }

    /// Element-wise hyperbolic tangent.
    pub fn tanh(self) -> Self {
        self.map(f64::tanh)
    }

    /// The first three components.
    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z), f(self.w))
    }
}

impl Add for Vec4 {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl Sub for Vec4 {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

impl Mul<f64> for Vec4 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Mul for Vec4 {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Self::new(self.x * o.x, self.y * o.y, self.z * o.z, self.w * o.w)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
