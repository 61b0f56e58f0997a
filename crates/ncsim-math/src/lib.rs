#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod tables;
pub mod matrix;
pub mod scalar;

pub use matrix::GfMatrix;

use core::str::FromStr;
use ncsim_core::{NcError, NcResult};
use serde::{Deserialize, Serialize};
use tables::{TABLES_GF16, TABLES_GF256};
use zeroize::Zeroize;

/// A single field element. Wide enough for the largest supported field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct GfElement(pub u16);

impl zeroize::DefaultIsZeroes for GfElement {}

impl GfElement {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[inline(always)]
    pub fn is_zero(self) -> bool { self.0 == 0 }
}

/// The finite field coded symbols are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Binary,
    Binary4,
    Binary8,
    Binary16,
}

impl Field {
    /// Width of one element in bits.
    pub fn bits(self) -> u32 {
        match self {
            Field::Binary => 1,
            Field::Binary4 => 4,
            Field::Binary8 => 8,
            Field::Binary16 => 16,
        }
    }

    /// Number of elements in the field (`field_max`).
    pub fn order(self) -> u32 { 1 << self.bits() }

    pub fn name(self) -> &'static str {
        match self {
            Field::Binary => "binary",
            Field::Binary4 => "binary4",
            Field::Binary8 => "binary8",
            Field::Binary16 => "binary16",
        }
    }

    #[inline]
    pub fn contains(self, e: GfElement) -> bool { (e.0 as u32) < self.order() }

    #[inline(always)]
    pub fn add(self, a: GfElement, b: GfElement) -> GfElement { GfElement(a.0 ^ b.0) }

    #[inline]
    pub fn mul(self, a: GfElement, b: GfElement) -> GfElement {
        match self {
            Field::Binary => GfElement(a.0 & b.0 & 1),
            Field::Binary4 => GfElement(TABLES_GF16.mul(a.0 as u8, b.0 as u8) as u16),
            Field::Binary8 => GfElement(TABLES_GF256.mul(a.0 as u8, b.0 as u8) as u16),
            Field::Binary16 => GfElement(scalar::mul_gf65536(a.0, b.0)),
        }
    }

    /// Multiplicative inverse. Zero maps to zero.
    pub fn inv(self, a: GfElement) -> GfElement {
        if a.is_zero() { return GfElement::ZERO; }
        match self {
            Field::Binary => GfElement::ONE,
            Field::Binary4 => GfElement(TABLES_GF16.inv(a.0 as u8) as u16),
            Field::Binary8 => GfElement(TABLES_GF256.inv(a.0 as u8) as u16),
            // a^(q-2) = a^-1
            Field::Binary16 => self.pow(a, self.order() - 2),
        }
    }

    pub fn pow(self, a: GfElement, mut exp: u32) -> GfElement {
        let mut base = a;
        let mut acc = GfElement::ONE;
        while exp > 0 {
            if exp & 1 == 1 { acc = self.mul(acc, base); }
            base = self.mul(base, base);
            exp >>= 1;
        }
        acc
    }

    pub fn validate_symbol_size(self, symbol_size: usize) -> NcResult<()> {
        if symbol_size == 0 {
            return Err(NcError::InvalidConfig("symbol size must be positive"));
        }
        if self == Field::Binary16 && symbol_size % 2 != 0 {
            return Err(NcError::InvalidConfig("binary16 needs an even symbol size"));
        }
        Ok(())
    }
}

impl FromStr for Field {
    type Err = NcError;

    fn from_str(s: &str) -> NcResult<Self> {
        match s {
            "binary" => Ok(Field::Binary),
            "binary4" => Ok(Field::Binary4),
            "binary8" => Ok(Field::Binary8),
            "binary16" => Ok(Field::Binary16),
            _ => Err(NcError::UnknownField),
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// --- ROW DISPATCHER ---

/// dest += factor * src over packed symbols.
#[inline]
pub fn row_add_scaled(field: Field, dest: &mut [u8], src: &[u8], factor: GfElement) {
    if factor.is_zero() || dest.is_empty() { return; }

    if factor == GfElement::ONE {
        scalar::row_add(dest, src);
        return;
    }

    match field {
        // Only 0 and 1 exist in GF(2)
        Field::Binary => {}
        Field::Binary4 => scalar::row_add_scaled_gf16(dest, src, factor),
        Field::Binary8 => scalar::row_add_scaled_gf256(dest, src, factor),
        Field::Binary16 => scalar::row_add_scaled_gf65536(dest, src, factor),
    }
}

/// buf *= factor over a packed symbol.
pub fn row_scale(field: Field, buf: &mut [u8], factor: GfElement) {
    if factor == GfElement::ONE { return; }
    if factor.is_zero() {
        buf.zeroize();
        return;
    }

    match field {
        Field::Binary => {}
        Field::Binary4 => scalar::row_scale_gf16(buf, factor),
        Field::Binary8 => scalar::row_scale_gf256(buf, factor),
        Field::Binary16 => scalar::row_scale_gf65536(buf, factor),
    }
}

/// dest += factor * src over unpacked coefficient vectors.
pub fn vec_add_scaled(field: Field, dest: &mut [GfElement], src: &[GfElement], factor: GfElement) {
    if factor.is_zero() { return; }
    for (d, s) in dest.iter_mut().zip(src) {
        *d = field.add(*d, field.mul(factor, *s));
    }
}

pub fn vec_scale(field: Field, buf: &mut [GfElement], factor: GfElement) {
    for x in buf.iter_mut() { *x = field.mul(*x, factor); }
}
