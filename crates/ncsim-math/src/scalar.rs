use crate::tables::{TABLES_GF16, TABLES_GF256, POLY_GF65536};
use crate::GfElement;

/// Carry-less multiply of two `bits`-wide elements reduced by `poly`.
/// `poly` carries the x^bits term. Usable in const context for table generation.
pub const fn mul_bitwise(a: u32, b: u32, bits: u32, poly: u32) -> u32 {
    let mut p = 0u32;
    let mut a = a;
    let mut b = b;
    let high = 1u32 << (bits - 1);
    let mut i = 0;
    while i < bits {
        if (b & 1) != 0 { p ^= a; }
        let carry = (a & high) != 0;
        a <<= 1;
        if carry { a ^= poly; }
        b >>= 1;
        i += 1;
    }
    p
}

#[inline]
pub fn mul_gf65536(a: u16, b: u16) -> u16 {
    mul_bitwise(a as u32, b as u32, 16, POLY_GF65536) as u16
}

/// Nibble product tables for a fixed GF(2^4) factor.
fn gf16_table(factor: u8) -> [u8; 16] {
    let mut tbl = [0u8; 16];
    for j in 0..16u8 {
        tbl[j as usize] = TABLES_GF16.mul(j, factor);
    }
    tbl
}

/// Split low/high nibble product tables for a fixed GF(2^8) factor.
/// s * f = lo[s & 0xF] ^ hi[s >> 4] by linearity.
fn gf256_tables(factor: u8) -> ([u8; 16], [u8; 16]) {
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    for j in 0..16u8 {
        lo[j as usize] = TABLES_GF256.mul(j, factor);
        hi[j as usize] = TABLES_GF256.mul(j << 4, factor);
    }
    (lo, hi)
}

/// dest ^= src (the multiply-by-one case, valid for every field).
#[inline]
pub fn row_add(dest: &mut [u8], src: &[u8]) {
    for (d, s) in dest.iter_mut().zip(src) { *d ^= *s; }
}

pub fn row_add_scaled_gf16(dest: &mut [u8], src: &[u8], factor: GfElement) {
    let tbl = gf16_table(factor.0 as u8);
    for (d, s) in dest.iter_mut().zip(src) {
        *d ^= tbl[(*s & 0x0F) as usize] | (tbl[(*s >> 4) as usize] << 4);
    }
}

pub fn row_add_scaled_gf256(dest: &mut [u8], src: &[u8], factor: GfElement) {
    let (lo, hi) = gf256_tables(factor.0 as u8);
    for (d, s) in dest.iter_mut().zip(src) {
        *d ^= lo[(*s & 0x0F) as usize] ^ hi[(*s >> 4) as usize];
    }
}

pub fn row_add_scaled_gf65536(dest: &mut [u8], src: &[u8], factor: GfElement) {
    for (d, s) in dest.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let word = u16::from_le_bytes([s[0], s[1]]);
        let prod = mul_gf65536(word, factor.0).to_le_bytes();
        d[0] ^= prod[0];
        d[1] ^= prod[1];
    }
}

pub fn row_scale_gf16(buf: &mut [u8], factor: GfElement) {
    let tbl = gf16_table(factor.0 as u8);
    for b in buf.iter_mut() {
        *b = tbl[(*b & 0x0F) as usize] | (tbl[(*b >> 4) as usize] << 4);
    }
}

pub fn row_scale_gf256(buf: &mut [u8], factor: GfElement) {
    let (lo, hi) = gf256_tables(factor.0 as u8);
    for b in buf.iter_mut() {
        *b = lo[(*b & 0x0F) as usize] ^ hi[(*b >> 4) as usize];
    }
}

pub fn row_scale_gf65536(buf: &mut [u8], factor: GfElement) {
    for chunk in buf.chunks_exact_mut(2) {
        let word = u16::from_le_bytes([chunk[0], chunk[1]]);
        chunk.copy_from_slice(&mul_gf65536(word, factor.0).to_le_bytes());
    }
}
