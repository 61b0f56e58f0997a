#![forbid(unsafe_code)]

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use ncsim_core::{NcError, NcResult};
use ncsim_math::{row_add_scaled, row_scale, vec_add_scaled, vec_scale, Field, GfElement, GfMatrix};
use zeroize::Zeroize;

use crate::encoder::{check_coefficients, unit_vector};

/// Incremental RLNC decoder.
///
/// Rows are kept in reduced row echelon form and stored in the slot of their
/// leading column, so slot `i` holds source symbol `i` byte-exact as soon as
/// symbol `i` is isolated.
pub struct RlncDecoder {
    field: Field,
    k: usize,
    symbol_size: usize,

    // Matrix [K x K] stores the coefficient rows
    matrix: GfMatrix,
    // [K x S] combined symbols, one slot per leading column
    data: Vec<u8>,

    present: Vec<bool>,
    decoded: Vec<bool>,
    rank: usize,
}

impl RlncDecoder {
    pub fn new(field: Field, k: usize, symbol_size: usize) -> Self {
        Self {
            field,
            k,
            symbol_size,
            matrix: GfMatrix::new(k, k),
            data: alloc::vec![0u8; k * symbol_size],
            present: alloc::vec![false; k],
            decoded: alloc::vec![false; k],
            rank: 0,
        }
    }

    /// Back to rank 0 for a new generation. Storage is zeroed in place.
    pub fn reset(&mut self) {
        self.matrix.clear();
        self.data.as_mut_slice().zeroize();
        self.present.iter_mut().for_each(|p| *p = false);
        self.decoded.iter_mut().for_each(|d| *d = false);
        self.rank = 0;
    }

    /// Feed the decoder its own uncoded symbol.
    pub fn consume_systematic(&mut self, index: usize, payload: &[u8]) -> NcResult<bool> {
        if index >= self.k {
            return Err(NcError::SymbolOutOfRange { index, symbols: self.k });
        }
        self.consume(&unit_vector(self.k, index), payload)
    }

    /// One elimination step. Returns true if the row was innovative.
    /// Malformed input is rejected before anything is mutated.
    pub fn consume(&mut self, coefficients: &[GfElement], payload: &[u8]) -> NcResult<bool> {
        check_coefficients(self.field, coefficients, self.k)?;
        if payload.len() != self.symbol_size {
            return Err(NcError::MalformedPayload { expected: self.symbol_size, actual: payload.len() });
        }

        let field = self.field;
        let mut row = coefficients.to_vec();
        let mut sym = payload.to_vec();

        // Forward: clear every column that already has a pivot row
        for col in 0..self.k {
            if !self.present[col] { continue; }
            let factor = row[col];
            if factor.is_zero() { continue; }
            vec_add_scaled(field, &mut row, self.matrix.row(col), factor);
            row_add_scaled(field, &mut sym, self.slot(col), factor);
        }

        let pivot = match row.iter().position(|c| !c.is_zero()) {
            Some(p) => p,
            None => return Ok(false), // Linear Dependence
        };

        let inv = field.inv(row[pivot]);
        vec_scale(field, &mut row, inv);
        row_scale(field, &mut sym, inv);

        // Backward: clear the new pivot column from the stored rows
        for r in 0..self.k {
            if !self.present[r] { continue; }
            let factor = self.matrix.row(r)[pivot];
            if factor.is_zero() { continue; }
            vec_add_scaled(field, self.matrix.row_mut(r), &row, factor);
            row_add_scaled(field, self.slot_mut(r), &sym, factor);
        }

        self.matrix.row_mut(pivot).copy_from_slice(&row);
        self.slot_mut(pivot).copy_from_slice(&sym);
        self.present[pivot] = true;
        self.rank += 1;
        self.refresh_decoded();
        Ok(true)
    }

    fn refresh_decoded(&mut self) {
        for r in 0..self.k {
            self.decoded[r] = self.present[r] && self.matrix.is_unit_row(r);
        }
    }

    fn slot(&self, r: usize) -> &[u8] {
        &self.data[r * self.symbol_size..(r + 1) * self.symbol_size]
    }

    fn slot_mut(&mut self, r: usize) -> &mut [u8] {
        &mut self.data[r * self.symbol_size..(r + 1) * self.symbol_size]
    }

    pub fn rank(&self) -> usize { self.rank }
    pub fn symbols(&self) -> usize { self.k }
    pub fn symbol_size(&self) -> usize { self.symbol_size }
    pub fn field(&self) -> Field { self.field }

    pub fn is_complete(&self) -> bool {
        self.rank == self.k
    }

    /// Source symbol `index` is isolated (fully decoded).
    pub fn is_pivot(&self, index: usize) -> bool {
        self.decoded.get(index).copied().unwrap_or(false)
    }

    pub fn pivots(&self) -> impl Iterator<Item = usize> + '_ {
        self.decoded.iter().enumerate().filter(|(_, d)| **d).map(|(i, _)| i)
    }

    pub fn decoded_count(&self) -> usize {
        self.decoded.iter().filter(|d| **d).count()
    }

    /// Rows holding more than one unknown.
    pub fn partially_decoded(&self) -> usize {
        self.rank - self.decoded_count()
    }

    /// Symbol `index` appears in no stored combination.
    pub fn is_missing(&self, index: usize) -> bool {
        index < self.k && (0..self.k).all(|r| !self.present[r] || self.matrix.row(r)[index].is_zero())
    }

    pub fn missing(&self) -> BTreeSet<usize> {
        (0..self.k).filter(|&i| self.is_missing(i)).collect()
    }

    /// Raw storage slot `index`, decoded or not.
    pub fn symbol(&self, index: usize) -> Option<&[u8]> {
        if index >= self.k { return None; }
        Some(self.slot(index))
    }

    pub fn decoded_symbol(&self, index: usize) -> Option<&[u8]> {
        if !self.is_pivot(index) { return None; }
        Some(self.slot(index))
    }

    /// Stored coefficient row whose leading column is `index`.
    pub fn coefficients(&self, index: usize) -> Option<&[GfElement]> {
        if index >= self.k || !self.present[index] { return None; }
        Some(self.matrix.row(index))
    }

    /// Whole symbol storage, `symbols() * symbol_size()` bytes.
    pub fn storage(&self) -> &[u8] {
        &self.data
    }
}
