use crate::GfElement;
use zeroize::Zeroize;

use alloc::vec::Vec;

/// Dense row-major matrix of field elements.
#[derive(Debug, Clone, Zeroize)]
pub struct GfMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<GfElement>,
}

impl GfMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: alloc::vec![GfElement::ZERO; rows * cols],
        }
    }

    pub fn get(&self, r: usize, c: usize) -> Option<GfElement> {
        if r >= self.rows || c >= self.cols { return None; }
        Some(self.data[r * self.cols + c])
    }

    pub fn set(&mut self, r: usize, c: usize, val: GfElement) {
        if r < self.rows && c < self.cols {
            self.data[r * self.cols + c] = val;
        }
    }

    pub fn row(&self, r: usize) -> &[GfElement] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [GfElement] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Row `r` is zero everywhere except its diagonal entry.
    pub fn is_unit_row(&self, r: usize) -> bool {
        self.row(r).iter().enumerate().all(|(c, v)| c == r || v.is_zero())
    }

    /// Zeroes every entry, keeping the shape.
    pub fn clear(&mut self) {
        self.data.as_mut_slice().zeroize();
    }
}
