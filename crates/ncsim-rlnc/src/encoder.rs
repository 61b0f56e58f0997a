#![forbid(unsafe_code)]

use alloc::vec::Vec;
use ncsim_core::{NcError, NcResult};
use ncsim_math::{row_add_scaled, Field, GfElement};

/// Coefficient vector selecting source symbol `index` alone.
pub fn unit_vector(symbols: usize, index: usize) -> Vec<GfElement> {
    let mut v = alloc::vec![GfElement::ZERO; symbols];
    if index < symbols { v[index] = GfElement::ONE; }
    v
}

pub(crate) fn check_coefficients(field: Field, coefficients: &[GfElement], symbols: usize) -> NcResult<()> {
    if coefficients.len() != symbols {
        return Err(NcError::MalformedCoefficients { expected: symbols, actual: coefficients.len() });
    }
    if let Some(index) = coefficients.iter().position(|&c| !field.contains(c)) {
        return Err(NcError::CoefficientOutOfField { index, value: coefficients[index].0 as u32 });
    }
    Ok(())
}

/// Linear combination sum(c_i * symbol_i) over `field`.
/// `source` holds the symbols back to back, `symbol_size` bytes each.
pub fn encode(field: Field, coefficients: &[GfElement], source: &[u8], symbol_size: usize) -> NcResult<Vec<u8>> {
    if symbol_size == 0 || source.len() % symbol_size != 0 {
        return Err(NcError::MalformedPayload { expected: symbol_size, actual: source.len() });
    }
    check_coefficients(field, coefficients, source.len() / symbol_size)?;

    let mut out = alloc::vec![0u8; symbol_size];
    for (coeff, symbol) in coefficients.iter().zip(source.chunks_exact(symbol_size)) {
        row_add_scaled(field, &mut out, symbol, *coeff);
    }
    Ok(out)
}

/// The generation-wide master encoder. Read-only once built.
pub struct RlncEncoder {
    field: Field,
    symbols: usize,
    symbol_size: usize,
    data: Vec<u8>,
}

impl RlncEncoder {
    pub fn new(field: Field, symbols: usize, symbol_size: usize, data: Vec<u8>) -> NcResult<Self> {
        if symbols == 0 { return Err(NcError::InvalidConfig("generation size must be positive")); }
        field.validate_symbol_size(symbol_size)?;
        if data.len() != symbols * symbol_size {
            return Err(NcError::MalformedPayload { expected: symbols * symbol_size, actual: data.len() });
        }
        Ok(Self { field, symbols, symbol_size, data })
    }

    pub fn encode(&self, coefficients: &[GfElement]) -> NcResult<Vec<u8>> {
        encode(self.field, coefficients, &self.data, self.symbol_size)
    }

    /// Source symbol `index`, uncoded.
    pub fn symbol(&self, index: usize) -> NcResult<&[u8]> {
        if index >= self.symbols {
            return Err(NcError::SymbolOutOfRange { index, symbols: self.symbols });
        }
        let start = index * self.symbol_size;
        Ok(&self.data[start..start + self.symbol_size])
    }

    pub fn data(&self) -> &[u8] { &self.data }
    pub fn field(&self) -> Field { self.field }
    pub fn symbols(&self) -> usize { self.symbols }
    pub fn symbol_size(&self) -> usize { self.symbol_size }
}
