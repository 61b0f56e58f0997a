#![no_std]
extern crate alloc;

mod packet;
mod encoder;
mod decoder;
mod strategy;

pub use packet::CodedPacket;
pub use encoder::{encode, unit_vector, RlncEncoder};
pub use decoder::RlncDecoder;
pub use strategy::{CoefficientDraw, CoefficientStrategy, DEFAULT_INCLUDE_PROBABILITY};
