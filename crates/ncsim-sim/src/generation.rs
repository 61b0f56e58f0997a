use ncsim_core::{NcResult, NodeId};
use ncsim_math::Field;
use ncsim_rlnc::RlncEncoder;
use rand::Rng;

const MESSAGE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source message of `node`: "IAM07X" then random uppercase/digit filler,
/// cut to `symbol_size`.
pub fn node_message<R: Rng + ?Sized>(node: NodeId, symbol_size: usize, rng: &mut R) -> Vec<u8> {
    let mut msg = format!("IAM{:02}X", node).into_bytes();
    while msg.len() < symbol_size {
        msg.push(MESSAGE_ALPHABET[rng.gen_range(0..MESSAGE_ALPHABET.len())]);
    }
    msg.truncate(symbol_size);
    msg
}

/// One generation's source symbols, owned by the master encoder.
pub struct Generation {
    index: u32,
    encoder: RlncEncoder,
}

impl Generation {
    pub fn random<R: Rng + ?Sized>(index: u32, field: Field, nodes: usize, symbol_size: usize, rng: &mut R) -> NcResult<Self> {
        let mut data = Vec::with_capacity(nodes * symbol_size);
        for node in 0..nodes {
            data.extend_from_slice(&node_message(node, symbol_size, rng));
        }
        Self::from_data(index, field, nodes, symbol_size, data)
    }

    pub fn from_data(index: u32, field: Field, nodes: usize, symbol_size: usize, data: Vec<u8>) -> NcResult<Self> {
        let encoder = RlncEncoder::new(field, nodes, symbol_size, data)?;
        Ok(Self { index, encoder })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn encoder(&self) -> &RlncEncoder {
        &self.encoder
    }

    /// Source symbol of `node`.
    pub fn message(&self, node: NodeId) -> NcResult<&[u8]> {
        self.encoder.symbol(node)
    }

    pub fn symbols(&self) -> usize {
        self.encoder.symbols()
    }
}
