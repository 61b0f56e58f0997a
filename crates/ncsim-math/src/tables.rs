use crate::scalar::mul_bitwise;

/// x^4 + x + 1
pub const POLY_GF16: u32 = 0x13;
/// The Rijndael Polynomial: x^8 + x^4 + x^3 + x + 1 (0x11B)
pub const POLY_GF256: u32 = 0x11B;
/// x^16 + x^12 + x^3 + x + 1
pub const POLY_GF65536: u32 = 0x1100B;

/// Log/exp tables for the small fields (up to 2^8 elements).
pub struct LogTables {
    pub exp: [u8; 512], // Doubled to avoid modulo in inner loops
    pub log: [u8; 256],
    /// Order of the multiplicative group (q - 1).
    pub cycle: usize,
}

impl LogTables {
    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 { return 0; }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    #[inline]
    pub fn inv(&self, a: u8) -> u8 {
        if a == 0 { return 0; }
        self.exp[self.cycle - self.log[a as usize] as usize]
    }
}

/// Generates tables at compile time by walking the powers of `generator`.
/// `generator` must be primitive for `poly`, otherwise the log table has holes.
const fn gen_tables(bits: u32, poly: u32, generator: u32) -> LogTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let cycle = (1usize << bits) - 1;
    let mut x = 1u32;
    let mut i = 0;

    while i < cycle {
        exp[i] = x as u8;
        exp[i + cycle] = x as u8;
        log[x as usize] = i as u8;
        x = mul_bitwise(x, generator, bits, poly);
        i += 1;
    }

    LogTables { exp, log, cycle }
}

/// GF(2^4), generator 2.
pub static TABLES_GF16: LogTables = gen_tables(4, POLY_GF16, 0x02);
/// GF(2^8), generator 3.
pub static TABLES_GF256: LogTables = gen_tables(8, POLY_GF256, 0x03);
