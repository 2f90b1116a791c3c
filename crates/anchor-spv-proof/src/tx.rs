//! Splits a serialized Bitcoin transaction into the four sections hashed by its txid.
//!
//! Scripts are never interpreted. Segregated-witness serializations are
//! accepted: the marker, flag and witness stacks are skipped so that
//! `version‖vin‖vout‖locktime` is exactly the txid pre-image.

use serde::{Deserialize, Serialize};

use crate::codec::{hash256, Hash256};
use crate::error::TxParseError;
use crate::serialize::hex_bytes;

/// version (4) + input count (1) + one input (41) + output count (1) + one output (9) + locktime (4)
pub const MIN_TRANSACTION_SIZE: usize = 60;

/// Outpoint (36) + empty script length (1) + sequence (4)
const MIN_INPUT_SIZE: usize = 41;

/// Value (8) + empty script length (1)
const MIN_OUTPUT_SIZE: usize = 9;

/// Raw byte sections of a transaction, preserved exactly as serialized.
///
/// `vin` and `vout` include their var-int count prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSections {
    #[serde(with = "hex_bytes")]
    pub version: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub vin: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub vout: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub locktime: Vec<u8>,
}

impl TxSections {
    /// Concatenation `version‖vin‖vout‖locktime`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            self.version.len() + self.vin.len() + self.vout.len() + self.locktime.len(),
        );
        bytes.extend_from_slice(&self.version);
        bytes.extend_from_slice(&self.vin);
        bytes.extend_from_slice(&self.vout);
        bytes.extend_from_slice(&self.locktime);
        bytes
    }

    /// Transaction id in internal byte order
    pub fn txid(&self) -> Hash256 {
        hash256(&self.to_bytes())
    }
}

/// Decode raw transaction bytes into their four sections
pub fn decode_transaction(raw: &[u8]) -> Result<TxSections, TxParseError> {
    if raw.len() < MIN_TRANSACTION_SIZE {
        return Err(TxParseError::TooShort(raw.len()));
    }

    let mut reader = Reader::new(raw);
    let version = reader.take(4)?.to_vec();

    // A zero input count is never valid, so a zero byte here is the segwit marker
    let segwit = raw[4] == 0x00;
    if segwit {
        let flag = raw[5];
        if flag != 0x01 {
            return Err(TxParseError::InvalidSegwitFlag(flag));
        }
        reader.take(2)?;
    }

    let vin_start = reader.offset;
    let input_count = reader.read_varint()?;
    if input_count == 0 || input_count > (reader.remaining() / MIN_INPUT_SIZE) as u64 {
        return Err(TxParseError::InvalidInputCount(input_count));
    }
    for _ in 0..input_count {
        reader.take(36)?;
        let script_len = reader.read_varint()?;
        reader.take_var(script_len)?;
        reader.take(4)?;
    }
    let vin = raw[vin_start..reader.offset].to_vec();

    let vout_start = reader.offset;
    let output_count = reader.read_varint()?;
    if output_count == 0 || output_count > (reader.remaining() / MIN_OUTPUT_SIZE) as u64 {
        return Err(TxParseError::InvalidOutputCount(output_count));
    }
    for _ in 0..output_count {
        reader.take(8)?;
        let script_len = reader.read_varint()?;
        reader.take_var(script_len)?;
    }
    let vout = raw[vout_start..reader.offset].to_vec();

    if segwit {
        for _ in 0..input_count {
            let items = reader.read_varint()?;
            for _ in 0..items {
                let item_len = reader.read_varint()?;
                reader.take_var(item_len)?;
            }
        }
    }

    let locktime = reader.take(4)?.to_vec();
    if reader.remaining() != 0 {
        return Err(TxParseError::TrailingBytes(reader.remaining()));
    }

    Ok(TxSections {
        version,
        vin,
        vout,
        locktime,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TxParseError> {
        if n > self.remaining() {
            return Err(TxParseError::InsufficientBytes {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn take_var(&mut self, n: u64) -> Result<&'a [u8], TxParseError> {
        let n = usize::try_from(n).map_err(|_| TxParseError::InsufficientBytes {
            offset: self.offset,
            needed: usize::MAX,
        })?;
        self.take(n)
    }

    /// Bitcoin CompactSize integer
    fn read_varint(&mut self) -> Result<u64, TxParseError> {
        let prefix = self.take(1)?[0];
        let value = match prefix {
            0xfd => u16::from_le_bytes([self.take(1)?[0], self.take(1)?[0]]) as u64,
            0xfe => {
                let b = self.take(4)?;
                u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as u64
            }
            0xff => {
                let b = self.take(8)?;
                u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            }
            n => n as u64,
        };
        Ok(value)
    }
}
