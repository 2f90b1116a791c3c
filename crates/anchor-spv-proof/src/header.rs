//! Read-only view over a raw 80-byte Bitcoin block header.

use crate::codec::{decode_hex, hash256, Hash256};
use crate::error::{Result, SpvError};

pub const HEADER_SIZE: usize = 80;

/// Raw block header bytes with field accessors.
///
/// Hash fields are returned in internal byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader([u8; HEADER_SIZE]);

impl RawHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; HEADER_SIZE] = bytes
            .try_into()
            .map_err(|_| SpvError::InvalidHeaderLength(bytes.len()))?;
        Ok(Self(raw))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(s)?)
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.0
    }

    /// Header hash (double SHA-256 of the raw bytes)
    pub fn hash(&self) -> Hash256 {
        hash256(&self.0)
    }

    pub fn version(&self) -> i32 {
        i32::from_le_bytes(self.field::<4>(0))
    }

    pub fn prev_hash(&self) -> Hash256 {
        self.field::<32>(4)
    }

    pub fn merkle_root(&self) -> Hash256 {
        self.field::<32>(36)
    }

    pub fn time(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(68))
    }

    pub fn bits(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(72))
    }

    pub fn nonce(&self) -> u32 {
        u32::from_le_bytes(self.field::<4>(76))
    }

    fn field<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.0[offset..offset + N]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::internal_to_display;

    const BLOCK_11_HEADER: &str = "010000000508085c47cc849eb80ea905cc7800a3be674ffc57263cf210c59d8d00000000112ba175a1e04b14ba9e7ea5f76ab640affeef5ec98173ac9799a852fa39add320cd6649ffff001d1e2de565";

    #[test]
    fn test_header_fields() {
        let header = RawHeader::from_hex(BLOCK_11_HEADER).unwrap();
        assert_eq!(header.version(), 1);
        assert_eq!(header.bits(), 0x1d00ffff);
        assert_eq!(
            internal_to_display(&header.hash()),
            "000000002c05cc2e78923c34df87fd108b22221ac6076c18f3ade378a4d915e9"
        );
        assert_eq!(
            internal_to_display(&header.prev_hash()),
            "000000008d9dc510f23c2657fc4f67bea30078cc05a90eb89e84cc475c080805"
        );
        assert_eq!(
            internal_to_display(&header.merkle_root()),
            "d3ad39fa52a89997ac7381c95eeffeaf40b66af7a57e9eba144be0a175a12b11"
        );
    }

    #[test]
    fn test_header_length() {
        assert_eq!(
            RawHeader::from_bytes(&[0u8; 79]),
            Err(SpvError::InvalidHeaderLength(79))
        );
        assert!(matches!(
            RawHeader::from_hex("0g"),
            Err(SpvError::MalformedHex(_))
        ));
    }
}
