//! Decode a raw block header into the `confirming_header` shape of a proof.

use anchor_spv_proof::{ConfirmingHeader, RawHeader};
use clap::Args;

/// CLI arguments for the `header` subcommand
#[derive(Clone, Debug, Args)]
pub struct HeaderArgs {
    /// Raw 80-byte header as hex
    #[arg(long)]
    raw: String,
    /// Block height to record, if known
    #[arg(long, default_value = "0")]
    height: u32,
}

/// Run the `header` subcommand: print the decoded header as JSON
pub async fn run(args: HeaderArgs) -> Result<(), anyhow::Error> {
    let header = decode_header(&args.raw, args.height)?;
    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}

/// Parse a raw header and derive its hash, previous hash and Merkle root
pub fn decode_header(raw: &str, height: u32) -> Result<ConfirmingHeader, anyhow::Error> {
    let header = RawHeader::from_hex(raw.trim())?;
    Ok(ConfirmingHeader {
        raw: header.as_bytes().to_vec(),
        hash: header.hash(),
        height,
        prevhash: header.prev_hash(),
        merkle_root: header.merkle_root(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_11_HEADER: &str = "010000000508085c47cc849eb80ea905cc7800a3be674ffc57263cf210c59d8d00000000112ba175a1e04b14ba9e7ea5f76ab640affeef5ec98173ac9799a852fa39add320cd6649ffff001d1e2de565";

    #[test]
    fn test_decode_block_11_header() {
        let header = decode_header(BLOCK_11_HEADER, 11).unwrap();
        let value = serde_json::to_value(&header).unwrap();

        assert_eq!(value["raw"], BLOCK_11_HEADER);
        assert_eq!(value["height"], 11);
        assert_eq!(
            value["hash"],
            "e915d9a478e3adf3186c07c61a22228b10fd87df343c92782ecc052c00000000"
        );
        assert_eq!(
            value["prevhash"],
            "0508085c47cc849eb80ea905cc7800a3be674ffc57263cf210c59d8d00000000"
        );
        assert_eq!(
            value["merkle_root"],
            "112ba175a1e04b14ba9e7ea5f76ab640affeef5ec98173ac9799a852fa39add3"
        );
    }

    #[test]
    fn test_decode_rejects_short_header() {
        assert!(decode_header(&BLOCK_11_HEADER[..158], 11).is_err());
        assert!(decode_header("not hex", 11).is_err());
    }
}
