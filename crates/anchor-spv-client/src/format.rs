//! Terminal rendering of a validated SPV proof.
//!
//! Decodes the proven transaction and its confirming header with the
//! `bitcoin` crate and draws them as a box similar to block explorers.

use anchor_spv_proof::codec::internal_to_display;
use anchor_spv_proof::SpvProof;
use anyhow::Context;
use bitcoin::absolute::LockTime;
use bitcoin::block::Header as BlockHeader;
use bitcoin::{consensus, Address, Network, Transaction, TxIn, TxOut};
use chrono::DateTime;

const CARD_WIDTH: usize = 96;

/// Box-drawing buffer with a fixed inner width
struct Card {
    out: String,
}

impl Card {
    fn new(title: &str) -> Self {
        let fill = CARD_WIDTH.saturating_sub(title.chars().count() + 1);
        Self {
            out: format!("\n┌─ {} {}┐\n", title, "─".repeat(fill)),
        }
    }

    fn line(&mut self, content: &str) {
        let visible = strip_ansi_codes(content).chars().count();
        let padding = CARD_WIDTH.saturating_sub(visible);
        self.out
            .push_str(&format!("│ {}{} │\n", content, " ".repeat(padding)));
    }

    fn heading(&mut self, title: &str) {
        self.line(&format!("\x1b[33m{title}\x1b[0m"));
    }

    fn divider(&mut self) {
        self.out
            .push_str(&format!("├{}┤\n", "─".repeat(CARD_WIDTH + 2)));
    }

    fn finish(mut self) -> String {
        self.out
            .push_str(&format!("└{}┘\n", "─".repeat(CARD_WIDTH + 2)));
        self.out
    }
}

/// Format a proof and the transaction it carries for terminal display
pub fn format_proof(proof: &SpvProof, network: Network) -> Result<String, anyhow::Error> {
    let tx: Transaction = consensus::deserialize(&proof.sections().to_bytes())
        .context("Proof carries an undecodable transaction")?;
    let header: BlockHeader = consensus::deserialize(&proof.confirming_header.raw)
        .context("Proof carries an undecodable block header")?;

    let mut card = Card::new("Bitcoin Transaction");
    card.line(&format!("\x1b[33mTXID:\x1b[0m {}", tx.compute_txid()));
    card.divider();

    card.heading("INPUTS:");
    for input in &tx.input {
        format_input(&mut card, input);
    }
    card.divider();

    card.heading("OUTPUTS:");
    for output in &tx.output {
        format_output(&mut card, output, network);
    }
    card.divider();

    card.heading("INCLUSION:");
    card.line(&format!("Block hash: {}", header.block_hash()));
    card.line(&format!("Block height: {}", proof.confirming_height));
    card.line(&format!(
        "Block timestamp: {}",
        format_unix_timestamp(header.time)
    ));
    card.line(&format!("Merkle root: {}", header.merkle_root));
    card.line(&format!("Position in block: {}", proof.index));
    card.line(&format!(
        "Merkle branch: {} hashes",
        proof.intermediate_nodes.len() / 32
    ));
    card.line(&format!("Wire tx_id: {}", hex::encode(proof.tx_id)));
    card.line(&format!("Display tx_id: {}", internal_to_display(&proof.tx_id)));
    if tx.lock_time != LockTime::ZERO {
        card.line(&format!("Locktime: {}", format_locktime(tx.lock_time)));
    }

    Ok(card.finish())
}

fn format_input(card: &mut Card, input: &TxIn) {
    if input.previous_output.is_null() {
        card.line("  Coinbase");
    } else {
        card.line(&format!("  {}", input.previous_output.txid));
        card.line(&format!("  vout = {}", input.previous_output.vout));
    }
}

fn format_output(card: &mut Card, output: &TxOut, network: Network) {
    card.line(&format!(
        "  {:<70} {:.8} BTC",
        output_label(output, network),
        output.value.to_btc()
    ));
    let script_asm = output.script_pubkey.to_asm_string();
    for opcode in script_asm.split_whitespace() {
        card.line(&format!("\x1b[90m    {opcode}\x1b[0m"));
    }
}

/// Address for standard scripts, otherwise the script type
fn output_label(output: &TxOut, network: Network) -> String {
    if let Ok(address) = Address::from_script(&output.script_pubkey, network) {
        return address.to_string();
    }
    let script = &output.script_pubkey;
    let label = if script.is_p2pk() {
        "P2PK"
    } else if script.is_op_return() {
        "OP_RETURN"
    } else {
        "Unknown"
    };
    label.to_string()
}

fn format_locktime(lock_time: LockTime) -> String {
    match lock_time {
        LockTime::Blocks(height) => format!("block {height}"),
        LockTime::Seconds(time) => {
            format!("timestamp {}", format_unix_timestamp(time.to_consensus_u32()))
        }
    }
}

/// Remove ANSI color codes from a string for width calculation
fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn format_unix_timestamp(timestamp: u32) -> String {
    match DateTime::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => timestamp.to_string(),
    }
}
