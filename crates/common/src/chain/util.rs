use bitcoin::{BlockHash, hashes::Hash};
use hex::FromHex;

/// Parses a block hash written in display order, as block explorers and RPC
/// print it (most significant byte first).
pub fn blockhash_from_display(hex: &str) -> Result<BlockHash, hex::FromHexError> {
    let mut bytes = <[u8; 32]>::from_hex(hex)?;
    bytes.reverse();
    Ok(BlockHash::from_byte_array(bytes))
}
