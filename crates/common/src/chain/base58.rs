//! Base58Check version prefixes.
//!
//! Every encoded address or key starts with a network specific version
//! prefix. The prefixes of one network must be prefix-free, otherwise a
//! decoder could not tell which kind of payload it is looking at.

use bitcoin::base58;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to Base58Check prefixes and payloads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    /// The string is not valid Base58Check (bad character, checksum or length).
    #[error("Base58 decoding failed: {0}")]
    Decode(#[from] base58::Error),
    /// A kind has no version prefix.
    #[error("Empty version prefix for {0}")]
    EmptyPrefix(Base58Type),
    /// One prefix starts with another, so decoding would be ambiguous.
    #[error("Version prefix of {first} overlaps the prefix of {second}")]
    AmbiguousPrefix {
        /// The kind whose prefix is the shorter (or equal) one
        first: Base58Type,
        /// The kind whose prefix starts with `first`'s
        second: Base58Type,
    },
    /// The decoded data does not start with any known prefix.
    #[error("No known version prefix matches payload starting with {0:#04x}")]
    UnknownPrefix(u8),
    /// The decoded data is empty.
    #[error("Empty payload")]
    EmptyPayload,
}

/// Kinds of Base58Check encoded data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base58Type {
    /// Pay-to-pubkey-hash address.
    PubkeyAddress,
    /// Legacy pay-to-script-hash address.
    ScriptAddress,
    /// Current pay-to-script-hash address.
    ScriptAddressV2,
    /// WIF encoded secret key.
    SecretKey,
    /// BIP32 extended public key.
    ExtPublicKey,
    /// BIP32 extended secret key.
    ExtSecretKey,
}

impl Base58Type {
    /// Every kind, in the order decoders try them.
    pub const ALL: [Base58Type; 6] = [
        Base58Type::PubkeyAddress,
        Base58Type::ScriptAddress,
        Base58Type::ScriptAddressV2,
        Base58Type::SecretKey,
        Base58Type::ExtPublicKey,
        Base58Type::ExtSecretKey,
    ];

    /// Returns the snake case name used in logs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Base58Type::PubkeyAddress => "pubkey_address",
            Base58Type::ScriptAddress => "script_address",
            Base58Type::ScriptAddressV2 => "script_address_v2",
            Base58Type::SecretKey => "secret_key",
            Base58Type::ExtPublicKey => "ext_public_key",
            Base58Type::ExtSecretKey => "ext_secret_key",
        }
    }
}

impl std::fmt::Display for Base58Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The version prefix table of one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base58Prefixes {
    pubkey_address: Vec<u8>,
    script_address: Vec<u8>,
    script_address_v2: Vec<u8>,
    secret_key: Vec<u8>,
    ext_public_key: Vec<u8>,
    ext_secret_key: Vec<u8>,
}

impl Base58Prefixes {
    /// Creates a prefix table. Single byte versions are used for addresses
    /// and secret keys, four byte versions for extended keys.
    ///
    /// # Arguments
    ///
    /// * `pubkey_address` - Version byte of pay-to-pubkey-hash addresses
    /// * `script_address` - Version byte of legacy pay-to-script-hash addresses
    /// * `script_address_v2` - Version byte of current pay-to-script-hash
    ///   addresses
    /// * `secret_key` - Version byte of WIF secret keys
    /// * `ext_public_key` - Version of BIP32 extended public keys
    /// * `ext_secret_key` - Version of BIP32 extended secret keys
    pub fn new(
        pubkey_address: u8,
        script_address: u8,
        script_address_v2: u8,
        secret_key: u8,
        ext_public_key: [u8; 4],
        ext_secret_key: [u8; 4],
    ) -> Self {
        Self {
            pubkey_address: vec![pubkey_address],
            script_address: vec![script_address],
            script_address_v2: vec![script_address_v2],
            secret_key: vec![secret_key],
            ext_public_key: ext_public_key.to_vec(),
            ext_secret_key: ext_secret_key.to_vec(),
        }
    }

    /// Returns the version prefix of `kind`.
    pub fn get(&self, kind: Base58Type) -> &[u8] {
        match kind {
            Base58Type::PubkeyAddress => &self.pubkey_address,
            Base58Type::ScriptAddress => &self.script_address,
            Base58Type::ScriptAddressV2 => &self.script_address_v2,
            Base58Type::SecretKey => &self.secret_key,
            Base58Type::ExtPublicKey => &self.ext_public_key,
            Base58Type::ExtSecretKey => &self.ext_secret_key,
        }
    }

    /// Iterates over every kind and its prefix.
    pub fn iter(&self) -> impl Iterator<Item = (Base58Type, &[u8])> {
        Base58Type::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
    }

    /// Checks that no prefix is empty and that no prefix starts with another,
    /// so every payload decodes to at most one kind.
    pub fn validate(&self) -> Result<(), Base58Error> {
        for (first, prefix) in self.iter() {
            if prefix.is_empty() {
                return Err(Base58Error::EmptyPrefix(first));
            }
            for (second, other) in self.iter() {
                if first != second && other.starts_with(prefix) {
                    return Err(Base58Error::AmbiguousPrefix { first, second });
                }
            }
        }
        Ok(())
    }

    /// Finds the kind whose prefix starts `data`.
    ///
    /// # Returns
    ///
    /// The kind and the payload following its prefix, or `None` if no
    /// prefix matches
    pub fn classify<'a>(&self, data: &'a [u8]) -> Option<(Base58Type, &'a [u8])> {
        self.iter().find_map(|(kind, prefix)| {
            data.strip_prefix(prefix).map(|payload| (kind, payload))
        })
    }

    /// Encodes `payload` with the version prefix of `kind` as Base58Check.
    pub fn encode_check(&self, kind: Base58Type, payload: &[u8]) -> String {
        let mut data = self.get(kind).to_vec();
        data.extend_from_slice(payload);
        base58::encode_check(&data)
    }

    /// Decodes a Base58Check string and identifies its kind from the version
    /// prefix.
    pub fn decode_check(&self, encoded: &str) -> Result<(Base58Type, Vec<u8>), Base58Error> {
        let data = base58::decode_check(encoded)?;
        let first = *data.first().ok_or(Base58Error::EmptyPayload)?;
        let (kind, payload) = self
            .classify(&data)
            .ok_or(Base58Error::UnknownPrefix(first))?;
        Ok((kind, payload.to_vec()))
    }
}
