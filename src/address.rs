// Factoria: deterministic instance address derivation and factory deployment
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2026 by Factoria developers
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use amplify::hex::{self, FromHex, ToHex};
use amplify::{ByteArray, Bytes20, Bytes32, FromSliceError};
use sha3::{Digest, Keccak256};

use crate::LIB_NAME_FACTORIA;

/// Computes Keccak-256 digest of the provided data.
pub fn keccak256(data: impl AsRef<[u8]>) -> Bytes32 {
    let digest: [u8; 32] = Keccak256::digest(data.as_ref()).into();
    Bytes32::from_byte_array(digest)
}

/// Address naming an account (a factory or a deployed child instance) within the global namespace
/// of the environment.
///
/// Addresses are always derived, never chosen by a caller. Displayed with EIP-55 mixed-case
/// checksum.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_FACTORIA)]
pub struct Address(
    #[from]
    #[from([u8; 20])]
    Bytes20,
);

#[cfg(feature = "serde")]
impl_serde_wrapper!(Address, 20);

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self { addr.to_byte_array() }
}

impl Address {
    /// Constructs address from a slice, which must be exactly 20 bytes long.
    pub fn copy_from_slice(slice: impl AsRef<[u8]>) -> Result<Self, FromSliceError> {
        Bytes20::copy_from_slice(slice).map(Self)
    }

    /// Returns the raw 20 bytes of the address.
    pub fn to_byte_array(&self) -> [u8; 20] { self.0.to_byte_array() }

    /// Constructs address from the trailing 20 bytes of a 32-byte digest.
    pub fn from_digest(digest: Bytes32) -> Self {
        let digest = digest.to_byte_array();
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        Self::from(addr)
    }

    /// Returns `0x`-prefixed EIP-55 checksummed representation of the address.
    pub fn to_checksum(&self) -> String {
        let lower = self.to_hex();
        let hash = keccak256(lower.as_bytes()).to_byte_array();
        let mut s = String::with_capacity(2 + lower.len());
        s.push_str("0x");
        for (pos, c) in lower.chars().enumerate() {
            let nibble = if pos % 2 == 0 { hash[pos / 2] >> 4 } else { hash[pos / 2] & 0x0F };
            if nibble >= 8 {
                s.push(c.to_ascii_uppercase());
            } else {
                s.push(c);
            }
        }
        s
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.to_checksum()) }
}

impl FromStr for Address {
    type Err = ParseAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = strip_hex_prefix(s);
        let addr = Bytes20::from_hex(&hex.to_ascii_lowercase()).map(Self)?;
        let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase())
            && hex.chars().any(|c| c.is_ascii_uppercase());
        if mixed_case && addr.to_checksum()[2..] != *hex {
            return Err(ParseAddrError::InvalidChecksum(s.to_owned()));
        }
        Ok(addr)
    }
}

/// Errors parsing [`Address`] from a string.
#[derive(Clone, Eq, PartialEq, Debug, Display, From, Error)]
#[display(doc_comments)]
pub enum ParseAddrError {
    /// malformed hex representation of an address. Details: {0}
    #[from]
    InvalidHex(hex::Error),

    /// address '{0}' uses mixed case which doesn't match its EIP-55 checksum.
    InvalidChecksum(String),
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

macro_rules! impl_hex_id {
    ($ty:ty) => {
        impl $ty {
            /// Returns the raw 32 bytes.
            pub fn to_byte_array(&self) -> [u8; 32] { self.0.to_byte_array() }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { write!(f, "0x{}", self.to_hex()) }
        }

        impl FromStr for $ty {
            type Err = hex::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Bytes32::from_hex(strip_hex_prefix(s)).map(Self)
            }
        }

        #[cfg(feature = "serde")]
        impl_serde_wrapper!($ty, 32);
    };
}

/// Caller-supplied 32-byte value mixed into the salted address derivation.
///
/// The salt is opaque; nothing prevents its reuse, but reusing it with the same code from the same
/// factory always derives the same (already occupied) address.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_FACTORIA)]
pub struct Salt(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl_hex_id!(Salt);

impl Salt {
    /// Produces salt as a Keccak-256 hash of an arbitrary preimage (like `keccak("mySalt")`).
    pub fn from_preimage(preimage: impl AsRef<[u8]>) -> Self { Self(keccak256(preimage)) }
}

/// Fingerprint of a child init code (creation code followed by the encoded constructor
/// arguments).
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_FACTORIA)]
pub struct CodeHash(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl_hex_id!(CodeHash);

impl CodeHash {
    /// Computes the fingerprint of the given init code.
    pub fn digest(code: impl AsRef<[u8]>) -> Self { Self(keccak256(code)) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keccak_empty() {
        assert_eq!(
            keccak256(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn checksum_display() {
        for s in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr = Address::from_str(&s.to_lowercase()).unwrap();
            assert_eq!(addr.to_string(), s);
            assert_eq!(Address::from_str(s).unwrap(), addr);
        }
    }

    #[test]
    fn parse_forms() {
        let addr = Address::from_str("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(Address::from_str("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(), addr);
        assert_eq!(Address::from_str("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap(), addr);
    }

    #[test]
    fn parse_bad_checksum() {
        assert_eq!(
            Address::from_str("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Err(ParseAddrError::InvalidChecksum(s!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD")))
        );
    }

    #[test]
    fn parse_bad_length() {
        assert!(matches!(
            Address::from_str("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea"),
            Err(ParseAddrError::InvalidHex(_))
        ));
        assert!(Address::from_str("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }

    #[test]
    fn from_digest_takes_tail() {
        let mut digest = [0xAAu8; 32];
        digest[12..].copy_from_slice(&[0x11; 20]);
        let addr = Address::from_digest(Bytes32::from_byte_array(digest));
        assert_eq!(addr.to_byte_array(), [0x11; 20]);
    }

    #[test]
    fn salt_display_roundtrip() {
        let salt = Salt::from_preimage(b"mySalt");
        let s = salt.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
        assert_eq!(Salt::from_str(&s).unwrap(), salt);
        assert_eq!(Salt::from_str(&s[2..]).unwrap(), salt);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn address_serde() {
        let val = Address::from([0u8; 20]);
        test_serde_wrapper!(val, "0x0000000000000000000000000000000000000000", &[0u8; 20]);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn salt_serde() {
        let val = Salt::from([0x01u8; 32]);
        test_serde_wrapper!(
            val,
            "0x0101010101010101010101010101010101010101010101010101010101010101",
            &[0x01u8; 32]
        );
    }

    #[test]
    #[cfg(feature = "serde")]
    fn code_hash_serde() {
        let val = CodeHash::from([0xABu8; 32]);
        test_serde_wrapper!(
            val,
            "0xabababababababababababababababababababababababababababababababab",
            &[0xABu8; 32]
        );
    }
}
