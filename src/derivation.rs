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

//! Address derivation rules.
//!
//! Both deployment strategies are expressed by a single pure function, [`derive`], which depends
//! only on its arguments. Factories and external callers use it in the same way, so an address
//! computed off-line always matches the one assigned during deployment for the same inputs.

use crate::{keccak256, Address, CodeHash, Salt};

/// Prefix byte of the salted derivation preimage, which can't start a valid RLP list of the
/// sequential derivation.
pub const SALTED_PREFIX: u8 = 0xFF;

/// Deployment strategy, determining what the derived address depends on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(doc_comments)]
pub enum Strategy {
    /// sequential derivation with nonce {nonce}
    Sequential {
        /// Deployment counter of the factory.
        nonce: u64,
    },

    /// salted derivation with salt {salt} over init code {code_hash}
    Salted {
        /// Caller-supplied salt.
        salt: Salt,
        /// Fingerprint of the child init code.
        code_hash: CodeHash,
    },
}

/// Derives address of an instance deployed by `factory` using a given `strategy`.
pub fn derive(strategy: Strategy, factory: Address) -> Address {
    let addr = match strategy {
        Strategy::Sequential { nonce } => create_address(factory, nonce),
        Strategy::Salted { salt, code_hash } => create2_address(factory, salt, code_hash),
    };
    log::debug!("derived {addr} from {factory} using {strategy}");
    addr
}

/// `keccak256(rlp([factory, nonce]))[12..]`
pub fn create_address(factory: Address, nonce: u64) -> Address {
    Address::from_digest(keccak256(rlp_address_nonce(factory, nonce)))
}

/// `keccak256(0xff ++ factory ++ salt ++ code_hash)[12..]`
pub fn create2_address(factory: Address, salt: Salt, code_hash: CodeHash) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(SALTED_PREFIX);
    preimage.extend_from_slice(&factory.to_byte_array());
    preimage.extend_from_slice(&salt.to_byte_array());
    preimage.extend_from_slice(&code_hash.to_byte_array());
    Address::from_digest(keccak256(preimage))
}

// The list payload never exceeds 55 bytes (21 for the address, at most 9 for the nonce), so the
// short list form is always used.
fn rlp_address_nonce(addr: Address, nonce: u64) -> Vec<u8> {
    let be = nonce.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    let nonce = &be[skip..];

    let mut payload = Vec::with_capacity(30);
    payload.push(0x80 + 20);
    payload.extend_from_slice(&addr.to_byte_array());
    match nonce {
        [] => payload.push(0x80),
        [byte] if *byte < 0x80 => payload.push(*byte),
        bytes => {
            payload.push(0x80 + bytes.len() as u8);
            payload.extend_from_slice(bytes);
        }
    }

    let mut rlp = Vec::with_capacity(1 + payload.len());
    rlp.push(0xC0 + payload.len() as u8);
    rlp.extend(payload);
    rlp
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use amplify::hex::FromHex;

    use super::*;

    fn addr(s: &str) -> Address { Address::from_str(s).unwrap() }

    fn salt(s: &str) -> Salt { Salt::from_str(s).unwrap() }

    #[test]
    fn rlp_encoding() {
        let a = addr("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");
        let rlp = rlp_address_nonce(a, 0);
        assert_eq!(rlp.len(), 23);
        assert_eq!(&rlp[..2], &[0xD6, 0x94]);
        assert_eq!(rlp[22], 0x80);

        assert_eq!(rlp_address_nonce(a, 0x7F)[22], 0x7F);
        assert_eq!(&rlp_address_nonce(a, 0x80)[22..], &[0x81, 0x80]);
        let rlp = rlp_address_nonce(a, 0x0102);
        assert_eq!(rlp[0], 0xC0 + 24);
        assert_eq!(&rlp[22..], &[0x82, 0x01, 0x02]);
        let rlp = rlp_address_nonce(a, u64::MAX);
        assert_eq!(rlp[0], 0xC0 + 30);
        assert_eq!(rlp[22], 0x88);
    }

    #[test]
    fn create_vectors() {
        let sender = addr("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");
        for (nonce, expected) in [
            (0, "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"),
            (1, "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8"),
            (2, "0xf778b86fa74e846c4f0a1fbd1335fe81c00a0c91"),
            (3, "0xfffd933a0bc612844eaf0c6fe3e5b8e9b6c1d19c"),
        ] {
            assert_eq!(create_address(sender, nonce), addr(expected));
        }
    }

    #[test]
    fn create_hardhat_deployer() {
        let deployer = addr("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(
            create_address(deployer, 0).to_string(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
        assert_eq!(
            create_address(deployer, 1).to_string(),
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
        );
    }

    #[test]
    fn create2_vectors() {
        let zero = addr("0x0000000000000000000000000000000000000000");
        let deadbeef = addr("0xdeadbeef00000000000000000000000000000000");
        let zero_salt = salt("0x0000000000000000000000000000000000000000000000000000000000000000");
        let feed_salt = salt("0x000000000000000000000000feed000000000000000000000000000000000000");
        let code = |hex: &str| CodeHash::digest(Vec::<u8>::from_hex(hex).unwrap());

        for (factory, salt, code_hash, expected) in [
            (zero, zero_salt, code("00"), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38"),
            (deadbeef, zero_salt, code("00"), "0xB928f69Bb1D91Cd65274e3c79d8986362984fDA3"),
            (deadbeef, feed_salt, code("00"), "0xD04116cDd17beBE565EB2422F2497E06cC1C9833"),
            (zero, zero_salt, code("deadbeef"), "0x70f2b2914A2a4b783FaEFb75f459A580616Fcb5e"),
            (zero, zero_salt, code(""), "0xE33C0C7F7df4809055C3ebA6c09CFe4BaF1BD9e0"),
        ] {
            assert_eq!(create2_address(factory, salt, code_hash).to_string(), expected);
        }
    }

    #[test]
    fn derive_dispatch() {
        let factory = addr("0x5FbDB2315678afecb367f032d93F642f64180aa3");
        let code_hash = CodeHash::digest(b"code");
        let salt = Salt::from_preimage(b"mySalt");

        assert_eq!(derive(Strategy::Sequential { nonce: 7 }, factory), create_address(factory, 7));
        assert_ne!(
            derive(Strategy::Sequential { nonce: 7 }, factory),
            derive(Strategy::Sequential { nonce: 8 }, factory)
        );
        assert_eq!(
            derive(Strategy::Salted { salt, code_hash }, factory),
            create2_address(factory, salt, code_hash)
        );
        assert_ne!(
            derive(Strategy::Salted { salt, code_hash }, factory),
            derive(Strategy::Salted { salt, code_hash: CodeHash::digest(b"other") }, factory)
        );
        let other_factory = create_address(factory, 0);
        assert_ne!(
            derive(Strategy::Salted { salt, code_hash }, factory),
            derive(Strategy::Salted { salt, code_hash }, other_factory)
        );
    }
}
