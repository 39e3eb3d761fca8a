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

use amplify::num::u256;
use strict_encoding::{StrictDeserialize, StrictSerialize};

use crate::{Address, CodeHash, LIB_NAME_FACTORIA};

/// Creation code of the built-in stored-value child.
pub const STORED_VALUE_CODE: &[u8] = b"factoria:stored-value#2026-10-14";

/// Template defining the shape of every deployed child instance.
///
/// The creation code is treated as an opaque blob: it matters only as the part of the init code
/// fingerprint committed into salted addresses.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct ChildTemplate {
    creation_code: Vec<u8>,
}

impl Default for ChildTemplate {
    fn default() -> Self { Self::stored_value() }
}

impl ChildTemplate {
    /// Constructs template from an opaque creation code.
    pub fn new(creation_code: impl Into<Vec<u8>>) -> Self {
        Self { creation_code: creation_code.into() }
    }

    /// Template of the child storing a single immutable value.
    pub fn stored_value() -> Self { Self::new(STORED_VALUE_CODE) }

    /// Creation code shared by all children of the template.
    pub fn creation_code(&self) -> &[u8] { &self.creation_code }

    /// Builds init code: the creation code followed by the ABI-encoded constructor argument.
    pub fn init_code(&self, value: u256) -> InitCode {
        InitCode { creation_code: self.creation_code.clone(), value }
    }

    /// Constructs an instance at an already derived address. The value is stored verbatim.
    pub fn construct(
        &self,
        address: Address,
        factory: Address,
        init_code: &InitCode,
    ) -> ChildInstance {
        ChildInstance {
            address,
            factory,
            code_hash: init_code.code_hash(),
            value: init_code.value,
        }
    }
}

/// Init code of a child instance parameterized with its constructor argument.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct InitCode {
    creation_code: Vec<u8>,
    value: u256,
}

impl InitCode {
    /// Constructor argument carried by the init code.
    pub fn value(&self) -> u256 { self.value }

    /// Size of the init code in bytes.
    pub fn size(&self) -> usize { self.creation_code.len() + 32 }

    /// Serializes init code: the creation code followed by the 32-byte big-endian value.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut code = Vec::with_capacity(self.size());
        code.extend_from_slice(&self.creation_code);
        code.extend_from_slice(&self.value.to_be_bytes());
        code
    }

    /// Keccak-256 fingerprint of [`Self::to_bytes`].
    pub fn code_hash(&self) -> CodeHash { CodeHash::digest(self.to_bytes()) }
}

/// Deployed child instance.
///
/// Instances are owned by the environment world state; factories only refer to them by address.
/// There is no way to modify the stored value after construction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_FACTORIA)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct ChildInstance {
    address: Address,
    factory: Address,
    code_hash: CodeHash,
    value: u256,
}

impl StrictSerialize for ChildInstance {}
impl StrictDeserialize for ChildInstance {}

impl ChildInstance {
    /// Address the instance is deployed at.
    pub fn address(&self) -> Address { self.address }

    /// Factory which has deployed the instance.
    pub fn factory(&self) -> Address { self.factory }

    /// Fingerprint of the init code the instance was constructed from.
    pub fn code_hash(&self) -> CodeHash { self.code_hash }

    /// Value stored at construction.
    #[inline]
    pub fn get_value(&self) -> u256 { self.value }
}
