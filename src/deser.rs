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

// Human-readable formats use the string form of the identifier (`Display`/`FromStr`), binary
// formats use the fixed-size byte array.
macro_rules! impl_serde_wrapper {
    ($ty:ty, $len:literal) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where S: serde::Serializer {
                if serializer.is_human_readable() {
                    serializer.collect_str(self)
                } else {
                    serde::Serialize::serialize(&self.to_byte_array(), serializer)
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where D: serde::Deserializer<'de> {
                use serde::de::Error;
                use serde::Deserialize;
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(D::Error::custom)
                } else {
                    <[u8; $len]>::deserialize(deserializer).map(Self::from)
                }
            }
        }
    };
}

#[cfg(test)]
macro_rules! test_serde_wrapper {
    ($val:expr, $str:literal, $dat:expr) => {
        use serde_test::{assert_tokens, Configure, Token};
        let bin = bincode::serialize(&$val).unwrap();
        assert_eq!(bin, $dat);
        assert_eq!(bincode::deserialize(&bin).ok(), Some($val));
        assert_tokens(&$val.readable(), &[Token::Str($str)]);
    };
}
