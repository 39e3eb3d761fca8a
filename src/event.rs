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

use amplify::Bytes32;
use strict_encoding::{StrictDeserialize, StrictSerialize};

use crate::{keccak256, Address, LIB_NAME_FACTORIA};

/// ABI signature of the event emitted by factories on each successful deployment.
pub const DEPLOYMENT_EVENT_SIGNATURE: &str = "NewContractAddress(address)";

/// Record appended to the call log.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct Log {
    /// Account which has emitted the log.
    pub emitter: Address,
    /// The first topic is the hash of the event signature.
    pub topics: Vec<Bytes32>,
    /// ABI-encoded non-indexed event arguments.
    pub data: Vec<u8>,
}

/// Event carrying the address of a newly deployed child instance.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display("NewContractAddress({new_contract})")]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_FACTORIA)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct DeploymentEvent {
    /// Address of the deployed child instance.
    pub new_contract: Address,
}

impl StrictSerialize for DeploymentEvent {}
impl StrictDeserialize for DeploymentEvent {}

impl DeploymentEvent {
    /// Constructs event for a child deployed at `new_contract`.
    pub fn new(new_contract: Address) -> Self { Self { new_contract } }

    /// Topic identifying the event: Keccak-256 hash of [`DEPLOYMENT_EVENT_SIGNATURE`].
    pub fn topic() -> Bytes32 { keccak256(DEPLOYMENT_EVENT_SIGNATURE) }

    /// Encodes the event as a log record emitted by `emitter`.
    pub fn to_log(&self, emitter: Address) -> Log {
        let mut data = Vec::with_capacity(32);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&self.new_contract.to_byte_array());
        Log { emitter, topics: vec![Self::topic()], data }
    }

    /// Parses an event from a log record, checking its topic and the ABI encoding of the data.
    pub fn parse_log(log: &Log) -> Result<Self, ParseLogError> {
        let topic = log.topics.first().ok_or(ParseLogError::NoTopics)?;
        if *topic != Self::topic() {
            return Err(ParseLogError::UnknownTopic(*topic));
        }
        if log.data.len() != 32 {
            return Err(ParseLogError::InvalidDataLen(log.data.len()));
        }
        if log.data[..12].iter().any(|b| *b != 0) {
            return Err(ParseLogError::DirtyPadding);
        }
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&log.data[12..]);
        Ok(Self::new(Address::from(addr)))
    }
}

/// Errors parsing deployment events from logs.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ParseLogError {
    /// log has no topics and can't be a deployment event.
    NoTopics,

    /// log topic doesn't match the deployment event signature.
    UnknownTopic(Bytes32),

    /// deployment event data must be 32 bytes long, while {0} bytes found.
    InvalidDataLen(usize),

    /// deployment event data has non-zero address padding.
    DirtyPadding,

    /// call receipt contains no deployment event.
    NoEvent,
}

/// Result of a successful call: an ordered append-only log of what the call has emitted.
///
/// Failed calls produce no receipt.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct Receipt {
    /// Sequence number of the call within the environment.
    pub tx_no: u64,
    /// Called account.
    pub to: Address,
    /// Logs emitted during the call, in emission order.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Iterates over deployment events emitted by the called account.
    pub fn deployment_events(&self) -> impl Iterator<Item = DeploymentEvent> + '_ {
        self.logs
            .iter()
            .filter(|log| log.emitter == self.to)
            .filter_map(|log| DeploymentEvent::parse_log(log).ok())
    }

    /// Address of the instance reported by the first deployment event of the called account.
    pub fn deployed_address(&self) -> Result<Address, ParseLogError> {
        self.deployment_events()
            .next()
            .map(|event| event.new_contract)
            .ok_or(ParseLogError::NoEvent)
    }
}

#[cfg(test)]
mod test {
    use amplify::confinement::U16;

    use super::*;

    fn emitter() -> Address { Address::from([0xEEu8; 20]) }

    #[test]
    fn log_layout() {
        let event = DeploymentEvent::new(Address::from([0x11u8; 20]));
        let log = event.to_log(emitter());
        assert_eq!(log.emitter, emitter());
        assert_eq!(log.topics, vec![keccak256(b"NewContractAddress(address)")]);
        assert_eq!(&log.data[..12], &[0u8; 12]);
        assert_eq!(&log.data[12..], &[0x11u8; 20]);
        assert_eq!(DeploymentEvent::parse_log(&log), Ok(event));
    }

    #[test]
    fn parse_failures() {
        let good = DeploymentEvent::new(Address::from([0x11u8; 20])).to_log(emitter());

        let mut log = good.clone();
        log.topics.clear();
        assert_eq!(DeploymentEvent::parse_log(&log), Err(ParseLogError::NoTopics));

        let mut log = good.clone();
        log.topics[0] = keccak256(b"Transfer(address,address,uint256)");
        assert!(matches!(DeploymentEvent::parse_log(&log), Err(ParseLogError::UnknownTopic(_))));

        let mut log = good.clone();
        log.data.truncate(20);
        assert_eq!(DeploymentEvent::parse_log(&log), Err(ParseLogError::InvalidDataLen(20)));

        let mut log = good;
        log.data[0] = 1;
        assert_eq!(DeploymentEvent::parse_log(&log), Err(ParseLogError::DirtyPadding));
    }

    #[test]
    fn receipt_events() {
        let a = Address::from([0x11u8; 20]);
        let b = Address::from([0x22u8; 20]);
        let receipt = Receipt {
            tx_no: 0,
            to: emitter(),
            logs: vec![
                DeploymentEvent::new(a).to_log(emitter()),
                DeploymentEvent::new(b).to_log(Address::from([0xFFu8; 20])),
            ],
        };
        assert_eq!(receipt.deployed_address(), Ok(a));
        assert_eq!(receipt.deployment_events().collect::<Vec<_>>(), vec![DeploymentEvent::new(a)]);

        let empty = Receipt { tx_no: 1, to: emitter(), logs: vec![] };
        assert_eq!(empty.deployed_address(), Err(ParseLogError::NoEvent));
        assert_eq!(empty.deployment_events().count(), 0);
    }

    #[test]
    fn deployed_address_skips_foreign_logs() {
        let a = Address::from([0x11u8; 20]);
        let b = Address::from([0x22u8; 20]);
        let unrelated =
            Log { emitter: emitter(), topics: vec![keccak256(b"Ping()")], data: vec![] };
        let receipt = Receipt {
            tx_no: 2,
            to: emitter(),
            logs: vec![
                DeploymentEvent::new(b).to_log(Address::from([0xFFu8; 20])),
                unrelated,
                DeploymentEvent::new(a).to_log(emitter()),
            ],
        };
        assert_eq!(receipt.deployed_address(), Ok(a));

        let foreign = Receipt {
            tx_no: 3,
            to: emitter(),
            logs: vec![DeploymentEvent::new(b).to_log(Address::from([0xFFu8; 20]))],
        };
        assert_eq!(foreign.deployed_address(), Err(ParseLogError::NoEvent));
    }

    #[test]
    fn event_strict_encoding() {
        let event = DeploymentEvent::new(Address::from([0x11u8; 20]));
        let data = event.to_strict_serialized::<U16>().unwrap();
        assert_eq!(data.as_slice(), &[0x11u8; 20]);
        assert_eq!(DeploymentEvent::from_strict_serialized::<U16>(data).unwrap(), event);
    }
}
