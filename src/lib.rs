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

//! **Factoria** deploys isolated state-holding child instances from factories, deriving their
//! addresses deterministically.
//!
//! Two deployment strategies are provided:
//! - [`SequentialFactory`] places each child at an address derived from the factory address and
//!   its deployment counter (EVM `CREATE` rule). The address depends on how many deployments
//!   happened before.
//! - [`SaltedFactory`] places each child at an address derived from the factory address, a
//!   caller-supplied [`Salt`] and the fingerprint of the child init code (EVM `CREATE2` rule).
//!   The address is known before deployment via [`SaltedFactory::predict_address`].
//!
//! Both rules are exposed as a single pure function [`derive`]. Calls are executed by an
//! [`Environment`] atomically; successful calls return a [`Receipt`] carrying the
//! [`DeploymentEvent`] logs.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate strict_encoding;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

#[macro_use]
mod deser;
mod address;
mod derivation;
mod template;
mod event;
mod factory;
mod env;
mod shared;
#[cfg(feature = "stl")]
pub mod stl;

pub use address::{keccak256, Address, CodeHash, ParseAddrError, Salt};
pub use derivation::{create2_address, create_address, derive, Strategy, SALTED_PREFIX};
pub use env::{
    Call, CallError, EnvConfig, Environment, WorldState, DEFAULT_DEPLOYER, MAX_INIT_CODE_SIZE,
};
pub use event::{DeploymentEvent, Log, ParseLogError, Receipt, DEPLOYMENT_EVENT_SIGNATURE};
pub use factory::{
    ConstructionError, DeployError, Factory, FactoryKind, Host, SaltedFactory, SequentialFactory,
};
pub use shared::SharedEnv;
pub use template::{ChildInstance, ChildTemplate, InitCode, STORED_VALUE_CODE};

/// Strict type library name for the types defined in this crate.
pub const LIB_NAME_FACTORIA: &str = "Factoria";
