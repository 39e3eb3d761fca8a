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

use std::collections::{BTreeMap, BTreeSet};

use amplify::num::u256;

use crate::{
    derive, Address, ChildInstance, ChildTemplate, ConstructionError, DeployError, Factory,
    FactoryKind, Host, Log, Receipt, SaltedFactory, Salt, SequentialFactory, Strategy,
};

/// Maximal size of child init code (EIP-3860).
pub const MAX_INIT_CODE_SIZE: usize = 2 * 24576;

/// Default deployer account (the first development account of Hardhat and Anvil).
pub const DEFAULT_DEPLOYER: [u8; 20] = [
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79, 0xcf,
    0xff, 0xb9, 0x22, 0x66,
];

/// Resource limits and initial values used by the environment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct EnvConfig {
    /// Maximal size of init code (creation code with constructor arguments), in bytes.
    pub max_init_code_size: usize,
    /// Maximal number of child instances; `None` means no limit.
    pub max_instances: Option<usize>,
    /// Deployment counter value of newly deployed sequential factories.
    pub initial_factory_nonce: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            max_init_code_size: MAX_INIT_CODE_SIZE,
            max_instances: None,
            initial_factory_nonce: 0,
        }
    }
}

/// Operations which can be called on factories.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Call {
    /// Sequential deployment.
    CreateChild {
        /// Value stored by the child.
        value: u256,
    },
    /// Salted deployment.
    DeployChild {
        /// Value stored by the child.
        value: u256,
        /// Salt mixed into the child address.
        salt: Salt,
    },
}

impl Call {
    /// Name of the factory method the call invokes.
    pub fn name(&self) -> &'static str {
        match self {
            Call::CreateChild { .. } => "createChild",
            Call::DeployChild { .. } => "deployChild",
        }
    }
}

/// Errors of calls and queries on the environment.
#[derive(Clone, Eq, PartialEq, Debug, Display, From, Error)]
#[display(doc_comments)]
pub enum CallError {
    /// no factory is deployed at {0}.
    NoFactory(Address),

    /// no child instance is deployed at {0}.
    NoInstance(Address),

    /// factory {factory} uses {kind} deployment and doesn't support {call}.
    WrongFactoryKind {
        /// Called factory.
        factory: Address,
        /// Deployment strategy of the factory.
        kind: FactoryKind,
        /// Name of the rejected operation.
        call: &'static str,
    },

    /// {0}
    #[from]
    Deploy(DeployError),
}

impl From<ConstructionError> for CallError {
    fn from(err: ConstructionError) -> Self { CallError::Deploy(err.into()) }
}

/// Global state: every occupied address and the child instances.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct WorldState {
    config: EnvConfig,
    instances: BTreeMap<Address, ChildInstance>,
    accounts: BTreeSet<Address>,
}

impl WorldState {
    /// Constructs empty state using the given limits.
    pub fn with(config: EnvConfig) -> Self { WorldState { config, ..default!() } }

    /// Child instance deployed at the address, if any.
    pub fn instance(&self, address: Address) -> Option<&ChildInstance> {
        self.instances.get(&address)
    }

    fn is_occupied(&self, address: Address) -> bool {
        self.accounts.contains(&address) || self.instances.contains_key(&address)
    }
}

/// Host view used for the duration of a single call, collecting its log.
struct Frame<'state> {
    state: &'state mut WorldState,
    logs: Vec<Log>,
}

impl<'state> Frame<'state> {
    fn new(state: &'state mut WorldState) -> Self { Frame { state, logs: vec![] } }
}

impl Host for Frame<'_> {
    fn config(&self) -> &EnvConfig { &self.state.config }

    fn is_occupied(&self, address: Address) -> bool { self.state.is_occupied(address) }

    fn instance_count(&self) -> usize { self.state.instances.len() }

    fn insert(&mut self, instance: ChildInstance) {
        self.state.instances.insert(instance.address(), instance);
    }

    fn emit(&mut self, log: Log) { self.logs.push(log); }
}

/// Hosting environment executing calls as atomic serialized units.
///
/// A call either completes, returning a [`Receipt`] with the emitted logs, or fails leaving no
/// trace: no instance, no log, no consumed counter or transaction number.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Environment {
    deployer: Address,
    deployer_nonce: u64,
    tx_no: u64,
    factories: BTreeMap<Address, Factory>,
    state: WorldState,
}

impl Default for Environment {
    fn default() -> Self { Self::with(EnvConfig::default()) }
}

impl Environment {
    /// Constructs environment with the default deployer and limits.
    pub fn new() -> Self { Self::default() }

    /// Constructs environment with the default deployer and custom limits.
    pub fn with(config: EnvConfig) -> Self {
        Self::with_deployer(Address::from(DEFAULT_DEPLOYER), config)
    }

    /// Constructs environment where factories are deployed by the `deployer` account.
    pub fn with_deployer(deployer: Address, config: EnvConfig) -> Self {
        let mut state = WorldState::with(config);
        state.accounts.insert(deployer);
        Environment { deployer, deployer_nonce: 0, tx_no: 0, factories: none!(), state }
    }

    /// Limits applied to deployments.
    pub fn config(&self) -> &EnvConfig { &self.state.config }

    /// Account deploying factories.
    pub fn deployer(&self) -> Address { self.deployer }

    /// Global state of the environment.
    pub fn state(&self) -> &WorldState { &self.state }

    /// Number of successful calls processed so far.
    pub fn tx_count(&self) -> u64 { self.tx_no }

    /// Number of deployed child instances.
    pub fn instance_count(&self) -> usize { self.state.instances.len() }

    /// Factory deployed at the address, if any.
    pub fn factory(&self, address: Address) -> Option<&Factory> { self.factories.get(&address) }

    /// Child instance deployed at the address, if any.
    pub fn instance(&self, address: Address) -> Option<&ChildInstance> {
        self.state.instance(address)
    }

    /// Deploys a new sequential factory from the deployer account and returns its address.
    pub fn deploy_sequential_factory(
        &mut self,
        template: ChildTemplate,
    ) -> Result<Address, CallError> {
        let nonce = self.state.config.initial_factory_nonce;
        self.deploy_factory(|address| {
            SequentialFactory::with_counter(address, template, nonce).into()
        })
    }

    /// Deploys a new salted factory from the deployer account and returns its address.
    pub fn deploy_salted_factory(&mut self, template: ChildTemplate) -> Result<Address, CallError> {
        self.deploy_factory(|address| SaltedFactory::new(address, template).into())
    }

    // Factories are deployed by the deployer account using the sequential derivation over its
    // nonce.
    fn deploy_factory(
        &mut self,
        construct: impl FnOnce(Address) -> Factory,
    ) -> Result<Address, CallError> {
        let nonce = self.deployer_nonce;
        let next = nonce
            .checked_add(1)
            .ok_or(ConstructionError::NonceOverflow(self.deployer))?;
        let address = derive(Strategy::Sequential { nonce }, self.deployer);
        if self.state.is_occupied(address) {
            return Err(DeployError::AddressCollision(address).into());
        }
        let factory = construct(address);
        log::info!("deployed {} factory at {address}", factory.kind());
        self.deployer_nonce = next;
        self.state.accounts.insert(address);
        self.factories.insert(address, factory);
        Ok(address)
    }

    /// Executes a call on a factory.
    pub fn call(&mut self, to: Address, call: Call) -> Result<Receipt, CallError> {
        let factory = self.factories.get_mut(&to).ok_or(CallError::NoFactory(to))?;
        let mut frame = Frame::new(&mut self.state);
        let res = match (factory, call) {
            (Factory::Sequential(factory), Call::CreateChild { value }) => {
                factory.create_child(&mut frame, value)
            }
            (Factory::Salted(factory), Call::DeployChild { value, salt }) => {
                factory.deploy_child(&mut frame, value, salt)
            }
            (factory, call) => {
                return Err(CallError::WrongFactoryKind {
                    factory: to,
                    kind: factory.kind(),
                    call: call.name(),
                })
            }
        };
        if let Err(err) = res {
            log::warn!("call {} to {to} is rejected: {err}", call.name());
            return Err(err.into());
        }
        let logs = frame.logs;
        let receipt = Receipt { tx_no: self.tx_no, to, logs };
        self.tx_no += 1;
        Ok(receipt)
    }

    /// Calls `createChild` on a sequential factory.
    pub fn create_child(&mut self, factory: Address, value: u256) -> Result<Receipt, CallError> {
        self.call(factory, Call::CreateChild { value })
    }

    /// Calls `deployChild` on a salted factory.
    pub fn deploy_child(
        &mut self,
        factory: Address,
        value: u256,
        salt: Salt,
    ) -> Result<Receipt, CallError> {
        self.call(factory, Call::DeployChild { value, salt })
    }

    /// Read-only query computing the address a salted factory assigns to `value` and `salt`.
    pub fn predict_address(
        &self,
        factory: Address,
        value: u256,
        salt: Salt,
    ) -> Result<Address, CallError> {
        match self.factories.get(&factory) {
            Some(Factory::Salted(salted)) => {
                let addr = salted.predict_address(value, salt);
                log::debug!("predicted {addr} for salt {salt} at factory {factory}");
                Ok(addr)
            }
            Some(other) => Err(CallError::WrongFactoryKind {
                factory,
                kind: other.kind(),
                call: "predictAddress",
            }),
            None => Err(CallError::NoFactory(factory)),
        }
    }

    fn sequential(
        &self,
        factory: Address,
        call: &'static str,
    ) -> Result<&SequentialFactory, CallError> {
        match self.factories.get(&factory) {
            Some(Factory::Sequential(sequential)) => Ok(sequential),
            Some(other) => Err(CallError::WrongFactoryKind { factory, kind: other.kind(), call }),
            None => Err(CallError::NoFactory(factory)),
        }
    }

    /// Current deployment counter of a sequential factory.
    pub fn deployment_counter(&self, factory: Address) -> Result<u64, CallError> {
        self.sequential(factory, "deploymentCounter")
            .map(SequentialFactory::counter)
    }

    /// Best-effort hint of the address the next sequential deployment of the factory lands at.
    ///
    /// The hint is stale as soon as any other deployment from the same factory happens first.
    pub fn peek_next_address(&self, factory: Address) -> Result<Address, CallError> {
        self.sequential(factory, "nextAddress")
            .map(SequentialFactory::next_address)
    }

    /// Read-only query of the value stored by a child instance.
    pub fn get_value(&self, instance: Address) -> Result<u256, CallError> {
        self.state
            .instance(instance)
            .map(ChildInstance::get_value)
            .ok_or(CallError::NoInstance(instance))
    }
}
