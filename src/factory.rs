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

use crate::{
    derive, Address, ChildInstance, ChildTemplate, DeploymentEvent, EnvConfig, InitCode, Log, Salt,
    Strategy,
};

/// World state seam through which factories deploy child instances.
pub trait Host {
    /// Limits applied to deployments.
    fn config(&self) -> &EnvConfig;

    /// Checks whether an account (of any kind) already exists at the address.
    fn is_occupied(&self, address: Address) -> bool;

    /// Number of child instances deployed so far.
    fn instance_count(&self) -> usize;

    /// Stores a constructed instance. Called only once all deployment checks have passed.
    fn insert(&mut self, instance: ChildInstance);

    /// Appends a record to the log of the current call.
    fn emit(&mut self, log: Log);
}

/// Failures to construct a child instance due to environment limits.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ConstructionError {
    /// init code of {size} bytes exceeds the limit of {max} bytes.
    InitCodeTooLarge {
        /// Size of the rejected init code.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// environment limit of {0} child instances is reached.
    InstanceLimit(usize),

    /// deployment counter of {0} is exhausted.
    NonceOverflow(Address),
}

/// Errors of a child deployment. Each leaves the factory and the host unchanged.
#[derive(Clone, Eq, PartialEq, Debug, Display, From, Error)]
#[display(doc_comments)]
pub enum DeployError {
    /// unable to construct child instance: {0}
    #[from]
    Construction(ConstructionError),

    /// address {0} is already occupied.
    AddressCollision(Address),
}

/// Performs all deployment checks and, only if all of them pass, stores the instance and emits
/// the deployment event on behalf of `factory`.
///
/// An occupied address is reported as a collision before any construction limit is checked.
fn instantiate(
    host: &mut impl Host,
    factory: Address,
    template: &ChildTemplate,
    address: Address,
    init_code: &InitCode,
) -> Result<DeploymentEvent, DeployError> {
    if host.is_occupied(address) {
        return Err(DeployError::AddressCollision(address));
    }
    let config = *host.config();
    if init_code.size() > config.max_init_code_size {
        return Err(ConstructionError::InitCodeTooLarge {
            size: init_code.size(),
            max: config.max_init_code_size,
        }
        .into());
    }
    if let Some(max) = config.max_instances {
        if host.instance_count() >= max {
            return Err(ConstructionError::InstanceLimit(max).into());
        }
    }

    let instance = template.construct(address, factory, init_code);
    host.insert(instance);
    let event = DeploymentEvent::new(address);
    host.emit(event.to_log(factory));
    log::info!("factory {factory} deployed child instance {address}");
    Ok(event)
}

/// Deployment strategy used by a factory.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum FactoryKind {
    /// Addresses derived from the deployment counter.
    Sequential,
    /// Addresses derived from a salt and the init code.
    Salted,
}

/// Factory deploying children to addresses derived from its own address and a deployment
/// counter.
///
/// The counter is owned by the factory and changes only through [`Self::create_child`]. Its
/// current value can be read, but an address predicted from it is only a hint: another deployment
/// may consume the counter value first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SequentialFactory {
    address: Address,
    template: ChildTemplate,
    counter: u64,
}

impl SequentialFactory {
    /// Constructs factory with a zero deployment counter.
    pub fn new(address: Address, template: ChildTemplate) -> Self {
        Self::with_counter(address, template, 0)
    }

    /// Constructs factory with a given initial deployment counter.
    pub fn with_counter(address: Address, template: ChildTemplate, counter: u64) -> Self {
        Self { address, template, counter }
    }

    /// Address of the factory itself.
    pub fn address(&self) -> Address { self.address }

    /// Template of the deployed children.
    pub fn template(&self) -> &ChildTemplate { &self.template }

    /// Number the next deployment derives its address from.
    pub fn counter(&self) -> u64 { self.counter }

    /// Address the next deployment will land at, unless some other deployment happens first.
    pub fn next_address(&self) -> Address {
        derive(Strategy::Sequential { nonce: self.counter }, self.address)
    }

    /// Deploys a new child with the given `value` at [`Self::next_address`] and increments the
    /// counter. On failure neither the counter nor the host are changed.
    pub fn create_child(
        &mut self,
        host: &mut impl Host,
        value: u256,
    ) -> Result<DeploymentEvent, DeployError> {
        let next = self
            .counter
            .checked_add(1)
            .ok_or(ConstructionError::NonceOverflow(self.address))?;
        let address = self.next_address();
        let init_code = self.template.init_code(value);
        let event = instantiate(host, self.address, &self.template, address, &init_code)?;
        self.counter = next;
        Ok(event)
    }
}

/// Factory deploying children to addresses derived from its own address, a caller-provided salt
/// and the child init code. The address doesn't depend on the deployment order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SaltedFactory {
    address: Address,
    template: ChildTemplate,
}

impl SaltedFactory {
    /// Constructs factory deploying children of `template`.
    pub fn new(address: Address, template: ChildTemplate) -> Self { Self { address, template } }

    /// Address of the factory itself.
    pub fn address(&self) -> Address { self.address }

    /// Template of the deployed children.
    pub fn template(&self) -> &ChildTemplate { &self.template }

    /// Computes the address [`Self::deploy_child`] assigns for the same arguments.
    pub fn predict_address(&self, value: u256, salt: Salt) -> Address {
        let code_hash = self.template.init_code(value).code_hash();
        derive(Strategy::Salted { salt, code_hash }, self.address)
    }

    /// Deploys a new child with the given `value` at [`Self::predict_address`].
    ///
    /// Fails with [`DeployError::AddressCollision`] if the same `value` and `salt` were already
    /// deployed from this factory.
    pub fn deploy_child(
        &self,
        host: &mut impl Host,
        value: u256,
        salt: Salt,
    ) -> Result<DeploymentEvent, DeployError> {
        let init_code = self.template.init_code(value);
        let code_hash = init_code.code_hash();
        let address = derive(Strategy::Salted { salt, code_hash }, self.address);
        instantiate(host, self.address, &self.template, address, &init_code)
    }
}

/// Factory of either kind, as stored by the environment.
#[derive(Clone, PartialEq, Eq, Debug, From)]
pub enum Factory {
    /// Sequential factory.
    #[from]
    Sequential(SequentialFactory),

    /// Salted factory.
    #[from]
    Salted(SaltedFactory),
}

impl Factory {
    /// Deployment strategy of the factory.
    pub fn kind(&self) -> FactoryKind {
        match self {
            Factory::Sequential(_) => FactoryKind::Sequential,
            Factory::Salted(_) => FactoryKind::Salted,
        }
    }

    /// Address of the factory.
    pub fn address(&self) -> Address {
        match self {
            Factory::Sequential(factory) => factory.address(),
            Factory::Salted(factory) => factory.address(),
        }
    }

    /// Template of the deployed children.
    pub fn template(&self) -> &ChildTemplate {
        match self {
            Factory::Sequential(factory) => factory.template(),
            Factory::Salted(factory) => factory.template(),
        }
    }
}
