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

//! Environment shared between concurrent callers.
//!
//! Each mutating call holds the write lock for its whole duration, so deployments are executed as
//! serialized atomic units and no caller ever observes a half-done deployment. Queries take the
//! read lock.
//!
//! Serialization doesn't make out-of-band predictions for sequential factories safe: a caller
//! reading [`SharedEnv::peek_next_address`] and calling [`SharedEnv::create_child`] afterwards
//! may be overtaken by another caller, landing at a different address. Salted predictions depend
//! only on the caller inputs and remain valid regardless of other deployments.

use std::sync::Arc;

use amplify::num::u256;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Address, Call, CallError, ChildTemplate, Environment, Receipt, Salt};

/// Cloneable handle to an [`Environment`] shared between threads.
///
/// The underlying lock doesn't poison, so a panicking caller can't block the others.
#[derive(Clone, Debug, Default)]
pub struct SharedEnv(Arc<RwLock<Environment>>);

impl From<Environment> for SharedEnv {
    fn from(env: Environment) -> Self { Self::new(env) }
}

impl SharedEnv {
    /// Wraps an environment for shared use.
    pub fn new(env: Environment) -> Self { Self(Arc::new(RwLock::new(env))) }

    /// Locks the environment for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Environment> { self.0.read() }

    /// Locks the environment for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Environment> { self.0.write() }

    /// See [`Environment::deploy_sequential_factory`].
    pub fn deploy_sequential_factory(&self, template: ChildTemplate) -> Result<Address, CallError> {
        self.write().deploy_sequential_factory(template)
    }

    /// See [`Environment::deploy_salted_factory`].
    pub fn deploy_salted_factory(&self, template: ChildTemplate) -> Result<Address, CallError> {
        self.write().deploy_salted_factory(template)
    }

    /// Executes a call under the write lock.
    pub fn call(&self, to: Address, call: Call) -> Result<Receipt, CallError> {
        self.write().call(to, call)
    }

    /// Calls `createChild` under the write lock.
    pub fn create_child(&self, factory: Address, value: u256) -> Result<Receipt, CallError> {
        self.call(factory, Call::CreateChild { value })
    }

    /// Calls `deployChild` under the write lock.
    pub fn deploy_child(
        &self,
        factory: Address,
        value: u256,
        salt: Salt,
    ) -> Result<Receipt, CallError> {
        self.call(factory, Call::DeployChild { value, salt })
    }

    /// Predicts a salted address under the read lock.
    pub fn predict_address(
        &self,
        factory: Address,
        value: u256,
        salt: Salt,
    ) -> Result<Address, CallError> {
        self.read().predict_address(factory, value, salt)
    }

    /// Reads a sequential deployment counter under the read lock.
    pub fn deployment_counter(&self, factory: Address) -> Result<u64, CallError> {
        self.read().deployment_counter(factory)
    }

    /// Reads the next sequential address hint, which may be stale by the time it is used.
    pub fn peek_next_address(&self, factory: Address) -> Result<Address, CallError> {
        self.read().peek_next_address(factory)
    }

    /// Reads the value stored by a child instance.
    pub fn get_value(&self, instance: Address) -> Result<u256, CallError> {
        self.read().get_value(instance)
    }
}
