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

//! Strict type library of the data types defined by the crate.

use strict_types::stl::std_stl;
use strict_types::typelib::LibBuilder;
use strict_types::{CompileError, TypeLib};

use crate::{Address, ChildInstance, CodeHash, DeploymentEvent, Salt, LIB_NAME_FACTORIA};

fn _factoria_stl() -> Result<TypeLib, CompileError> {
    LibBuilder::new(libname!(LIB_NAME_FACTORIA), tiny_bset! {
        std_stl().to_dependency(),
    })
    .transpile::<Address>()
    .transpile::<Salt>()
    .transpile::<CodeHash>()
    .transpile::<ChildInstance>()
    .transpile::<DeploymentEvent>()
    .compile()
}

/// Generates strict type library providing data types for deployment receipts and instances.
pub fn factoria_stl() -> TypeLib { _factoria_stl().expect("invalid strict type Factoria library") }
