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

#![cfg_attr(coverage_nightly, feature(coverage_attribute), coverage(off))]

use factoria::stl::factoria_stl;
use strict_types::parse_args;

fn main() {
    let (format, dir) = parse_args();

    let lib = factoria_stl();
    lib.serialize(
        format,
        dir.as_ref(),
        "0.1.0",
        Some(
            "
  Description: Deterministic instance address derivation and factory deployment
  Author: Factoria developers
  License: Apache-2.0",
        ),
    )
    .expect("unable to write to the file");
}
