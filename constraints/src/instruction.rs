// Copyright (C) 2019-2024 Aleo Systems Inc.
// This file is part of the snarkVM library.

// The snarkVM library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The snarkVM library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the snarkVM library. If not, see <https://www.gnu.org/licenses/>.

//! The flat, append-only instruction stream (C3).

use crate::blueprint::{BlueprintId, BlueprintKind};
use serde::{Deserialize, Serialize};

/// Index into [`crate::system::System::instructions`].
pub type InstructionId = u32;

/// One entry in the instruction stream: names a blueprint and a slice of the
/// global call-data buffer. `constraint_offset` is the running total of
/// `nb_constraints` prior to this instruction's emission, used by the solver
/// to compute each row's diagnostic index without a separate pass.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Instruction {
    pub blueprint_id: BlueprintId,
    pub constraint_offset: u32,
    pub calldata_start: u32,
    pub kind: BlueprintKind,
}
