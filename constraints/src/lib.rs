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

//! Constraint systems for both the dense R1C and Sparse R1C (PLONK-style)
//! dialects, built additively by a frontend and solved by one shared,
//! level-parallel solver.
//!
//! - [`coeff`] / [`row`] / [`wire`] — the coefficient table and the two rows
//!   a [`system::System`] can accumulate.
//! - [`blueprint`] / [`instruction`] — packed, tagged-dispatch call-data
//!   decoding, so the solver's inner loop never pays for a virtual call.
//! - [`hint`] — out-of-circuit functions bound by id and invoked lazily.
//! - [`level`] — the dependency leveller that makes §6's parallel solve safe.
//! - [`log`] — the structured, deferred-render user log sink (distinct from
//!   this crate's own `tracing` instrumentation).
//! - [`system`] — the constraint graph itself.
//! - [`solver`] — fills in the witness and checks satisfaction.
//! - [`serialize`] — the persisted tagged-binary form.

pub mod blueprint;
pub mod coeff;
pub mod error;
pub mod hint;
pub mod instruction;
pub mod level;
pub mod log;
pub mod row;
pub mod serialize;
pub mod solver;
pub mod system;
pub mod wire;

pub use blueprint::{Blueprint, BlueprintId, BlueprintKind, HintBlueprint, R1CBlueprint, SparseR1CBlueprint};
pub use coeff::{CoeffId, CoeffTable};
pub use error::{SerializationError, SolverError};
pub use hint::{BigIntPool, HintError, HintFn, HintFunctions, HintId, HintMapping};
pub use instruction::{Instruction, InstructionId};
pub use level::Leveller;
pub use log::{LogEntry, LogSink, SymbolTable, TracingLogSink};
pub use row::{CommitmentTag, LinearExpression, Term, R1C, SparseR1C};
pub use serialize::{read_system, write_system, MAGIC, MAX_ARRAY_ELEMENTS, VERSION};
pub use solver::{solve, R1CSSolution, Solution, SolverConfig, SparseR1CSSolution};
pub use system::{ConstraintId, Dialect, System};
pub use wire::{WireId, ONE_WIRE};
