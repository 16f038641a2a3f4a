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

use crate::hint::HintError;
use thiserror::Error;

/// User-recoverable failures from [`crate::solver::solve`].
///
/// `DivisionByZero` and `SolverIncomplete` are deliberately absent: both
/// indicate a broken upstream invariant (a malformed frontend or leveller
/// bug) rather than a bad witness, and are raised as panics instead — see
/// the solver module for where each is raised.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    #[error("witness has the wrong size: expected {expected}, found {found}")]
    InvalidWitnessSize { expected: usize, found: usize },

    #[error("missing hint function bindings: {names:?}")]
    MissingHint { names: Vec<String> },

    #[error("hint invocation failed: {0}")]
    HintError(#[from] HintError),

    #[error("constraint {constraint_index} is not satisfied: {cause}")]
    UnsatisfiedConstraint { constraint_index: usize, cause: String, debug: Option<String> },
}

/// Failures reading or writing the persisted tagged-binary form. Can occur
/// independently of any `solve()` call, so it is a sibling enum rather than
/// a `SolverError` variant.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("bad magic number: expected {expected:#x}, found {found:#x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported stream version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("modulus mismatch: stream was serialised for a different field")]
    ModulusMismatch,

    #[error("curve id mismatch: expected {expected}, found {found}")]
    CurveMismatch { expected: u32, found: u32 },

    #[error("{what} count {found} exceeds the maximum of {max}")]
    LimitExceeded { what: &'static str, found: u64, max: u64 },

    #[error("malformed stream: {0}")]
    Codec(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
