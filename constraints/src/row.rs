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

//! Row shapes for the two constraint dialects.

use crate::coeff::{CoeffId, COEFF_ID_ZERO};
use crate::wire::WireId;
use serde::{Deserialize, Serialize};

/// A single `(coefficient, wire)` pair.
///
/// A term with `coeff == 0` contributes nothing and has no wire dependency.
/// A term marked [`Term::is_constant`] also has no wire dependency; its
/// `wire` field is meaningless and ignored by the solver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub coeff: CoeffId,
    pub wire: WireId,
    pub is_constant: bool,
}

impl Term {
    pub fn new(coeff: CoeffId, wire: WireId) -> Self {
        Term { coeff, wire, is_constant: false }
    }

    pub fn constant(coeff: CoeffId) -> Self {
        Term { coeff, wire: 0, is_constant: true }
    }

    pub fn is_zero(&self) -> bool {
        self.coeff == COEFF_ID_ZERO
    }
}

/// An ordered sequence of [`Term`]s, denoting their sum.
pub type LinearExpression = Vec<Term>;

/// `(ΣL) · (ΣR) = ΣO`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct R1C {
    pub l: LinearExpression,
    pub r: LinearExpression,
    pub o: LinearExpression,
}

/// Whether a Sparse R1C row asserts an external commitment rather than an
/// arithmetic identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentTag {
    Not,
    Committed,
    HasCommitmentPart,
}

/// `qL·L + qR·R + qO·O + qM·(M0·M1) + qC = 0`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct SparseR1C {
    pub l: Term,
    pub r: Term,
    pub o: Term,
    pub m: [Term; 2],
    pub k: CoeffId,
    pub commitment: CommitmentTag,
}
