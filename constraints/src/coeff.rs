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

//! The coefficient interning table (C2).
//!
//! Five field elements are reserved at fixed ids so the solver's hot loop
//! can special-case them without a hash lookup: `0, 1, 2, -1, -2`.

use crate::row::Term;
use crate::wire::WireId;
use cs_fields::Field;
use indexmap::IndexMap;

pub type CoeffId = u32;

pub const COEFF_ID_ZERO: CoeffId = 0;
pub const COEFF_ID_ONE: CoeffId = 1;
pub const COEFF_ID_TWO: CoeffId = 2;
pub const COEFF_ID_MINUS_ONE: CoeffId = 3;
pub const COEFF_ID_MINUS_TWO: CoeffId = 4;

/// Number of reserved, always-present entries at the head of the table.
pub const NUM_RESERVED: usize = 5;

/// Interning store mapping field elements to stable small-integer ids.
///
/// Single-writer: only the frontend (the code building a [`crate::System`])
/// calls [`CoeffTable::add_coeff`]. Once frozen, the solver only reads.
#[derive(Clone)]
pub struct CoeffTable<F: Field> {
    coefficients: Vec<F>,
    index: IndexMap<F, CoeffId>,
}

impl<F: Field> CoeffTable<F> {
    pub fn new() -> Self {
        let zero = F::zero();
        let one = F::one();
        let two = F::from_u64(2);
        let minus_one = F::zero().sub(&F::one());
        let minus_two = F::zero().sub(&two);

        CoeffTable { coefficients: vec![zero, one, two, minus_one, minus_two], index: IndexMap::new() }
    }

    /// Interns `element`, returning its stable id. Reserved literals are
    /// recognised by equality before falling back to a dictionary lookup.
    pub fn add_coeff(&mut self, element: F) -> CoeffId {
        if element.is_zero() {
            return COEFF_ID_ZERO;
        }
        if element.is_one() {
            return COEFF_ID_ONE;
        }
        if element == self.coefficients[COEFF_ID_TWO as usize] {
            return COEFF_ID_TWO;
        }
        if element == self.coefficients[COEFF_ID_MINUS_ONE as usize] {
            return COEFF_ID_MINUS_ONE;
        }
        if element == self.coefficients[COEFF_ID_MINUS_TWO as usize] {
            return COEFF_ID_MINUS_TWO;
        }
        if let Some(&id) = self.index.get(&element) {
            return id;
        }
        let id = self.coefficients.len() as CoeffId;
        self.coefficients.push(element);
        self.index.insert(element, id);
        id
    }

    pub fn make_term(&mut self, element: F, wire: WireId) -> Term {
        let coeff = self.add_coeff(element);
        Term::new(coeff, wire)
    }

    pub fn get(&self, id: CoeffId) -> F {
        self.coefficients[id as usize]
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn coeff_to_string(&self, id: CoeffId) -> String {
        self.coefficients[id as usize].to_string()
    }

    pub fn as_slice(&self) -> &[F] {
        &self.coefficients
    }

    /// Rebuilds a table from a complete, already-ordered coefficient list
    /// (the persisted form's own layout: the five reserved entries first,
    /// then every interned element in the order it was first added).
    ///
    /// Panics if `coefficients` has fewer than [`NUM_RESERVED`] entries.
    pub fn from_raw(coefficients: Vec<F>) -> Self {
        assert!(coefficients.len() >= NUM_RESERVED, "persisted coefficient table is missing reserved entries");
        let mut index = IndexMap::with_capacity(coefficients.len() - NUM_RESERVED);
        for (id, &element) in coefficients.iter().enumerate().skip(NUM_RESERVED) {
            index.insert(element, id as CoeffId);
        }
        CoeffTable { coefficients, index }
    }

    /// Computes `-coefficients[i]^-1` for every entry, for use by the
    /// Sparse R1C solver's `Solve O` fast path. Zero entries map to `None`.
    pub fn neg_inverses(&self) -> Vec<Option<F>> {
        self.coefficients
            .iter()
            .map(|c| if c.is_zero() { None } else { c.inverse().ok().map(|inv| F::zero().sub(&inv)) })
            .collect()
    }
}

impl<F: Field> Default for CoeffTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a single [`Term`] against the coefficient table and current
/// wire values, using the reserved-id fast paths before falling back to a
/// generic multiplication. Panics if `wire` is not solved and the term is
/// not marked constant; callers must only invoke this once all of a term's
/// dependencies are known to be solved.
pub fn compute_term<F: Field>(table: &CoeffTable<F>, term: &Term, value: F) -> F {
    match term.coeff {
        COEFF_ID_ZERO => F::zero(),
        COEFF_ID_ONE => value,
        COEFF_ID_MINUS_ONE => value.neg(),
        COEFF_ID_TWO => value.double(),
        _ => table.get(term.coeff).mul(&value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_fields::toy::ToyField;

    #[test]
    fn reserved_ids_are_stable() {
        let mut table = CoeffTable::<ToyField>::new();
        assert_eq!(table.add_coeff(ToyField::zero()), COEFF_ID_ZERO);
        assert_eq!(table.add_coeff(ToyField::one()), COEFF_ID_ONE);
        assert_eq!(table.add_coeff(ToyField::from_u64(2)), COEFF_ID_TWO);
        assert_eq!(table.add_coeff(ToyField::zero().sub(&ToyField::one())), COEFF_ID_MINUS_ONE);
        assert_eq!(table.add_coeff(ToyField::zero().sub(&ToyField::from_u64(2))), COEFF_ID_MINUS_TWO);
    }

    #[test]
    fn add_coeff_is_idempotent() {
        let mut table = CoeffTable::<ToyField>::new();
        let seven = ToyField::from_u64(7);
        let id_a = table.add_coeff(seven);
        let id_b = table.add_coeff(seven);
        assert_eq!(id_a, id_b);
        assert_eq!(table.len(), NUM_RESERVED + 1);
    }

    #[test]
    fn neg_inverses_satisfy_identity() {
        let mut table = CoeffTable::<ToyField>::new();
        let seven = ToyField::from_u64(7);
        let id = table.add_coeff(seven);
        let neg_inv = table.neg_inverses();
        let product = table.get(id).mul(&neg_inv[id as usize].unwrap());
        assert_eq!(product, ToyField::zero().sub(&ToyField::one()));
    }
}
