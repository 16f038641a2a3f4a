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

//! A tiny prime field used only by this workspace's test suite.
//!
//! Real callers bring their own curve's field and never touch this module.

use crate::{Field, FieldError};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// The modulus is the Mersenne prime `2^31 - 1`, comfortably larger than any
/// literal used in the solver's test scenarios while fitting in a `u64` with
/// room to spare for `u128` intermediate products.
pub const MODULUS: u64 = 2_147_483_647;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ToyField(u64);

impl ToyField {
    fn reduce(value: u128) -> u64 {
        (value % MODULUS as u128) as u64
    }
}

impl Field for ToyField {
    const BYTE_SIZE: usize = 8;

    fn modulus() -> BigUint {
        BigUint::from(MODULUS)
    }

    fn zero() -> Self {
        ToyField(0)
    }

    fn one() -> Self {
        ToyField(1)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn is_one(&self) -> bool {
        self.0 == 1
    }

    fn from_u64(value: u64) -> Self {
        ToyField(value % MODULUS)
    }

    fn from_bigint(value: &BigUint) -> Self {
        let modulus = BigUint::from(MODULUS);
        let reduced = value % &modulus;
        let digits = reduced.to_u64_digits();
        ToyField(digits.first().copied().unwrap_or(0))
    }

    fn to_bigint(&self) -> BigUint {
        BigUint::from(self.0)
    }

    fn add(&self, other: &Self) -> Self {
        ToyField(Self::reduce(self.0 as u128 + other.0 as u128))
    }

    fn sub(&self, other: &Self) -> Self {
        ToyField(Self::reduce(self.0 as u128 + (MODULUS - other.0) as u128))
    }

    fn mul(&self, other: &Self) -> Self {
        ToyField(Self::reduce(self.0 as u128 * other.0 as u128))
    }

    fn neg(&self) -> Self {
        if self.0 == 0 { ToyField(0) } else { ToyField(MODULUS - self.0) }
    }

    fn inverse(&self) -> Result<Self, FieldError> {
        if self.0 == 0 {
            return Err(FieldError::DivisionByZero);
        }
        // Fermat's little theorem: a^(p-2) = a^-1 mod p.
        let mut base = self.0 as u128;
        let mut exponent = MODULUS - 2;
        let modulus = MODULUS as u128;
        let mut result: u128 = 1;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = (result * base) % modulus;
            }
            base = (base * base) % modulus;
            exponent >>= 1;
        }
        Ok(ToyField(result as u64))
    }

    fn to_bytes_le(&self) -> Vec<u8> {
        self.0.to_le_bytes().to_vec()
    }

    fn from_bytes_le(bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.len() != Self::BYTE_SIZE {
            return Err(FieldError::InvalidEncodingLength { expected: Self::BYTE_SIZE, found: bytes.len() });
        }
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        let value = u64::from_le_bytes(array);
        if value >= MODULUS {
            return Err(FieldError::NonCanonicalEncoding);
        }
        Ok(ToyField(value))
    }
}

impl core::fmt::Debug for ToyField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ToyField({})", self.0)
    }
}

impl core::fmt::Display for ToyField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn test_rng() -> XorShiftRng {
        XorShiftRng::seed_from_u64(0x5EED_CAFE)
    }

    fn random_nonzero(rng: &mut XorShiftRng) -> ToyField {
        loop {
            let candidate = ToyField::from_u64(rng.gen_range(1..MODULUS));
            if !candidate.is_zero() {
                return candidate;
            }
        }
    }

    #[test]
    fn zero_and_one() {
        assert!(ToyField::zero().is_zero());
        assert!(ToyField::one().is_one());
        assert!(!ToyField::one().is_zero());
    }

    #[test]
    fn add_wraps_modulus() {
        let a = ToyField::from_u64(MODULUS - 1);
        let b = ToyField::from_u64(2);
        assert_eq!(a.add(&b), ToyField::from_u64(1));
    }

    #[test]
    fn sub_wraps_modulus() {
        let a = ToyField::zero();
        let b = ToyField::one();
        assert_eq!(a.sub(&b), ToyField::from_u64(MODULUS - 1));
    }

    #[test]
    fn mul_matches_hand_computation() {
        let a = ToyField::from_u64(7);
        let b = ToyField::from_u64(6);
        assert_eq!(a.mul(&b), ToyField::from_u64(42));
    }

    #[test]
    fn neg_and_add_cancel() {
        let a = ToyField::from_u64(123_456);
        assert!(a.add(&a.neg()).is_zero());
    }

    #[test]
    fn inverse_of_zero_is_division_by_zero() {
        assert_eq!(ToyField::zero().inverse().unwrap_err(), FieldError::DivisionByZero);
    }

    #[test]
    fn inverse_round_trips() {
        let a = ToyField::from_u64(12_345);
        let inv = a.inverse().expect("nonzero element must invert");
        assert!(a.mul(&inv).is_one());
    }

    #[test]
    fn bytes_round_trip() {
        let a = ToyField::from_u64(999_999);
        let bytes = a.to_bytes_le();
        assert_eq!(bytes.len(), ToyField::BYTE_SIZE);
        assert_eq!(ToyField::from_bytes_le(&bytes).unwrap(), a);
    }

    #[test]
    fn non_canonical_bytes_are_rejected() {
        let bytes = MODULUS.to_le_bytes();
        assert_eq!(ToyField::from_bytes_le(&bytes).unwrap_err(), FieldError::NonCanonicalEncoding);
    }

    #[test]
    fn from_bigint_reduces() {
        let value = BigUint::from(MODULUS) + BigUint::from(5u64);
        assert_eq!(ToyField::from_bigint(&value), ToyField::from_u64(5));
    }

    #[test]
    fn inverse_round_trips_over_random_samples() {
        let mut rng = test_rng();
        for _ in 0..256 {
            let a = random_nonzero(&mut rng);
            let inv = a.inverse().expect("sampled nonzero");
            assert!(a.mul(&inv).is_one());
        }
    }

    #[test]
    fn addition_is_commutative_over_random_samples() {
        let mut rng = test_rng();
        for _ in 0..256 {
            let a = ToyField::from_u64(rng.gen_range(0..MODULUS));
            let b = ToyField::from_u64(rng.gen_range(0..MODULUS));
            assert_eq!(a.add(&b), b.add(&a));
        }
    }
}
