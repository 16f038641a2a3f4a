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

//! The narrow field-element trait shared by both constraint-system dialects.
//!
//! A concrete curve's prime field is expected to live in its own crate and
//! implement [`Field`] here; this crate deliberately ships no curve-specific
//! arithmetic. The `toy` module's [`toy::ToyField`] exists only so the
//! `constraints` crate's test suite has something concrete to run against.

mod error;
pub use error::FieldError;

#[cfg(any(test, feature = "toy-field"))]
pub mod toy;

use num_bigint::BigUint;

/// A prime-field element.
///
/// Every operation is pure and allocation-free on the hot path (aside from
/// the explicit byte/BigUint conversions, which are only used at the edges
/// of the solver: hint marshalling and persisted-form I/O).
pub trait Field:
    Sized + Copy + Clone + Eq + PartialEq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static
{
    /// Width, in bytes, of this field's fixed-size encoding.
    const BYTE_SIZE: usize;

    /// The field's modulus, as an arbitrary-precision integer.
    fn modulus() -> BigUint;

    fn zero() -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;
    fn is_one(&self) -> bool;

    /// Reduces `value` modulo the field's characteristic.
    fn from_u64(value: u64) -> Self;
    /// Reduces `value` modulo the field's characteristic.
    fn from_bigint(value: &BigUint) -> Self;
    fn to_bigint(&self) -> BigUint;

    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;

    fn double(&self) -> Self {
        self.add(self)
    }

    fn square(&self) -> Self {
        self.mul(self)
    }

    /// Returns `Err(FieldError::DivisionByZero)` for the zero element.
    fn inverse(&self) -> Result<Self, FieldError>;

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Fixed-width little-endian encoding; always exactly `Self::BYTE_SIZE` bytes.
    fn to_bytes_le(&self) -> Vec<u8>;

    /// Inverse of [`Field::to_bytes_le`]. `bytes` must be exactly `Self::BYTE_SIZE` long.
    fn from_bytes_le(bytes: &[u8]) -> Result<Self, FieldError>;
}
