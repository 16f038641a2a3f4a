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

//! Hint registry and runner (C5): out-of-circuit functions bound by id,
//! invoked lazily to produce otherwise-unconstrained wires.

use crate::row::LinearExpression;
use crate::wire::WireId;
use blake2::{Blake2s256, Digest};
use num_bigint::BigUint;
use num_traits::Zero;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// A stable identifier for a hint function, derived from its declared name.
///
/// Real frontends mint these once at compile time and carry them through
/// call-data; this crate exposes [`HintId::from_name`] as the canonical way
/// to mint one so that a name always maps to the same id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HintId(pub u64);

impl HintId {
    pub fn from_name(name: &str) -> Self {
        let mut hasher = Blake2s256::new();
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        HintId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Display for HintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("hint failed: {0}")]
pub struct HintError(pub String);

/// `(modulus, inputs, outputs) -> Result<(), HintError>`. Implementations
/// write every declared output; the runner zero-initialises `outputs` first.
pub type HintFn = dyn Fn(&BigUint, &[BigUint], &mut [BigUint]) -> Result<(), HintError> + Send + Sync;

/// `{hint_id, inputs, outputs}`. Inputs are evaluated like any other linear
/// expression; outputs are the wires this mapping produces.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HintMapping {
    pub hint_id: HintId,
    pub inputs: Vec<LinearExpression>,
    pub outputs: Vec<WireId>,
}

/// Caller-supplied bindings from [`HintId`] to an actual function, passed to
/// `solve`.
#[derive(Default)]
pub struct HintFunctions {
    bound: HashMap<HintId, std::sync::Arc<HintFn>>,
}

impl HintFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, id: HintId, f: std::sync::Arc<HintFn>) -> &mut Self {
        self.bound.insert(id, f);
        self
    }

    pub fn get(&self, id: HintId) -> Option<&std::sync::Arc<HintFn>> {
        self.bound.get(&id)
    }

    pub fn contains(&self, id: HintId) -> bool {
        self.bound.contains_key(&id)
    }
}

thread_local! {
    static BIGINT_FREE_LIST: RefCell<Vec<BigUint>> = RefCell::new(Vec::new());
}

/// A thread-local free list of [`BigUint`] buffers, acquired and released
/// within one hint invocation to avoid allocation churn when hints are dense.
pub struct BigIntPool;

impl BigIntPool {
    /// Acquires `count` zero-valued buffers, reusing pooled ones where available.
    pub fn acquire(count: usize) -> Vec<BigUint> {
        BIGINT_FREE_LIST.with(|pool| {
            let mut pool = pool.borrow_mut();
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(pool.pop().unwrap_or_else(|| BigUint::from(0u32)));
            }
            out
        })
    }

    /// Returns buffers to the pool for reuse. Each buffer is zeroed first so
    /// the next acquirer never observes stale data.
    pub fn release(mut buffers: Vec<BigUint>) {
        BIGINT_FREE_LIST.with(|pool| {
            let mut pool = pool.borrow_mut();
            for mut buf in buffers.drain(..) {
                buf.set_zero();
                pool.push(buf);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_id_is_stable_for_a_name() {
        assert_eq!(HintId::from_name("inverse"), HintId::from_name("inverse"));
        assert_ne!(HintId::from_name("inverse"), HintId::from_name("double"));
    }

    #[test]
    fn pool_round_trips() {
        let buffers = BigIntPool::acquire(3);
        assert_eq!(buffers.len(), 3);
        BigIntPool::release(buffers);
        let reused = BigIntPool::acquire(3);
        assert_eq!(reused.len(), 3);
    }
}
