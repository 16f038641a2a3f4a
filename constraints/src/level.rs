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

//! Dependency leveller (C4): partitions instructions into levels such that
//! every instruction in level `k` has all of its wire dependencies produced
//! in levels `< k`.

use crate::instruction::InstructionId;
use crate::wire::WireId;

/// Incrementally assigns each appended instruction to a level.
///
/// `level(i) = 1 + max(level(producer(w)))` over the wires `i` reads,
/// treating witness wires and the constant wire as level 0. Update cost is
/// `O(inputs)` per instruction.
#[derive(Default)]
pub struct Leveller {
    wire_level: Vec<usize>,
    levels: Vec<Vec<InstructionId>>,
}

impl Leveller {
    pub fn new() -> Self {
        Self { wire_level: Vec::new(), levels: Vec::new() }
    }

    fn level_of(&self, wire: WireId) -> usize {
        self.wire_level.get(wire as usize).copied().unwrap_or(0)
    }

    fn ensure_capacity(&mut self, wire: WireId) {
        let needed = wire as usize + 1;
        if self.wire_level.len() < needed {
            self.wire_level.resize(needed, 0);
        }
    }

    /// Records one instruction's dependencies and outputs, returning the
    /// level it was assigned to.
    pub fn record<I, O>(&mut self, id: InstructionId, inputs: I, outputs: O) -> usize
    where
        I: IntoIterator<Item = WireId>,
        O: IntoIterator<Item = WireId>,
    {
        let mut max_producer_level = 0usize;
        for wire in inputs {
            max_producer_level = max_producer_level.max(self.level_of(wire));
        }
        let level = max_producer_level + 1;

        for wire in outputs {
            self.ensure_capacity(wire);
            self.wire_level[wire as usize] = level;
        }

        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
        self.levels[level].push(id);
        level
    }

    /// Materialises the final `[[InstructionID]]` levels. Level 0 is always
    /// empty (it denotes witness/constant wires, not instructions) and is
    /// dropped so callers iterate only over levels that contain work.
    pub fn finish(self) -> Vec<Vec<InstructionId>> {
        let mut levels = self.levels;
        if !levels.is_empty() {
            levels.remove(0);
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_instructions_share_level_zero() {
        let mut leveller = Leveller::new();
        leveller.record(0, vec![0u32, 1], vec![10]);
        leveller.record(1, vec![0u32, 2], vec![11]);
        let levels = leveller.finish();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0], vec![0, 1]);
    }

    #[test]
    fn chained_instructions_land_in_successive_levels() {
        let mut leveller = Leveller::new();
        leveller.record(0, vec![0u32], vec![10]);
        leveller.record(1, vec![10u32], vec![11]);
        let levels = leveller.finish();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], vec![0]);
        assert_eq!(levels[1], vec![1]);
    }
}
