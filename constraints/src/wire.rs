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

/// A variable in the arithmetic circuit.
///
/// Wire `0` is [`ONE_WIRE`], always solved with value `1`. Wires
/// `[1, 1+public)` are public inputs, followed by secret inputs, followed
/// by internal (solver- or hint-produced) wires.
pub type WireId = u32;

/// The constant wire, always bound to the field element `1`.
pub const ONE_WIRE: WireId = 0;
