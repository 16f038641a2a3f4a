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

//! Blueprints: capability objects that decompress packed call-data into
//! constraint rows or hint mappings (C3).

use crate::hint::HintMapping;
use crate::row::{CommitmentTag, Term, R1C, SparseR1C};
use crate::wire::WireId;
use cs_fields::Field;

pub type BlueprintId = u32;

/// Which decoded shape a blueprint produces. Instructions carry this tag
/// directly so the solver's inner loop dispatches with a `match` on the
/// instruction rather than a virtual call per row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlueprintKind {
    R1C,
    SparseR1C,
    Hint,
}

/// Sentinel returned by [`Blueprint::nb_inputs`] meaning "variable; slot 0 of
/// this instruction's call-data is the length of the rest."
pub const VARIABLE_ARITY: i64 = -1;

/// A decoder capability for one instruction shape.
///
/// A blueprint is shared across every instruction that uses it; per-instance
/// state (which wires, which coefficients) lives entirely in call-data.
pub trait Blueprint<F: Field>: Send + Sync {
    fn kind(&self) -> BlueprintKind;

    /// Number of call-data slots this blueprint reads, or [`VARIABLE_ARITY`].
    fn nb_inputs(&self) -> i64;

    /// How many constraint rows one instance of this blueprint contributes.
    fn nb_constraints(&self) -> usize;

    /// How many wires one instance of this blueprint produces.
    fn nb_outputs(&self) -> usize;

    fn decompress_r1c(&self, _calldata: &[u32]) -> R1C {
        panic!("blueprint does not produce an R1C row")
    }

    fn decompress_sparse_r1c(&self, _calldata: &[u32]) -> SparseR1C {
        panic!("blueprint does not produce a Sparse R1C row")
    }

    fn decompress_hint(&self, _calldata: &[u32]) -> HintMapping {
        panic!("blueprint does not produce a hint mapping")
    }
}

fn encode_term(out: &mut Vec<u32>, term: &Term) {
    out.push(term.coeff);
    out.push(term.wire);
    out.push(term.is_constant as u32);
}

fn decode_term(calldata: &[u32], at: usize) -> (Term, usize) {
    let coeff = calldata[at];
    let wire = calldata[at + 1];
    let is_constant = calldata[at + 2] != 0;
    (Term { coeff, wire, is_constant }, at + 3)
}

fn encode_linear_expression(out: &mut Vec<u32>, expr: &[Term]) {
    out.push(expr.len() as u32);
    for term in expr {
        encode_term(out, term);
    }
}

fn decode_linear_expression(calldata: &[u32], at: usize) -> (Vec<Term>, usize) {
    let len = calldata[at] as usize;
    let mut cursor = at + 1;
    let mut terms = Vec::with_capacity(len);
    for _ in 0..len {
        let (term, next) = decode_term(calldata, cursor);
        terms.push(term);
        cursor = next;
    }
    (terms, cursor)
}

/// The general-purpose R1C blueprint: one instance encodes one arbitrary-arity
/// `(L, R, O)` row. Call-data layout (after the variable-arity length slot):
/// `[len_l, l-terms..., len_r, r-terms..., len_o, o-terms...]`.
#[derive(Default)]
pub struct R1CBlueprint;

impl<F: Field> Blueprint<F> for R1CBlueprint {
    fn kind(&self) -> BlueprintKind {
        BlueprintKind::R1C
    }

    fn nb_inputs(&self) -> i64 {
        VARIABLE_ARITY
    }

    fn nb_constraints(&self) -> usize {
        1
    }

    fn nb_outputs(&self) -> usize {
        0
    }

    fn decompress_r1c(&self, calldata: &[u32]) -> R1C {
        // calldata[0] is the variable-arity length slot; the payload starts at 1.
        let (l, at) = decode_linear_expression(calldata, 1);
        let (r, at) = decode_linear_expression(calldata, at);
        let (o, _) = decode_linear_expression(calldata, at);
        R1C { l, r, o }
    }
}

impl R1CBlueprint {
    /// Encodes one `(L, R, O)` row as a variable-arity call-data payload,
    /// including the leading length slot.
    pub fn encode(l: &[Term], r: &[Term], o: &[Term]) -> Vec<u32> {
        let mut payload = Vec::new();
        encode_linear_expression(&mut payload, l);
        encode_linear_expression(&mut payload, r);
        encode_linear_expression(&mut payload, o);
        let mut out = Vec::with_capacity(payload.len() + 1);
        out.push((payload.len() + 1) as u32);
        out.extend(payload);
        out
    }
}

fn encode_commitment(tag: CommitmentTag) -> u32 {
    match tag {
        CommitmentTag::Not => 0,
        CommitmentTag::Committed => 1,
        CommitmentTag::HasCommitmentPart => 2,
    }
}

fn decode_commitment(value: u32) -> CommitmentTag {
    match value {
        0 => CommitmentTag::Not,
        1 => CommitmentTag::Committed,
        2 => CommitmentTag::HasCommitmentPart,
        other => panic!("invalid commitment tag {other}"),
    }
}

/// The general-purpose Sparse R1C blueprint: fixed arity, five terms plus a
/// constant coefficient plus a commitment tag.
#[derive(Default)]
pub struct SparseR1CBlueprint;

/// `l, r, o, m0, m1` (3 slots each) + `k` (1 slot) + commitment tag (1 slot).
pub const SPARSE_R1C_ARITY: i64 = 3 * 5 + 2;

impl<F: Field> Blueprint<F> for SparseR1CBlueprint {
    fn kind(&self) -> BlueprintKind {
        BlueprintKind::SparseR1C
    }

    fn nb_inputs(&self) -> i64 {
        SPARSE_R1C_ARITY
    }

    fn nb_constraints(&self) -> usize {
        1
    }

    fn nb_outputs(&self) -> usize {
        0
    }

    fn decompress_sparse_r1c(&self, calldata: &[u32]) -> SparseR1C {
        let (l, at) = decode_term(calldata, 0);
        let (r, at) = decode_term(calldata, at);
        let (o, at) = decode_term(calldata, at);
        let (m0, at) = decode_term(calldata, at);
        let (m1, at) = decode_term(calldata, at);
        let k = calldata[at];
        let commitment = decode_commitment(calldata[at + 1]);
        SparseR1C { l, r, o, m: [m0, m1], k, commitment }
    }
}

impl SparseR1CBlueprint {
    pub fn encode(row: &SparseR1C) -> Vec<u32> {
        let mut out = Vec::with_capacity(SPARSE_R1C_ARITY as usize);
        encode_term(&mut out, &row.l);
        encode_term(&mut out, &row.r);
        encode_term(&mut out, &row.o);
        encode_term(&mut out, &row.m[0]);
        encode_term(&mut out, &row.m[1]);
        out.push(row.k);
        out.push(encode_commitment(row.commitment));
        out
    }
}

/// The general-purpose hint blueprint: variable arity, encodes a hint id, its
/// input linear expressions, and its output wires.
#[derive(Default)]
pub struct HintBlueprint {
    pub nb_outputs: usize,
}

impl<F: Field> Blueprint<F> for HintBlueprint {
    fn kind(&self) -> BlueprintKind {
        BlueprintKind::Hint
    }

    fn nb_inputs(&self) -> i64 {
        VARIABLE_ARITY
    }

    fn nb_constraints(&self) -> usize {
        0
    }

    fn nb_outputs(&self) -> usize {
        self.nb_outputs
    }

    fn decompress_hint(&self, calldata: &[u32]) -> HintMapping {
        // calldata[0] is the length slot; payload starts at 1.
        let hint_id_hi = calldata[1] as u64;
        let hint_id_lo = calldata[2] as u64;
        let hint_id = (hint_id_hi << 32) | hint_id_lo;
        let nb_inputs = calldata[3] as usize;
        let mut cursor = 4;
        let mut inputs = Vec::with_capacity(nb_inputs);
        for _ in 0..nb_inputs {
            let (expr, next) = decode_linear_expression(calldata, cursor);
            inputs.push(expr);
            cursor = next;
        }
        let nb_outputs = calldata[cursor] as usize;
        cursor += 1;
        let mut outputs = Vec::with_capacity(nb_outputs);
        for _ in 0..nb_outputs {
            outputs.push(calldata[cursor] as WireId);
            cursor += 1;
        }
        HintMapping { hint_id: crate::hint::HintId(hint_id), inputs, outputs }
    }
}

impl HintBlueprint {
    pub fn encode(hint_id: crate::hint::HintId, inputs: &[Vec<Term>], outputs: &[WireId]) -> Vec<u32> {
        let mut payload = Vec::new();
        payload.push((hint_id.0 >> 32) as u32);
        payload.push(hint_id.0 as u32);
        payload.push(inputs.len() as u32);
        for expr in inputs {
            encode_linear_expression(&mut payload, expr);
        }
        payload.push(outputs.len() as u32);
        for &wire in outputs {
            payload.push(wire);
        }
        let mut out = Vec::with_capacity(payload.len() + 1);
        out.push((payload.len() + 1) as u32);
        out.extend(payload);
        out
    }
}

use serde::{Deserialize, Serialize};
