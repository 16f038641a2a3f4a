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

//! The level-parallel solver (C6): fills unknown wires on demand, invokes
//! hints, and checks satisfaction.
//!
//! Within one level, the dependency-leveller's contract (§4.4) guarantees no
//! instruction reads a wire produced by another instruction in the same
//! level. That means a level's rows can be solved purely against the
//! assignment as of the *start* of the level: each worker only needs a
//! read-only view of `values`/`solved`, buffers its writes locally, and the
//! caller merges every worker's writes back in sequentially once the whole
//! level is done. No cell of `values` is ever written from more than one
//! thread, and nothing here needs `unsafe`.

use crate::blueprint::{Blueprint, BlueprintKind};
use crate::coeff::{compute_term, CoeffTable};
use crate::hint::{BigIntPool, HintError, HintFunctions, HintMapping};
use crate::instruction::{Instruction, InstructionId};
use crate::log::{resolve_entry, LogSink};
use crate::row::{CommitmentTag, Term};
use crate::system::{Dialect, System};
use crate::wire::{WireId, ONE_WIRE};
use crate::error::SolverError;
use cs_fields::Field;
use rayon::prelude::*;
use std::ops::Range;

/// Minimum number of instructions assigned to a single worker task. Below
/// this, a level runs sequentially on the calling thread — row work is small
/// enough that spawning tasks for it would cost more than it saves.
const MIN_WORK_PER_CPU: usize = 50;

/// Bindings and sink passed into [`solve`].
pub struct SolverConfig<'a> {
    pub hint_functions: &'a HintFunctions,
    pub log_sink: &'a dyn LogSink,
}

/// A completed R1C solve: the full wire assignment plus the per-row `A`, `B`,
/// `C` evaluations.
#[derive(Clone, Debug)]
pub struct R1CSSolution<F: Field> {
    pub w: Vec<F>,
    pub a: Vec<F>,
    pub b: Vec<F>,
    pub c: Vec<F>,
}

/// A completed Sparse R1C solve: the full wire assignment plus the per-row
/// `L`, `R`, `O` evaluations.
#[derive(Clone, Debug)]
pub struct SparseR1CSSolution<F: Field> {
    pub w: Vec<F>,
    pub l: Vec<F>,
    pub r: Vec<F>,
    pub o: Vec<F>,
}

#[derive(Clone, Debug)]
pub enum Solution<F: Field> {
    R1CS(R1CSSolution<F>),
    SparseR1CS(SparseR1CSSolution<F>),
}

/// One instruction's outcome: zero or more wire writes, and (for
/// constraint-producing rows) the row's resolved `(x, y, z)` evaluation to
/// store at `row_index` in the backend's auxiliary buffers.
struct RowDispatchResult<F: Field> {
    writes: Vec<(WireId, F)>,
    aux: Option<(usize, F, F, F)>,
}

/// Carries enough of a failed row to pick the first failure deterministically
/// (by constraint index, ties broken by instruction order) once a whole level
/// has finished, and to later attach a debug frame.
#[derive(Clone)]
struct RowError {
    instruction_id: InstructionId,
    constraint_offset: u32,
    error: SolverError,
}

fn pick_earliest(current: Option<RowError>, candidate: RowError) -> RowError {
    match current {
        None => candidate,
        Some(existing) => {
            let existing_key = (existing.constraint_offset, existing.instruction_id);
            let candidate_key = (candidate.constraint_offset, candidate.instruction_id);
            if candidate_key < existing_key { candidate } else { existing }
        }
    }
}

fn unsatisfied(instruction_id: InstructionId, constraint_index: usize, cause: String) -> RowError {
    RowError {
        instruction_id,
        constraint_offset: constraint_index as u32,
        error: SolverError::UnsatisfiedConstraint { constraint_index, cause, debug: None },
    }
}

fn hint_failed(instruction_id: InstructionId, constraint_offset: u32, cause: HintError) -> RowError {
    RowError { instruction_id, constraint_offset, error: SolverError::HintError(cause) }
}

/// Resolves `wire`'s value against the assignment as of the start of the
/// level, running its hint inline if it has one and hasn't fired yet.
/// Returns `Ok(None)` when `wire` is genuinely unconstrained here — the
/// caller's row invariant (§3.3) says that can happen for at most one wire
/// per row, which becomes that row's solve target.
fn resolve_or_mark<F: Field>(
    system: &System<F>,
    values: &[F],
    solved: &[bool],
    local: &mut Vec<(WireId, F)>,
    hint_fns: &HintFunctions,
    wire: WireId,
) -> Result<Option<F>, HintError> {
    if solved[wire as usize] {
        return Ok(Some(values[wire as usize]));
    }
    if let Some((_, v)) = local.iter().find(|(w, _)| *w == wire) {
        return Ok(Some(*v));
    }
    if let Some(mapping) = system.hint_mapping_for(wire) {
        run_hint(system, mapping, values, solved, local, hint_fns)?;
        let value = local
            .iter()
            .find(|(w, _)| *w == wire)
            .map(|(_, v)| *v)
            .expect("hint atomicity: a hint produces all of its declared outputs in one invocation");
        return Ok(Some(value));
    }
    Ok(None)
}

/// Evaluates `mapping`'s inputs, invokes the bound function, and buffers all
/// of its declared outputs into `local`. Idempotent: a no-op if the mapping's
/// first output is already resolved.
fn run_hint<F: Field>(
    system: &System<F>,
    mapping: &HintMapping,
    values: &[F],
    solved: &[bool],
    local: &mut Vec<(WireId, F)>,
    hint_fns: &HintFunctions,
) -> Result<(), HintError> {
    if let Some(&first) = mapping.outputs.first() {
        if solved[first as usize] || local.iter().any(|(w, _)| *w == first) {
            return Ok(());
        }
    }

    let table = system.coefficients();
    let mut input_values = Vec::with_capacity(mapping.inputs.len());
    for expr in &mapping.inputs {
        let mut sum = F::zero();
        for term in expr {
            if term.is_zero() {
                continue;
            }
            if term.is_constant {
                sum = sum.add(&table.get(term.coeff));
                continue;
            }
            let value = resolve_or_mark(system, values, solved, local, hint_fns, term.wire)?.unwrap_or_else(|| {
                panic!("hint input wire {} is unresolved; frontend/leveller invariant violated", term.wire)
            });
            sum = sum.add(&compute_term(table, term, value));
        }
        input_values.push(sum);
    }

    let modulus = F::modulus();
    let mut inputs_bigint = BigIntPool::acquire(input_values.len());
    for (slot, value) in inputs_bigint.iter_mut().zip(input_values.iter()) {
        *slot = value.to_bigint();
    }
    let mut outputs_bigint = BigIntPool::acquire(mapping.outputs.len());

    let function = hint_fns
        .get(mapping.hint_id)
        .unwrap_or_else(|| panic!("hint {} has no bound function; preflight should have caught this", mapping.hint_id));
    let result = function(&modulus, &inputs_bigint, &mut outputs_bigint);

    let outcome = result.map(|()| {
        for (&wire, value) in mapping.outputs.iter().zip(outputs_bigint.iter()) {
            local.push((wire, F::from_bigint(value)));
        }
    });

    BigIntPool::release(inputs_bigint);
    BigIntPool::release(outputs_bigint);
    outcome
}

/// Divides `value` by the coefficient at `coeff`, using the reserved-id fast
/// paths for `1`/`-1` before falling back to a generic inversion. Panics on a
/// zero divisor — the frontend guarantees R1C/Sparse row targets never carry
/// coefficient `0` (§4.6 step 5, §7 `DivisionByZero`).
fn divide_by_coeff<F: Field>(table: &CoeffTable<F>, coeff: crate::coeff::CoeffId, value: F) -> F {
    use crate::coeff::{COEFF_ID_MINUS_ONE, COEFF_ID_ONE, COEFF_ID_ZERO};
    match coeff {
        COEFF_ID_ONE => value,
        COEFF_ID_MINUS_ONE => value.neg(),
        COEFF_ID_ZERO => panic!("DivisionByZero: attempted to solve a row target with coefficient 0"),
        _ => {
            let c = table.get(coeff);
            let inv = c.inverse().unwrap_or_else(|_| panic!("DivisionByZero: attempted to solve a row target with coefficient 0"));
            value.mul(&inv)
        }
    }
}

/// One linear expression's accumulated value, plus the at-most-one `Term`
/// within it that the row invariant designates as this row's solve target.
fn accumulate<F: Field>(
    expr: &[Term],
    system: &System<F>,
    values: &[F],
    solved: &[bool],
    local: &mut Vec<(WireId, F)>,
    hint_fns: &HintFunctions,
) -> Result<(F, Option<Term>), HintError> {
    let table = system.coefficients();
    let mut sum = F::zero();
    let mut target = None;
    for term in expr {
        if term.is_zero() {
            continue;
        }
        if term.is_constant {
            sum = sum.add(&table.get(term.coeff));
            continue;
        }
        match resolve_or_mark(system, values, solved, local, hint_fns, term.wire)? {
            Some(v) => sum = sum.add(&compute_term(table, term, v)),
            None => {
                assert!(target.is_none(), "row invariant violation: more than one unsolved wire in a row");
                target = Some(*term);
            }
        }
    }
    Ok((sum, target))
}

fn dispatch_r1c<F: Field>(
    system: &System<F>,
    instruction: &Instruction,
    id: InstructionId,
    values: &[F],
    solved: &[bool],
    hint_fns: &HintFunctions,
) -> Result<RowDispatchResult<F>, RowError> {
    let calldata = system.get_calldata(instruction);
    let blueprint: &dyn Blueprint<F> = system.blueprint(instruction.blueprint_id);
    let row = blueprint.decompress_r1c(calldata);
    let table = system.coefficients();
    let row_index = instruction.constraint_offset as usize;

    let mut local = Vec::new();
    let wrap_hint = |e: HintError| hint_failed(id, instruction.constraint_offset, e);

    let (a, target_l) = accumulate(&row.l, system, values, solved, &mut local, hint_fns).map_err(wrap_hint)?;
    let (b, target_r) = accumulate(&row.r, system, values, solved, &mut local, hint_fns).map_err(wrap_hint)?;
    let (c, target_o) = accumulate(&row.o, system, values, solved, &mut local, hint_fns).map_err(wrap_hint)?;

    let targets: Vec<(u8, Term)> =
        [target_l.map(|t| (1u8, t)), target_r.map(|t| (2u8, t)), target_o.map(|t| (3u8, t))].into_iter().flatten().collect();
    assert!(targets.len() <= 1, "row invariant violation: more than one unsolved wire in a row");

    match targets.first() {
        None => {
            if !a.mul(&b).equal(&c) {
                return Err(unsatisfied(id, row_index, format!("{a} * {b} != {c}")));
            }
            Ok(RowDispatchResult { writes: local, aux: Some((row_index, a, b, c)) })
        }
        Some((1, term)) => {
            let (new, final_a, final_b, final_c) = if b.is_zero() {
                if !c.is_zero() {
                    return Err(unsatisfied(id, row_index, format!("{a} * {b} != {c}")));
                }
                (F::zero(), a, b, c)
            } else {
                let new = c.mul(&b.inverse().expect("checked nonzero above")).sub(&a);
                (new, a.add(&new), b, c)
            };
            let value = divide_by_coeff(table, term.coeff, new);
            local.push((term.wire, value));
            Ok(RowDispatchResult { writes: local, aux: Some((row_index, final_a, final_b, final_c)) })
        }
        Some((2, term)) => {
            let (new, final_a, final_b, final_c) = if a.is_zero() {
                if !c.is_zero() {
                    return Err(unsatisfied(id, row_index, format!("{a} * {b} != {c}")));
                }
                (F::zero(), a, b, c)
            } else {
                let new = c.mul(&a.inverse().expect("checked nonzero above")).sub(&b);
                (new, a, b.add(&new), c)
            };
            let value = divide_by_coeff(table, term.coeff, new);
            local.push((term.wire, value));
            Ok(RowDispatchResult { writes: local, aux: Some((row_index, final_a, final_b, final_c)) })
        }
        Some((3, term)) => {
            let new = a.mul(&b).sub(&c);
            let final_c = c.add(&new);
            let value = divide_by_coeff(table, term.coeff, new);
            local.push((term.wire, value));
            Ok(RowDispatchResult { writes: local, aux: Some((row_index, a, b, final_c)) })
        }
        _ => unreachable!("target loc is always 1, 2 or 3"),
    }
}

fn dispatch_sparse_r1c<F: Field>(
    system: &System<F>,
    instruction: &Instruction,
    id: InstructionId,
    values: &[F],
    solved: &[bool],
    hint_fns: &HintFunctions,
) -> Result<RowDispatchResult<F>, RowError> {
    let calldata = system.get_calldata(instruction);
    let blueprint: &dyn Blueprint<F> = system.blueprint(instruction.blueprint_id);
    let row = blueprint.decompress_sparse_r1c(calldata);
    let table = system.coefficients();
    let row_index = instruction.constraint_offset as usize;
    let wrap_hint = |e: HintError| hint_failed(id, instruction.constraint_offset, e);

    if row.commitment == CommitmentTag::Committed {
        return Ok(RowDispatchResult { writes: Vec::new(), aux: None });
    }

    let mut local = Vec::new();
    let resolve = |term: &Term, local: &mut Vec<(WireId, F)>| -> Result<Option<F>, HintError> {
        if term.is_zero() {
            return Ok(Some(F::zero()));
        }
        if term.is_constant {
            return Ok(Some(table.get(term.coeff)));
        }
        resolve_or_mark(system, values, solved, local, hint_fns, term.wire)
    };

    let l_val = resolve(&row.l, &mut local).map_err(wrap_hint)?;
    let r_val = resolve(&row.r, &mut local).map_err(wrap_hint)?;
    let o_val = resolve(&row.o, &mut local).map_err(wrap_hint)?;

    // `M[0]`/`M[1]` are resolved lazily: when solving for L or R, the
    // unsolved wire can itself be one of the multiplication operands (an
    // `a*b=c` gate solving for `b`), so resolving them up front would panic
    // on perfectly valid input. Only `u3` (the product of the two `M`
    // coefficients, independent of wire values) is needed to solve for L/R;
    // the quadratic `m0*m1` term is only ever needed once L and R are both
    // already solved, i.e. in the solve-O and fully-solved branches below.
    let u3 = table.get(row.m[0].coeff).mul(&table.get(row.m[1].coeff));
    let k = table.get(row.k);

    let l_contrib = l_val.map(|v| compute_term(table, &row.l, v));
    let r_contrib = r_val.map(|v| compute_term(table, &row.r, v));
    let o_contrib = o_val.map(|v| compute_term(table, &row.o, v));

    let (x, y, z) = match (l_val, r_val, o_val) {
        (Some(lv), None, Some(_)) => {
            let u1 = table.get(row.l.coeff);
            let u2 = table.get(row.r.coeff);
            let den = u3.mul(&lv).add(&u2);
            let num = l_contrib.unwrap().add(&o_contrib.unwrap()).add(&k);
            if den.is_zero() {
                return Err(unsatisfied(id, row_index, format!("{num} / 0 while solving for R (u1={u1})")));
            }
            let r_new = F::zero().sub(&num).mul(&den.inverse().expect("checked nonzero above"));
            local.push((row.r.wire, r_new));
            (l_contrib.unwrap(), compute_term(table, &row.r, r_new), o_contrib.unwrap())
        }
        (None, Some(rv), Some(_)) => {
            let u1 = table.get(row.l.coeff);
            let den = u3.mul(&rv).add(&u1);
            let num = r_contrib.unwrap().add(&o_contrib.unwrap()).add(&k);
            if den.is_zero() {
                return Err(unsatisfied(id, row_index, format!("{num} / 0 while solving for L")));
            }
            let l_new = F::zero().sub(&num).mul(&den.inverse().expect("checked nonzero above"));
            local.push((row.l.wire, l_new));
            (compute_term(table, &row.l, l_new), r_contrib.unwrap(), o_contrib.unwrap())
        }
        (Some(_), Some(_), None) => {
            let m0_val = resolve(&row.m[0], &mut local)
                .map_err(wrap_hint)?
                .expect("L and R already solved: M's operand wires must be solved too");
            let m1_val = resolve(&row.m[1], &mut local)
                .map_err(wrap_hint)?
                .expect("L and R already solved: M's operand wires must be solved too");
            let quadratic = u3.mul(&m0_val).mul(&m1_val);
            let inner = quadratic.add(&l_contrib.unwrap()).add(&r_contrib.unwrap()).add(&k);
            match system.coeff_neg_inv()[row.o.coeff as usize] {
                Some(neg_inv) => {
                    let o_new = inner.mul(&neg_inv);
                    local.push((row.o.wire, o_new));
                    (l_contrib.unwrap(), r_contrib.unwrap(), compute_term(table, &row.o, o_new))
                }
                None => {
                    if !inner.is_zero() {
                        return Err(unsatisfied(id, row_index, format!("{inner} != 0 while O's coefficient is 0")));
                    }
                    local.push((row.o.wire, F::zero()));
                    (l_contrib.unwrap(), r_contrib.unwrap(), F::zero())
                }
            }
        }
        (Some(_), Some(_), Some(_)) => {
            let m0_val = resolve(&row.m[0], &mut local)
                .map_err(wrap_hint)?
                .expect("L, R and O already solved: M's operand wires must be solved too");
            let m1_val = resolve(&row.m[1], &mut local)
                .map_err(wrap_hint)?
                .expect("L, R and O already solved: M's operand wires must be solved too");
            let quadratic = u3.mul(&m0_val).mul(&m1_val);
            let sum = l_contrib.unwrap().add(&r_contrib.unwrap()).add(&quadratic).add(&o_contrib.unwrap()).add(&k);
            if row.commitment == CommitmentTag::Not && !sum.is_zero() {
                return Err(unsatisfied(id, row_index, format!("{sum} != 0")));
            }
            (l_contrib.unwrap(), r_contrib.unwrap(), o_contrib.unwrap())
        }
        _ => panic!("row invariant violation: more than one unsolved wire in a sparse row"),
    };

    Ok(RowDispatchResult { writes: local, aux: Some((row_index, x, y, z)) })
}

fn dispatch_hint<F: Field>(
    system: &System<F>,
    instruction: &Instruction,
    id: InstructionId,
    values: &[F],
    solved: &[bool],
    hint_fns: &HintFunctions,
) -> Result<RowDispatchResult<F>, RowError> {
    let calldata = system.get_calldata(instruction);
    let blueprint: &dyn Blueprint<F> = system.blueprint(instruction.blueprint_id);
    let mapping = blueprint.decompress_hint(calldata);
    let mut local = Vec::new();
    run_hint(system, &mapping, values, solved, &mut local, hint_fns)
        .map_err(|e| hint_failed(id, instruction.constraint_offset, e))?;
    Ok(RowDispatchResult { writes: local, aux: None })
}

fn dispatch<F: Field>(
    system: &System<F>,
    id: InstructionId,
    values: &[F],
    solved: &[bool],
    hint_fns: &HintFunctions,
) -> Result<RowDispatchResult<F>, RowError> {
    let instruction = system.instructions()[id as usize];
    match instruction.kind {
        BlueprintKind::R1C => dispatch_r1c(system, &instruction, id, values, solved, hint_fns),
        BlueprintKind::SparseR1C => dispatch_sparse_r1c(system, &instruction, id, values, solved, hint_fns),
        BlueprintKind::Hint => dispatch_hint(system, &instruction, id, values, solved, hint_fns),
    }
}

/// Splits `len` items into `n_chunks` contiguous, balanced ranges; any
/// remainder is distributed to the leading chunks.
fn chunk_ranges(len: usize, n_chunks: usize) -> Vec<Range<usize>> {
    let base = len / n_chunks;
    let remainder = len % n_chunks;
    let mut ranges = Vec::with_capacity(n_chunks);
    let mut start = 0;
    for i in 0..n_chunks {
        let size = base + if i < remainder { 1 } else { 0 };
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

fn run_level<F: Field>(
    system: &System<F>,
    level: &[InstructionId],
    values: &[F],
    solved: &[bool],
    hint_fns: &HintFunctions,
) -> Vec<Result<RowDispatchResult<F>, RowError>> {
    let len = level.len();
    if len == 0 {
        return Vec::new();
    }

    let num_cpus = rayon::current_num_threads();
    let max_cpu = (len + MIN_WORK_PER_CPU - 1) / MIN_WORK_PER_CPU;

    if max_cpu <= 1 {
        return level.iter().map(|&id| dispatch(system, id, values, solved, hint_fns)).collect();
    }

    let n_chunks = num_cpus.min(max_cpu);
    chunk_ranges(len, n_chunks)
        .into_par_iter()
        .flat_map_iter(|range| level[range].iter().map(|&id| dispatch(system, id, values, solved, hint_fns)))
        .collect()
}

fn attach_debug<F: Field>(system: &System<F>, values: &[F], solved: &[bool], err: RowError) -> RowError {
    if let SolverError::UnsatisfiedConstraint { constraint_index, cause, .. } = &err.error {
        let debug =
            system.debug_entry_for(err.instruction_id).map(|entry| resolve_entry(entry, system.coefficients(), values, solved));
        return RowError {
            error: SolverError::UnsatisfiedConstraint { constraint_index: *constraint_index, cause: cause.clone(), debug },
            ..err
        };
    }
    err
}

/// Completes `witness` against `system`'s constraint graph, or reports the
/// first violated row.
///
/// Preconditions: `system` must be frozen (see [`System::freeze`]).
pub fn solve<F: Field>(system: &System<F>, witness: &[F], config: SolverConfig) -> Result<Solution<F>, SolverError> {
    assert!(system.is_frozen(), "solve() requires a frozen system; call System::freeze() first");

    let expected = system.public_wires() + system.secret_wires();
    if witness.len() != expected {
        return Err(SolverError::InvalidWitnessSize { expected, found: witness.len() });
    }

    let mut missing: Vec<String> =
        system.hint_dependencies().iter().filter(|(id, _)| !config.hint_functions.contains(**id)).map(|(_, name)| name.clone()).collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(SolverError::MissingHint { names: missing });
    }

    let n = system.nb_wires();
    let mut values = vec![F::zero(); n];
    let mut solved = vec![false; n];
    values[ONE_WIRE as usize] = F::one();
    solved[ONE_WIRE as usize] = true;
    for (i, w) in witness.iter().enumerate() {
        let wire = 1 + i;
        values[wire] = *w;
        solved[wire] = true;
    }

    let nb_constraints = system.nb_constraints();
    let dialect = system.dialect().unwrap_or(Dialect::R1C);
    // Rows are allocated with capacity rounded up to the next power of two:
    // real circuits feed these vectors into an FFT-based prover next, and
    // growing from an exact-fit allocation would force a reallocation right
    // before that step.
    let slot_capacity = nb_constraints.max(1).next_power_of_two();
    let mut slot0 = Vec::with_capacity(slot_capacity);
    let mut slot1 = Vec::with_capacity(slot_capacity);
    let mut slot2 = Vec::with_capacity(slot_capacity);
    slot0.resize(nb_constraints, F::zero());
    slot1.resize(nb_constraints, F::zero());
    slot2.resize(nb_constraints, F::zero());

    let span = tracing::debug_span!("solve", nb_constraints, nb_wires = n, nb_levels = system.levels().len());
    let _guard = span.enter();

    let mut solve_error: Option<RowError> = None;

    for (level_index, level) in system.levels().iter().enumerate() {
        tracing::trace!(level = level_index, size = level.len(), "dispatching level");
        let outcomes = run_level(system, level, &values, &solved, config.hint_functions);
        for outcome in outcomes {
            match outcome {
                Ok(result) => {
                    for (wire, value) in result.writes {
                        let idx = wire as usize;
                        assert!(!solved[idx], "wire {wire} solved twice");
                        values[idx] = value;
                        solved[idx] = true;
                    }
                    if let Some((row_index, x, y, z)) = result.aux {
                        slot0[row_index] = x;
                        slot1[row_index] = y;
                        slot2[row_index] = z;
                    }
                }
                Err(err) => solve_error = Some(pick_earliest(solve_error.take(), err)),
            }
        }
        if solve_error.is_some() {
            break;
        }
    }

    let final_error = solve_error.map(|err| attach_debug(system, &values, &solved, err));

    for entry in system.user_logs() {
        let message = resolve_entry(entry, system.coefficients(), &values, &solved);
        config.log_sink.emit(&message);
    }

    if let Some(err) = final_error {
        return Err(err.error);
    }

    let nb_solved = solved.iter().filter(|s| **s).count();
    assert_eq!(nb_solved, n, "SolverIncomplete: solved {nb_solved} of {n} wires (frontend/leveller invariant violated)");

    Ok(match dialect {
        Dialect::R1C => Solution::R1CS(R1CSSolution { w: values, a: slot0, b: slot1, c: slot2 }),
        Dialect::SparseR1C => Solution::SparseR1CS(SparseR1CSSolution { w: values, l: slot0, r: slot1, o: slot2 }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{R1CBlueprint, SparseR1CBlueprint};
    use crate::hint::{HintFunctions, HintId};
    use crate::row::{LinearExpression, R1C, SparseR1C};
    use cs_fields::toy::ToyField;
    use std::sync::Arc;

    struct NullLogSink;
    impl LogSink for NullLogSink {
        fn emit(&self, _message: &str) {}
    }

    fn term(coeff_id: crate::coeff::CoeffId, wire: WireId) -> Term {
        Term::new(coeff_id, wire)
    }

    fn one<F: Field>(system: &mut System<F>) -> crate::coeff::CoeffId {
        system.add_coefficient(F::one())
    }

    #[test]
    fn trivial_multiplication() {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(R1CBlueprint));
        let x = system.new_public_wire();
        let y = system.new_public_wire();
        let z = system.new_internal_wire();
        let one_id = one(&mut system);
        let row = R1C { l: vec![term(one_id, x)], r: vec![term(one_id, y)], o: vec![term(one_id, z)] };
        system.add_r1c(row, bp, Some(z));
        system.freeze();

        let witness = vec![ToyField::from_u64(3), ToyField::from_u64(5)];
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let solution = solve(&system, &witness, config).expect("satisfiable");
        match solution {
            Solution::R1CS(sol) => {
                assert_eq!(sol.w[z as usize], ToyField::from_u64(15));
                assert_eq!(sol.a, vec![ToyField::from_u64(3)]);
                assert_eq!(sol.b, vec![ToyField::from_u64(5)]);
                assert_eq!(sol.c, vec![ToyField::from_u64(15)]);
            }
            _ => panic!("expected an R1CS solution"),
        }
    }

    #[test]
    fn unsatisfied_assertion_reports_its_row_index() {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(R1CBlueprint));
        let x = system.new_public_wire();
        let y = system.new_public_wire();
        let one_id = one(&mut system);
        // x * x = y, asserted with no unknown wire.
        let row = R1C { l: vec![term(one_id, x)], r: vec![term(one_id, x)], o: vec![term(one_id, y)] };
        system.add_r1c(row, bp, None);
        system.freeze();

        let witness = vec![ToyField::from_u64(2), ToyField::from_u64(3)];
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let err = solve(&system, &witness, config).unwrap_err();
        match err {
            SolverError::UnsatisfiedConstraint { constraint_index, .. } => assert_eq!(constraint_index, 0),
            other => panic!("expected UnsatisfiedConstraint, got {other:?}"),
        }
    }

    fn inverse_hint() -> std::sync::Arc<crate::hint::HintFn> {
        Arc::new(|modulus, inputs, outputs| {
            let x = &inputs[0];
            if x.sign() == num_bigint::Sign::NoSign {
                return Err(HintError("cannot invert zero".to_string()));
            }
            let exponent = modulus - 2u32;
            outputs[0] = x.modpow(&exponent, modulus);
            Ok(())
        })
    }

    #[test]
    fn hint_produced_wire_computes_inverse() {
        let mut system = System::<ToyField>::new();
        let r1c_bp = system.add_blueprint(Box::new(R1CBlueprint));
        let hint_bp = system.add_blueprint(Box::new(crate::blueprint::HintBlueprint { nb_outputs: 1 }));
        let x = system.new_public_wire();
        let inv = system.new_internal_wire();
        let one_id = one(&mut system);

        let hint_id = HintId::from_name("inverse");
        let mapping = HintMapping { hint_id, inputs: vec![vec![term(one_id, x)]], outputs: vec![inv] };
        system.add_hint(mapping, hint_bp, "inverse");

        let row = R1C { l: vec![term(one_id, x)], r: vec![term(one_id, inv)], o: vec![term(one_id, ONE_WIRE)] };
        system.add_r1c(row, r1c_bp, None);
        system.freeze();

        let witness = vec![ToyField::from_u64(7)];
        let mut hints = HintFunctions::new();
        hints.bind(hint_id, inverse_hint());
        let config = SolverConfig { hint_functions: &hints, log_sink: &NullLogSink };
        let solution = solve(&system, &witness, config).expect("satisfiable");
        match solution {
            Solution::R1CS(sol) => {
                let expected = ToyField::from_u64(7).inverse().unwrap();
                assert_eq!(sol.w[inv as usize], expected);
            }
            _ => panic!("expected an R1CS solution"),
        }
    }

    #[test]
    fn missing_hint_binding_is_reported_before_any_solving() {
        let mut system = System::<ToyField>::new();
        let r1c_bp = system.add_blueprint(Box::new(R1CBlueprint));
        let hint_bp = system.add_blueprint(Box::new(crate::blueprint::HintBlueprint { nb_outputs: 1 }));
        let x = system.new_public_wire();
        let inv = system.new_internal_wire();
        let one_id = one(&mut system);

        let hint_id = HintId::from_name("inverse");
        let inputs: Vec<LinearExpression> = vec![vec![term(one_id, x)]];
        system.add_hint(HintMapping { hint_id, inputs, outputs: vec![inv] }, hint_bp, "inverse");
        let row = R1C { l: vec![term(one_id, x)], r: vec![term(one_id, inv)], o: vec![term(one_id, ONE_WIRE)] };
        system.add_r1c(row, r1c_bp, None);
        system.freeze();

        let witness = vec![ToyField::from_u64(7)];
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let err = solve(&system, &witness, config).unwrap_err();
        match err {
            SolverError::MissingHint { names } => assert_eq!(names, vec!["inverse".to_string()]),
            other => panic!("expected MissingHint, got {other:?}"),
        }
    }

    #[test]
    fn large_independent_level_solves_in_parallel() {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(R1CBlueprint));
        let one_id = one(&mut system);
        let n = 2000;
        let mut public = Vec::with_capacity(n);
        let mut squares = Vec::with_capacity(n);
        for _ in 0..n {
            let w = system.new_public_wire();
            let sq = system.new_internal_wire();
            public.push(w);
            squares.push(sq);
            let row = R1C { l: vec![term(one_id, w)], r: vec![term(one_id, w)], o: vec![term(one_id, sq)] };
            system.add_r1c(row, bp, Some(sq));
        }
        system.freeze();
        assert_eq!(system.levels().len(), 1);

        let witness: Vec<ToyField> = (0..n as u64).map(ToyField::from_u64).collect();
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let solution = solve(&system, &witness, config).expect("satisfiable");
        match solution {
            Solution::R1CS(sol) => {
                for i in 0..n {
                    let expected = witness[i].mul(&witness[i]);
                    assert_eq!(sol.w[squares[i] as usize], expected);
                }
            }
            _ => panic!("expected an R1CS solution"),
        }
    }

    #[test]
    fn sparse_commitment_row_is_skipped() {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(SparseR1CBlueprint));
        let one_id = one(&mut system);
        let zero_id = crate::coeff::COEFF_ID_ZERO;
        let a = system.new_public_wire();
        let b = system.new_public_wire();

        let committed = SparseR1C {
            l: term(zero_id, a),
            r: term(zero_id, b),
            o: term(zero_id, a),
            m: [term(zero_id, a), term(zero_id, b)],
            k: zero_id,
            commitment: CommitmentTag::Committed,
        };
        system.add_sparse_r1c(committed, bp, None);

        // qL*a + qR*b - c = 0, c = a + b, fully determined (assertion row).
        let c = system.new_internal_wire();
        let check = SparseR1C {
            l: term(one_id, a),
            r: term(one_id, b),
            o: term(crate::coeff::COEFF_ID_MINUS_ONE, c),
            m: [term(zero_id, a), term(zero_id, b)],
            k: zero_id,
            commitment: CommitmentTag::Not,
        };
        system.add_sparse_r1c(check, bp, Some(c));
        system.freeze();

        let witness = vec![ToyField::from_u64(4), ToyField::from_u64(9)];
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let solution = solve(&system, &witness, config).expect("satisfiable");
        match solution {
            Solution::SparseR1CS(sol) => {
                assert_eq!(sol.w[c as usize], ToyField::from_u64(13));
                assert_eq!(sol.l.len(), 2);
            }
            _ => panic!("expected a SparseR1CS solution"),
        }
    }

    #[test]
    fn sparse_quadratic_gate_solves_for_its_multiplication_operand() {
        // a*b = c (qM=1, qL=qR=0, qO=-1, k=0), solving for b given a and c.
        // M[1]'s wire is the very wire the R branch is solving for, which
        // must not be resolved before the branch picks L/R/O apart.
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(SparseR1CBlueprint));
        let one_id = one(&mut system);
        let zero_id = crate::coeff::COEFF_ID_ZERO;
        let a = system.new_public_wire();
        let c = system.new_public_wire();
        let b = system.new_internal_wire();

        let row = SparseR1C {
            l: term(zero_id, a),
            r: term(zero_id, b),
            o: term(crate::coeff::COEFF_ID_MINUS_ONE, c),
            m: [term(one_id, a), term(one_id, b)],
            k: zero_id,
            commitment: CommitmentTag::Not,
        };
        system.add_sparse_r1c(row, bp, Some(b));
        system.freeze();

        let witness = vec![ToyField::from_u64(4), ToyField::from_u64(12)];
        let config = SolverConfig { hint_functions: &HintFunctions::new(), log_sink: &NullLogSink };
        let solution = solve(&system, &witness, config).expect("satisfiable");
        match solution {
            Solution::SparseR1CS(sol) => assert_eq!(sol.w[b as usize], ToyField::from_u64(3)),
            _ => panic!("expected a SparseR1CS solution"),
        }
    }
}
