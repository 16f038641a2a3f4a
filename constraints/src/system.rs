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

//! The constraint-system container: built additively by a frontend, then
//! frozen and handed to the solver as a shared, read-only reference.

use crate::blueprint::{Blueprint, BlueprintId, BlueprintKind, VARIABLE_ARITY};
use crate::coeff::CoeffTable;
use crate::hint::{HintId, HintMapping};
use crate::instruction::{Instruction, InstructionId};
use crate::level::Leveller;
use crate::log::{LogEntry, SymbolTable};
use crate::row::{Term, R1C, SparseR1C};
use crate::wire::{WireId, ONE_WIRE};
use cs_fields::Field;
use std::collections::{HashMap, HashSet};

pub type ConstraintId = usize;

/// Which constraint dialect a [`System`] has accumulated rows for.
///
/// A system mixes at most one of the two; `add_r1c` and `add_sparse_r1c`
/// assert against this once the first row has picked a dialect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Dialect {
    R1C,
    SparseR1C,
}

/// The in-memory constraint graph: coefficient table, instruction stream,
/// blueprint registry, wire bookkeeping, hint bindings and user log rows.
///
/// Built additively through its `add_*` methods, then [`System::freeze`]d.
/// The solver only ever sees a frozen system.
pub struct System<F: Field> {
    coefficients: CoeffTable<F>,
    coeff_neg_inv: Vec<Option<F>>,

    calldata: Vec<u32>,
    instructions: Vec<Instruction>,
    blueprints: Vec<Box<dyn Blueprint<F>>>,

    public_wires: usize,
    secret_wires: usize,
    nb_internal_wires: usize,
    nb_constraints: usize,

    hint_mappings: Vec<HintMapping>,
    hint_output_index: HashMap<WireId, usize>,
    hint_dependencies: HashMap<HintId, String>,

    leveller: Option<Leveller>,
    levels: Vec<Vec<InstructionId>>,

    debug_info: Vec<LogEntry>,
    debug_index: HashMap<InstructionId, usize>,
    user_logs: Vec<LogEntry>,
    symbol_table: SymbolTable,

    produced_wires: HashSet<WireId>,
    read_wires: HashSet<WireId>,

    dialect: Option<Dialect>,
    frozen: bool,
}

impl<F: Field> System<F> {
    pub fn new() -> Self {
        System {
            coefficients: CoeffTable::new(),
            coeff_neg_inv: Vec::new(),
            calldata: Vec::new(),
            instructions: Vec::new(),
            blueprints: Vec::new(),
            public_wires: 0,
            secret_wires: 0,
            nb_internal_wires: 0,
            nb_constraints: 0,
            hint_mappings: Vec::new(),
            hint_output_index: HashMap::new(),
            hint_dependencies: HashMap::new(),
            leveller: Some(Leveller::new()),
            levels: Vec::new(),
            debug_info: Vec::new(),
            debug_index: HashMap::new(),
            user_logs: Vec::new(),
            symbol_table: SymbolTable::new(),
            produced_wires: HashSet::new(),
            read_wires: HashSet::new(),
            dialect: None,
            frozen: false,
        }
    }

    /// The constraint dialect this system has committed to, if any row has
    /// been added yet.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    fn commit_dialect(&mut self, dialect: Dialect) {
        match self.dialect {
            None => self.dialect = Some(dialect),
            Some(existing) => assert_eq!(existing, dialect, "a system may not mix R1C and Sparse R1C rows"),
        }
    }

    pub fn modulus(&self) -> num_bigint::BigUint {
        F::modulus()
    }

    // -- wire bookkeeping ---------------------------------------------------

    pub fn new_public_wire(&mut self) -> WireId {
        self.public_wires += 1;
        (self.public_wires + self.secret_wires) as WireId
    }

    pub fn new_secret_wire(&mut self) -> WireId {
        self.secret_wires += 1;
        (self.public_wires + self.secret_wires) as WireId
    }

    pub fn new_internal_wire(&mut self) -> WireId {
        let wire = (1 + self.public_wires + self.secret_wires + self.nb_internal_wires) as WireId;
        self.nb_internal_wires += 1;
        wire
    }

    pub fn public_wires(&self) -> usize {
        self.public_wires
    }

    pub fn secret_wires(&self) -> usize {
        self.secret_wires
    }

    pub fn nb_internal_wires(&self) -> usize {
        self.nb_internal_wires
    }

    /// Total number of wires, including [`ONE_WIRE`].
    pub fn nb_wires(&self) -> usize {
        1 + self.public_wires + self.secret_wires + self.nb_internal_wires
    }

    pub fn nb_constraints(&self) -> usize {
        self.nb_constraints
    }

    // -- coefficient table ----------------------------------------------------

    pub fn add_coefficient(&mut self, element: F) -> crate::coeff::CoeffId {
        self.coefficients.add_coeff(element)
    }

    pub fn coefficients(&self) -> &CoeffTable<F> {
        &self.coefficients
    }

    pub fn coeff_neg_inv(&self) -> &[Option<F>] {
        &self.coeff_neg_inv
    }

    // -- blueprint registry ---------------------------------------------------

    pub fn add_blueprint(&mut self, blueprint: Box<dyn Blueprint<F>>) -> BlueprintId {
        self.blueprints.push(blueprint);
        (self.blueprints.len() - 1) as BlueprintId
    }

    pub fn blueprint(&self, id: BlueprintId) -> &dyn Blueprint<F> {
        self.blueprints[id as usize].as_ref()
    }

    pub fn nb_blueprints(&self) -> usize {
        self.blueprints.len()
    }

    /// The blueprint registry, in id order. Used by the persisted form to
    /// record each blueprint's kind (and, for hint blueprints, its output
    /// arity) without serialising the trait object itself.
    pub fn blueprints(&self) -> &[Box<dyn Blueprint<F>>] {
        &self.blueprints
    }

    // -- row emission ---------------------------------------------------------

    fn push_instruction(&mut self, blueprint_id: BlueprintId, kind: BlueprintKind, calldata: Vec<u32>, nb_constraints: usize) -> InstructionId {
        let id = self.instructions.len() as InstructionId;
        let instruction = Instruction {
            blueprint_id,
            constraint_offset: self.nb_constraints as u32,
            calldata_start: self.calldata.len() as u32,
            kind,
        };
        self.calldata.extend(calldata);
        self.instructions.push(instruction);
        self.nb_constraints += nb_constraints;
        id
    }

    fn mark_terms(&mut self, terms: impl IntoIterator<Item = Term>, exclude: Option<WireId>) -> Vec<WireId> {
        let mut inputs = Vec::new();
        for term in terms {
            if term.is_constant {
                continue;
            }
            self.read_wires.insert(term.wire);
            if Some(term.wire) != exclude {
                inputs.push(term.wire);
            }
        }
        inputs
    }

    /// Appends an R1C row. `target`, when present, is the unique wire this
    /// row defines (the frontend always knows this; see §3 invariant 3).
    pub fn add_r1c(&mut self, row: R1C, blueprint_id: BlueprintId, target: Option<WireId>) -> ConstraintId {
        assert!(!self.frozen, "cannot add constraints to a frozen system");
        self.commit_dialect(Dialect::R1C);
        let constraint_id = self.nb_constraints;
        let calldata = crate::blueprint::R1CBlueprint::encode(&row.l, &row.r, &row.o);
        let nb_constraints = {
            let bp: &dyn Blueprint<F> = self.blueprints[blueprint_id as usize].as_ref();
            bp.nb_constraints()
        };

        let terms = row.l.into_iter().chain(row.r).chain(row.o);
        let inputs = self.mark_terms(terms, target);
        if let Some(w) = target {
            self.produced_wires.insert(w);
        }

        let inst_id = self.push_instruction(blueprint_id, BlueprintKind::R1C, calldata, nb_constraints);
        if let Some(leveller) = self.leveller.as_mut() {
            leveller.record(inst_id, inputs, target.into_iter());
        }
        constraint_id
    }

    /// Appends a Sparse R1C row. `target` mirrors [`System::add_r1c`]; absent
    /// for rows that are pure assertions (`loc == -1` at solve time) or that
    /// carry a commitment tag.
    pub fn add_sparse_r1c(&mut self, row: SparseR1C, blueprint_id: BlueprintId, target: Option<WireId>) -> ConstraintId {
        assert!(!self.frozen, "cannot add constraints to a frozen system");
        self.commit_dialect(Dialect::SparseR1C);
        let constraint_id = self.nb_constraints;
        let calldata = crate::blueprint::SparseR1CBlueprint::encode(&row);
        let nb_constraints = {
            let bp: &dyn Blueprint<F> = self.blueprints[blueprint_id as usize].as_ref();
            bp.nb_constraints()
        };

        let terms = [row.l, row.r, row.o, row.m[0], row.m[1]];
        let inputs = self.mark_terms(terms, target);
        if let Some(w) = target {
            self.produced_wires.insert(w);
        }

        let inst_id = self.push_instruction(blueprint_id, BlueprintKind::SparseR1C, calldata, nb_constraints);
        if let Some(leveller) = self.leveller.as_mut() {
            leveller.record(inst_id, inputs, target.into_iter());
        }
        constraint_id
    }

    /// Registers a hint mapping, recording one of its declared outputs'
    /// dependency level and binding every output wire to this mapping.
    pub fn add_hint(&mut self, hint: HintMapping, blueprint_id: BlueprintId, declared_name: impl Into<String>) {
        assert!(!self.frozen, "cannot add hints to a frozen system");
        self.hint_dependencies.insert(hint.hint_id, declared_name.into());

        let calldata = crate::blueprint::HintBlueprint::encode(hint.hint_id, &hint.inputs, &hint.outputs);
        let mut inputs = Vec::new();
        for expr in &hint.inputs {
            for term in expr {
                if !term.is_constant {
                    self.read_wires.insert(term.wire);
                    inputs.push(term.wire);
                }
            }
        }
        for &wire in &hint.outputs {
            self.produced_wires.insert(wire);
        }

        let inst_id = self.push_instruction(blueprint_id, BlueprintKind::Hint, calldata, 0);
        if let Some(leveller) = self.leveller.as_mut() {
            leveller.record(inst_id, inputs, hint.outputs.iter().copied());
        }

        let index = self.hint_mappings.len();
        for &wire in &hint.outputs {
            self.hint_output_index.insert(wire, index);
        }
        self.hint_mappings.push(hint);
    }

    pub fn hint_mapping_for(&self, wire: WireId) -> Option<&HintMapping> {
        self.hint_output_index.get(&wire).map(|&i| &self.hint_mappings[i])
    }

    pub fn hint_dependencies(&self) -> &HashMap<HintId, String> {
        &self.hint_dependencies
    }

    pub fn hint_mappings(&self) -> &[HintMapping] {
        &self.hint_mappings
    }

    // -- diagnostics ------------------------------------------------------------

    pub fn attach_debug(&mut self, instruction: InstructionId, entry: LogEntry) {
        let index = self.debug_info.len();
        self.debug_info.push(entry);
        self.debug_index.insert(instruction, index);
    }

    pub fn append_log(&mut self, entry: LogEntry) {
        self.user_logs.push(entry);
    }

    pub fn symbol_table_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbol_table
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn user_logs(&self) -> &[LogEntry] {
        &self.user_logs
    }

    pub fn debug_entry_for(&self, instruction: InstructionId) -> Option<&LogEntry> {
        self.debug_index.get(&instruction).map(|&i| &self.debug_info[i])
    }

    pub fn debug_info(&self) -> &[LogEntry] {
        &self.debug_info
    }

    pub fn debug_index(&self) -> &HashMap<InstructionId, usize> {
        &self.debug_index
    }

    pub fn produced_wires(&self) -> &HashSet<WireId> {
        &self.produced_wires
    }

    pub fn read_wires(&self) -> &HashSet<WireId> {
        &self.read_wires
    }

    // -- access used by the solver ------------------------------------------

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn calldata(&self) -> &[u32] {
        &self.calldata
    }

    pub fn levels(&self) -> &[Vec<InstructionId>] {
        &self.levels
    }

    pub fn get_calldata(&self, instruction: &Instruction) -> &[u32] {
        let blueprint = self.blueprints[instruction.blueprint_id as usize].as_ref();
        let start = instruction.calldata_start as usize;
        let n = if blueprint.nb_inputs() == VARIABLE_ARITY {
            self.calldata[start] as usize
        } else {
            blueprint.nb_inputs() as usize
        };
        &self.calldata[start..start + n]
    }

    /// Freezes the system: no further constraints, hints or instructions may
    /// be added. Computes the final dependency levels and the negated
    /// coefficient inverses the Sparse R1C solver's `Solve O` path needs.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.frozen = true;
        let leveller = self.leveller.take().expect("freeze called twice");
        self.levels = leveller.finish();
        self.coeff_neg_inv = self.coefficients.neg_inverses();
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// A genuine orphan-wire check (the original implementation this crate's
    /// design note references left this as a no-op; see DESIGN.md for why we
    /// do not). Returns every non-constant wire that is never read, never
    /// produced, and never a hint output.
    pub fn check_unconstrained_wires(&self) -> Vec<WireId> {
        let mut orphans = Vec::new();
        for wire in 1..self.nb_wires() as WireId {
            let touched = self.read_wires.contains(&wire)
                || self.produced_wires.contains(&wire)
                || self.hint_output_index.contains_key(&wire);
            if !touched {
                orphans.push(wire);
            }
        }
        orphans
    }
}

impl<F: Field> Default for System<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> System<F> {
    /// Reconstructs an already-frozen system from its persisted parts (see
    /// [`crate::serialize`]). `levels` is trusted as-is rather than
    /// recomputed: it was itself part of the persisted stream.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        coefficients: CoeffTable<F>,
        coeff_neg_inv: Vec<Option<F>>,
        calldata: Vec<u32>,
        instructions: Vec<Instruction>,
        blueprints: Vec<Box<dyn Blueprint<F>>>,
        public_wires: usize,
        secret_wires: usize,
        nb_internal_wires: usize,
        nb_constraints: usize,
        hint_mappings: Vec<HintMapping>,
        hint_dependencies: HashMap<HintId, String>,
        debug_info: Vec<LogEntry>,
        debug_index: HashMap<InstructionId, usize>,
        user_logs: Vec<LogEntry>,
        symbol_table: SymbolTable,
        levels: Vec<Vec<InstructionId>>,
        dialect: Option<Dialect>,
    ) -> Self {
        let mut hint_output_index = HashMap::new();
        let mut produced_wires = HashSet::new();
        for (index, mapping) in hint_mappings.iter().enumerate() {
            for &wire in &mapping.outputs {
                hint_output_index.insert(wire, index);
                produced_wires.insert(wire);
            }
        }

        let read_wires = rebuild_read_wires(&instructions, &blueprints, &calldata);

        System {
            coefficients,
            coeff_neg_inv,
            calldata,
            instructions,
            blueprints,
            public_wires,
            secret_wires,
            nb_internal_wires,
            nb_constraints,
            hint_mappings,
            hint_output_index,
            hint_dependencies,
            leveller: None,
            levels,
            debug_info,
            debug_index,
            user_logs,
            symbol_table,
            produced_wires,
            read_wires,
            dialect,
            frozen: true,
        }
    }
}

/// Best-effort reconstruction of [`System::read_wires`] from the decoded
/// instruction stream alone, for systems rebuilt by [`crate::serialize`].
/// Every non-constant term of every R1C/Sparse R1C row and every hint input
/// is marked touched; this is sufficient for
/// [`System::check_unconstrained_wires`] to agree with the system that was
/// originally built, even though the original build-time distinction
/// between "read as input" and "read as this row's own target" is not
/// recoverable from calldata alone.
fn rebuild_read_wires<F: Field>(instructions: &[Instruction], blueprints: &[Box<dyn Blueprint<F>>], calldata: &[u32]) -> HashSet<WireId> {
    let mut read_wires = HashSet::new();
    for instruction in instructions {
        let blueprint = blueprints[instruction.blueprint_id as usize].as_ref();
        let start = instruction.calldata_start as usize;
        let n = if blueprint.nb_inputs() == VARIABLE_ARITY { calldata[start] as usize } else { blueprint.nb_inputs() as usize };
        let slice = &calldata[start..start + n];

        let mut mark = |terms: &[Term]| {
            for term in terms {
                if !term.is_constant {
                    read_wires.insert(term.wire);
                }
            }
        };

        match instruction.kind {
            BlueprintKind::R1C => {
                let row = blueprint.decompress_r1c(slice);
                mark(&row.l);
                mark(&row.r);
                mark(&row.o);
            }
            BlueprintKind::SparseR1C => {
                let row = blueprint.decompress_sparse_r1c(slice);
                mark(&[row.l, row.r, row.o, row.m[0], row.m[1]]);
            }
            BlueprintKind::Hint => {
                let mapping = blueprint.decompress_hint(slice);
                for expr in &mapping.inputs {
                    mark(expr);
                }
            }
        }
    }
    read_wires
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_fields::toy::ToyField;

    fn simple_system() -> System<ToyField> {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(crate::blueprint::R1CBlueprint));
        let x = system.new_public_wire();
        let y = system.new_public_wire();
        let z = system.new_internal_wire();
        let one_id = system.add_coefficient(ToyField::one());
        let row = R1C { l: vec![Term::new(one_id, x)], r: vec![Term::new(one_id, y)], o: vec![Term::new(one_id, z)] };
        system.add_r1c(row, bp, Some(z));
        system
    }

    #[test]
    fn freeze_computes_one_level() {
        let mut system = simple_system();
        assert_eq!(system.nb_wires(), 4); // ONE_WIRE + x + y + z
        system.freeze();
        assert_eq!(system.levels().len(), 1);
        assert_eq!(system.levels()[0], vec![0]);
    }

    #[test]
    fn calldata_round_trips_through_blueprint() {
        let mut system = simple_system();
        system.freeze();
        let instruction = system.instructions()[0];
        let calldata = system.get_calldata(&instruction).to_vec();
        let bp: &dyn Blueprint<ToyField> = system.blueprint(instruction.blueprint_id);
        let row = bp.decompress_r1c(&calldata);
        assert_eq!(row.l.len(), 1);
        assert_eq!(row.r.len(), 1);
        assert_eq!(row.o.len(), 1);
    }

    #[test]
    fn one_wire_is_reserved() {
        assert_eq!(ONE_WIRE, 0);
    }

    #[test]
    fn unconstrained_wire_is_reported() {
        let mut system = System::<ToyField>::new();
        let _orphan = system.new_public_wire();
        assert_eq!(system.check_unconstrained_wires(), vec![1]);
    }
}
