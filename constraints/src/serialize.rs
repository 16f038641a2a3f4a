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

//! The persisted tagged-binary form of a [`System`] (§6 "Persisted form").
//!
//! A stream is a small fixed header — magic, version, a caller-chosen
//! `curve_id`, and the field's modulus — followed by one `bincode`-encoded
//! body carrying the coefficient table, the blueprint registry (recorded by
//! kind, not as trait objects), the calldata buffer, the instruction vector,
//! wire counts, hint mappings, debug tables, user logs and levels. The
//! reader validates the header — and, after decoding, the body's element
//! counts against [`MAX_ARRAY_ELEMENTS`] — before trusting any of it.

use crate::blueprint::{Blueprint, BlueprintKind, HintBlueprint, R1CBlueprint, SparseR1CBlueprint};
use crate::coeff::CoeffTable;
use crate::error::SerializationError;
use crate::hint::{HintId, HintMapping};
use crate::instruction::{Instruction, InstructionId};
use crate::log::{LogEntry, SymbolTable};
use crate::system::{Dialect, System};
use bincode::Options;
use cs_fields::Field;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// `b"CSYS"` read as a little-endian `u32`.
pub const MAGIC: u32 = 0x53595343;

/// The only stream version this crate writes or accepts.
pub const VERSION: u32 = 1;

/// Mirrors the Go original's `cbor.DecOptions{MaxArrayElements, MaxMapPairs}`
/// guard: no single `Vec`/map decoded from a stream may exceed this length.
pub const MAX_ARRAY_ELEMENTS: u64 = 1 << 27;

/// An upper bound on total decoded body bytes, so a corrupt or hostile
/// length prefix fails fast instead of driving an unbounded allocation.
const MAX_BODY_BYTES: u64 = 1 << 33;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_BODY_BYTES).with_fixint_encoding()
}

/// A blueprint's shape, recorded without serialising the trait object
/// itself. `R1CBlueprint`/`SparseR1CBlueprint` carry no per-instance state;
/// `HintBlueprint` carries its output arity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
enum BlueprintRecord {
    R1C,
    SparseR1C,
    Hint { nb_outputs: usize },
}

/// One field element's fixed-width encoding, carried as raw bytes so the
/// body doesn't need `F: Serialize`.
type ElementBytes = Vec<u8>;

#[derive(Serialize, Deserialize)]
struct SystemBody {
    coefficients: Vec<ElementBytes>,
    calldata: Vec<u32>,
    instructions: Vec<Instruction>,
    blueprints: Vec<BlueprintRecord>,
    public_wires: usize,
    secret_wires: usize,
    nb_internal_wires: usize,
    nb_constraints: usize,
    hint_mappings: Vec<HintMapping>,
    hint_dependencies: Vec<(HintId, String)>,
    debug_info: Vec<LogEntry>,
    debug_index: Vec<(InstructionId, usize)>,
    user_logs: Vec<LogEntry>,
    symbol_table: Vec<String>,
    levels: Vec<Vec<InstructionId>>,
    dialect: Option<Dialect>,
}

fn blueprint_record<F: Field>(blueprint: &dyn Blueprint<F>) -> BlueprintRecord {
    match blueprint.kind() {
        BlueprintKind::R1C => BlueprintRecord::R1C,
        BlueprintKind::SparseR1C => BlueprintRecord::SparseR1C,
        BlueprintKind::Hint => BlueprintRecord::Hint { nb_outputs: blueprint.nb_outputs() },
    }
}

fn build_blueprint<F: Field>(record: BlueprintRecord) -> Box<dyn Blueprint<F>> {
    match record {
        BlueprintRecord::R1C => Box::new(R1CBlueprint),
        BlueprintRecord::SparseR1C => Box::new(SparseR1CBlueprint),
        BlueprintRecord::Hint { nb_outputs } => Box::new(HintBlueprint { nb_outputs }),
    }
}

/// Serialises `system` — which must already be [`System::freeze`]d — as the
/// persisted tagged-binary stream, writing `curve_id` into the header
/// verbatim (this crate assigns no meaning to it; it is the caller's curve
/// discriminant, round-tripped so [`read_system`] can reject a stream from
/// the wrong curve before even checking the modulus).
pub fn write_system<F: Field, W: Write>(system: &System<F>, curve_id: u32, mut writer: W) -> Result<(), SerializationError> {
    assert!(system.is_frozen(), "write_system requires a frozen system");

    writer.write_all(&MAGIC.to_le_bytes())?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&curve_id.to_le_bytes())?;

    let modulus = F::modulus().to_bytes_le();
    writer.write_all(&(modulus.len() as u32).to_le_bytes())?;
    writer.write_all(&modulus)?;

    let body = SystemBody {
        coefficients: system.coefficients().as_slice().iter().map(Field::to_bytes_le).collect(),
        calldata: system.calldata().to_vec(),
        instructions: system.instructions().to_vec(),
        blueprints: system.blueprints().iter().map(|b| blueprint_record(b.as_ref())).collect(),
        public_wires: system.public_wires(),
        secret_wires: system.secret_wires(),
        nb_internal_wires: system.nb_internal_wires(),
        nb_constraints: system.nb_constraints(),
        hint_mappings: system.hint_mappings().to_vec(),
        hint_dependencies: system.hint_dependencies().iter().map(|(id, name)| (*id, name.clone())).collect(),
        debug_info: system.debug_info().to_vec(),
        debug_index: system.debug_index().iter().map(|(id, idx)| (*id, *idx)).collect(),
        user_logs: system.user_logs().to_vec(),
        symbol_table: system.symbol_table().locations().to_vec(),
        levels: system.levels().to_vec(),
        dialect: system.dialect(),
    };

    let encoded = bincode_options().serialize(&body)?;
    writer.write_all(&encoded)?;
    Ok(())
}

/// Inverse of [`write_system`]. Rejects the stream before materialising its
/// body if the header's magic, version or modulus don't match, or if
/// `expected_curve_id` doesn't match the header's `curve_id`.
pub fn read_system<F: Field, R: Read>(mut reader: R, expected_curve_id: u32) -> Result<System<F>, SerializationError> {
    let mut u32_buf = [0u8; 4];

    reader.read_exact(&mut u32_buf)?;
    let magic = u32::from_le_bytes(u32_buf);
    if magic != MAGIC {
        return Err(SerializationError::BadMagic { expected: MAGIC, found: magic });
    }

    reader.read_exact(&mut u32_buf)?;
    let version = u32::from_le_bytes(u32_buf);
    if version != VERSION {
        return Err(SerializationError::UnsupportedVersion { version });
    }

    reader.read_exact(&mut u32_buf)?;
    let curve_id = u32::from_le_bytes(u32_buf);
    if curve_id != expected_curve_id {
        return Err(SerializationError::CurveMismatch { expected: expected_curve_id, found: curve_id });
    }

    reader.read_exact(&mut u32_buf)?;
    let modulus_len = u32::from_le_bytes(u32_buf) as usize;
    if modulus_len as u64 > MAX_ARRAY_ELEMENTS {
        return Err(SerializationError::LimitExceeded { what: "modulus bytes", found: modulus_len as u64, max: MAX_ARRAY_ELEMENTS });
    }
    let mut modulus_bytes = vec![0u8; modulus_len];
    reader.read_exact(&mut modulus_bytes)?;
    if num_bigint::BigUint::from_bytes_le(&modulus_bytes) != F::modulus() {
        return Err(SerializationError::ModulusMismatch);
    }

    let body: SystemBody = bincode_options().deserialize_from(reader)?;

    check_limit("coefficients", body.coefficients.len())?;
    check_limit("calldata", body.calldata.len())?;
    check_limit("instructions", body.instructions.len())?;
    check_limit("hint_mappings", body.hint_mappings.len())?;
    check_limit("debug_info", body.debug_info.len())?;
    check_limit("user_logs", body.user_logs.len())?;
    check_limit("levels", body.levels.len())?;

    let coefficients: Vec<F> = body
        .coefficients
        .iter()
        .map(|bytes| F::from_bytes_le(bytes))
        .collect::<Result<_, _>>()
        .map_err(|_| SerializationError::ModulusMismatch)?;
    let coeff_table = CoeffTable::from_raw(coefficients);
    let coeff_neg_inv = coeff_table.neg_inverses();

    let blueprints: Vec<Box<dyn Blueprint<F>>> = body.blueprints.into_iter().map(build_blueprint).collect();

    let hint_dependencies = body.hint_dependencies.into_iter().collect();
    let debug_index = body.debug_index.into_iter().collect();
    let symbol_table = SymbolTable::from_locations(body.symbol_table);

    Ok(System::from_parts(
        coeff_table,
        coeff_neg_inv,
        body.calldata,
        body.instructions,
        blueprints,
        body.public_wires,
        body.secret_wires,
        body.nb_internal_wires,
        body.nb_constraints,
        body.hint_mappings,
        hint_dependencies,
        body.debug_info,
        debug_index,
        body.user_logs,
        symbol_table,
        body.levels,
        body.dialect,
    ))
}

fn check_limit(what: &'static str, found: usize) -> Result<(), SerializationError> {
    if found as u64 > MAX_ARRAY_ELEMENTS {
        Err(SerializationError::LimitExceeded { what, found: found as u64, max: MAX_ARRAY_ELEMENTS })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::R1CBlueprint;
    use crate::row::{Term, R1C};
    use cs_fields::toy::ToyField;

    fn sample_system() -> System<ToyField> {
        let mut system = System::<ToyField>::new();
        let bp = system.add_blueprint(Box::new(R1CBlueprint));
        let x = system.new_public_wire();
        let y = system.new_public_wire();
        let z = system.new_internal_wire();
        let one_id = system.add_coefficient(ToyField::one());
        let row = R1C { l: vec![Term::new(one_id, x)], r: vec![Term::new(one_id, y)], o: vec![Term::new(one_id, z)] };
        system.add_r1c(row, bp, Some(z));
        system.freeze();
        system
    }

    #[test]
    fn round_trips_a_system() {
        let system = sample_system();
        let mut buf = Vec::new();
        write_system(&system, 7, &mut buf).unwrap();

        let restored: System<ToyField> = read_system(&buf[..], 7).unwrap();
        assert_eq!(restored.nb_wires(), system.nb_wires());
        assert_eq!(restored.nb_constraints(), system.nb_constraints());
        assert_eq!(restored.levels(), system.levels());
        assert_eq!(restored.instructions().len(), system.instructions().len());
        assert!(restored.is_frozen());
    }

    #[test]
    fn serialising_twice_is_byte_identical() {
        let system = sample_system();
        let mut first = Vec::new();
        write_system(&system, 7, &mut first).unwrap();
        let restored: System<ToyField> = read_system(&first[..], 7).unwrap();

        let mut second = Vec::new();
        write_system(&restored, 7, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_magic() {
        let system = sample_system();
        let mut buf = Vec::new();
        write_system(&system, 7, &mut buf).unwrap();
        buf[0] ^= 0xff;
        let err = read_system::<ToyField, _>(&buf[..], 7).unwrap_err();
        assert!(matches!(err, SerializationError::BadMagic { .. }));
    }

    #[test]
    fn rejects_curve_id_mismatch() {
        let system = sample_system();
        let mut buf = Vec::new();
        write_system(&system, 7, &mut buf).unwrap();
        let err = read_system::<ToyField, _>(&buf[..], 8).unwrap_err();
        assert!(matches!(err, SerializationError::CurveMismatch { .. }));
    }

    #[test]
    fn solves_after_round_trip() {
        let system = sample_system();
        let mut buf = Vec::new();
        write_system(&system, 0, &mut buf).unwrap();
        let restored: System<ToyField> = read_system(&buf[..], 0).unwrap();

        let witness = vec![ToyField::from_u64(3), ToyField::from_u64(5)];
        let config = crate::solver::SolverConfig { hint_functions: &crate::hint::HintFunctions::new(), log_sink: &NullLogSink };
        let solution = crate::solver::solve(&restored, &witness, config).expect("satisfiable");
        match solution {
            crate::solver::Solution::R1CS(sol) => assert_eq!(sol.c, vec![ToyField::from_u64(15)]),
            _ => panic!("expected an R1CS solution"),
        }
    }

    struct NullLogSink;
    impl crate::log::LogSink for NullLogSink {
        fn emit(&self, _message: &str) {}
    }
}
