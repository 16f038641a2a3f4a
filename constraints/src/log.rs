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

//! The structured user log sink (C8).
//!
//! This is distinct from the `tracing` diagnostics emitted elsewhere in this
//! crate for operational visibility: entries here are part of the circuit's
//! own data model, queued during solving and only rendered once, against the
//! final assignment, when the solver returns.

use crate::coeff::{compute_term, CoeffTable};
use crate::row::LinearExpression;
use cs_fields::Field;
use serde::{Deserialize, Serialize};

pub type LocationId = u32;

/// Interns source-location strings so a [`LogEntry`]'s call stack can be
/// carried as a handful of small ids instead of repeated owned strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    locations: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, location: impl Into<String>) -> LocationId {
        let location = location.into();
        if let Some(pos) = self.locations.iter().position(|existing| existing == &location) {
            return pos as LocationId;
        }
        self.locations.push(location);
        (self.locations.len() - 1) as LocationId
    }

    pub fn get(&self, id: LocationId) -> &str {
        &self.locations[id as usize]
    }

    /// The interned locations, in id order. Used by the persisted form.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Rebuilds a table from its locations in id order (the inverse of
    /// [`SymbolTable::locations`]).
    pub fn from_locations(locations: Vec<String>) -> Self {
        SymbolTable { locations }
    }
}

/// One queued user log row. Formatting is deferred until the solver exits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub format: String,
    pub to_resolve: Vec<LinearExpression>,
    pub stack: Vec<LocationId>,
    pub caller: Option<LocationId>,
}

/// Where rendered user log rows go. Independent of this crate's own
/// `tracing` instrumentation.
pub trait LogSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Forwards rendered entries to `tracing` at debug level, so a caller who
/// already wires up `tracing-subscriber` gets user logs for free.
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, message: &str) {
        tracing::debug!(target: "cs_constraints::user_log", "{message}");
    }
}

/// Substituted in place of any linear expression that refers to an unsolved
/// wire at resolution time.
pub const UNSOLVED_PLACEHOLDER: &str = "<unsolved>";

/// Evaluates every `to_resolve` expression against the final assignment and
/// renders `format`, substituting [`UNSOLVED_PLACEHOLDER`] for any expression
/// touching a wire that never got solved.
pub fn resolve_entry<F: Field>(entry: &LogEntry, table: &CoeffTable<F>, values: &[F], solved: &[bool]) -> String {
    let args: Vec<String> = entry
        .to_resolve
        .iter()
        .map(|expr| resolve_linear_expression(expr, table, values, solved))
        .collect();
    render(&entry.format, &args)
}

fn resolve_linear_expression<F: Field>(
    expr: &LinearExpression,
    table: &CoeffTable<F>,
    values: &[F],
    solved: &[bool],
) -> String {
    let mut acc = F::zero();
    for term in expr {
        if term.is_constant {
            acc = acc.add(&table.get(term.coeff));
            continue;
        }
        let wire = term.wire as usize;
        if !solved.get(wire).copied().unwrap_or(false) {
            return UNSOLVED_PLACEHOLDER.to_string();
        }
        acc = acc.add(&compute_term(table, term, values[wire]));
    }
    acc.to_string()
}

/// A minimal positional-placeholder renderer: each `{}` in `format` is
/// replaced, in order, by the corresponding resolved argument.
fn render(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut arg_iter = args.iter();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'}') {
            chars.next();
            if let Some(arg) = arg_iter.next() {
                out.push_str(arg);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Term;
    use cs_fields::toy::ToyField;

    #[test]
    fn resolves_solved_expression() {
        let mut table = CoeffTable::<ToyField>::new();
        let id = table.add_coeff(ToyField::from_u64(3));
        let entry = LogEntry {
            format: "x = {}".to_string(),
            to_resolve: vec![vec![Term::new(id, 0)]],
            stack: vec![],
            caller: None,
        };
        let values = vec![ToyField::from_u64(5)];
        let solved = vec![true];
        assert_eq!(resolve_entry(&entry, &table, &values, &solved), "x = 15");
    }

    #[test]
    fn substitutes_unsolved_placeholder() {
        let table = CoeffTable::<ToyField>::new();
        let entry = LogEntry {
            format: "x = {}".to_string(),
            to_resolve: vec![vec![Term::new(1, 0)]],
            stack: vec![],
            caller: None,
        };
        let values = vec![ToyField::zero()];
        let solved = vec![false];
        assert_eq!(resolve_entry(&entry, &table, &values, &solved), "x = <unsolved>");
    }

    #[test]
    fn symbol_table_interns_uniquely() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo.rs:1");
        let b = table.intern("bar.rs:2");
        let a2 = table.intern("foo.rs:1");
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }
}
