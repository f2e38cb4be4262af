//! Source-level variable tracking: offset -> assignment, name -> value.

use std::collections::HashMap;

use crate::stack_item::StackItem;

/// A static assignment: "the value written at this bytecode offset is
/// bound to source-level name `name` of type `declared_type`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub declared_type: String,
}

/// The current value and type of a tracked variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub value: StackItem,
    pub declared_type: String,
}

/// Maintains the offset -> assignment map and the name -> current value
/// map described in the component design.
#[derive(Debug, Default)]
pub struct VariableTracker {
    assignments: HashMap<usize, Assignment>,
    variables: HashMap<String, VariableValue>,
}

impl VariableTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a static assignment. Must happen before `Reset`.
    pub fn register_assignment(&mut self, offset: usize, name: impl Into<String>, declared_type: impl Into<String>) {
        self.assignments.insert(
            offset,
            Assignment {
                name: name.into(),
                declared_type: declared_type.into(),
            },
        );
    }

    /// The assignment registered at `offset`, if any.
    pub fn assignment_at(&self, offset: usize) -> Option<&Assignment> {
        self.assignments.get(&offset)
    }

    /// Records `name`'s current value, inheriting a prior session's known
    /// type when `declared_type` is `"Unknown"` and one exists.
    pub fn record(&mut self, name: &str, value: StackItem, declared_type: &str) {
        let resolved_type = if declared_type == "Unknown" {
            self.variables
                .get(name)
                .map(|v| v.declared_type.clone())
                .unwrap_or_else(|| declared_type.to_string())
        } else {
            declared_type.to_string()
        };
        self.variables.insert(
            name.to_string(),
            VariableValue {
                value,
                declared_type: resolved_type,
            },
        );
    }

    /// Looks up a variable's current value.
    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.variables.get(name)
    }

    /// Empties both maps.
    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
        self.variables.clear();
    }

    /// Empties only the dynamic name -> value map, leaving registered
    /// assignments in place. Called at the end of `Reset`: per the design
    /// notes, unknown-type inheritance across sessions only ever helps
    /// within a single session because of this.
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    /// Iterates every currently tracked variable name.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn records_and_reads_back_a_value() {
        let mut tracker = VariableTracker::new();
        tracker.record("n", StackItem::from_int(5), "Integer");
        assert_eq!(tracker.get("n").unwrap().value, StackItem::Integer(BigInt::from(5)));
    }

    #[test]
    fn unknown_declared_type_inherits_prior_type() {
        let mut tracker = VariableTracker::new();
        tracker.record("n", StackItem::from_int(1), "Integer");
        tracker.record("n", StackItem::from_int(2), "Unknown");
        assert_eq!(tracker.get("n").unwrap().declared_type, "Integer");
    }

    #[test]
    fn clear_assignments_empties_both_maps() {
        let mut tracker = VariableTracker::new();
        tracker.register_assignment(3, "n", "Integer");
        tracker.record("n", StackItem::from_int(1), "Integer");
        tracker.clear_assignments();
        assert!(tracker.assignment_at(3).is_none());
        assert!(tracker.get("n").is_none());
    }
}
