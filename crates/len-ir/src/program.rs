//! Program structure: the ordered slot sequence and the set of values it uses.

use crate::instruction::{Instruction, Opcode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A decoded program: one slot per source line, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    slots: Vec<i32>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: Vec<i32>) -> Self {
        Self { slots }
    }

    /// Decode source text; see [`crate::decoder::decode`]
    pub fn decode(source: &str) -> Self {
        crate::decoder::decode(source).program
    }

    pub fn slots(&self) -> &[i32] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<i32> {
        self.slots.get(pc).copied()
    }

    /// Decode the instruction whose opcode sits at `pc`.
    ///
    /// Any slot can be decoded this way, including one that a linear walk
    /// would treat as an operand, since a jump may land anywhere.
    pub fn instruction_at(&self, pc: usize) -> Option<Instruction> {
        let opcode = Opcode::from_value(self.get(pc)?);
        let operand = if opcode.takes_operand() {
            self.get(pc + 1)
        } else {
            None
        };
        Some(Instruction { opcode, operand })
    }

    /// Linear walk from slot 0, consuming operand slots, for diagnostics
    pub fn listing(&self) -> Vec<(usize, Instruction)> {
        let mut listing = Vec::new();
        let mut pc = 0;
        while let Some(inst) = self.instruction_at(pc) {
            listing.push((pc, inst));
            pc += inst.width();
        }
        listing
    }

    /// Distinct slot values in this program
    pub fn instruction_set(&self) -> InstructionSet {
        self.slots.iter().copied().collect()
    }
}

/// Distinct slot values observed in a program; only membership matters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSet {
    values: BTreeSet<i32>,
}

impl InstructionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: i32) -> bool {
        self.values.insert(value)
    }

    pub fn contains(&self, value: i32) -> bool {
        self.values.contains(&value)
    }

    pub fn contains_opcode(&self, opcode: Opcode) -> bool {
        self.contains(opcode.value())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All distinct values, ascending
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.iter().copied()
    }

    /// Known opcodes present in the set, ascending by value
    pub fn known_opcodes(&self) -> impl Iterator<Item = Opcode> + '_ {
        Opcode::KNOWN
            .into_iter()
            .filter(move |opcode| self.contains_opcode(*opcode))
    }
}

impl FromIterator<i32> for InstructionSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
