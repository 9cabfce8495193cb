//! Instruction set of the line-length language.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opcode named by a program slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Opcode {
    // Input
    Read,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Stack
    Dup,
    Push,         // Operand: literal value

    // Control flow
    SkipIfZero,   // Skip next instruction when popped value is zero
    Jump,         // Operand: absolute slot index

    // Output
    PrintInt,
    PrintChar,

    /// Any slot value outside the known set; executes as a no-op
    Unknown(i32),
}

impl Opcode {
    /// Every opcode with defined semantics, in ascending value order
    pub const KNOWN: [Opcode; 11] = [
        Opcode::Read,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Dup,
        Opcode::SkipIfZero,
        Opcode::Jump,
        Opcode::PrintInt,
        Opcode::PrintChar,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Push,
    ];

    pub fn from_value(value: i32) -> Self {
        match value {
            9 => Opcode::Read,
            10 => Opcode::Add,
            11 => Opcode::Sub,
            12 => Opcode::Dup,
            13 => Opcode::SkipIfZero,
            14 => Opcode::Jump,
            15 => Opcode::PrintInt,
            16 => Opcode::PrintChar,
            20 => Opcode::Mul,
            21 => Opcode::Div,
            25 => Opcode::Push,
            other => Opcode::Unknown(other),
        }
    }

    /// The slot value (line length) that encodes this opcode
    pub fn value(&self) -> i32 {
        match self {
            Opcode::Read => 9,
            Opcode::Add => 10,
            Opcode::Sub => 11,
            Opcode::Dup => 12,
            Opcode::SkipIfZero => 13,
            Opcode::Jump => 14,
            Opcode::PrintInt => 15,
            Opcode::PrintChar => 16,
            Opcode::Mul => 20,
            Opcode::Div => 21,
            Opcode::Push => 25,
            Opcode::Unknown(value) => *value,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Read => "read",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Dup => "dup",
            Opcode::SkipIfZero => "jz-skip",
            Opcode::Jump => "jump",
            Opcode::PrintInt => "print-int",
            Opcode::PrintChar => "print-char",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Push => "push",
            Opcode::Unknown(_) => "nop",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Opcode::Unknown(_))
    }

    /// Returns true if the following slot is this opcode's operand
    pub fn takes_operand(&self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Push)
    }

    /// Returns the number of values this opcode pops
    pub fn pops(&self) -> usize {
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => 2,
            Opcode::SkipIfZero | Opcode::PrintInt | Opcode::PrintChar => 1,
            Opcode::Read | Opcode::Dup | Opcode::Jump | Opcode::Push | Opcode::Unknown(_) => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Unknown(value) => write!(f, "nop({})", value),
            known => f.write_str(known.mnemonic()),
        }
    }
}

/// One logical instruction decoded at a program counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Contents of the operand slot for two-slot opcodes; `None` when the
    /// opcode takes no operand or the slot lies past the end of the program
    pub operand: Option<i32>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    pub fn with_operand(mut self, operand: i32) -> Self {
        self.operand = Some(operand);
        self
    }

    /// Number of program slots this instruction occupies
    pub fn width(&self) -> usize {
        if self.opcode.takes_operand() {
            2
        } else {
            1
        }
    }

    /// Operand value with the missing-slot fallback applied
    pub fn operand_or_zero(&self) -> i32 {
        self.operand.unwrap_or(0)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.opcode.takes_operand(), self.operand) {
            (true, Some(operand)) => write!(f, "{} {}", self.opcode, operand),
            (true, None) => write!(f, "{} <missing>", self.opcode),
            _ => write!(f, "{}", self.opcode),
        }
    }
}
