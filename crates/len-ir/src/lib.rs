//! Decoder, instruction set and C++ code generator for the line-length language.
//!
//! A source file carries meaning only through the length of its lines:
//! - Decoding: each line's character count becomes one program slot
//! - Instruction set: a slot value names an opcode, unknown values are no-ops
//! - Generation: the slots become a C++ stack machine with only the handlers in use

pub mod instruction;
pub mod program;
pub mod decoder;
pub mod compiler;

pub use instruction::{Instruction, Opcode};
pub use program::{InstructionSet, Program};
pub use decoder::{decode, decode_bytes, Decoded};
pub use compiler::{Compiler, CompilerConfig};
