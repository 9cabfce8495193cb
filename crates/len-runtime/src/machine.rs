//! Direct execution of decoded programs.

use crate::context::ExecutionContext;
use crate::RuntimeConfig;
use len_core::{Error, Result};
use len_ir::{Opcode, Program};
use tracing::{debug, trace};

/// Observable state after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Dispatched steps, operand slots not counted
    pub steps: u64,
    /// Final stack, bottom first
    pub stack: Vec<i32>,
}

/// Stack machine executing a program slot by slot
pub struct Machine {
    config: RuntimeConfig,
}

impl Machine {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn run(&self, program: &Program, ctx: &mut ExecutionContext<'_>) -> Result<ExecutionReport> {
        let mut stack: Vec<i32> = Vec::new();
        let mut steps: u64 = 0;
        let length = program.len() as i64;
        // Signed so that a jump to slot 0 can pass through -1
        let mut pc: i64 = 0;

        while pc >= 0 && pc < length {
            if let Some(max_steps) = self.config.max_steps {
                if steps >= max_steps {
                    return Err(Error::ResourceExhausted(format!(
                        "step limit of {} reached at slot {}",
                        max_steps, pc
                    )));
                }
            }
            steps += 1;

            let Some(inst) = program.instruction_at(pc as usize) else {
                break;
            };
            trace!(pc, %inst, depth = stack.len(), "step");

            match inst.opcode {
                Opcode::Read => {
                    let code = ctx.read_char_code()?;
                    stack.push(code);
                }
                Opcode::Add => binary(&mut stack, |next, top| next.wrapping_add(top)),
                Opcode::Sub => binary(&mut stack, |next, top| next.wrapping_sub(top)),
                Opcode::Mul => binary(&mut stack, |next, top| next.wrapping_mul(top)),
                Opcode::Div => binary(&mut stack, |next, top| {
                    if top == 0 {
                        0
                    } else {
                        next.wrapping_div(top)
                    }
                }),
                Opcode::Dup => {
                    let top = stack.last().copied().unwrap_or(0);
                    stack.push(top);
                }
                Opcode::SkipIfZero => {
                    if pop(&mut stack) == 0 {
                        pc += 1;
                        let two_slot = program
                            .instruction_at(pc as usize)
                            .is_some_and(|next| next.opcode.takes_operand());
                        if two_slot {
                            pc += 1;
                        }
                    }
                }
                Opcode::Jump => {
                    pc = i64::from(inst.operand_or_zero()) - 1;
                }
                Opcode::PrintInt => {
                    let value = pop(&mut stack);
                    ctx.write_int(value)?;
                }
                Opcode::PrintChar => {
                    let value = pop(&mut stack);
                    ctx.write_char(value)?;
                }
                Opcode::Push => {
                    stack.push(inst.operand_or_zero());
                    pc += 1;
                }
                Opcode::Unknown(_) => {}
            }

            pc += 1;
        }

        ctx.flush()?;
        debug!(steps, depth = stack.len(), "Program finished");

        Ok(ExecutionReport { steps, stack })
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

/// Pop with the empty-stack fallback
fn pop(stack: &mut Vec<i32>) -> i32 {
    stack.pop().unwrap_or(0)
}

/// Pop `top`, pop `next`, push `op(next, top)`
fn binary(stack: &mut Vec<i32>, op: impl Fn(i32, i32) -> i32) {
    let top = pop(stack);
    let next = pop(stack);
    stack.push(op(next, top));
}

#[cfg(test)]
mod tests {
    use super::*;
    use len_core::InputMode;
    use proptest::prelude::*;

    fn run_with(slots: Vec<i32>, input: &[u8], config: RuntimeConfig) -> Result<(ExecutionReport, String)> {
        let program = Program::from_slots(slots);
        let mut input = input;
        let mut output = Vec::new();
        let mut ctx = ExecutionContext::new(&mut input, &mut output, InputMode::Token);
        let report = Machine::new(config).run(&program, &mut ctx)?;
        Ok((report, String::from_utf8_lossy(&output).into_owned()))
    }

    fn run(slots: Vec<i32>) -> (ExecutionReport, String) {
        run_with(slots, b"", RuntimeConfig::default()).unwrap()
    }

    #[test]
    fn test_push_print() {
        let (report, output) = run(vec![25, 5, 15]);
        assert_eq!(output, "5");
        assert!(report.stack.is_empty());
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_push_add_print() {
        let (_, output) = run(vec![25, 2, 25, 3, 10, 15]);
        assert_eq!(output, "5");
    }

    #[test]
    fn test_empty_program() {
        let (report, output) = run(vec![]);
        assert_eq!(output, "");
        assert_eq!(report.steps, 0);
        assert!(report.stack.is_empty());
    }

    #[test]
    fn test_unknown_opcode_is_noop() {
        let (report, output) = run(vec![99, 25, 4, 99, 0, 12]);
        assert_eq!(output, "");
        assert_eq!(report.stack, vec![4, 4]);
        assert_eq!(report.steps, 5);
    }

    #[test]
    fn test_operand_order() {
        // 7 - 3 and 7 / 3 pop the right operand first
        let (report, _) = run(vec![25, 7, 25, 3, 11, 25, 7, 25, 3, 21]);
        assert_eq!(report.stack, vec![4, 2]);

        let (report, _) = run(vec![25, 6, 25, 7, 20]);
        assert_eq!(report.stack, vec![42]);
    }

    #[test]
    fn test_negative_division_truncates() {
        // 0 - 7 = -7, then -7 / 2
        let (report, _) = run(vec![25, 0, 25, 7, 11, 25, 2, 21]);
        assert_eq!(report.stack, vec![-3]);
    }

    #[test]
    fn test_fallbacks() {
        // Underflow pops zero, dup on empty pushes zero
        let (report, output) = run(vec![15, 12, 10]);
        assert_eq!(output, "0");
        assert_eq!(report.stack, vec![0]);

        // Division by zero pushes zero
        let (report, _) = run(vec![25, 9, 25, 0, 21]);
        assert_eq!(report.stack, vec![0]);

        // Missing operand reads as zero
        let (report, _) = run(vec![25]);
        assert_eq!(report.stack, vec![0]);
    }

    #[test]
    fn test_overflow_wraps() {
        let program = Program::from_slots(vec![25, i32::MAX, 25, 1, 10, 25, i32::MIN, 25, -1, 21]);
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        let mut ctx = ExecutionContext::new(&mut input, &mut output, InputMode::Token);
        let report = Machine::default().run(&program, &mut ctx).unwrap();
        assert_eq!(report.stack, vec![i32::MIN, i32::MIN]);
    }

    #[test]
    fn test_print_char() {
        let (_, output) = run(vec![25, 72, 16, 25, 105, 16]);
        assert_eq!(output, "Hi");
    }

    #[test]
    fn test_read_pushes_char_code() {
        let (report, output) = run_with(vec![9, 12, 16, 15], b"A", RuntimeConfig::default()).unwrap();
        assert_eq!(output, "Input:\nA65");
        assert!(report.stack.is_empty());
    }

    #[test]
    fn test_skip_over_two_slot_instruction() {
        // push 1, push 0, skip(0) over "push 7", push 9
        let (report, _) = run(vec![25, 1, 25, 0, 13, 25, 7, 25, 9]);
        assert_eq!(report.stack, vec![1, 9]);

        // Non-zero does not skip
        let (report, _) = run(vec![25, 1, 25, 5, 13, 25, 7, 25, 9]);
        assert_eq!(report.stack, vec![1, 7, 9]);
    }

    #[test]
    fn test_skip_over_one_slot_instruction() {
        let (report, output) = run(vec![25, 8, 25, 0, 13, 15, 12]);
        assert_eq!(output, "");
        assert_eq!(report.stack, vec![8, 8]);
    }

    #[test]
    fn test_skip_at_end() {
        let (report, _) = run(vec![25, 0, 13]);
        assert!(report.stack.is_empty());
    }

    #[test]
    fn test_countdown_loop() {
        // 0: push 3 | 2: dup | 3: print | 4: push 1 | 6: sub | 7: dup
        // 8: skip if zero | 9: jump 2
        let (report, output) = run(vec![25, 3, 12, 15, 25, 1, 11, 12, 13, 14, 2]);
        assert_eq!(output, "321");
        assert_eq!(report.stack, vec![0]);
    }

    #[test]
    fn test_jump_lands_on_target() {
        // Jump over a print to slot 4
        let (report, output) = run(vec![14, 4, 25, 15, 25, 6]);
        assert_eq!(output, "");
        assert_eq!(report.stack, vec![6]);
    }

    #[test]
    fn test_jump_past_end_halts() {
        let (report, _) = run(vec![14, 100, 25, 1]);
        assert!(report.stack.is_empty());
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_negative_jump_halts() {
        let (report, _) = run(vec![14, -5, 25, 1]);
        assert!(report.stack.is_empty());
    }

    #[test]
    fn test_step_limit() {
        // Jump to itself forever
        let err = run_with(vec![14, 0], b"", RuntimeConfig::with_max_steps(50)).unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted(_)));
    }

    proptest! {
        #[test]
        fn prop_zero_skip_passes_operand(operand in any::<i32>(), jump in any::<bool>()) {
            let two_slot = if jump { 14 } else { 25 };
            let (report, _) = run(vec![25, 0, 13, two_slot, operand, 25, 1]);
            prop_assert_eq!(report.stack, vec![1]);
            prop_assert_eq!(report.steps, 3);
        }

        #[test]
        fn prop_unknown_values_leave_stack(values in prop::collection::vec(30i32..1000, 0..20)) {
            let mut slots = vec![25, 11];
            slots.extend(values);
            let (report, output) = run(slots);
            prop_assert_eq!(report.stack, vec![11]);
            prop_assert_eq!(output, "");
        }
    }
}
