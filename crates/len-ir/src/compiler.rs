//! Compiler from a decoded program to C++ source.
//!
//! The output is a stack machine: the program slots as an `int` array, a
//! `stack<int>`, and a loop that dispatches on the current slot. Only
//! handlers for known opcodes present in the program are emitted.

use crate::decoder::Decoded;
use crate::instruction::Opcode;
use crate::program::{InstructionSet, Program};
use len_core::Target;
use tracing::debug;

/// Emits the body of one `case` block
type HandlerFn = fn(&Target, &mut SourceWriter);

/// Handler fragments, ascending by opcode value
static HANDLERS: [(Opcode, HandlerFn); 11] = [
    (Opcode::Read, emit_read),
    (Opcode::Add, emit_add),
    (Opcode::Sub, emit_sub),
    (Opcode::Dup, emit_dup),
    (Opcode::SkipIfZero, emit_skip_if_zero),
    (Opcode::Jump, emit_jump),
    (Opcode::PrintInt, emit_print_int),
    (Opcode::PrintChar, emit_print_char),
    (Opcode::Mul, emit_mul),
    (Opcode::Div, emit_div),
    (Opcode::Push, emit_push),
];

/// Look up the handler fragment for an opcode; unknown opcodes have none
pub fn handler_for(opcode: Opcode) -> Option<fn(&Target, &mut SourceWriter)> {
    HANDLERS
        .iter()
        .find(|(known, _)| *known == opcode)
        .map(|(_, handler)| *handler)
}

#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub target: Target,
}

pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn generate_decoded(&self, decoded: &Decoded) -> String {
        self.generate(&decoded.program, &decoded.instruction_set)
    }

    /// Generate C++ source executing `program`, with a handler for every
    /// known opcode in `in_use` and for no other.
    pub fn generate(&self, program: &Program, in_use: &InstructionSet) -> String {
        let target = &self.config.target;
        let handlers: Vec<(Opcode, HandlerFn)> = in_use
            .known_opcodes()
            .filter_map(|opcode| handler_for(opcode).map(|handler| (opcode, handler)))
            .collect();

        debug!(
            slots = program.len(),
            handlers = handlers.len(),
            preset = ?target.preset,
            "Generating C++ source"
        );

        let mut w = SourceWriter::new();
        self.emit_preamble(&mut w, program, &handlers);

        for (opcode, handler) in &handlers {
            w.line(&format!("case {}:", opcode.value()));
            w.open("{");
            handler(target, &mut w);
            w.line("break;");
            w.close("}");
        }

        self.emit_epilogue(&mut w);
        w.finish()
    }

    fn emit_preamble(&self, w: &mut SourceWriter, program: &Program, handlers: &[(Opcode, HandlerFn)]) {
        let target = &self.config.target;
        let uses = |opcode: Opcode| handlers.iter().any(|(op, _)| *op == opcode);

        if target.is_vs2010() {
            w.line("#include <SDKDDKVer.h>");
            w.line("#include \"tchar.h\"");
            w.line("#include <string>");
        }
        w.line("#include <stack>");
        w.line("#include <iostream>");
        if !target.is_vs2010() && uses(Opcode::Read) {
            w.line("#include <string>");
        }
        w.blank();
        w.line("using namespace std;");
        w.blank();

        // Underflow reads as zero
        if handlers.iter().any(|(op, _)| op.pops() > 0) {
            w.open("static int pop(stack<int>& a) {");
            w.line("if (a.empty()) return 0;");
            w.line("int value = a.top();");
            w.line("a.pop();");
            w.line("return value;");
            w.close("}");
            w.blank();
        }

        if target.is_vs2010() {
            w.open("int _tmain(int argc, _TCHAR* argv[]) {");
        } else {
            w.open("int main() {");
        }

        // Zero-length arrays are ill-formed, so an empty program keeps a placeholder
        let values = if program.is_empty() {
            "0".to_string()
        } else {
            program
                .slots()
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        w.line(&format!("int program[] = {{{}}};", values));
        w.line(&format!("const int length = {};", program.len()));
        w.line("stack<int> a;");
        w.open("for (int x = 0; x >= 0 && x < length; x++) {");
        w.open("switch (program[x]) {");
    }

    fn emit_epilogue(&self, w: &mut SourceWriter) {
        let target = &self.config.target;

        w.close("}");
        w.close("}");
        w.blank();
        if target.trailing_newline() {
            w.line("cout << endl;");
        }
        w.line("return 0;");
        w.dedent();
        w.text("}");
        if target.trailing_newline() {
            w.text("\n");
        }
    }
}

/// Line-oriented source buffer with four-space indentation
pub struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text` and indent what follows
    pub fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedent and write `text`
    pub fn close(&mut self, text: &str) {
        self.dedent();
        self.line(text);
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn emit_read(target: &Target, w: &mut SourceWriter) {
    w.line("string input;");
    w.line("cout << \"Input:\" << endl;");
    if target.is_vs2010() {
        w.line("getline(cin, input);");
    } else {
        w.line("cin >> input;");
    }
    w.line("a.push(input.empty() ? 0 : (int)(unsigned char)input[0]);");
}

fn emit_binary(w: &mut SourceWriter, result: &str) {
    w.line("int top = pop(a);");
    w.line("int next = pop(a);");
    w.line(&format!("a.push({});", result));
}

// Arithmetic goes through unsigned so that overflow wraps
fn emit_add(_: &Target, w: &mut SourceWriter) {
    emit_binary(w, "(int)((unsigned)next + (unsigned)top)");
}

fn emit_sub(_: &Target, w: &mut SourceWriter) {
    emit_binary(w, "(int)((unsigned)next - (unsigned)top)");
}

fn emit_mul(_: &Target, w: &mut SourceWriter) {
    emit_binary(w, "(int)((unsigned)next * (unsigned)top)");
}

fn emit_div(_: &Target, w: &mut SourceWriter) {
    emit_binary(
        w,
        "top == 0 ? 0 : top == -1 ? (int)(0u - (unsigned)next) : next / top",
    );
}

fn emit_dup(_: &Target, w: &mut SourceWriter) {
    w.line("a.push(a.empty() ? 0 : a.top());");
}

fn emit_skip_if_zero(_: &Target, w: &mut SourceWriter) {
    w.open("if (pop(a) == 0) {");
    w.line("x++;");
    w.line(&format!(
        "if (x < length && (program[x] == {} || program[x] == {})) x++;",
        Opcode::Jump.value(),
        Opcode::Push.value()
    ));
    w.close("}");
}

fn emit_jump(_: &Target, w: &mut SourceWriter) {
    w.line("x = (x + 1 < length ? program[x + 1] : 0) - 1;");
}

fn emit_print_int(_: &Target, w: &mut SourceWriter) {
    w.line("cout << pop(a);");
}

fn emit_print_char(_: &Target, w: &mut SourceWriter) {
    w.line("cout << (char)pop(a);");
}

fn emit_push(_: &Target, w: &mut SourceWriter) {
    w.line("a.push(x + 1 < length ? program[x + 1] : 0);");
    w.line("x++;");
}
