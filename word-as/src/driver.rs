use std::io::Read;

use word_core::{
    classify, is_legal_macro_name, matches_signature, merge, parse_int, parse_line,
    render_tuple, strip_address_of, ErrorKind, Instruction, LabelTable, LineError, MacroStore,
    ParsedLine, DIRECTIVE_ARITY, INSTRUCTION_TABLE,
};

const FIRST_VAR_ADDRESS: i32 = 16;

/// One instruction line buffered during pass 1, carried into pass 2 with the
/// source line number it was read from (for error messages).
struct BufferedLine {
    source_line: usize,
    mnemonic: String,
    args: Vec<String>,
}

/// Owns everything a compilation needs across both passes: the label table,
/// macro store, buffered instruction lines, the `VAR` word-address counter,
/// and the accumulated error list. Constructed fresh per call to
/// [`assemble`]; nothing survives between compilations.
struct CompilationContext {
    labels: LabelTable,
    macros: MacroStore,
    buffer: Vec<BufferedLine>,
    next_var_address: i32,
    errors: Vec<LineError>,
}

impl CompilationContext {
    fn new() -> Self {
        CompilationContext {
            labels: LabelTable::new(),
            macros: MacroStore::new(),
            buffer: Vec::new(),
            next_var_address: FIRST_VAR_ADDRESS,
            errors: Vec::new(),
        }
    }

    fn push_error(&mut self, source_line: usize, kind: ErrorKind) {
        self.errors.push(LineError {
            line: source_line,
            kind,
        });
    }
}

/// Resolve one raw argument string to a classified operand: strip a leading
/// `&`, macro-expand the remainder, and — if the prefix was present and the
/// expansion turned out to be a bracketed `VAR` address — unwrap the
/// brackets so the result classifies as a bare `immediate` address.
fn resolve_operand(
    raw: &str,
    macros: &MacroStore,
    labels: &LabelTable,
) -> Result<word_core::Operand, ErrorKind> {
    let (is_address_of, rest) = strip_address_of(raw);
    let expanded = macros.expand(rest);
    let text = if is_address_of {
        match expanded.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => inner.to_string(),
            None => expanded,
        }
    } else {
        expanded
    };
    classify(&text, labels)
}

fn handle_directive(ctx: &mut CompilationContext, line_no: usize, name: &str, args: &[String]) {
    let lowered = name.to_lowercase();
    let Some(&expected) = DIRECTIVE_ARITY.get(lowered.as_str()) else {
        ctx.push_error(
            line_no,
            ErrorKind::UnknownDirective {
                directive: name.to_string(),
            },
        );
        return;
    };
    if args.len() != expected {
        ctx.push_error(
            line_no,
            ErrorKind::DirectiveArity {
                directive: name.to_string(),
                expected,
                got: args.len(),
            },
        );
        return;
    }

    let macro_name = &args[0];
    if !is_legal_macro_name(macro_name) {
        ctx.push_error(
            line_no,
            ErrorKind::IllegalIdentifier {
                name: macro_name.clone(),
            },
        );
        return;
    }

    let substitution = match lowered.as_str() {
        "const" => match parse_int(&args[1]) {
            Ok(value) => value.to_string(),
            Err(e) => {
                ctx.push_error(line_no, e);
                return;
            }
        },
        "define" => args[1].clone(),
        _ => unreachable!("DIRECTIVE_ARITY only names const/define"),
    };

    if let Err(e) = ctx.macros.create(macro_name, substitution) {
        ctx.push_error(line_no, e);
    }
}

/// `VAR name` / `VAR name, init`. Allocates the next word address, registers
/// `name` in the macro store as a bracketed address (so a bare later use
/// dereferences it, per the argument classifier's `immediate_reference`
/// form), and emits the store to that address.
fn handle_var(ctx: &mut CompilationContext, line_no: usize, args: &[String]) -> Option<Instruction> {
    if args.is_empty() || args.len() > 2 {
        ctx.push_error(
            line_no,
            ErrorKind::DirectiveArity {
                directive: "VAR".to_string(),
                expected: 1,
                got: args.len(),
            },
        );
        return None;
    }

    let name = &args[0];
    if !is_legal_macro_name(name) {
        ctx.push_error(
            line_no,
            ErrorKind::IllegalIdentifier { name: name.clone() },
        );
        return None;
    }

    let address = ctx.next_var_address;
    ctx.next_var_address += 1;

    if let Err(e) = ctx.macros.create(name, format!("[{address}]")) {
        ctx.push_error(line_no, e);
        return None;
    }

    let store = Instruction {
        wr: 1,
        addr: address,
        mar: 2,
        mbr: 1,
        ..Default::default()
    };

    let init = match args.get(1) {
        Some(raw) => match resolve_operand(raw, &ctx.macros, &ctx.labels) {
            Ok(op @ (word_core::Operand::Register(_) | word_core::Operand::Immediate(_))) => {
                word_core::emit(&op, 1)
            }
            Ok(other) => {
                ctx.push_error(
                    line_no,
                    ErrorKind::InvalidOperands {
                        mnemonic: "VAR".to_string(),
                        tuple: format!("({})", other.type_name()),
                    },
                );
                return None;
            }
            Err(e) => {
                ctx.push_error(line_no, e);
                return None;
            }
        },
        None => Instruction {
            cmux: 1,
            ..Default::default()
        },
    };

    Some(merge([store, init]))
}

fn assemble_buffered(ctx: &mut CompilationContext, line: BufferedLine) -> Option<Instruction> {
    let lowered = line.mnemonic.to_lowercase();
    if lowered == "var" {
        return handle_var(ctx, line.source_line, &line.args);
    }

    let Some(strategy) = INSTRUCTION_TABLE.get(lowered.as_str()) else {
        ctx.push_error(
            line.source_line,
            ErrorKind::UnknownMnemonic {
                mnemonic: line.mnemonic.clone(),
            },
        );
        return None;
    };

    let operands: Result<Vec<word_core::Operand>, ErrorKind> = line
        .args
        .iter()
        .map(|raw| resolve_operand(raw, &ctx.macros, &ctx.labels))
        .collect();
    let operands = match operands {
        Ok(operands) => operands,
        Err(e) => {
            ctx.push_error(line.source_line, e);
            return None;
        }
    };

    if !matches_signature(strategy.signatures, &operands) {
        ctx.push_error(
            line.source_line,
            ErrorKind::InvalidOperands {
                mnemonic: line.mnemonic.clone(),
                tuple: render_tuple(&operands),
            },
        );
        return None;
    }

    Some((strategy.emit)(&operands))
}

/// Assemble a complete source program: two passes, as §4.7 describes.
/// Returns the instruction sequence on success, or the composite
/// `"Compilation errors:"` message (newline-joined per-line errors) on
/// failure — never both.
pub fn assemble(mut source: impl Read) -> Result<Vec<Instruction>, String> {
    let mut text = String::new();
    source
        .read_to_string(&mut text)
        .map_err(|e| format!("Compilation errors:\nError: 0: failed to read source: {e}"))?;

    let mut ctx = CompilationContext::new();
    let mut instruction_index = 0usize;

    for (offset, raw_line) in text.lines().enumerate() {
        let line_no = offset + 1;
        match parse_line(raw_line) {
            Ok(ParsedLine::Ignored) => {}
            Ok(ParsedLine::Directive { name, args }) => {
                handle_directive(&mut ctx, line_no, &name, &args);
            }
            Ok(ParsedLine::Instruction {
                label,
                mnemonic,
                args,
            }) => {
                if let Some(label) = label {
                    if let Err(e) = ctx.labels.define(&label, instruction_index) {
                        ctx.push_error(line_no, e);
                    }
                }
                ctx.buffer.push(BufferedLine {
                    source_line: line_no,
                    mnemonic,
                    args,
                });
                instruction_index += 1;
            }
            Err(e) => ctx.push_error(line_no, e),
        }
    }

    let buffered = std::mem::take(&mut ctx.buffer);
    let mut output = Vec::with_capacity(buffered.len());
    for line in buffered {
        if let Some(instruction) = assemble_buffered(&mut ctx, line) {
            output.push(instruction);
        }
    }

    if ctx.errors.is_empty() {
        Ok(output)
    } else {
        let mut message = String::from("Compilation errors:");
        for error in &ctx.errors {
            message.push('\n');
            message.push_str(&error.to_string());
        }
        Err(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> Vec<Instruction> {
        assemble(source.as_bytes()).expect("source should assemble cleanly")
    }

    fn instr(f: impl FnOnce(&mut Instruction)) -> Instruction {
        let mut i = Instruction::default();
        f(&mut i);
        i
    }

    #[test]
    fn mov_register_to_register() {
        let result = build("MOV eax, ebx");
        assert_eq!(
            result,
            vec![instr(|i| {
                i.enc = 1;
                i.c = 10;
                i.a = 11;
            })]
        );
    }

    #[test]
    fn mov_immediate() {
        let result = build("MOV ecx, 101");
        assert_eq!(
            result,
            vec![instr(|i| {
                i.enc = 1;
                i.c = 12;
                i.cmux = 1;
                i.imm = 101;
            })]
        );
    }

    #[test]
    fn add_with_immediate_srcb() {
        let result = build("ADD eax, ebx, 123");
        assert_eq!(
            result,
            vec![instr(|i| {
                i.enc = 1;
                i.a = 11;
                i.bmux = 1;
                i.c = 10;
                i.alu = 1;
                i.imm = 123;
            })]
        );
    }

    #[test]
    fn var_then_mov_dereferences() {
        let result = build("VAR foo, 123\nMOV eax, foo\n");
        assert_eq!(
            result,
            vec![
                instr(|i| {
                    i.mbr = 1;
                    i.mar = 2;
                    i.wr = 1;
                    i.addr = 16;
                    i.cmux = 1;
                    i.imm = 123;
                }),
                instr(|i| {
                    i.enc = 1;
                    i.c = 10;
                    i.amux = 1;
                    i.mar = 2;
                    i.addr = 16;
                    i.rd = 1;
                }),
            ]
        );
    }

    #[test]
    fn var_address_of_yields_bare_address() {
        let result = build("VAR foo, 123\nMOV ebx, &foo\n");
        assert_eq!(
            result[1],
            instr(|i| {
                i.enc = 1;
                i.c = 11;
                i.cmux = 1;
                i.imm = 16;
            })
        );
    }

    #[test]
    fn label_and_jmp() {
        let result = build("foo:MOV eax, 0\n\nMOV ebx, 0\nbar:MOV ecx, 0\n\nJMP foo\nJMP bar\n");
        assert_eq!(result[3], instr(|i| { i.cond = 7 }));
        assert_eq!(
            result[4],
            instr(|i| {
                i.cond = 7;
                i.bran = 2;
            })
        );
    }

    #[test]
    fn const_then_mov() {
        let result = build("#CONST foo, 200\nMOV eax, foo\n");
        assert_eq!(
            result,
            vec![instr(|i| {
                i.enc = 1;
                i.c = 10;
                i.cmux = 1;
                i.imm = 200;
            })]
        );
    }

    #[test]
    fn unknown_mnemonic_is_an_error() {
        let err = assemble("NOPE eax, ebx".as_bytes()).unwrap_err();
        assert!(err.starts_with("Compilation errors:"));
        assert!(err.contains("unknown mnemonic"));
    }

    #[test]
    fn signature_mismatch_is_an_error() {
        let err = assemble("MOV eax, eax, eax".as_bytes()).unwrap_err();
        assert!(err.contains("invalid operand combination"));
    }

    #[test]
    fn undefined_label_is_an_error() {
        let err = assemble("JMP nowhere".as_bytes()).unwrap_err();
        assert!(err.contains("invalid operand combination"));
    }

    #[test]
    fn var_with_register_shaped_name_is_illegal() {
        let err = assemble("VAR eax".as_bytes()).unwrap_err();
        assert!(err.contains("is not a legal identifier here"));
    }

    #[test]
    fn duplicate_var_is_an_error() {
        let err = assemble("VAR foo, 1\nVAR foo, 2\n".as_bytes()).unwrap_err();
        assert!(err.contains("is already defined"));
    }

    #[test]
    fn empty_source_yields_empty_sequence() {
        assert_eq!(assemble("".as_bytes()).unwrap(), Vec::<Instruction>::new());
    }
}
