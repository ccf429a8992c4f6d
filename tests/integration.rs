use word_core::Instruction;

fn assemble(source: &str) -> Vec<Instruction> {
    word_as::assemble(source.as_bytes()).expect("source should assemble cleanly")
}

fn instr(f: impl FnOnce(&mut Instruction)) -> Instruction {
    let mut i = Instruction::default();
    f(&mut i);
    i
}

#[test]
fn mov_register_to_register() {
    assert_eq!(
        assemble("MOV eax, ebx"),
        vec![instr(|i| {
            i.enc = 1;
            i.c = 10;
            i.a = 11;
        })]
    );
}

#[test]
fn alu_family_with_memory_reference_operand() {
    let result = assemble("MUL ecx, [124], edx");
    assert_eq!(
        result,
        vec![instr(|i| {
            i.enc = 1;
            i.b = 13;
            i.c = 12;
            i.alu = 3;
            i.addr = 124;
            i.rd = 1;
            i.mar = 2;
            i.amux = 1;
        })]
    );
}

#[test]
fn var_then_dereferencing_mov() {
    let result = assemble("VAR foo, 123\nMOV eax, foo\n");
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
fn forward_label_reference_resolves() {
    let result = assemble("JMP done\nMOV eax, 0\ndone:MOV ebx, 0\n");
    assert_eq!(
        result[0],
        instr(|i| {
            i.cond = 7;
            i.bran = 2;
        })
    );
    assert_eq!(
        result[2],
        instr(|i| {
            i.enc = 1;
            i.c = 11;
            i.cmux = 1;
        })
    );
}

#[test]
fn conditional_jump_with_immediate_comparand() {
    let result = assemble("label0:MOV eax, 0\nJE label0, eax, 123\n");
    assert_eq!(
        result[1],
        instr(|i| {
            i.a = 10;
            i.alu = 2;
            i.cond = 1;
            i.bran = 0;
            i.bmux = 1;
            i.imm = 123;
        })
    );
}

#[test]
fn const_directive_then_use() {
    let result = assemble("#CONST foo, 200\nMOV eax, foo\n");
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
fn case_insensitivity_is_a_no_op_on_output() {
    let lower = assemble("foo:mov eax, 0\njmp foo\n");
    let upper = assemble("FOO:MOV EAX, 0\nJMP FOO\n");
    assert_eq!(lower, upper);
}

#[test]
fn mnemonic_signature_mismatch_is_reported() {
    let err = word_as::assemble("MOV eax, eax, eax".as_bytes()).unwrap_err();
    assert!(err.starts_with("Compilation errors:"));
    assert!(err.contains("MOV"));
}

#[test]
fn reference_to_undeclared_label_is_reported() {
    let err = word_as::assemble("JMP nowhere".as_bytes()).unwrap_err();
    assert!(err.contains("invalid operand combination"));
}

#[test]
fn duplicate_label_is_reported() {
    let err = word_as::assemble("foo:MOV eax, 0\nfoo:MOV ebx, 0\n".as_bytes()).unwrap_err();
    assert!(err.contains("already defined"));
}

#[test]
fn end_to_end_program_renders_a_versioned_blueprint() {
    let instructions = assemble("MOV eax, ebx\nADD eax, ebx, ecx\n");
    let mut out = Vec::new();
    word_bp::render(&instructions, &mut out).expect("rendering should not fail");
    assert_eq!(out[0], b'0');
    assert!(out.len() > 1);
}
