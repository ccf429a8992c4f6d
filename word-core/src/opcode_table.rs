use std::collections::HashMap;
use std::sync::LazyLock;

use crate::instruction::{merge, Instruction};
use crate::operand::{emit, Operand};

/// The shape of an operand for signature matching, distinct from [`Operand`]
/// itself: a signature cares only about which addressing mode is present at
/// a position, not the decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Imm,
    ImmRef,
    Reg,
    RegRef,
    Port,
    Label,
}

pub fn operand_kind(operand: &Operand) -> Option<OperandKind> {
    match operand {
        Operand::Immediate(_) => Some(OperandKind::Imm),
        Operand::ImmediateReference(_) => Some(OperandKind::ImmRef),
        Operand::Register(_) => Some(OperandKind::Reg),
        Operand::RegisterReference(_) => Some(OperandKind::RegRef),
        Operand::Port(_) => Some(OperandKind::Port),
        Operand::Label(_) => Some(OperandKind::Label),
        Operand::Undefined(_) => None,
    }
}

/// Per-mnemonic record of (signature set, emitter). The emitter is pure:
/// given the already-classified operand list, it merges the per-position
/// emits (plus any mnemonic-fixed fields, like an ALU op code) into one
/// `Instruction`. `VAR` is not a member of this table — it mutates the
/// macro store and word-address counter, so the driver special-cases it.
pub struct OpcodeStrategy {
    pub signatures: &'static [&'static [OperandKind]],
    pub emit: fn(&[Operand]) -> Instruction,
}

use OperandKind::{Imm, ImmRef, Label as Lbl, Port as Prt, Reg, RegRef};

fn emit_positional(operands: &[Operand]) -> Instruction {
    merge(
        operands
            .iter()
            .enumerate()
            .map(|(pos, op)| emit(op, pos)),
    )
}

fn alu_emitter(code: u8) -> impl Fn(&[Operand]) -> Instruction {
    move |operands: &[Operand]| {
        let fixed = Instruction {
            alu: code,
            ..Default::default()
        };
        merge(std::iter::once(fixed).chain(
            operands.iter().enumerate().map(|(pos, op)| emit(op, pos)),
        ))
    }
}

fn jmp_emitter(operands: &[Operand]) -> Instruction {
    let fixed = Instruction {
        cond: 7,
        ..Default::default()
    };
    merge([fixed, emit(&operands[0], 0)])
}

fn cond_jmp_emitter(cond: u8) -> impl Fn(&[Operand]) -> Instruction {
    move |operands: &[Operand]| {
        let fixed = Instruction {
            alu: 2,
            cond,
            ..Default::default()
        };
        merge([
            fixed,
            emit(&operands[0], 0),
            emit(&operands[1], 1),
            emit(&operands[2], 2),
        ])
    }
}

macro_rules! sig {
    ($([$($kind:expr),*]),* $(,)?) => {
        &[$(&[$($kind),*] as &[OperandKind]),*] as &[&[OperandKind]]
    };
}

const MOV_SIGNATURES: &[&[OperandKind]] = sig![
    [Reg, Reg],
    [Reg, RegRef],
    [Reg, Imm],
    [Reg, ImmRef],
    [ImmRef, Reg],
    [ImmRef, Imm],
    [RegRef, Reg],
    [RegRef, Imm],
];

const ALU_SIGNATURES: &[&[OperandKind]] = sig![
    [Reg, Reg, Reg],
    [Reg, ImmRef, Reg],
    [Reg, ImmRef, Imm],
    [Reg, Reg, Imm],
    [ImmRef, Reg, Reg],
    [ImmRef, Reg, Imm],
];

const JMP_SIGNATURES: &[&[OperandKind]] = sig![[Lbl]];

const COND_JMP_SIGNATURES: &[&[OperandKind]] = sig![
    [Lbl, Reg, Reg],
    [Lbl, Reg, Imm],
    [Lbl, ImmRef, Reg],
    [Lbl, ImmRef, Imm],
];

const IN_SIGNATURES: &[&[OperandKind]] = sig![[Reg, Prt]];
const OUT_SIGNATURES: &[&[OperandKind]] = sig![[Prt, Reg], [Prt, Imm]];

static ALU_EMITTERS: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    HashMap::from([
        ("add", 1),
        ("sub", 2),
        ("mul", 3),
        ("div", 4),
        ("mod", 5),
        ("and", 6),
        ("or", 7),
        ("xor", 8),
        ("sal", 9),
        ("sar", 10),
    ])
});

static COND_JMP_CODES: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    HashMap::from([
        ("je", 1),
        ("jne", 2),
        ("jl", 3),
        ("jg", 4),
        ("jle", 5),
        ("jge", 6),
    ])
});

pub static INSTRUCTION_TABLE: LazyLock<HashMap<&'static str, OpcodeStrategy>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, OpcodeStrategy> = HashMap::new();

    table.insert(
        "mov",
        OpcodeStrategy {
            signatures: MOV_SIGNATURES,
            emit: emit_positional,
        },
    );

    for (mnemonic, code) in ALU_EMITTERS.iter() {
        let code = *code;
        let emit_fn: fn(&[Operand]) -> Instruction = match code {
            1 => alu1,
            2 => alu2,
            3 => alu3,
            4 => alu4,
            5 => alu5,
            6 => alu6,
            7 => alu7,
            8 => alu8,
            9 => alu9,
            10 => alu10,
            _ => unreachable!("ALU_EMITTERS only defines codes 1..=10"),
        };
        table.insert(
            mnemonic,
            OpcodeStrategy {
                signatures: ALU_SIGNATURES,
                emit: emit_fn,
            },
        );
    }

    table.insert(
        "jmp",
        OpcodeStrategy {
            signatures: JMP_SIGNATURES,
            emit: jmp_emitter,
        },
    );

    for (mnemonic, code) in COND_JMP_CODES.iter() {
        let emit_fn: fn(&[Operand]) -> Instruction = match *code {
            1 => cjmp1,
            2 => cjmp2,
            3 => cjmp3,
            4 => cjmp4,
            5 => cjmp5,
            6 => cjmp6,
            _ => unreachable!("COND_JMP_CODES only defines codes 1..=6"),
        };
        table.insert(
            mnemonic,
            OpcodeStrategy {
                signatures: COND_JMP_SIGNATURES,
                emit: emit_fn,
            },
        );
    }

    table.insert(
        "in",
        OpcodeStrategy {
            signatures: IN_SIGNATURES,
            emit: emit_positional,
        },
    );
    table.insert(
        "out",
        OpcodeStrategy {
            signatures: OUT_SIGNATURES,
            emit: emit_positional,
        },
    );

    table
});

// `alu_emitter`/`cond_jmp_emitter` return `impl Fn`, which can't coerce to a
// bare `fn` pointer once it closes over `code`; these thin, code-specific
// wrappers give the table plain fn pointers without boxing.
macro_rules! alu_fn {
    ($name:ident, $code:expr) => {
        fn $name(operands: &[Operand]) -> Instruction {
            alu_emitter($code)(operands)
        }
    };
}
alu_fn!(alu1, 1);
alu_fn!(alu2, 2);
alu_fn!(alu3, 3);
alu_fn!(alu4, 4);
alu_fn!(alu5, 5);
alu_fn!(alu6, 6);
alu_fn!(alu7, 7);
alu_fn!(alu8, 8);
alu_fn!(alu9, 9);
alu_fn!(alu10, 10);

macro_rules! cjmp_fn {
    ($name:ident, $code:expr) => {
        fn $name(operands: &[Operand]) -> Instruction {
            cond_jmp_emitter($code)(operands)
        }
    };
}
cjmp_fn!(cjmp1, 1);
cjmp_fn!(cjmp2, 2);
cjmp_fn!(cjmp3, 3);
cjmp_fn!(cjmp4, 4);
cjmp_fn!(cjmp5, 5);
cjmp_fn!(cjmp6, 6);

/// `#CONST`/`#DEFINE` directive table: name → expected argument count. Both
/// directives are handled by the driver (they write into the macro store it
/// owns); this table only records arity for the arity-check error.
pub static DIRECTIVE_ARITY: LazyLock<HashMap<&'static str, usize>> =
    LazyLock::new(|| HashMap::from([("const", 2), ("define", 2)]));

/// Render a classified operand tuple the way a signature-mismatch error
/// quotes it, e.g. `(register, immediate)`.
pub fn render_tuple(operands: &[Operand]) -> String {
    let names: Vec<&str> = operands.iter().map(Operand::type_name).collect();
    format!("({})", names.join(", "))
}

/// Does `operands` match one of `signatures` by exact arity and
/// element-wise operand-kind equality?
pub fn matches_signature(signatures: &[&[OperandKind]], operands: &[Operand]) -> bool {
    let kinds: Option<Vec<OperandKind>> = operands.iter().map(operand_kind).collect();
    let Some(kinds) = kinds else {
        return false;
    };
    signatures.iter().any(|sig| sig == &kinds.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;

    #[test]
    fn mov_reg_reg_matches() {
        let operands = vec![Operand::Register(10), Operand::Register(11)];
        assert!(matches_signature(MOV_SIGNATURES, &operands));
    }

    #[test]
    fn mov_three_regs_does_not_match() {
        let operands = vec![
            Operand::Register(10),
            Operand::Register(10),
            Operand::Register(10),
        ];
        assert!(!matches_signature(MOV_SIGNATURES, &operands));
    }

    #[test]
    fn undefined_operand_never_matches() {
        let operands = vec![Operand::Register(10), Operand::Undefined("x".into())];
        assert!(!matches_signature(MOV_SIGNATURES, &operands));
    }

    #[test]
    fn alu_emitter_sets_fixed_alu_code() {
        let strategy = &INSTRUCTION_TABLE["add"];
        let operands = vec![
            Operand::Register(10),
            Operand::Register(11),
            Operand::Register(12),
        ];
        let instr = (strategy.emit)(&operands);
        assert_eq!(instr.alu, 1);
        assert_eq!(instr.c, 10);
        assert_eq!(instr.a, 11);
        assert_eq!(instr.b, 12);
        assert_eq!(instr.enc, 1);
    }

    #[test]
    fn jmp_sets_cond_seven() {
        let strategy = &INSTRUCTION_TABLE["jmp"];
        let operands = vec![Operand::Label(3)];
        let instr = (strategy.emit)(&operands);
        assert_eq!(instr.cond, 7);
        assert_eq!(instr.bran, 3);
    }
}
