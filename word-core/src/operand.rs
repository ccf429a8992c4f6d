use std::sync::LazyLock;
use std::collections::HashMap;

use regex::Regex;

use crate::error::ErrorKind;
use crate::instruction::Instruction;
use crate::label_table::LabelTable;

static IMMEDIATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(0b|0x)?\d+$").unwrap());
static IMMEDIATE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[-?(0b|0x)?\d+\]$").unwrap());
static REGISTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^e[a-z]x$").unwrap());
static REGISTER_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[e[a-z]x\]$").unwrap());
static PORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^p_[a-z0-9]$").unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Is `name` a legal `VAR`/`#CONST`/`#DEFINE` name: an identifier that does
/// not also look like a register or port?
pub fn is_legal_macro_name(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !REGISTER.is_match(name) && !PORT.is_match(name)
}

static REGISTER_MAP: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    HashMap::from([
        ("eax", 10),
        ("ebx", 11),
        ("ecx", 12),
        ("edx", 13),
        ("eex", 14),
        ("efx", 15),
    ])
});

static PORT_MAP: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    HashMap::from([
        ("p_1", 1),
        ("p_2", 2),
        ("p_3", 3),
        ("p_4", 4),
        ("p_5", 5),
        ("p_6", 6),
        ("p_7", 7),
        ("p_8", 8),
        ("p_9", 9),
        ("p_a", 10),
        ("p_b", 11),
        ("p_c", 12),
        ("p_d", 13),
        ("p_e", 14),
        ("p_f", 15),
    ])
});

/// A classified operand. Each variant carries the decoded value; the raw
/// text survives only inside `Undefined`, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(i32),
    ImmediateReference(i32),
    Register(u8),
    RegisterReference(u8),
    Port(u8),
    Label(usize),
    Undefined(String),
}

impl Operand {
    /// One-word name used to render a signature-mismatch tuple, e.g.
    /// `(register, immediate)`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Immediate(_) => "immediate",
            Operand::ImmediateReference(_) => "immediate_reference",
            Operand::Register(_) => "register",
            Operand::RegisterReference(_) => "register_reference",
            Operand::Port(_) => "port",
            Operand::Label(_) => "label",
            Operand::Undefined(_) => "undefined",
        }
    }
}

/// Parse a decimal, `0x`-hex, or `0b`-binary literal (optionally signed)
/// into a signed 32-bit value, the same grammar the classifier accepts for
/// `immediate`/`immediate_reference` operands. Exposed for `#CONST`, which
/// validates its value the same way before registering it as a macro.
pub fn parse_int(text: &str) -> Result<i32, ErrorKind> {
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse::<i64>()
    }
    .map_err(|_| ErrorKind::IntegerRange {
        text: text.to_string(),
    })?;
    let value = if neg { -value } else { value };
    if value.unsigned_abs() > i32::MAX as u64 {
        return Err(ErrorKind::IntegerRange {
            text: text.to_string(),
        });
    }
    Ok(value as i32)
}

/// Classify an already-macro-expanded argument string. `label_table` is
/// consulted last, so a name that is also a forward label reference resolves
/// correctly in pass 2.
pub fn classify(text: &str, label_table: &LabelTable) -> Result<Operand, ErrorKind> {
    if IMMEDIATE.is_match(text) {
        return Ok(Operand::Immediate(parse_int(text)?));
    }
    if IMMEDIATE_REFERENCE.is_match(text) {
        let inner = &text[1..text.len() - 1];
        return Ok(Operand::ImmediateReference(parse_int(inner)?));
    }
    if REGISTER.is_match(text) {
        return match REGISTER_MAP.get(text) {
            Some(&r) => Ok(Operand::Register(r)),
            None => Err(ErrorKind::UndefinedRegisterOrPort {
                text: text.to_string(),
            }),
        };
    }
    if REGISTER_REFERENCE.is_match(text) {
        let inner = &text[1..text.len() - 1];
        return match REGISTER_MAP.get(inner) {
            Some(&r) => Ok(Operand::RegisterReference(r)),
            None => Err(ErrorKind::UndefinedRegisterOrPort {
                text: text.to_string(),
            }),
        };
    }
    if PORT.is_match(text) {
        return match PORT_MAP.get(text) {
            Some(&p) => Ok(Operand::Port(p)),
            None => Err(ErrorKind::UndefinedRegisterOrPort {
                text: text.to_string(),
            }),
        };
    }
    if let Some(index) = label_table.resolve(text) {
        return Ok(Operand::Label(index));
    }
    Ok(Operand::Undefined(text.to_string()))
}

/// Strip a leading address-of `&` before macro expansion/classification.
pub fn strip_address_of(raw: &str) -> (bool, &str) {
    match raw.strip_prefix('&') {
        Some(rest) => (true, rest),
        None => (false, raw),
    }
}

/// Emit the partial instruction for one classified operand at one operand
/// position (0 = dest, 1 = srcA, 2 = srcB), per the position-conditioned
/// emit table. A position the table marks *invalid* indicates an
/// unreachable signature in the opcode table, which is a bug in the table
/// itself, not in the user's source — so it panics.
pub fn emit(operand: &Operand, position: usize) -> Instruction {
    match (operand, position) {
        (Operand::Register(r), 0) => Instruction {
            c: *r,
            enc: 1,
            ..Default::default()
        },
        (Operand::Register(r), 1) => Instruction {
            a: *r,
            ..Default::default()
        },
        (Operand::Register(r), 2) => Instruction {
            b: *r,
            ..Default::default()
        },
        (Operand::RegisterReference(r), 0) => Instruction {
            b: *r,
            wr: 1,
            mar: 1,
            mbr: 1,
            ..Default::default()
        },
        (Operand::RegisterReference(r), 1) => Instruction {
            b: *r,
            rd: 1,
            mar: 1,
            amux: 1,
            ..Default::default()
        },
        (Operand::Immediate(n), 1) => Instruction {
            imm: *n,
            cmux: 1,
            ..Default::default()
        },
        (Operand::Immediate(n), 2) => Instruction {
            imm: *n,
            bmux: 1,
            ..Default::default()
        },
        (Operand::ImmediateReference(n), 0) => Instruction {
            addr: *n,
            wr: 1,
            mar: 2,
            mbr: 1,
            ..Default::default()
        },
        (Operand::ImmediateReference(n), 1) => Instruction {
            addr: *n,
            rd: 1,
            mar: 2,
            amux: 1,
            ..Default::default()
        },
        (Operand::Port(p), 0) => Instruction {
            addr: i32::from(*p),
            wr: 1,
            mar: 2,
            mbr: 1,
            ..Default::default()
        },
        (Operand::Port(p), 1) => Instruction {
            addr: i32::from(*p),
            rd: 1,
            mar: 2,
            amux: 1,
            ..Default::default()
        },
        (Operand::Label(idx), 0) => Instruction {
            bran: i32::try_from(*idx).expect("instruction index fits in i32"),
            ..Default::default()
        },
        (op, pos) => unreachable!(
            "operand {:?} has no valid emitter at position {pos}; this is a bug in the opcode table",
            op
        ),
    }
}
