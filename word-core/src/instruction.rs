/// The horizontal microword. Every field defaults to zero; exactly one
/// contributing emitter may write a nonzero value to any given field during
/// the assembly of a single source instruction. See [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Instruction {
    pub amux: u8,
    pub bmux: u8,
    pub cmux: u8,
    pub cond: u8,
    pub alu: u8,
    pub mbr: u8,
    pub mar: u8,
    pub rd: u8,
    pub wr: u8,
    pub enc: u8,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub addr: i32,
    pub bran: i32,
    pub imm: i32,
}

macro_rules! merge_narrow {
    ($accum:ident, $part:ident, $field:ident) => {
        if $part.$field != 0 {
            assert!(
                $accum.$field == 0,
                "instruction field `{}` is given a nonzero value more than once",
                stringify!($field)
            );
            $accum.$field = $part.$field;
        }
    };
}

macro_rules! merge_wide {
    ($accum:ident, $part:ident, $field:ident) => {
        if $part.$field != 0 {
            assert!(
                $accum.$field == 0,
                "instruction field `{}` is given a nonzero value more than once",
                stringify!($field)
            );
            $accum.$field = $part.$field;
        }
    };
}

/// Fold a sequence of partial instructions into one, enforcing that every
/// field has at most one nonzero writer. A field written nonzero twice is a
/// bug in the opcode table or emitter, not a user-correctable source error,
/// so this panics rather than returning a `Result`.
pub fn merge(parts: impl IntoIterator<Item = Instruction>) -> Instruction {
    let mut accum = Instruction::default();
    for part in parts {
        merge_narrow!(accum, part, amux);
        merge_narrow!(accum, part, bmux);
        merge_narrow!(accum, part, cmux);
        merge_narrow!(accum, part, cond);
        merge_narrow!(accum, part, alu);
        merge_narrow!(accum, part, mbr);
        merge_narrow!(accum, part, mar);
        merge_narrow!(accum, part, rd);
        merge_narrow!(accum, part, wr);
        merge_narrow!(accum, part, enc);
        merge_narrow!(accum, part, a);
        merge_narrow!(accum, part, b);
        merge_narrow!(accum, part, c);
        merge_wide!(accum, part, addr);
        merge_wide!(accum, part, bran);
        merge_wide!(accum, part, imm);
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_fields_merge() {
        let a = Instruction {
            c: 10,
            enc: 1,
            ..Default::default()
        };
        let b = Instruction {
            a: 11,
            ..Default::default()
        };
        let merged = merge([a, b]);
        assert_eq!(
            merged,
            Instruction {
                c: 10,
                enc: 1,
                a: 11,
                ..Default::default()
            }
        );
    }

    #[test]
    fn merge_is_order_independent() {
        let a = Instruction {
            c: 10,
            ..Default::default()
        };
        let b = Instruction {
            a: 11,
            ..Default::default()
        };
        assert_eq!(merge([a, b]), merge([b, a]));
    }

    #[test]
    #[should_panic(expected = "given a nonzero value more than once")]
    fn conflicting_fields_panic() {
        let a = Instruction {
            c: 10,
            ..Default::default()
        };
        let b = Instruction {
            c: 12,
            ..Default::default()
        };
        merge([a, b]);
    }
}
