use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::Serialize;

use word_core::Instruction;

use crate::controls::{filter_group, signal_anything, signal_each, signal_everything, Comparator, Operation, Signal};
use crate::entities::{
    connect, ArithmeticCombinator, ConstantCombinator, DeciderCombinator, Direction,
    EntityRecord, IdAllocator, Lamp, Wire,
};

fn signal_instruction_index() -> Signal {
    Signal::item("grenade")
}
fn signal_negative() -> Signal {
    Signal::item("poison-capsule")
}
fn signal_amux() -> Signal {
    Signal::item("crude-oil-barrel")
}
fn signal_bmux() -> Signal {
    Signal::item("lubricant-barrel")
}
fn signal_cmux() -> Signal {
    Signal::item("empty-barrel")
}
fn signal_cond() -> Signal {
    Signal::item("heavy-oil-barrel")
}
fn signal_alu() -> Signal {
    Signal::item("light-oil-barrel")
}
fn signal_mbr() -> Signal {
    Signal::item("petroleum-gas-barrel")
}
fn signal_mar() -> Signal {
    Signal::item("water-barrel")
}
fn signal_rd() -> Signal {
    Signal::item("science-pack-1")
}
fn signal_wr() -> Signal {
    Signal::item("high-tech-science-pack")
}
fn signal_enc() -> Signal {
    Signal::item("science-pack-2")
}
fn signal_a() -> Signal {
    Signal::item("science-pack-3")
}
fn signal_b() -> Signal {
    Signal::item("space-science-pack")
}
fn signal_c() -> Signal {
    Signal::item("production-science-pack")
}
fn signal_addr() -> Signal {
    Signal::item("military-science-pack")
}
fn signal_imm() -> Signal {
    Signal::item("sulfuric-acid-barrel")
}
// Not present in the source revision this renderer is grounded on (its
// Instruction shape predates the branch-target field); picked to keep the
// "*-barrel" item family used by the other wide fields.
fn signal_bran() -> Signal {
    Signal::item("rocket-fuel-barrel")
}

#[derive(Debug, Clone, Serialize)]
struct Icon {
    signal: Signal,
    index: i32,
}

#[derive(Debug, Clone, Serialize)]
struct Blueprint {
    icons: Vec<Icon>,
    entities: Vec<EntityRecord>,
    item: String,
    version: i64,
}

#[derive(Debug, Clone, Serialize)]
struct BlueprintFile {
    blueprint: Blueprint,
}

fn connect_indices(
    entities: &mut [EntityRecord],
    a: usize,
    a_connector: i32,
    b: usize,
    b_connector: i32,
    wire: Wire,
) {
    assert_ne!(a, b, "an entity cannot wire to itself");
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (left, right) = entities.split_at_mut(hi);
    if a < b {
        connect(left[a].entity_mut(), a_connector, right[0].entity_mut(), b_connector, wire);
    } else {
        connect(right[0].entity_mut(), a_connector, left[b].entity_mut(), b_connector, wire);
    }
}

/// The fixed three-combinator prelude that adapts the blueprint's external
/// `signal-instruction-index` input into the per-row decider comparisons.
/// Returns the indices (within `entities`) of the instruction-index input
/// and the negated-index return, which row 0's decider wires back to.
fn add_bus_connector(entities: &mut Vec<EntityRecord>, ids: &mut IdAllocator) -> (usize, usize) {
    let mut instruction_index_input = ArithmeticCombinator::with_constant(
        ids,
        signal_instruction_index(),
        0,
        Operation::Addition,
        signal_instruction_index(),
    );
    instruction_index_input.entity.set_position(0.0, 1.5);

    let mut all_return =
        ArithmeticCombinator::with_constant(ids, signal_each(), 0, Operation::Addition, signal_each());
    all_return.entity.set_position(1.0, 1.5);
    all_return.entity.set_direction(Direction::Down);

    let mut negate_instruction_index_return = ArithmeticCombinator::with_signal(
        ids,
        signal_instruction_index(),
        signal_negative(),
        Operation::Multiplication,
        signal_instruction_index(),
    );
    negate_instruction_index_return.entity.set_position(2.0, 1.5);
    negate_instruction_index_return.entity.set_direction(Direction::Down);

    let mut negative_one = ConstantCombinator::new(ids, filter_group(vec![(signal_negative(), -1)]));
    negative_one.entity.set_position(3.0, 1.0);

    connect(
        &mut instruction_index_input.entity,
        1,
        &mut all_return.entity,
        2,
        Wire::Green,
    );
    connect(
        &mut all_return.entity,
        2,
        &mut negate_instruction_index_return.entity,
        2,
        Wire::Green,
    );
    connect(
        &mut all_return.entity,
        1,
        &mut negate_instruction_index_return.entity,
        1,
        Wire::Green,
    );
    connect(
        &mut negative_one.entity,
        1,
        &mut negate_instruction_index_return.entity,
        1,
        Wire::Red,
    );

    let input_index = entities.len();
    entities.push(EntityRecord::Arithmetic(instruction_index_input));
    entities.push(EntityRecord::Arithmetic(all_return));
    let negate_index = entities.len();
    entities.push(EntityRecord::Arithmetic(negate_instruction_index_return));
    entities.push(EntityRecord::Constant(negative_one));

    (input_index, negate_index)
}

fn instruction_filters(instruction: &Instruction) -> Vec<crate::controls::Filter> {
    filter_group(vec![
        (signal_amux(), i64::from(instruction.amux)),
        (signal_cmux(), i64::from(instruction.cmux)),
        (signal_cond(), i64::from(instruction.cond)),
        (signal_alu(), i64::from(instruction.alu)),
        (signal_bmux(), i64::from(instruction.bmux)),
        (signal_mbr(), i64::from(instruction.mbr)),
        (signal_mar(), i64::from(instruction.mar)),
        (signal_rd(), i64::from(instruction.rd)),
        (signal_wr(), i64::from(instruction.wr)),
        (signal_enc(), i64::from(instruction.enc)),
        (signal_a(), i64::from(instruction.a)),
        (signal_b(), i64::from(instruction.b)),
        (signal_c(), i64::from(instruction.c)),
        (signal_addr(), i64::from(instruction.addr)),
        (signal_bran(), i64::from(instruction.bran)),
        (signal_imm(), i64::from(instruction.imm)),
    ])
}

/// Build one instruction row: a constant combinator holding the word,
/// a decider comparing the external instruction index against this row,
/// and an indicator lamp — wired provider→decider→lamp on the red network.
/// Returns the pushed decider's index within `entities`.
fn add_instruction_row(
    entities: &mut Vec<EntityRecord>,
    ids: &mut IdAllocator,
    instruction: &Instruction,
    index: usize,
) -> usize {
    let mut provider = ConstantCombinator::new(ids, instruction_filters(instruction));
    provider.entity.set_direction(Direction::Right);
    provider.entity.set_position(0.0, -(index as f32));

    let mut decider = DeciderCombinator::with_constant(
        ids,
        signal_instruction_index(),
        index as i64,
        Comparator::Equal,
        signal_everything(),
        true,
    );
    decider.entity.set_direction(Direction::Right);
    decider.entity.set_position(1.5, -(index as f32));

    let mut lamp = Lamp::with_constant(ids, signal_anything(), 0, Comparator::GreaterThan);
    lamp.entity.set_position(3.0, -(index as f32));

    connect(&mut provider.entity, 1, &mut decider.entity, 1, Wire::Red);
    connect(&mut decider.entity, 2, &mut lamp.entity, 1, Wire::Red);

    entities.push(EntityRecord::Constant(provider));
    let decider_index = entities.len();
    entities.push(EntityRecord::Decider(decider));
    entities.push(EntityRecord::Lamp(lamp));

    decider_index
}

fn build_document(instructions: &[Instruction]) -> BlueprintFile {
    let mut ids = IdAllocator::new();
    let mut entities: Vec<EntityRecord> = Vec::new();

    let (input_index, negate_index) = add_bus_connector(&mut entities, &mut ids);

    let mut previous_decider_index: Option<usize> = None;
    for (index, instruction) in instructions.iter().enumerate() {
        let decider_index = add_instruction_row(&mut entities, &mut ids, instruction, index);
        match previous_decider_index {
            None => {
                connect_indices(&mut entities, decider_index, 1, input_index, 2, Wire::Green);
                connect_indices(&mut entities, decider_index, 2, negate_index, 1, Wire::Green);
            }
            Some(previous) => {
                connect_indices(&mut entities, decider_index, 1, previous, 1, Wire::Green);
                connect_indices(&mut entities, decider_index, 2, previous, 2, Wire::Green);
            }
        }
        previous_decider_index = Some(decider_index);
    }

    BlueprintFile {
        blueprint: Blueprint {
            icons: vec![
                Icon {
                    signal: Signal::item("science-pack-1"),
                    index: 1,
                },
                Icon {
                    signal: Signal::item("science-pack-2"),
                    index: 2,
                },
                Icon {
                    signal: Signal::item("science-pack-3"),
                    index: 3,
                },
                Icon {
                    signal: Signal::item("space-science-pack"),
                    index: 4,
                },
            ],
            entities,
            item: "blueprint".to_string(),
            version: 64425558017,
        },
    }
}

/// Render a finished instruction sequence into the external blueprint wire
/// format: an ASCII `'0'` version byte, followed by the base64-standard
/// encoding of zlib-compressed, UTF-8 JSON.
pub fn render(instructions: &[Instruction], mut writer: impl Write) -> io::Result<()> {
    let document = build_document(instructions);
    let json = serde_json::to_vec(&document)
        .expect("blueprint document has no non-serializable fields");

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    let encoded = BASE64.encode(compressed);

    writer.write_all(b"0")?;
    writer.write_all(encoded.as_bytes())?;
    Ok(())
}
