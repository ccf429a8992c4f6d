use std::collections::HashMap;

use serde::Serialize;

use crate::controls::{Comparator, Filter, FilterGroup, Operation, Signal};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vector2 { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[repr(i32)]
pub enum Direction {
    Up = 0,
    Right = 2,
    Down = 4,
    #[allow(dead_code)]
    Left = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Green,
    Red,
}

impl Wire {
    fn as_str(self) -> &'static str {
        match self {
            Wire::Green => "green",
            Wire::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Circuit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i32>,
}

pub type Connections = HashMap<String, HashMap<String, Vec<Circuit>>>;

/// The common envelope every placed entity carries: identity, position,
/// orientation, and wire connections. Combinator-specific structs flatten
/// one of these alongside their own `control_behavior`.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub name: String,
    pub entity_number: i32,
    pub position: Vector2,
    pub direction: i32,
    pub connections: Connections,
}

impl Entity {
    fn new(name: &str, id: i32) -> Self {
        Entity {
            name: name.to_string(),
            entity_number: id,
            position: Vector2::new(0.0, 0.0),
            direction: Direction::Up as i32,
            connections: Connections::new(),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vector2::new(x, y);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction as i32;
    }

    fn add_connection(&mut self, other_entity_id: i32, connector: &str, wire: Wire, other_connector: i32) {
        let circuit = Circuit {
            entity_id: Some(other_entity_id),
            circuit_id: Some(other_connector),
        };
        self.connections
            .entry(connector.to_string())
            .or_default()
            .entry(wire.as_str().to_string())
            .or_default()
            .push(circuit);
    }
}

/// Monotonic entity-number allocator for one blueprint. Each rendered
/// blueprint owns its own allocator; there is no process-wide counter.
#[derive(Debug, Default)]
pub struct IdAllocator(i32);

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator(0)
    }

    pub fn next(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

/// Wire two entities' numbered connectors together, red or green, on both
/// sides at once.
pub fn connect(
    first: &mut Entity,
    first_connector: i32,
    second: &mut Entity,
    second_connector: i32,
    wire: Wire,
) {
    let first_id = first.entity_number;
    let second_id = second.entity_number;
    first.add_connection(second_id, &first_connector.to_string(), wire, second_connector);
    second.add_connection(first_id, &second_connector.to_string(), wire, first_connector);
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstantBehavior {
    pub filters: FilterGroup,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstantCombinator {
    #[serde(flatten)]
    pub entity: Entity,
    pub control_behavior: ConstantBehavior,
}

impl ConstantCombinator {
    pub fn new(ids: &mut IdAllocator, filters: Vec<Filter>) -> Self {
        ConstantCombinator {
            entity: Entity::new("constant-combinator", ids.next()),
            control_behavior: ConstantBehavior { filters },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeciderConditions {
    pub first_signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<Signal>,
    pub constant: i64,
    pub comparator: Comparator,
    pub output_signal: Signal,
    pub copy_count_from_input: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeciderBehavior {
    pub decider_conditions: DeciderConditions,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeciderCombinator {
    #[serde(flatten)]
    pub entity: Entity,
    pub control_behavior: DeciderBehavior,
}

impl DeciderCombinator {
    pub fn with_constant(
        ids: &mut IdAllocator,
        first_signal: Signal,
        constant: i64,
        comparator: Comparator,
        output_signal: Signal,
        copy_count_from_input: bool,
    ) -> Self {
        DeciderCombinator {
            entity: Entity::new("decider-combinator", ids.next()),
            control_behavior: DeciderBehavior {
                decider_conditions: DeciderConditions {
                    first_signal,
                    second_signal: None,
                    constant,
                    comparator,
                    output_signal,
                    copy_count_from_input,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LampConditions {
    pub first_signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<Signal>,
    pub constant: i64,
    pub comparator: Comparator,
}

#[derive(Debug, Clone, Serialize)]
pub struct LampBehavior {
    pub circuit_condition: LampConditions,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lamp {
    #[serde(flatten)]
    pub entity: Entity,
    pub control_behavior: LampBehavior,
}

impl Lamp {
    pub fn with_constant(ids: &mut IdAllocator, first_signal: Signal, constant: i64, comparator: Comparator) -> Self {
        Lamp {
            entity: Entity::new("small-lamp", ids.next()),
            control_behavior: LampBehavior {
                circuit_condition: LampConditions {
                    first_signal,
                    second_signal: None,
                    constant,
                    comparator,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArithmeticConditions {
    pub first_signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<Signal>,
    pub constant: i64,
    pub operation: Operation,
    pub output_signal: Signal,
    pub copy_count_from_input: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArithmeticBehavior {
    pub arithmetic_conditions: ArithmeticConditions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArithmeticCombinator {
    #[serde(flatten)]
    pub entity: Entity,
    pub control_behavior: ArithmeticBehavior,
}

impl ArithmeticCombinator {
    pub fn with_constant(
        ids: &mut IdAllocator,
        first_signal: Signal,
        constant: i64,
        operation: Operation,
        output_signal: Signal,
    ) -> Self {
        ArithmeticCombinator {
            entity: Entity::new("arithmetic-combinator", ids.next()),
            control_behavior: ArithmeticBehavior {
                arithmetic_conditions: ArithmeticConditions {
                    first_signal,
                    second_signal: None,
                    constant,
                    operation,
                    output_signal,
                    copy_count_from_input: 0,
                },
            },
        }
    }

    pub fn with_signal(
        ids: &mut IdAllocator,
        first_signal: Signal,
        second_signal: Signal,
        operation: Operation,
        output_signal: Signal,
    ) -> Self {
        ArithmeticCombinator {
            entity: Entity::new("arithmetic-combinator", ids.next()),
            control_behavior: ArithmeticBehavior {
                arithmetic_conditions: ArithmeticConditions {
                    first_signal,
                    second_signal: Some(second_signal),
                    constant: 0,
                    operation,
                    output_signal,
                    copy_count_from_input: 0,
                },
            },
        }
    }
}

/// A placed entity, serialized without a discriminant tag — exactly the
/// shape Factorio expects for a blueprint's flat `entities` array.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntityRecord {
    Constant(ConstantCombinator),
    Decider(DeciderCombinator),
    Lamp(Lamp),
    Arithmetic(ArithmeticCombinator),
}

impl EntityRecord {
    pub fn entity_mut(&mut self) -> &mut Entity {
        match self {
            EntityRecord::Constant(c) => &mut c.entity,
            EntityRecord::Decider(d) => &mut d.entity,
            EntityRecord::Lamp(l) => &mut l.entity,
            EntityRecord::Arithmetic(a) => &mut a.entity,
        }
    }

    pub fn entity(&self) -> &Entity {
        match self {
            EntityRecord::Constant(c) => &c.entity,
            EntityRecord::Decider(d) => &d.entity,
            EntityRecord::Lamp(l) => &l.entity,
            EntityRecord::Arithmetic(a) => &a.entity,
        }
    }
}
