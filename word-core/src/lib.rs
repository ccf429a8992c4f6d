pub mod error;
pub mod instruction;
pub mod label_table;
pub mod lexer;
pub mod macro_store;
pub mod opcode_table;
pub mod operand;

pub use error::{ErrorKind, LineError};
pub use instruction::{merge, Instruction};
pub use label_table::LabelTable;
pub use lexer::{parse_line, ParsedLine};
pub use macro_store::MacroStore;
pub use opcode_table::{matches_signature, render_tuple, OpcodeStrategy, DIRECTIVE_ARITY, INSTRUCTION_TABLE};
pub use operand::{classify, emit, is_legal_macro_name, parse_int, strip_address_of, Operand};
