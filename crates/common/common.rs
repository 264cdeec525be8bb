pub use ethereum_types::U256;
pub mod fork;
pub mod opcodes;

pub use fork::Fork;
pub use opcodes::{InstructionInfo, Opcode};
