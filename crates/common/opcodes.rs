use crate::fork::Fork;
use strum::{EnumIter, IntoStaticStr};

#[derive(
    Debug, PartialEq, Eq, Clone, Copy, PartialOrd, EnumIter, IntoStaticStr, Hash,
)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    // Stop and Arithmetic Operations
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison & Bitwise Logic Operations
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,
    CLZ = 0x1E,

    // KECCAK256
    KECCAK256 = 0x20,

    // Environmental Information
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3A,
    EXTCODESIZE = 0x3B,
    EXTCODECOPY = 0x3C,
    RETURNDATASIZE = 0x3D,
    RETURNDATACOPY = 0x3E,
    EXTCODEHASH = 0x3F,

    // Block Information
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    PREVRANDAO = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,
    BLOBHASH = 0x49,
    BLOBBASEFEE = 0x4A,
    SLOTNUM = 0x4B,

    // Stack, Memory, Storage, and Flow Operations
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,
    TLOAD = 0x5C,
    TSTORE = 0x5D,
    MCOPY = 0x5E,

    // Push Operations
    PUSH0 = 0x5F,
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Duplication Operations
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Swap Operations
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,
    // Logging Operations
    LOG0 = 0xA0,
    LOG1 = 0xA1,
    LOG2 = 0xA2,
    LOG3 = 0xA3,
    LOG4 = 0xA4,
    // System Operations
    CREATE = 0xF0,
    CALL = 0xF1,
    CALLCODE = 0xF2,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    CREATE2 = 0xF5,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

/// Static stack arity of an instruction: how many values it pops and how many it pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionInfo {
    pub args: usize,
    pub ret: usize,
}

impl InstructionInfo {
    const fn new(args: usize, ret: usize) -> Self {
        Self { args, ret }
    }

    /// Net change of the operand stack height, `ret - args`.
    #[expect(clippy::as_conversions, reason = "arities are at most 17")]
    pub const fn stack_diff(&self) -> i64 {
        self.ret as i64 - self.args as i64
    }
}

const DUP_OPCODES: [Opcode; 16] = [
    Opcode::DUP1,
    Opcode::DUP2,
    Opcode::DUP3,
    Opcode::DUP4,
    Opcode::DUP5,
    Opcode::DUP6,
    Opcode::DUP7,
    Opcode::DUP8,
    Opcode::DUP9,
    Opcode::DUP10,
    Opcode::DUP11,
    Opcode::DUP12,
    Opcode::DUP13,
    Opcode::DUP14,
    Opcode::DUP15,
    Opcode::DUP16,
];

impl Opcode {
    /// The `DUPn` instruction copying the `n`-th stack item (1-based), if `1 <= n <= 16`.
    pub fn dup(n: usize) -> Option<Self> {
        DUP_OPCODES.get(n.checked_sub(1)?).copied()
    }

    /// Lowercase mnemonic, as used for builtin function names.
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    /// Stack arity of the instruction.
    ///
    /// `DUPn` is modelled as consuming `n` values and returning `n + 1`, `SWAPn` as consuming
    /// and returning `n + 1`, `LOGn` as consuming `n + 2`.
    #[expect(clippy::as_conversions, reason = "opcode byte values")]
    pub const fn info(self) -> InstructionInfo {
        use Opcode::*;
        let byte = self as u8 as usize;
        match self {
            STOP | JUMPDEST | INVALID => InstructionInfo::new(0, 0),

            ADD | MUL | SUB | DIV | SDIV | MOD | SMOD | EXP | SIGNEXTEND | LT | GT | SLT | SGT
            | EQ | AND | OR | XOR | BYTE | SHL | SHR | SAR | KECCAK256 => {
                InstructionInfo::new(2, 1)
            }
            ADDMOD | MULMOD => InstructionInfo::new(3, 1),
            ISZERO | NOT | CLZ => InstructionInfo::new(1, 1),

            ADDRESS | ORIGIN | CALLER | CALLVALUE | CALLDATASIZE | CODESIZE | GASPRICE
            | RETURNDATASIZE | COINBASE | TIMESTAMP | NUMBER | PREVRANDAO | GASLIMIT | CHAINID
            | SELFBALANCE | BASEFEE | BLOBBASEFEE | SLOTNUM | PC | MSIZE | GAS => {
                InstructionInfo::new(0, 1)
            }
            BALANCE | CALLDATALOAD | EXTCODESIZE | EXTCODEHASH | BLOCKHASH | BLOBHASH | MLOAD
            | SLOAD | TLOAD => InstructionInfo::new(1, 1),
            CALLDATACOPY | CODECOPY | RETURNDATACOPY | MCOPY => InstructionInfo::new(3, 0),
            EXTCODECOPY => InstructionInfo::new(4, 0),

            POP | JUMP | SELFDESTRUCT => InstructionInfo::new(1, 0),
            MSTORE | MSTORE8 | SSTORE | TSTORE | JUMPI | RETURN | REVERT => {
                InstructionInfo::new(2, 0)
            }

            CREATE => InstructionInfo::new(3, 1),
            CREATE2 => InstructionInfo::new(4, 1),
            CALL | CALLCODE => InstructionInfo::new(7, 1),
            DELEGATECALL | STATICCALL => InstructionInfo::new(6, 1),

            _ => {
                if byte >= PUSH0 as usize && byte <= PUSH32 as usize {
                    InstructionInfo::new(0, 1)
                } else if byte >= DUP1 as usize && byte <= DUP16 as usize {
                    let n = byte - DUP1 as usize + 1;
                    InstructionInfo::new(n, n + 1)
                } else if byte >= SWAP1 as usize && byte <= SWAP16 as usize {
                    let n = byte - SWAP1 as usize + 1;
                    InstructionInfo::new(n + 1, n + 1)
                } else {
                    // LOG0..=LOG4, the only remaining variants
                    let n = byte - LOG0 as usize;
                    InstructionInfo::new(n + 2, 0)
                }
            }
        }
    }

    /// Whether the instruction is part of the instruction set at `fork`.
    pub fn is_available(self, fork: Fork) -> bool {
        match self {
            // [EIP-3855] - PUSH0 is only available from SHANGHAI
            Opcode::PUSH0 => fork >= Fork::Shanghai,
            // [EIP-5656], [EIP-1153], [EIP-7516], [EIP-4844] - available from CANCUN
            Opcode::MCOPY
            | Opcode::TLOAD
            | Opcode::TSTORE
            | Opcode::BLOBBASEFEE
            | Opcode::BLOBHASH => fork >= Fork::Cancun,
            // [EIP-7939]
            Opcode::CLZ => fork >= Fork::Osaka,
            // [EIP-7843]
            Opcode::SLOTNUM => fork >= Fork::Amsterdam,
            _ => true,
        }
    }

    /// Whether the instruction manipulates the stack layout or control flow directly and
    /// therefore cannot be exposed as a plain builtin function.
    #[expect(clippy::as_conversions, reason = "opcode byte values")]
    pub fn is_stack_or_flow(self) -> bool {
        let byte = self as u8;
        matches!(
            self,
            Opcode::JUMP | Opcode::JUMPI | Opcode::JUMPDEST | Opcode::PC
        ) || ((Opcode::PUSH0 as u8)..=(Opcode::SWAP16 as u8)).contains(&byte)
    }
}
