//! The assembler interface code generators write into.
//!
//! A code generator only talks to `&mut dyn AbstractAssembly`, so the same generator can drive
//! a real bytecode encoder or the [`NoOutputAssembly`](crate::no_output::NoOutputAssembly)
//! dry-run backend. The backend is chosen before a pass starts and never swapped mid-pass.

use drygen_common::{Opcode, U256};

use crate::errors::AssemblyError;

/// Handle to a jump target.
pub type LabelId = usize;
/// Handle to a sub-assembly or a data section.
pub type SubId = usize;

/// Annotation attached to jumps. Only used for debugging output by real assemblers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpType {
    #[default]
    Ordinary,
    IntoFunction,
    OutOfFunction,
}

/// Target of a code generation pass.
///
/// Fallible operations return [`AssemblyError::UnsupportedCapability`] when the backend
/// cannot express the request at all. The stack height is not updated in that case and the
/// output of the pass is meaningless: callers must propagate the error and abandon the pass,
/// never retry the operation or continue with the next one.
pub trait AbstractAssembly {
    /// Current height of the operand stack, relative to where the pass started.
    fn stack_height(&self) -> i64;
    /// Overrides the stack height, e.g. when entering a function body.
    fn set_stack_height(&mut self, height: i64);

    fn append_instruction(&mut self, opcode: Opcode);
    fn append_constant(&mut self, value: U256);
    fn append_label(&mut self, id: LabelId);
    /// Pushes the address of a label.
    fn append_label_reference(&mut self, id: LabelId);
    fn new_label_id(&mut self) -> LabelId;
    /// Returns a label for a named function entry point, reusing `existing_id` if given.
    fn named_label(
        &mut self,
        name: &str,
        num_args: usize,
        num_rets: usize,
        existing_id: Option<LabelId>,
    ) -> LabelId;
    fn append_linker_symbol(&mut self, name: &str) -> Result<(), AssemblyError>;

    /// Appends a jump to the address on top of the stack. `stack_diff_after` is the stack height
    /// change the caller expects once control comes back, on top of the jump itself.
    fn append_jump(&mut self, stack_diff_after: i64, jump_type: JumpType);
    fn append_jump_to(&mut self, id: LabelId, stack_diff_after: i64, jump_type: JumpType);
    fn append_jump_to_if(&mut self, id: LabelId, jump_type: JumpType);

    /// Pushes the size of the current assembly.
    fn append_assembly_size(&mut self);
    fn create_sub_assembly(
        &mut self,
        name: &str,
    ) -> Result<(Box<dyn AbstractAssembly>, SubId), AssemblyError>;
    /// Pushes the offset of the (nested) sub-assembly reached through `sub_path`.
    fn append_data_offset(&mut self, sub_path: &[SubId]);
    /// Pushes the size of the (nested) sub-assembly reached through `sub_path`.
    fn append_data_size(&mut self, sub_path: &[SubId]);
    fn append_data(&mut self, data: &[u8]) -> SubId;

    fn append_immutable(&mut self, name: &str) -> Result<(), AssemblyError>;
    fn append_immutable_assignment(&mut self, name: &str) -> Result<(), AssemblyError>;
}
