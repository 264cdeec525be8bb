//! Assembly backend that ignores everything except the stack height.
//!
//! Used as the target of a compilation dry-run: the code generator runs unmodified and the
//! only result is the net change of the operand stack. Every instruction contributes the
//! `ret - args` of its entry in the arity table; pseudo-instructions are mapped onto the
//! instruction a real assembler would emit for them.

use drygen_common::{Opcode, U256};
use tracing::trace;

use crate::{
    assembly::{AbstractAssembly, JumpType, LabelId, SubId},
    errors::AssemblyError,
};

/// Handle returned for every label, sub-assembly and data request.
/// Callers of a dry run never dereference it, so it does not need to be unique.
pub const SENTINEL_ID: usize = 1;

#[derive(Debug, Default)]
pub struct NoOutputAssembly {
    stack_height: i64,
}

impl NoOutputAssembly {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AbstractAssembly for NoOutputAssembly {
    fn stack_height(&self) -> i64 {
        self.stack_height
    }

    fn set_stack_height(&mut self, height: i64) {
        self.stack_height = height;
    }

    fn append_instruction(&mut self, opcode: Opcode) {
        let diff = opcode.info().stack_diff();
        // Wraps instead of clamping so that opposite effects always cancel out.
        self.stack_height = self.stack_height.wrapping_add(diff);
        trace!(?opcode, diff, height = self.stack_height, "instruction");
    }

    fn append_constant(&mut self, _value: U256) {
        self.append_instruction(Opcode::PUSH1);
    }

    fn append_label(&mut self, _id: LabelId) {
        self.append_instruction(Opcode::JUMPDEST);
    }

    fn append_label_reference(&mut self, _id: LabelId) {
        self.append_instruction(Opcode::PUSH1);
    }

    fn new_label_id(&mut self) -> LabelId {
        SENTINEL_ID
    }

    fn named_label(
        &mut self,
        _name: &str,
        _num_args: usize,
        _num_rets: usize,
        _existing_id: Option<LabelId>,
    ) -> LabelId {
        SENTINEL_ID
    }

    fn append_linker_symbol(&mut self, _name: &str) -> Result<(), AssemblyError> {
        Err(AssemblyError::UnsupportedCapability(
            "linker symbols are not implemented",
        ))
    }

    fn append_jump(&mut self, stack_diff_after: i64, _jump_type: JumpType) {
        self.append_instruction(Opcode::JUMP);
        self.stack_height = self.stack_height.wrapping_add(stack_diff_after);
    }

    fn append_jump_to(&mut self, id: LabelId, stack_diff_after: i64, jump_type: JumpType) {
        self.append_label_reference(id);
        self.append_jump(stack_diff_after, jump_type);
    }

    fn append_jump_to_if(&mut self, id: LabelId, _jump_type: JumpType) {
        self.append_label_reference(id);
        self.append_instruction(Opcode::JUMPI);
    }

    // Only the arity of PUSH1 matters here, no bytes are laid out.
    fn append_assembly_size(&mut self) {
        self.append_instruction(Opcode::PUSH1);
    }

    fn create_sub_assembly(
        &mut self,
        _name: &str,
    ) -> Result<(Box<dyn AbstractAssembly>, SubId), AssemblyError> {
        Err(AssemblyError::UnsupportedCapability(
            "sub assemblies are not implemented",
        ))
    }

    fn append_data_offset(&mut self, _sub_path: &[SubId]) {
        self.append_instruction(Opcode::PUSH1);
    }

    fn append_data_size(&mut self, _sub_path: &[SubId]) {
        self.append_instruction(Opcode::PUSH1);
    }

    fn append_data(&mut self, _data: &[u8]) -> SubId {
        SENTINEL_ID
    }

    fn append_immutable(&mut self, _name: &str) -> Result<(), AssemblyError> {
        Err(AssemblyError::UnsupportedCapability(
            "loadimmutable is not implemented",
        ))
    }

    fn append_immutable_assignment(&mut self, _name: &str) -> Result<(), AssemblyError> {
        Err(AssemblyError::UnsupportedCapability(
            "setimmutable is not implemented",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// Stack height change caused by `f`, starting from a non-zero height.
    fn delta(f: impl FnOnce(&mut NoOutputAssembly)) -> i64 {
        let mut assembly = NoOutputAssembly::new();
        assembly.set_stack_height(10);
        f(&mut assembly);
        assembly.stack_height() - 10
    }

    #[test]
    fn instruction_applies_arity_table() {
        assert_eq!(delta(|a| a.append_instruction(Opcode::ADD)), -1);
        assert_eq!(delta(|a| a.append_instruction(Opcode::CALL)), -6);
        assert_eq!(delta(|a| a.append_instruction(Opcode::CALLER)), 1);
        assert_eq!(delta(|a| a.append_instruction(Opcode::SWAP3)), 0);
        assert_eq!(delta(|a| a.append_instruction(Opcode::DUP7)), 1);
        assert_eq!(delta(|a| a.append_instruction(Opcode::LOG2)), -4);
    }

    #[test]
    fn constants_and_label_references_push_one() {
        assert_eq!(delta(|a| a.append_constant(U256::zero())), 1);
        assert_eq!(delta(|a| a.append_constant(U256::MAX)), 1);
        assert_eq!(delta(|a| a.append_label_reference(42)), 1);
        assert_eq!(delta(|a| a.append_assembly_size()), 1);
        assert_eq!(delta(|a| a.append_data_offset(&[])), 1);
        assert_eq!(delta(|a| a.append_data_size(&[1, 2, 3])), 1);
    }

    #[test]
    fn labels_do_not_touch_the_stack() {
        assert_eq!(delta(|a| a.append_label(0)), 0);
        assert_eq!(delta(|a| a.append_label(usize::MAX)), 0);
    }

    #[test]
    fn jumps_add_declared_difference() {
        assert_eq!(delta(|a| a.append_jump(-2, JumpType::Ordinary)), -3);
        assert_eq!(delta(|a| a.append_jump(0, JumpType::OutOfFunction)), -1);
        assert_eq!(delta(|a| a.append_jump_to(7, -1, JumpType::Ordinary)), -1);
        assert_eq!(delta(|a| a.append_jump_to(7, 2, JumpType::IntoFunction)), 2);
        assert_eq!(delta(|a| a.append_jump_to_if(7, JumpType::Ordinary)), -1);
    }

    #[test]
    fn handles_are_always_the_sentinel() {
        let mut assembly = NoOutputAssembly::new();
        assert_eq!(assembly.new_label_id(), SENTINEL_ID);
        assert_eq!(assembly.named_label("f", 2, 1, None), SENTINEL_ID);
        assert_eq!(assembly.new_label_id(), SENTINEL_ID);
        assert_eq!(assembly.named_label("g", 0, 0, Some(99)), SENTINEL_ID);
        assert_eq!(assembly.append_data(&[]), SENTINEL_ID);
        assert_eq!(assembly.append_data(&hex!("600160020100")), SENTINEL_ID);
        assert_eq!(assembly.stack_height(), 0);
    }

    #[test]
    fn unsupported_capabilities_fail_without_touching_the_stack() {
        let mut assembly = NoOutputAssembly::new();
        assembly.append_constant(U256::one());

        assert!(matches!(
            assembly.append_linker_symbol("lib.sol:L"),
            Err(AssemblyError::UnsupportedCapability(_))
        ));
        assert!(matches!(
            assembly.create_sub_assembly("runtime"),
            Err(AssemblyError::UnsupportedCapability(_))
        ));
        assert!(matches!(
            assembly.append_immutable("owner"),
            Err(AssemblyError::UnsupportedCapability(_))
        ));
        assert!(matches!(
            assembly.append_immutable_assignment("owner"),
            Err(AssemblyError::UnsupportedCapability(_))
        ));
        assert_eq!(assembly.stack_height(), 1);
    }

    #[test]
    fn effects_cancel_at_the_edges_of_the_counter() {
        let mut assembly = NoOutputAssembly::new();
        assembly.set_stack_height(i64::MAX);
        assembly.append_constant(U256::zero());
        assembly.append_instruction(Opcode::POP);
        assert_eq!(assembly.stack_height(), i64::MAX);

        assembly.set_stack_height(i64::MIN);
        assembly.append_jump(-5, JumpType::Ordinary);
        assembly.append_jump(4, JumpType::Ordinary);
        assembly.append_constant(U256::zero());
        assembly.append_constant(U256::zero());
        assembly.append_constant(U256::zero());
        assert_eq!(assembly.stack_height(), i64::MIN);
    }

    #[test]
    fn constant_constant_add_leaves_one_value() {
        let mut assembly = NoOutputAssembly::new();
        assembly.append_constant(U256::from(5));
        assembly.append_constant(U256::from(7));
        assembly.append_instruction(Opcode::ADD);
        assert_eq!(assembly.stack_height(), 1);
    }
}
