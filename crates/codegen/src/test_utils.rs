use drygen_common::{Opcode, U256};

use crate::{
    assembly::{AbstractAssembly, JumpType, LabelId, SubId},
    ast::Expression,
    dialect::BuiltinContext,
    errors::{AssemblyError, CodegenError},
    no_output::NoOutputAssembly,
};

/// Value pushed by [`recording_visitor`] for every visited argument.
pub const VISITED_MARKER: U256 = U256::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Instruction(Opcode),
    Constant(U256),
    Label(LabelId),
    LabelReference(LabelId),
    Jump(i64),
    AssemblySize,
    DataOffset(Vec<SubId>),
    DataSize(Vec<SubId>),
}

/// Records every call it receives and tracks the stack height like [`NoOutputAssembly`].
#[derive(Debug, Default)]
pub struct RecordingAssembly {
    inner: NoOutputAssembly,
    pub events: Vec<Event>,
}

impl AbstractAssembly for RecordingAssembly {
    fn stack_height(&self) -> i64 {
        self.inner.stack_height()
    }

    fn set_stack_height(&mut self, height: i64) {
        self.inner.set_stack_height(height);
    }

    fn append_instruction(&mut self, opcode: Opcode) {
        self.events.push(Event::Instruction(opcode));
        self.inner.append_instruction(opcode);
    }

    fn append_constant(&mut self, value: U256) {
        self.events.push(Event::Constant(value));
        self.inner.append_constant(value);
    }

    fn append_label(&mut self, id: LabelId) {
        self.events.push(Event::Label(id));
        self.inner.append_label(id);
    }

    fn append_label_reference(&mut self, id: LabelId) {
        self.events.push(Event::LabelReference(id));
        self.inner.append_label_reference(id);
    }

    fn new_label_id(&mut self) -> LabelId {
        self.inner.new_label_id()
    }

    fn named_label(
        &mut self,
        name: &str,
        num_args: usize,
        num_rets: usize,
        existing_id: Option<LabelId>,
    ) -> LabelId {
        self.inner.named_label(name, num_args, num_rets, existing_id)
    }

    fn append_linker_symbol(&mut self, name: &str) -> Result<(), AssemblyError> {
        self.inner.append_linker_symbol(name)
    }

    fn append_jump(&mut self, stack_diff_after: i64, jump_type: JumpType) {
        self.events.push(Event::Jump(stack_diff_after));
        self.inner.append_jump(stack_diff_after, jump_type);
    }

    fn append_jump_to(&mut self, id: LabelId, stack_diff_after: i64, jump_type: JumpType) {
        self.append_label_reference(id);
        self.append_jump(stack_diff_after, jump_type);
    }

    fn append_jump_to_if(&mut self, id: LabelId, _jump_type: JumpType) {
        self.append_label_reference(id);
        self.append_instruction(Opcode::JUMPI);
    }

    fn append_assembly_size(&mut self) {
        self.events.push(Event::AssemblySize);
        self.inner.append_assembly_size();
    }

    fn create_sub_assembly(
        &mut self,
        name: &str,
    ) -> Result<(Box<dyn AbstractAssembly>, SubId), AssemblyError> {
        self.inner.create_sub_assembly(name)
    }

    fn append_data_offset(&mut self, sub_path: &[SubId]) {
        self.events.push(Event::DataOffset(sub_path.to_vec()));
        self.inner.append_data_offset(sub_path);
    }

    fn append_data_size(&mut self, sub_path: &[SubId]) {
        self.events.push(Event::DataSize(sub_path.to_vec()));
        self.inner.append_data_size(sub_path);
    }

    fn append_data(&mut self, data: &[u8]) -> SubId {
        self.inner.append_data(data)
    }

    fn append_immutable(&mut self, name: &str) -> Result<(), AssemblyError> {
        self.inner.append_immutable(name)
    }

    fn append_immutable_assignment(&mut self, name: &str) -> Result<(), AssemblyError> {
        self.inner.append_immutable_assignment(name)
    }
}

/// Argument visitor that records the name of every visited identifier and pushes
/// [`VISITED_MARKER`] in its place.
pub fn recording_visitor(
    visited: &mut Vec<String>,
) -> impl FnMut(&Expression, &mut dyn AbstractAssembly, &mut BuiltinContext) -> Result<(), CodegenError>
+ '_ {
    move |expression, assembly, _context| {
        if let Expression::Identifier(name) = expression {
            visited.push(name.clone());
        }
        assembly.append_constant(VISITED_MARKER);
        Ok(())
    }
}
