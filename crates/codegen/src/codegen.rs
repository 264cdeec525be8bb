use drygen_common::{Opcode, U256};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    assembly::AbstractAssembly,
    ast::{Expression, FunctionCall},
    dialect::{BuiltinContext, Dialect},
    errors::CodegenError,
};

/// Generates code for expressions into an [`AbstractAssembly`], resolving calls through a
/// [`Dialect`].
pub struct ExpressionCodegen<'a> {
    dialect: &'a Dialect,
    assembly: &'a mut dyn AbstractAssembly,
    context: BuiltinContext,
    /// Stack slot (1-based, counted from the bottom) of every bound variable.
    variables: FxHashMap<String, i64>,
}

impl<'a> ExpressionCodegen<'a> {
    pub fn new(
        dialect: &'a Dialect,
        assembly: &'a mut dyn AbstractAssembly,
        context: BuiltinContext,
    ) -> Self {
        Self {
            dialect,
            assembly,
            context,
            variables: FxHashMap::default(),
        }
    }

    pub fn stack_height(&self) -> i64 {
        self.assembly.stack_height()
    }

    /// Binds `name` to the value currently on top of the stack.
    pub fn bind_variable(&mut self, name: impl Into<String>) {
        let slot = self.assembly.stack_height();
        self.variables.insert(name.into(), slot);
    }

    /// Pushes `value`, or zero when absent, and binds `name` to it.
    pub fn declare_variable(
        &mut self,
        name: impl Into<String>,
        value: Option<&Expression>,
    ) -> Result<(), CodegenError> {
        match value {
            Some(value) => self.visit_expression(value)?,
            None => self.assembly.append_constant(U256::zero()),
        }
        self.bind_variable(name);
        Ok(())
    }

    pub fn visit_expression(&mut self, expression: &Expression) -> Result<(), CodegenError> {
        let scope = Scope {
            dialect: self.dialect,
            variables: &self.variables,
        };
        scope.generate(expression, &mut *self.assembly, &mut self.context)
    }

    /// Generates an expression statement. The expression must leave the stack as it found it.
    pub fn visit_statement(&mut self, expression: &Expression) -> Result<(), CodegenError> {
        let before = self.stack_height();
        self.visit_expression(expression)?;
        let diff = self.stack_height() - before;
        debug!(diff, height = self.stack_height(), "Generated expression statement");
        if diff != 0 {
            return Err(CodegenError::UnbalancedStatement(diff));
        }
        Ok(())
    }
}

struct Scope<'s> {
    dialect: &'s Dialect,
    variables: &'s FxHashMap<String, i64>,
}

impl Scope<'_> {
    fn generate(
        &self,
        expression: &Expression,
        assembly: &mut dyn AbstractAssembly,
        context: &mut BuiltinContext,
    ) -> Result<(), CodegenError> {
        match expression {
            Expression::Number(value) => assembly.append_constant(*value),
            Expression::String(value) => assembly.append_constant(string_to_word(value)?),
            Expression::Identifier(name) => {
                let slot = self
                    .variables
                    .get(name)
                    .ok_or_else(|| CodegenError::UnknownIdentifier(name.clone()))?;
                let depth = assembly.stack_height() - slot + 1;
                let dup = usize::try_from(depth)
                    .ok()
                    .and_then(Opcode::dup)
                    .ok_or_else(|| CodegenError::StackTooDeep(name.clone()))?;
                assembly.append_instruction(dup);
            }
            Expression::Call(call) => self.generate_call(call, assembly, context)?,
        }
        Ok(())
    }

    fn generate_call(
        &self,
        call: &FunctionCall,
        assembly: &mut dyn AbstractAssembly,
        context: &mut BuiltinContext,
    ) -> Result<(), CodegenError> {
        let builtin = self
            .dialect
            .builtin(&call.name)
            .ok_or_else(|| CodegenError::UnknownFunction(call.name.clone()))?;

        if call.arguments.len() != builtin.parameters {
            return Err(CodegenError::ArgumentCountMismatch {
                name: call.name.clone(),
                expected: builtin.parameters,
                got: call.arguments.len(),
            });
        }
        let non_literal = call
            .arguments
            .iter()
            .enumerate()
            .find(|(index, argument)| builtin.is_literal_argument(*index) && !argument.is_literal());
        if let Some((index, _)) = non_literal {
            return Err(CodegenError::LiteralArgumentExpected {
                name: call.name.clone(),
                index,
            });
        }

        trace!(function = %call.name, "Generating builtin call");
        builtin.generate_code(call, assembly, context, &mut |argument, assembly, context| {
            self.generate(argument, assembly, context)
        })
    }
}

/// Left-aligns the bytes of a string literal in a 32 byte word.
fn string_to_word(value: &str) -> Result<U256, CodegenError> {
    let bytes = value.as_bytes();
    let mut word = [0u8; 32];
    word.get_mut(..bytes.len())
        .ok_or_else(|| CodegenError::StringLiteralTooLong(value.to_string()))?
        .copy_from_slice(bytes);
    Ok(U256::from_big_endian(&word))
}
