//! Builtin function tables.
//!
//! An [`EvmDialect`] exposes one builtin per opcode available at its fork, plus the object
//! access builtins (`datasize`, `loadimmutable`, ...) when requested. [`patch_for_dry_run`]
//! derives a copy of a dialect whose builtins only keep the stack effects needed by
//! [`NoOutputAssembly`](crate::no_output::NoOutputAssembly).

use std::{collections::BTreeMap, fmt, sync::Arc};

use drygen_common::{Fork, Opcode, U256};
use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    assembly::{AbstractAssembly, SubId},
    ast::{Expression, FunctionCall},
    errors::CodegenError,
};

/// Callback used by a builtin to evaluate one of its argument expressions.
///
/// The visitor generates code for the expression into the assembly and context it is given,
/// so a builtin keeps both borrowed while its arguments are evaluated.
pub type ArgumentVisitor<'a> = dyn FnMut(
        &Expression,
        &mut dyn AbstractAssembly,
        &mut BuiltinContext,
    ) -> Result<(), CodegenError>
    + 'a;

/// Code generation callback of a builtin function.
pub type GenerateCode = Arc<
    dyn Fn(
            &FunctionCall,
            &mut dyn AbstractAssembly,
            &mut BuiltinContext,
            &mut ArgumentVisitor<'_>,
        ) -> Result<(), CodegenError>
        + Send
        + Sync,
>;

/// Wraps a closure into a [`GenerateCode`] callback.
pub fn code_generator<F>(generate: F) -> GenerateCode
where
    F: Fn(
            &FunctionCall,
            &mut dyn AbstractAssembly,
            &mut BuiltinContext,
            &mut ArgumentVisitor<'_>,
        ) -> Result<(), CodegenError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(generate)
}

/// Object level information needed by the object access builtins.
#[derive(Debug, Clone, Default)]
pub struct BuiltinContext {
    /// Name of the object whose code is being generated.
    pub current_object: Option<String>,
    /// Path of sub-assembly ids for each sub-object reachable from the current one.
    pub sub_objects: FxHashMap<String, Vec<SubId>>,
}

impl BuiltinContext {
    pub fn new(current_object: impl Into<String>) -> Self {
        Self {
            current_object: Some(current_object.into()),
            sub_objects: FxHashMap::default(),
        }
    }

    pub fn with_sub_object(mut self, name: impl Into<String>, sub_path: Vec<SubId>) -> Self {
        self.sub_objects.insert(name.into(), sub_path);
        self
    }

    fn is_current_object(&self, name: &str) -> bool {
        self.current_object.as_deref() == Some(name)
    }

    fn sub_path(&self, name: &str) -> Result<&[SubId], CodegenError> {
        self.sub_objects
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CodegenError::UnknownDataObject(name.to_string()))
    }
}

#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: String,
    pub parameters: usize,
    pub returns: usize,
    /// For each parameter position, whether the argument has to be a literal.
    /// Literal arguments are consumed at compile time and never evaluated onto the stack.
    pub literal_arguments: Vec<bool>,
    /// The opcode this builtin maps to, if it is a plain instruction.
    pub instruction: Option<Opcode>,
    generate_code: GenerateCode,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .field("literal_arguments", &self.literal_arguments)
            .field("instruction", &self.instruction)
            .finish_non_exhaustive()
    }
}

impl BuiltinFunction {
    pub fn new(
        name: impl Into<String>,
        parameters: usize,
        returns: usize,
        literal_arguments: Vec<bool>,
        generate_code: GenerateCode,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            returns,
            literal_arguments,
            instruction: None,
            generate_code,
        }
    }

    fn from_instruction(opcode: Opcode) -> Self {
        let info = opcode.info();
        let literal_arguments = vec![false; info.args];
        let mut builtin = Self::new(
            opcode.mnemonic(),
            info.args,
            info.ret,
            literal_arguments,
            code_generator(move |call, assembly, context, visit| {
                visit_non_literal_arguments(&[], call, assembly, context, visit)?;
                assembly.append_instruction(opcode);
                Ok(())
            }),
        );
        builtin.instruction = Some(opcode);
        builtin
    }

    pub fn is_literal_argument(&self, index: usize) -> bool {
        self.literal_arguments.get(index).copied().unwrap_or(false)
    }

    pub fn generate_code(
        &self,
        call: &FunctionCall,
        assembly: &mut dyn AbstractAssembly,
        context: &mut BuiltinContext,
        visit: &mut ArgumentVisitor<'_>,
    ) -> Result<(), CodegenError> {
        (self.generate_code)(call, assembly, context, visit)
    }
}

/// Visits every argument whose position is not flagged in `literal_arguments`, last argument
/// first. Returns how many arguments were visited.
fn visit_non_literal_arguments(
    literal_arguments: &[bool],
    call: &FunctionCall,
    assembly: &mut dyn AbstractAssembly,
    context: &mut BuiltinContext,
    visit: &mut ArgumentVisitor<'_>,
) -> Result<usize, CodegenError> {
    let mut visited = 0;
    for (index, argument) in call.arguments.iter().enumerate().rev() {
        if !literal_arguments.get(index).copied().unwrap_or(false) {
            visit(argument, &mut *assembly, &mut *context)?;
            visited += 1;
        }
    }
    Ok(visited)
}

fn string_literal<'a>(call: &'a FunctionCall, index: usize) -> Result<&'a str, CodegenError> {
    match call.arguments.get(index) {
        Some(Expression::String(value)) => Ok(value.as_str()),
        _ => Err(CodegenError::LiteralArgumentExpected {
            name: call.name.clone(),
            index,
        }),
    }
}

fn number_literal(call: &FunctionCall, index: usize) -> Result<U256, CodegenError> {
    match call.arguments.get(index) {
        Some(Expression::Number(value)) => Ok(*value),
        _ => Err(CodegenError::LiteralArgumentExpected {
            name: call.name.clone(),
            index,
        }),
    }
}

/// `setimmutable(offset, "name", value)`: only the name is a literal.
const SETIMMUTABLE_LITERALS: [bool; 3] = [false, true, false];

fn object_access_builtins() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new(
            "datasize",
            1,
            1,
            vec![true],
            code_generator(|call, assembly, context, _visit| {
                let name = string_literal(call, 0)?;
                if context.is_current_object(name) {
                    assembly.append_assembly_size();
                } else {
                    assembly.append_data_size(context.sub_path(name)?);
                }
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "dataoffset",
            1,
            1,
            vec![true],
            code_generator(|call, assembly, context, _visit| {
                let name = string_literal(call, 0)?;
                if context.is_current_object(name) {
                    assembly.append_constant(U256::zero());
                } else {
                    assembly.append_data_offset(context.sub_path(name)?);
                }
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "datacopy",
            3,
            0,
            vec![false; 3],
            code_generator(|call, assembly, context, visit| {
                visit_non_literal_arguments(&[], call, assembly, context, visit)?;
                assembly.append_instruction(Opcode::CODECOPY);
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "setimmutable",
            3,
            0,
            SETIMMUTABLE_LITERALS.to_vec(),
            code_generator(|call, assembly, context, visit| {
                let name = string_literal(call, 1)?;
                visit_non_literal_arguments(
                    &SETIMMUTABLE_LITERALS,
                    call,
                    assembly,
                    context,
                    visit,
                )?;
                assembly.append_immutable_assignment(name)?;
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "loadimmutable",
            1,
            1,
            vec![true],
            code_generator(|call, assembly, _context, _visit| {
                assembly.append_immutable(string_literal(call, 0)?)?;
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "linkersymbol",
            1,
            1,
            vec![true],
            code_generator(|call, assembly, _context, _visit| {
                assembly.append_linker_symbol(string_literal(call, 0)?)?;
                Ok(())
            }),
        ),
        BuiltinFunction::new(
            "memoryguard",
            1,
            1,
            vec![true],
            code_generator(|call, assembly, _context, _visit| {
                assembly.append_constant(number_literal(call, 0)?);
                Ok(())
            }),
        ),
    ]
}

/// Builtin function table for a given fork.
#[derive(Debug, Clone)]
pub struct EvmDialect {
    fork: Fork,
    builtins: BTreeMap<String, BuiltinFunction>,
}

impl EvmDialect {
    pub fn new(fork: Fork, provides_object_access: bool) -> Self {
        let mut builtins: BTreeMap<String, BuiltinFunction> = Opcode::iter()
            .filter(|opcode| opcode.is_available(fork) && !opcode.is_stack_or_flow())
            .map(|opcode| {
                (
                    opcode.mnemonic().to_string(),
                    BuiltinFunction::from_instruction(opcode),
                )
            })
            .collect();

        if provides_object_access {
            for builtin in object_access_builtins() {
                builtins.insert(builtin.name.clone(), builtin);
            }
        }

        debug!(
            %fork,
            provides_object_access,
            builtins = builtins.len(),
            "Built EVM dialect"
        );

        Self { fork, builtins }
    }

    pub fn fork(&self) -> Fork {
        self.fork
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }

    /// Builtins ordered by name.
    pub fn builtins(&self) -> impl Iterator<Item = &BuiltinFunction> {
        self.builtins.values()
    }
}

/// Derives a dialect for dry runs from `source`.
///
/// Every builtin of the copy evaluates its non-literal arguments right to left, pops each of
/// them and pushes one zero per declared return value. `source` is left untouched.
pub fn patch_for_dry_run(source: &EvmDialect) -> EvmDialect {
    let mut patched = source.clone();
    for builtin in patched.builtins.values_mut() {
        let returns = builtin.returns;
        let literal_arguments = builtin.literal_arguments.clone();
        builtin.generate_code = code_generator(move |call, assembly, context, visit| {
            let visited =
                visit_non_literal_arguments(&literal_arguments, call, assembly, context, visit)?;
            for _ in 0..visited {
                assembly.append_instruction(Opcode::POP);
            }
            for _ in 0..returns {
                assembly.append_constant(U256::zero());
            }
            Ok(())
        });
    }
    debug!(
        fork = %patched.fork,
        builtins = patched.builtins.len(),
        "Patched dialect for dry run"
    );
    patched
}

/// The dialect a code generation pass runs with.
#[derive(Debug, Clone)]
pub enum Dialect {
    Real(EvmDialect),
    DryRun(EvmDialect),
}

impl Dialect {
    pub fn real(fork: Fork, provides_object_access: bool) -> Self {
        Self::Real(EvmDialect::new(fork, provides_object_access))
    }

    pub fn dry_run(source: &EvmDialect) -> Self {
        Self::DryRun(patch_for_dry_run(source))
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }

    pub fn evm_dialect(&self) -> &EvmDialect {
        match self {
            Self::Real(dialect) | Self::DryRun(dialect) => dialect,
        }
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.evm_dialect().builtin(name)
    }
}
