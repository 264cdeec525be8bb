use std::path::Path;

use drygen_codegen::{
    BuiltinContext, CodegenError, Dialect, EvmDialect, Expression, ExpressionCodegen,
    NoOutputAssembly,
};
use eyre::WrapErr;
use serde::Serialize;
use tracing::debug;

use crate::cli::{DialectKind, Options};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    /// Stack height difference produced by each expression, in program order.
    pub deltas: Vec<i64>,
    /// Stack height after the whole program.
    pub stack_height: i64,
}

pub fn load_program(path: &Path) -> eyre::Result<Vec<Expression>> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read program file {}", path.display()))?;
    serde_json::from_str(&contents)
        .wrap_err_with(|| format!("Failed to parse program file {}", path.display()))
}

pub fn builtin_context(opts: &Options) -> BuiltinContext {
    let context = match &opts.object {
        Some(object) => BuiltinContext::new(object.as_str()),
        None => BuiltinContext::default(),
    };
    opts.sub_objects
        .iter()
        .enumerate()
        .fold(context, |context, (id, name)| {
            context.with_sub_object(name.as_str(), vec![id])
        })
}

pub fn build_dialect(opts: &Options) -> Dialect {
    let source = EvmDialect::new(opts.fork, opts.object_access);
    match opts.dialect {
        DialectKind::Real => Dialect::Real(source),
        DialectKind::DryRun => Dialect::dry_run(&source),
    }
}

/// Runs every expression of the program through a [`NoOutputAssembly`].
///
/// In strict mode each expression is generated as a statement and must leave the stack
/// height unchanged.
pub fn estimate(opts: &Options, program: &[Expression]) -> Result<Estimate, CodegenError> {
    let dialect = build_dialect(opts);
    let mut assembly = NoOutputAssembly::new();
    let mut codegen = ExpressionCodegen::new(&dialect, &mut assembly, builtin_context(opts));

    let mut deltas = Vec::with_capacity(program.len());
    for (index, expression) in program.iter().enumerate() {
        let before = codegen.stack_height();
        if opts.strict {
            codegen.visit_statement(expression)?;
        } else {
            codegen.visit_expression(expression)?;
        }
        let delta = codegen.stack_height() - before;
        debug!(index, delta, height = codegen.stack_height(), "Estimated expression");
        deltas.push(delta);
    }

    Ok(Estimate {
        deltas,
        stack_height: codegen.stack_height(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use drygen_codegen::AssemblyError;
    use drygen_common::Fork;

    fn program(json: &str) -> Vec<Expression> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn reports_per_expression_deltas() {
        let expressions = program(
            r#"[
                {"call": {"name": "caller"}},
                {"call": {"name": "add", "arguments": [{"number": "0x1"}, {"number": "0x2"}]}},
                {"call": {"name": "sstore", "arguments": [{"number": "0x0"}, {"number": "0x1"}]}}
            ]"#,
        );
        let report = estimate(&Options::default(), &expressions).unwrap();
        assert_eq!(report.deltas, [1, 1, 0]);
        assert_eq!(report.stack_height, 2);
    }

    #[test]
    fn json_report_lists_deltas_and_final_height() {
        let expressions = program(
            r#"[
                {"call": {"name": "callvalue"}},
                {"call": {"name": "pop", "arguments": [{"call": {"name": "gas"}}]}},
                {"call": {"name": "iszero", "arguments": [{"number": "0x0"}]}}
            ]"#,
        );
        let report = estimate(&Options::default(), &expressions).unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "deltas": [1, 0, 1],
                "stack_height": 2,
            })
        );
    }

    #[test]
    fn strict_mode_rejects_leftover_values() {
        let expressions = program(r#"[{"call": {"name": "gas"}}]"#);
        let opts = Options {
            strict: true,
            ..Default::default()
        };
        assert_eq!(
            estimate(&opts, &expressions),
            Err(CodegenError::UnbalancedStatement(1))
        );
    }

    #[test]
    fn dialect_selection_decides_object_access() {
        let expressions = program(
            r#"[{"call": {"name": "mstore", "arguments": [
                {"number": "0x0"},
                {"call": {"name": "loadimmutable", "arguments": [{"string": "owner"}]}}
            ]}}]"#,
        );
        let dry = Options {
            object_access: true,
            ..Default::default()
        };
        assert_eq!(estimate(&dry, &expressions).unwrap().stack_height, 0);

        let real = Options {
            dialect: DialectKind::Real,
            ..dry
        };
        assert_eq!(
            estimate(&real, &expressions),
            Err(CodegenError::Assembly(AssemblyError::UnsupportedCapability(
                "loadimmutable is not implemented"
            )))
        );
    }

    #[test]
    fn fork_gates_builtins() {
        let expressions = program(r#"[{"call": {"name": "tload", "arguments": [{"number": "0x0"}]}}]"#);
        let shanghai = Options {
            fork: Fork::Shanghai,
            ..Default::default()
        };
        assert_eq!(
            estimate(&shanghai, &expressions),
            Err(CodegenError::UnknownFunction("tload".to_string()))
        );
        assert_eq!(
            estimate(&Options::default(), &expressions).unwrap().deltas,
            [1]
        );
    }

    #[test]
    fn sub_objects_are_numbered_in_order() {
        let opts = Options {
            object: Some("Token".to_string()),
            sub_objects: vec!["Token_deployed".to_string(), "Helper".to_string()],
            ..Default::default()
        };
        let context = builtin_context(&opts);
        assert_eq!(context.current_object.as_deref(), Some("Token"));
        assert_eq!(context.sub_objects.get("Helper"), Some(&vec![1]));
        assert_eq!(context.sub_objects.get("Token_deployed"), Some(&vec![0]));
    }

    #[test]
    fn load_program_reports_missing_file() {
        let error = load_program(Path::new("/nonexistent/program.json")).unwrap_err();
        assert!(error.to_string().contains("Failed to read program file"));
    }
}
