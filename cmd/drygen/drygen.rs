use clap::Parser;
use drygen::{
    cli::CLI,
    estimate::{estimate, load_program},
    initializers::init_tracing,
};
use tracing::info;

fn main() -> eyre::Result<()> {
    let CLI { opts, program } = CLI::parse();
    init_tracing(&opts);

    let expressions = load_program(&program)?;
    info!(
        program = %program.display(),
        expressions = expressions.len(),
        fork = %opts.fork,
        dialect = ?opts.dialect,
        "Starting dry run"
    );

    let report = estimate(&opts, &expressions)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stack height: {}", report.stack_height);
    }
    Ok(())
}
