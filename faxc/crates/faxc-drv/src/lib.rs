//! faxc-drv - The command-line driver for the Fax C-subset compiler.
//!
//! Wires every stage crate together into the pipeline `main.py` drove
//! by hand: lex -> parse -> build the symbol table -> build the IR ->
//! lower to LIR -> print assembly, gated by the same flag set the
//! reference exposes (scan/parse/table/ir/asm dumps, table-cache
//! forcing, an IR-file resume point). Grounded on
//! `original_source/src/main.py`.
//!
//! **(expansion)** The reference's IR dump is a hand-rolled, positional
//! JSON-array format (`[".name", [args], declCount]` headers
//! interleaved with string-array instruction records). This driver
//! dumps/loads the same [`faxc_mir::Program`] value through its derived
//! `serde` representation instead: self-describing, round-trips
//! exactly, and needs no bespoke (de)serializer — see DESIGN.md.

pub mod error;

pub use error::{DriverError, Result};

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use faxc_util::{Diagnostic, Handler, Level, Unique};

/// Command-line flags, one-to-one with the reference's `argparse` setup.
#[derive(Debug, Parser)]
#[command(
    name = "faxc",
    about = "Compiles a curated C subset to GNU AT&T-syntax x86-64 assembly"
)]
pub struct Cli {
    /// Source file to compile. Not required when resuming from a
    /// dumped IR file via `--input`.
    pub source: Option<PathBuf>,

    /// Enable debug-level tracing output.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Tokenize and print tokens.
    #[arg(short = 's', long = "scan")]
    pub scan: bool,

    /// Parse and print the parse tree.
    #[arg(short = 'p', long = "parse")]
    pub parse: bool,

    /// Build and print the symbol table.
    #[arg(short = 't', long = "table")]
    pub table: bool,

    /// Force LR(1) table regeneration, bypassing the cache.
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Build and print the IR.
    #[arg(short = 'r', long = "ir")]
    pub ir: bool,

    /// Resume compilation from a dumped IR file.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub ir_input: Option<PathBuf>,

    /// Dump the IR to a file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub ir_output: Option<PathBuf>,

    /// Print the generated assembly.
    #[arg(short = 'a', long = "asm")]
    pub asm: bool,

    /// Write assembly to a file.
    #[arg(short = 'n', long = "asmOutput", value_name = "FILE")]
    pub asm_output: Option<PathBuf>,

    /// Grammar file path.
    #[arg(
        short = 'g',
        long = "grammar",
        value_name = "FILE",
        default_value = "grammars/main_grammar.txt"
    )]
    pub grammar: PathBuf,
}

/// Installs a `tracing` subscriber whose verbosity follows `-v`,
/// matching the reference's `logging.basicConfig(level=DEBUG if
/// args.verbose else INFO)`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .without_time()
        .try_init();
}

/// Runs the full pipeline for `cli`, returning the diagnostics
/// accumulated along the way and the process exit code (0 success, 2
/// any compiler error).
pub fn run(cli: &Cli) -> Result<(Handler, i32)> {
    let mut handler = Handler::new();
    let mut unique = Unique::new();

    let (grammar, tables, conflicts) = faxc_par::load_or_build_tables(&cli.grammar, cli.force)?;
    for conflict in &conflicts {
        handler.emit(Diagnostic::warning(format!(
            "grammar conflict during table build: {conflict}"
        )));
    }

    let program = if let Some(ir_path) = &cli.ir_input {
        handler.emit(Diagnostic::important(format!(
            "resuming from dumped IR at {}",
            ir_path.display()
        )));
        load_ir(ir_path)?
    } else {
        let source_path = cli.source.as_ref().ok_or(DriverError::MissingSource)?;
        let source = fs::read_to_string(source_path)?;

        let tokens = faxc_lex::tokenize(&source)?;
        if cli.scan {
            for token in &tokens {
                println!("{token:?}");
            }
        }

        let tree = faxc_par::parse_program(&tokens, &grammar, &tables, &mut unique)?;
        if cli.parse {
            println!("{tree:#?}");
        }

        let symbols = faxc_sem::build_symbol_table(&tree)?;
        if cli.table {
            println!("{symbols:#?}");
        }

        faxc_mir::build(&tree, &symbols, &mut unique)?
    };

    if cli.ir {
        println!("{program:#?}");
    }
    if let Some(ir_out) = &cli.ir_output {
        dump_ir(ir_out, &program)?;
        handler.emit(Diagnostic::success(format!(
            "wrote IR to {}",
            ir_out.display()
        )));
    }

    let no_flags_given = !(cli.scan
        || cli.parse
        || cli.table
        || cli.ir
        || cli.asm
        || cli.ir_output.is_some());

    if cli.asm || cli.asm_output.is_some() || no_flags_given {
        let platform = faxc_lir::Platform::host();
        let asm = faxc_gen::generate(&program, platform)?;

        if cli.asm {
            println!("{asm}");
        }
        if let Some(asm_out) = &cli.asm_output {
            fs::write(asm_out, &asm)?;
            handler.emit(Diagnostic::success(format!(
                "wrote assembly to {}",
                asm_out.display()
            )));
        } else if no_flags_given {
            handler.emit(Diagnostic::warning(
                "no flags given; compiling straight through to assembly".to_string(),
            ));
            let out_path =
                default_asm_path(cli.source.as_ref().ok_or(DriverError::MissingSource)?);
            fs::write(&out_path, &asm)?;
            handler.emit(Diagnostic::success(format!(
                "wrote assembly to {}",
                out_path.display()
            )));
        }
    }

    let exit_code = if handler.has_errors() { 2 } else { 0 };
    Ok((handler, exit_code))
}

/// Replaces `path`'s extension with `.s`, matching the reference's
/// no-flags default output naming.
fn default_asm_path(path: &Path) -> PathBuf {
    path.with_extension("s")
}

fn dump_ir(path: &Path, program: &faxc_mir::Program) -> Result<()> {
    let json = serde_json::to_string_pretty(program)?;
    fs::write(path, json)?;
    Ok(())
}

fn load_ir(path: &Path) -> Result<faxc_mir::Program> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Prints every accumulated diagnostic to the appropriate stream
/// (errors and warnings to stderr, everything else to stdout),
/// matching the reference's `MessageCollector` behavior of printing as
/// messages are emitted.
pub fn report(handler: &Handler) {
    for diag in handler.messages() {
        match diag.level {
            Level::Error | Level::Warning => eprintln!("{diag}"),
            Level::Success | Level::Important => println!("{diag}"),
        }
    }
}
