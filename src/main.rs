//! Vesper compiler front-end CLI
//!
//! Command-line interface for scanning and parsing .vsp sources and
//! inspecting the result: diagnostics only, or the full AST.

use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use vesperc::ast::{Expr, ExprKind, Stmt, StmtKind, TypeExpr, TypeExprKind, Unit};
use vesperc::config::CompilerConfig;
use vesperc::diagnostics::Severity;
use vesperc::source::SourceId;
use vesperc::symbol::Interner;
use vesperc::Compiler;

#[derive(ClapParser)]
#[command(name = "vesperc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vesper compiler front end - scan, parse, and inspect .vsp sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a .vsp file and print its diagnostics
    Check {
        /// Input .vsp source file
        input: PathBuf,

        /// Path to a vesper.toml project file (defaults to built-in sizing)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse a .vsp file and print its AST as an indented tree
    DumpAst {
        /// Input .vsp source file
        input: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vesperc=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, config } => run_check(&input, config.as_deref()),
        Commands::DumpAst { input, config } => run_dump_ast(&input, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> CompilerConfig {
    match path {
        None => CompilerConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            });
            CompilerConfig::from_toml_str(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing {}: {}", path.display(), e);
                process::exit(1);
            })
        }
    }
}

fn read_source(input: &Path) -> String {
    std::fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", input.display(), e);
        process::exit(1);
    })
}

fn run_check(input: &Path, config_path: Option<&Path>) {
    let config = load_config(config_path);
    let source = read_source(input);
    let mut compiler = Compiler::new(&config);
    let bump = bumpalo::Bump::new();
    let _unit = compiler.parse_source(&bump, SourceId(0), &source);

    let mut errors = 0;
    for d in compiler.diagnostics.take_all() {
        let tag = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        if d.severity == Severity::Error {
            errors += 1;
        }
        println!("{}: {}: {}", input.display(), tag, d.message);
    }

    if errors > 0 {
        eprintln!("{} error(s)", errors);
        process::exit(1);
    }
    println!("{}: ok", input.display());
}

fn run_dump_ast(input: &Path, config_path: Option<&Path>) {
    let config = load_config(config_path);
    let source = read_source(input);
    let mut compiler = Compiler::new(&config);
    let bump = bumpalo::Bump::new();
    let unit = compiler.parse_source(&bump, SourceId(0), &source);
    dump_unit(&unit, &compiler.interner);

    if compiler.diagnostics.has_errors() {
        process::exit(1);
    }
}

fn indent(depth: usize) {
    print!("{}", "  ".repeat(depth));
}

fn dump_unit(unit: &Unit, interner: &Interner) {
    for stmt in unit.top_level {
        dump_stmt(stmt, interner, 0);
    }
}

fn dump_stmt(stmt: &Stmt, interner: &Interner, depth: usize) {
    indent(depth);
    match &stmt.kind {
        StmtKind::Expr(e) => {
            println!("Expr");
            dump_expr(e, interner, depth + 1);
        }
        StmtKind::Let { name, mutable, init, .. } => {
            println!("Let {} mutable={}", interner.as_str(*name), mutable);
            if let Some(init) = init {
                dump_expr(init, interner, depth + 1);
            }
        }
        StmtKind::Return(e) => {
            println!("Return");
            if let Some(e) = e {
                dump_expr(e, interner, depth + 1);
            }
        }
        StmtKind::Break => println!("Break"),
        StmtKind::Continue => println!("Continue"),
        StmtKind::FunDef(f) => {
            println!("FunDef {}", interner.as_str(f.name));
            dump_expr(f.body, interner, depth + 1);
        }
        StmtKind::TypeDef(t) => {
            println!("TypeDef {}", interner.as_str(t.name));
            dump_type_expr(t.target, interner, depth + 1);
        }
        StmtKind::Bad => println!("<bad statement>"),
    }
}

fn dump_expr(expr: &Expr, interner: &Interner, depth: usize) {
    indent(depth);
    match &expr.kind {
        ExprKind::IntLiteral(v) => println!("Int {v}"),
        ExprKind::UIntLiteral(v) => println!("UInt {v}"),
        ExprKind::FloatLiteral(v) => println!("Float {v}"),
        ExprKind::BoolLiteral(v) => println!("Bool {v}"),
        ExprKind::StringLiteral(s) => println!("String {:?}", interner.as_str(*s)),
        ExprKind::Id(s) => println!("Id {}", interner.as_str(*s)),
        ExprKind::Binary { op, lhs, rhs } => {
            println!("Binary {op:?}");
            dump_expr(lhs, interner, depth + 1);
            dump_expr(rhs, interner, depth + 1);
        }
        ExprKind::Unary { op, operand } => {
            println!("Unary {op:?}");
            dump_expr(operand, interner, depth + 1);
        }
        ExprKind::Assign { target, value } => {
            println!("Assign");
            dump_expr(target, interner, depth + 1);
            dump_expr(value, interner, depth + 1);
        }
        ExprKind::Call { callee, args } => {
            println!("Call");
            dump_expr(callee, interner, depth + 1);
            for a in args.iter() {
                dump_expr(a, interner, depth + 1);
            }
        }
        ExprKind::Member { base, name } => {
            println!("Member .{}", interner.as_str(*name));
            dump_expr(base, interner, depth + 1);
        }
        ExprKind::Reference { operand, mutable } => {
            println!("Reference mutable={mutable}");
            dump_expr(operand, interner, depth + 1);
        }
        ExprKind::Deref { operand } => {
            println!("Deref");
            dump_expr(operand, interner, depth + 1);
        }
        ExprKind::Subscript { base } => {
            println!("Subscript");
            dump_expr(base, interner, depth + 1);
        }
        ExprKind::If { cond, then_branch, else_branch } => {
            println!("If");
            dump_expr(cond, interner, depth + 1);
            dump_expr(then_branch, interner, depth + 1);
            if let Some(e) = else_branch {
                dump_expr(e, interner, depth + 1);
            }
        }
        ExprKind::Block(stmts) => {
            println!("Block");
            for s in stmts.iter() {
                dump_stmt(s, interner, depth + 1);
            }
        }
        ExprKind::Bad => println!("<bad expression>"),
    }
}

fn dump_type_expr(ty: &TypeExpr, interner: &Interner, depth: usize) {
    indent(depth);
    match &ty.kind {
        TypeExprKind::Name(s) => println!("Name {}", interner.as_str(*s)),
        TypeExprKind::Pointer(inner) => {
            println!("Pointer");
            dump_type_expr(inner, interner, depth + 1);
        }
        TypeExprKind::Reference { target, mutable } => {
            println!("Reference mutable={mutable}");
            dump_type_expr(target, interner, depth + 1);
        }
        TypeExprKind::Slice { element, mutable } => {
            println!("Slice mutable={mutable}");
            dump_type_expr(element, interner, depth + 1);
        }
        TypeExprKind::Optional(inner) => {
            println!("Optional");
            dump_type_expr(inner, interner, depth + 1);
        }
        TypeExprKind::Array { element, len } => {
            println!("Array len={len}");
            dump_type_expr(element, interner, depth + 1);
        }
        TypeExprKind::Function { params, result } => {
            println!("Function");
            for p in params.iter() {
                dump_type_expr(p, interner, depth + 1);
            }
            dump_type_expr(result, interner, depth + 1);
        }
        TypeExprKind::StructBody { fields } => {
            println!("StructBody");
            for f in fields.iter() {
                indent(depth + 1);
                println!("Field {}", interner.as_str(f.name));
                dump_type_expr(f.ty, interner, depth + 2);
            }
        }
    }
}
