//! Front-end core for the Vesper compiler: scanner, Pratt parser, scope
//! stack, and structural type store. This crate turns a single source
//! buffer into a typed AST plus a diagnostics channel; code generation is
//! outside its scope.

pub mod ast;
pub mod builtins;
pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod source;
pub mod symbol;
pub mod token;
pub mod types;

use bumpalo::Bump;

use ast::Unit;
use config::CompilerConfig;
use diagnostics::Diagnostics;
use parser::Parser;
use source::SourceId;
use symbol::Interner;
use types::TypeStore;

/// Owns everything a single `parse_source` call needs: the symbol table,
/// the type store, and the diagnostics channel. One `Compiler` per
/// compilation unit, matching §4.6's "AST arena is exclusively owned by
/// the compilation unit" ownership model.
pub struct Compiler {
    pub interner: Interner,
    pub types: TypeStore,
    pub diagnostics: Diagnostics,
}

impl Compiler {
    pub fn new(config: &CompilerConfig) -> Self {
        let interner = Interner::new();
        let types = TypeStore::new(&interner, config.pointer_width as u64, config.native_int_width as u64);
        Compiler {
            interner,
            types,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Scans and parses one source buffer into an AST allocated from
    /// `bump`. The returned `Unit` borrows from both `bump` and `self` —
    /// callers inspect `self.diagnostics` afterward to check for errors.
    pub fn parse_source<'a>(&mut self, bump: &'a Bump, file: SourceId, source: &'a str) -> Unit<'a> {
        tracing::info!(file = file.0, bytes = source.len(), "parsing source");
        let parser = Parser::new(bump, &self.interner, &self.diagnostics, &mut self.types, file, source.as_bytes());
        parser.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_trivial_function_with_no_diagnostics() {
        let config = CompilerConfig::default();
        let mut compiler = Compiler::new(&config);
        let bump = Bump::new();
        let unit = compiler.parse_source(&bump, SourceId(0), "fun add(x, y int) int { x + y }");
        assert_eq!(unit.top_level.len(), 1);
        assert!(!compiler.diagnostics.has_errors());
    }
}
