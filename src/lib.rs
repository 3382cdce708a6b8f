type P<T> = Box<T>;

pub mod cli;
pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use codegen::*;
pub use diagnostic::*;
pub use error::*;
pub use parser::*;
pub use tokenizer::*;

use tracing::debug;

/// Runs the whole pipeline over `src` and returns the assembly text.
pub fn compile(src: &str, target: Target) -> Result<String, CompileError> {
    let stmts = parse(src)?;
    let asm = Codegen::new(target).program(&stmts)?;
    debug!(bytes = asm.len(), ?target, "generated assembly");
    Ok(asm)
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, CompileError> {
    let tokens = Tokenizer::new(src).tokenize()?;
    debug!(count = tokens.len(), "tokenized input");
    Ok(tokens)
}

pub fn parse(src: &str) -> Result<Vec<StmtNode>, CompileError> {
    let tokens = tokenize(src)?;
    let stmts = Parser::new(src, tokens).parse()?;
    debug!(count = stmts.len(), "parsed statements");
    Ok(stmts)
}
