use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{CompileError, Target};

#[derive(Parser, Debug)]
#[command(
    name = "rvcc",
    version,
    about = "Compile semicolon-terminated arithmetic expressions to assembly"
)]
pub struct Cli {
    /// Program text, e.g. "1+2*3;". Exactly one is accepted.
    #[arg(allow_hyphen_values = true)]
    pub inputs: Vec<String>,
    /// Instruction set to emit
    #[arg(short, long, value_enum, default_value_t = Target::Riscv64)]
    pub target: Target,
    /// Stage to stop after
    #[arg(long, value_enum, default_value_t = Emit::Asm)]
    pub emit: Emit,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Asm,
    Tokens,
    Ast,
}

impl Cli {
    /// The single program text, or an argument-count error naming `program`.
    pub fn source(&self, program: &str) -> Result<&str, CompileError> {
        match self.inputs.as_slice() {
            [src] => Ok(src),
            _ => Err(CompileError::ArgumentCount {
                program: program.to_string(),
            }),
        }
    }

    /// Produces the text selected by `--emit`.
    pub fn render(&self, src: &str) -> Result<String, CompileError> {
        match self.emit {
            Emit::Asm => crate::compile(src, self.target),
            Emit::Tokens => Ok(format!("{:#?}\n", crate::tokenize(src)?)),
            Emit::Ast => Ok(format!("{:#?}\n", crate::parse(src)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rvcc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn exactly_one_input() {
        assert_eq!(cli(&["1;"]).source("rvcc").unwrap(), "1;");

        for args in [&[][..], &["1;", "2;"][..]] {
            let err = cli(args).source("rvcc").unwrap_err();
            assert!(matches!(err, CompileError::ArgumentCount { .. }));
        }
    }

    #[test]
    fn leading_minus_is_input() {
        let cli = cli(&["-1;"]);
        assert_eq!(cli.source("rvcc").unwrap(), "-1;");
    }

    #[test]
    fn options() {
        let cli = cli(&["--target", "x86_64", "--emit", "tokens", "-o", "out.s", "1;"]);
        assert_eq!(cli.target, Target::X86_64);
        assert_eq!(cli.emit, Emit::Tokens);
        assert_eq!(cli.output, Some(PathBuf::from("out.s")));
        assert_eq!(cli.source("rvcc").unwrap(), "1;");
    }

    #[test]
    fn defaults() {
        let cli = cli(&["1;"]);
        assert_eq!(cli.target, Target::Riscv64);
        assert_eq!(cli.emit, Emit::Asm);
        assert!(cli.output.is_none());
        assert!(cli.render("1;").unwrap().ends_with("  li a0, 1\n  ret\n"));
    }

    #[test]
    fn emit_ast() {
        let cli = cli(&["--emit", "ast", "1;"]);
        let out = cli.render("1;").unwrap();
        assert!(out.starts_with("[\n    Node {"));
        assert!(out.contains("Number("));
    }
}
