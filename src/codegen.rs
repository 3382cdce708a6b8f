use tracing::{debug, trace};

use crate::{CompileError, ExprKind, ExprNode, StmtKind, StmtNode};

/// Instruction set the generator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Target {
    /// RV64, result in `a0`.
    #[default]
    Riscv64,
    /// x86-64 in AT&T syntax, result in `%rax`.
    #[value(name = "x86_64")]
    X86_64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Lte,
}

pub struct Codegen {
    pub target: Target,
    pub depth: i64,
    out: String,
}

impl Codegen {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            depth: 0,
            out: String::new(),
        }
    }

    /// Emits the whole program. The value of the last statement is left in
    /// the accumulator when `main` returns.
    pub fn program(mut self, stmts: &[StmtNode]) -> Result<String, CompileError> {
        self.raw("  .globl main");
        self.raw("main:");
        if stmts.is_empty() {
            self.load_imm(0);
        }
        for (i, stmt) in stmts.iter().enumerate() {
            debug!(index = i, loc = stmt.loc, "generating statement");
            self.check_depth()?;
            self.stmt(stmt)?;
            self.check_depth()?;
        }
        self.emit("ret");
        Ok(self.out)
    }

    fn check_depth(&self) -> Result<(), CompileError> {
        if self.depth != 0 {
            return Err(CompileError::Internal(format!(
                "unbalanced stack, depth is {}",
                self.depth
            )));
        }
        Ok(())
    }

    fn raw(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn emit(&mut self, ins: &str) {
        self.out.push_str("  ");
        self.raw(ins);
    }

    fn push(&mut self) {
        match self.target {
            Target::Riscv64 => {
                self.emit("addi sp, sp, -8");
                self.emit("sd a0, 0(sp)");
            }
            Target::X86_64 => self.emit("push %rax"),
        }
        self.depth += 1;
        trace!(depth = self.depth, "push");
    }

    fn pop(&mut self) -> Result<(), CompileError> {
        if self.depth == 0 {
            return Err(CompileError::Internal("pop from an empty stack".into()));
        }
        match self.target {
            Target::Riscv64 => {
                self.emit("ld a1, 0(sp)");
                self.emit("addi sp, sp, 8");
            }
            Target::X86_64 => self.emit("pop %rdi"),
        }
        self.depth -= 1;
        trace!(depth = self.depth, "pop");
        Ok(())
    }

    fn load_imm(&mut self, val: i32) {
        match self.target {
            Target::Riscv64 => self.emit(&format!("li a0, {}", val)),
            Target::X86_64 => self.emit(&format!("mov ${}, %rax", val)),
        }
    }

    fn stmt(&mut self, node: &StmtNode) -> Result<(), CompileError> {
        match &node.kind {
            StmtKind::Expr(lhs) => self.expr(lhs),
        }
    }

    fn expr(&mut self, node: &ExprNode) -> Result<(), CompileError> {
        let (op, lhs, rhs) = match node.kind {
            ExprKind::Number(val) => {
                self.load_imm(val);
                return Ok(());
            }
            ExprKind::Neg(ref rhs) => {
                self.expr(rhs)?;
                match self.target {
                    Target::Riscv64 => self.emit("neg a0, a0"),
                    Target::X86_64 => self.emit("neg %rax"),
                }
                return Ok(());
            }
            ExprKind::Add(ref lhs, ref rhs) => (BinOp::Add, lhs, rhs),
            ExprKind::Sub(ref lhs, ref rhs) => (BinOp::Sub, lhs, rhs),
            ExprKind::Mul(ref lhs, ref rhs) => (BinOp::Mul, lhs, rhs),
            ExprKind::Div(ref lhs, ref rhs) => (BinOp::Div, lhs, rhs),
            ExprKind::Eq(ref lhs, ref rhs) => (BinOp::Eq, lhs, rhs),
            ExprKind::Ne(ref lhs, ref rhs) => (BinOp::Ne, lhs, rhs),
            ExprKind::Lt(ref lhs, ref rhs) => (BinOp::Lt, lhs, rhs),
            ExprKind::Lte(ref lhs, ref rhs) => (BinOp::Lte, lhs, rhs),
        };

        self.expr(rhs)?;
        self.push();
        self.expr(lhs)?;
        self.pop()?;
        match self.target {
            Target::Riscv64 => self.riscv64_binop(op),
            Target::X86_64 => self.x86_64_binop(op),
        }
        Ok(())
    }

    // lhs in a0, rhs in a1
    fn riscv64_binop(&mut self, op: BinOp) {
        match op {
            BinOp::Add => self.emit("add a0, a0, a1"),
            BinOp::Sub => self.emit("sub a0, a0, a1"),
            BinOp::Mul => self.emit("mul a0, a0, a1"),
            BinOp::Div => self.emit("div a0, a0, a1"),
            BinOp::Eq => {
                self.emit("xor a0, a0, a1");
                self.emit("seqz a0, a0");
            }
            BinOp::Ne => {
                self.emit("xor a0, a0, a1");
                self.emit("snez a0, a0");
            }
            BinOp::Lt => self.emit("slt a0, a0, a1"),
            // a <= b is !(b < a)
            BinOp::Lte => {
                self.emit("slt a0, a1, a0");
                self.emit("xori a0, a0, 1");
            }
        }
    }

    // lhs in %rax, rhs in %rdi
    fn x86_64_binop(&mut self, op: BinOp) {
        match op {
            BinOp::Add => self.emit("add %rdi, %rax"),
            BinOp::Sub => self.emit("sub %rdi, %rax"),
            BinOp::Mul => self.emit("imul %rdi, %rax"),
            BinOp::Div => {
                self.emit("cqo");
                self.emit("idiv %rdi");
            }
            BinOp::Eq | BinOp::Ne => {
                self.emit("xor %rdi, %rax");
                self.emit(if op == BinOp::Eq { "sete %al" } else { "setne %al" });
                self.emit("movzb %al, %rax");
            }
            BinOp::Lt => {
                self.emit("cmp %rdi, %rax");
                self.emit("setl %al");
                self.emit("movzb %al, %rax");
            }
            BinOp::Lte => {
                self.emit("cmp %rax, %rdi");
                self.emit("setl %al");
                self.emit("movzb %al, %rax");
                self.emit("xor $1, %rax");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parser, Tokenizer, P};
    use insta::assert_snapshot;

    fn gen(src: &str, target: Target) -> String {
        let tokens = Tokenizer::new(src).tokenize().unwrap();
        let stmts = Parser::new(src, tokens).parse().unwrap();
        Codegen::new(target).program(&stmts).unwrap()
    }

    #[test]
    fn number() {
        assert_snapshot!(gen("42;", Target::Riscv64), @r"
          .globl main
        main:
          li a0, 42
          ret
        ");
    }

    #[test]
    fn binary_saves_rhs() {
        assert_snapshot!(gen("5-3;", Target::Riscv64), @r"
          .globl main
        main:
          li a0, 3
          addi sp, sp, -8
          sd a0, 0(sp)
          li a0, 5
          ld a1, 0(sp)
          addi sp, sp, 8
          sub a0, a0, a1
          ret
        ");
    }

    #[test]
    fn comparisons() {
        assert_snapshot!(gen("-1<=2==1;", Target::Riscv64), @r"
          .globl main
        main:
          li a0, 1
          addi sp, sp, -8
          sd a0, 0(sp)
          li a0, 2
          addi sp, sp, -8
          sd a0, 0(sp)
          li a0, 1
          neg a0, a0
          ld a1, 0(sp)
          addi sp, sp, 8
          slt a0, a1, a0
          xori a0, a0, 1
          ld a1, 0(sp)
          addi sp, sp, 8
          xor a0, a0, a1
          seqz a0, a0
          ret
        ");
    }

    #[test]
    fn x86_64() {
        assert_snapshot!(gen("6/2!=3;", Target::X86_64), @r"
          .globl main
        main:
          mov $3, %rax
          push %rax
          mov $2, %rax
          push %rax
          mov $6, %rax
          pop %rdi
          cqo
          idiv %rdi
          pop %rdi
          xor %rdi, %rax
          setne %al
          movzb %al, %rax
          ret
        ");
    }

    #[test]
    fn one_block_per_statement() {
        let asm = gen("1; 2;", Target::Riscv64);
        assert_eq!(asm.matches("  li a0, ").count(), 2);
        assert_eq!(asm.matches("main:").count(), 1);
        assert!(asm.ends_with("  li a0, 2\n  ret\n"));
    }

    #[test]
    fn empty_program_returns_zero() {
        assert_snapshot!(gen("", Target::X86_64), @r"
          .globl main
        main:
          mov $0, %rax
          ret
        ");
    }

    #[test]
    fn depth_is_balanced() {
        let mut codegen = Codegen::new(Target::Riscv64);
        let src = "((1+2)*(3-4))/(5==6);";
        let tokens = Tokenizer::new(src).tokenize().unwrap();
        let stmts = Parser::new(src, tokens).parse().unwrap();
        codegen.stmt(&stmts[0]).unwrap();
        assert_eq!(codegen.depth, 0);
    }

    #[test]
    fn unbalanced_stack_is_internal_error() {
        let mut codegen = Codegen::new(Target::Riscv64);
        codegen.push();
        let err = codegen.check_depth().unwrap_err();
        assert!(matches!(err, CompileError::Internal(_)));

        let mut codegen = Codegen::new(Target::Riscv64);
        let err = codegen.pop().unwrap_err();
        assert!(matches!(err, CompileError::Internal(_)));
    }

    #[test]
    fn emits_mnemonics_in_lowercase() {
        let node = ExprNode {
            kind: ExprKind::Mul(
                P::new(ExprNode {
                    kind: ExprKind::Number(2),
                    loc: 0,
                }),
                P::new(ExprNode {
                    kind: ExprKind::Number(-7),
                    loc: 2,
                }),
            ),
            loc: 1,
        };
        let stmt = StmtNode {
            kind: StmtKind::Expr(node),
            loc: 0,
        };
        let asm = Codegen::new(Target::Riscv64).program(&[stmt]).unwrap();
        assert!(asm.contains("  li a0, -7\n"));
        for line in asm.lines().skip(2) {
            assert!(line.starts_with("  "));
            assert_eq!(line, line.to_lowercase());
        }
    }
}
