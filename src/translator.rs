use std::io::Write;

use log::{debug, warn};
use snafu::{ensure, ResultExt};

use crate::ast::{ArithmeticOp, Command, CommandKind, Segment};
use crate::error::{
    BootstrapNotFirstSnafu, IndexOutOfRangeSnafu, PopConstantSnafu, Result, WriteSnafu,
};
use crate::hack::{
    at_c, at_r, at_s, c, label, Address, Asm, Register, ENTRY_FUNCTION, FRAME_SIZE,
    MAX_CONSTANT, STACK_BASE, TEMP_SLOTS,
};

/// Static file name used until the driver names the first source unit.
const DEFAULT_FILE_NAME: &str = "Static";

/// *SP = D; SP++
fn push_d() -> Vec<Asm> {
    vec![
        at_r(Register::Sp),
        c("M=M+1"),
        c("A=M-1"), // Don't need to refetch SP; this is safe
        c("M=D"),
    ]
}

fn temp_register(index: u16) -> Result<Register> {
    ensure!(
        index < TEMP_SLOTS,
        IndexOutOfRangeSnafu {
            segment: Segment::Temp,
            index,
            max: TEMP_SLOTS - 1,
        }
    );
    Ok(Register::Temp(index))
}

fn pointer_register(index: u16) -> Result<Register> {
    match index {
        0 => Ok(Register::This),
        1 => Ok(Register::That),
        _ => IndexOutOfRangeSnafu {
            segment: Segment::Pointer,
            index,
            max: 1u16,
        }
        .fail(),
    }
}

/// Push microcode for the four based segments
fn seg_push(base: Register, index: u16) -> Vec<Asm> {
    let mut code = vec![
        at_r(base),
        c("D=M"),
        at_c(index),
        c("A=D+A"), // A = SEG+index
        c("D=M"),   // D = value to push
    ];
    code.extend(push_d());
    code
}

fn seg_push_direct(addr: Address) -> Vec<Asm> {
    let mut code = vec![Asm::At(addr), c("D=M")];
    code.extend(push_d());
    code
}

fn seg_pop(base: Register, index: u16) -> Vec<Asm> {
    vec![
        at_r(base),
        c("D=M"),
        at_c(index),
        c("D=D+A"), // D = SEG+index
        at_r(Register::Addr),
        c("M=D"), // Stash the target address
        at_r(Register::Sp),
        c("AM=M-1"), // SP--, A <- new SP (val to be popped)
        c("D=M"),
        at_r(Register::Addr),
        c("A=M"), // At the target address...
        c("M=D"), // ... store the popped val
    ]
}

fn seg_pop_direct(addr: Address) -> Vec<Asm> {
    vec![
        at_r(Register::Sp),
        c("AM=M-1"),
        c("D=M"),
        Asm::At(addr),
        c("M=D"),
    ]
}

fn simple_un_op(op: &'static str) -> Vec<Asm> {
    vec![at_r(Register::Sp), c("A=M-1"), c(op)]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(op: &'static str) -> Vec<Asm> {
    vec![
        at_r(Register::Sp),
        c("AM=M-1"), // SP--, looking at top of stack now
        c("D=M"),    // Right arg in D
        c("A=A-1"),  // Looking at second arg of stack, will overwrite
        c(op),       // Op and overwrite second element
    ]
}

/// Emits Hack assembly for a stream of VM commands.
///
/// One translator serves a whole run: the label counter and the enclosing
/// function carry over when the driver moves on to the next source unit.
pub struct Translator<W: Write> {
    out: W,
    file_name: String,
    function: Option<String>,
    gen_sym: usize,
    written: usize,
    annotate: bool,
}

impl<W: Write> Translator<W> {
    pub fn new(out: W) -> Self {
        Translator {
            out,
            file_name: DEFAULT_FILE_NAME.to_string(),
            function: None,
            gen_sym: 0,
            written: 0,
            annotate: false,
        }
    }

    /// Precede each command's code with the command as a comment.
    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Switch to a new source unit; static variables are named after it.
    pub fn set_file_name(&mut self, name: &str) {
        self.file_name = name.to_string();
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Number of unique label ids handed out so far.
    pub fn labels_allocated(&self) -> usize {
        self.gen_sym
    }

    fn next_gen_sym(&mut self) -> usize {
        let tmp = self.gen_sym;
        self.gen_sym += 1;
        tmp
    }

    fn emit(&mut self, code: Vec<Asm>) -> Result<()> {
        for asm in code {
            writeln!(self.out, "{}", asm).context(WriteSnafu)?;
            self.written += 1;
        }
        Ok(())
    }

    fn static_addr(&self, index: u16) -> Address {
        Address::Symbol(format!("{}.{}", self.file_name, index))
    }

    /// Qualify a VM label with the enclosing function, if any.
    fn scoped(&self, label: &str) -> String {
        match &self.function {
            Some(function) => format!("{}${}", function, label),
            None => label.to_string(),
        }
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> Result<()> {
        let code = match op {
            ArithmeticOp::Not => simple_un_op("M=!M"),
            ArithmeticOp::Neg => simple_un_op("M=-M"),
            ArithmeticOp::Add => simple_bin_op("M=D+M"),
            ArithmeticOp::Sub => simple_bin_op("M=M-D"),
            ArithmeticOp::And => simple_bin_op("M=D&M"),
            ArithmeticOp::Or => simple_bin_op("M=D|M"),
            ArithmeticOp::Eq => self.compare("D;JEQ"),
            ArithmeticOp::Gt => self.compare("D;JGT"),
            ArithmeticOp::Lt => self.compare("D;JLT"),
        };
        self.emit(code)
    }

    fn compare(&mut self, jump: &'static str) -> Vec<Asm> {
        let sym = self.next_gen_sym();
        let cmp_sym = format!("CMP_TRUE:{}", sym);
        let end_sym = format!("CMP_END:{}", sym);
        vec![
            at_r(Register::Sp),
            c("AM=M-1"), // SP--, looking at top of stack now
            c("D=M"),    // Right arg in D
            c("A=A-1"),  // Looking at second arg of stack, will overwrite
            c("D=M-D"),
            at_s(cmp_sym.as_str()),
            c(jump),
            c("D=0"),
            at_s(end_sym.as_str()),
            c("0;JMP"),
            label(cmp_sym),
            c("D=-1"),
            label(end_sym),
            at_r(Register::Sp),
            c("A=M-1"),
            c("M=D"),
        ]
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<()> {
        let code = match segment {
            Segment::Constant => {
                ensure!(
                    index <= MAX_CONSTANT,
                    IndexOutOfRangeSnafu {
                        segment,
                        index,
                        max: MAX_CONSTANT,
                    }
                );
                let mut code = vec![at_c(index), c("D=A")];
                code.extend(push_d());
                code
            }
            Segment::Local => seg_push(Register::Lcl, index),
            Segment::Argument => seg_push(Register::Arg, index),
            Segment::This => seg_push(Register::This, index),
            Segment::That => seg_push(Register::That, index),
            Segment::Static => seg_push_direct(self.static_addr(index)),
            Segment::Temp => seg_push_direct(Address::Reg(temp_register(index)?)),
            Segment::Pointer => seg_push_direct(Address::Reg(pointer_register(index)?)),
        };
        self.emit(code)
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<()> {
        let code = match segment {
            Segment::Constant => return PopConstantSnafu.fail(),
            Segment::Local => seg_pop(Register::Lcl, index),
            Segment::Argument => seg_pop(Register::Arg, index),
            Segment::This => seg_pop(Register::This, index),
            Segment::That => seg_pop(Register::That, index),
            Segment::Static => seg_pop_direct(self.static_addr(index)),
            Segment::Temp => seg_pop_direct(Address::Reg(temp_register(index)?)),
            Segment::Pointer => seg_pop_direct(Address::Reg(pointer_register(index)?)),
        };
        self.emit(code)
    }

    pub fn write_label(&mut self, name: &str) -> Result<()> {
        let code = vec![label(self.scoped(name))];
        self.emit(code)
    }

    pub fn write_goto(&mut self, name: &str) -> Result<()> {
        let code = vec![
            at_s(self.scoped(name)),
            c("0;JMP"), // Unconditional jump
        ];
        self.emit(code)
    }

    pub fn write_if(&mut self, name: &str) -> Result<()> {
        let code = vec![
            at_r(Register::Sp),
            c("AM=M-1"),
            c("D=M"), // Stack popped into D
            at_s(self.scoped(name)),
            c("D;JNE"), // False is 0
        ];
        self.emit(code)
    }

    /// Entry label plus `n_locals` zeroed cells.
    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<()> {
        self.function = Some(name.to_string());
        let mut code = vec![label(name)];
        for _ in 0..n_locals {
            code.extend([at_r(Register::Sp), c("M=M+1"), c("A=M-1"), c("M=0")]);
        }
        self.emit(code)
    }

    /// Save the caller's frame, reposition ARG and LCL, jump to `name`.
    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<()> {
        let sym = self.next_gen_sym();
        let ret = self.scoped(&format!("ret.{}", sym));

        let mut code = vec![at_s(ret.as_str()), c("D=A")];
        code.extend(push_d());
        for reg in [Register::Lcl, Register::Arg, Register::This, Register::That] {
            code.extend([at_r(reg), c("D=M")]);
            code.extend(push_d());
        }
        code.extend([
            // ARG = SP - 5 - n_args
            at_r(Register::Sp),
            c("D=M"),
            at_c(FRAME_SIZE),
            c("D=D-A"),
            at_c(n_args),
            c("D=D-A"),
            at_r(Register::Arg),
            c("M=D"),
            // LCL = SP
            at_r(Register::Sp),
            c("D=M"),
            at_r(Register::Lcl),
            c("M=D"),
            at_s(name),
            c("0;JMP"),
            label(ret),
        ]);
        self.emit(code)
    }

    /// Hand the top of stack back to the caller and restore its frame.
    pub fn write_return(&mut self) -> Result<()> {
        if self.function.is_none() {
            warn!("{}: return outside of any function", self.file_name);
        }
        let mut code = vec![
            // R13 = frame base
            at_r(Register::Lcl),
            c("D=M"),
            at_r(Register::Addr),
            c("M=D"),
            // R14 = *(frame - 5)
            at_c(FRAME_SIZE),
            c("A=D-A"),
            c("D=M"),
            at_r(Register::Ret),
            c("M=D"),
            // *ARG = pop()
            at_r(Register::Sp),
            c("AM=M-1"),
            c("D=M"),
            at_r(Register::Arg),
            c("A=M"),
            c("M=D"),
            // SP = ARG + 1
            at_r(Register::Arg),
            c("D=M+1"),
            at_r(Register::Sp),
            c("M=D"),
        ];
        // Walk down the saved frame: THAT, THIS, ARG, LCL
        for reg in [Register::That, Register::This, Register::Arg, Register::Lcl] {
            code.extend([
                at_r(Register::Addr),
                c("AM=M-1"),
                c("D=M"),
                at_r(reg),
                c("M=D"),
            ]);
        }
        code.extend([at_r(Register::Ret), c("A=M"), c("0;JMP")]);
        self.emit(code)
    }

    /// `SP = 256; call Sys.init 0`. Only valid as the very first output.
    pub fn write_bootstrap(&mut self) -> Result<()> {
        ensure!(self.written == 0, BootstrapNotFirstSnafu);
        debug!("bootstrap: call {}", ENTRY_FUNCTION);
        if self.annotate {
            self.emit(vec![Asm::Comment("bootstrap".to_string())])?;
        }
        self.emit(vec![
            at_c(STACK_BASE),
            c("D=A"),
            at_r(Register::Sp),
            c("M=D"),
        ])?;
        self.write_call(ENTRY_FUNCTION, 0)
    }

    pub fn translate(&mut self, command: &Command) -> Result<()> {
        debug!("{}: {}", self.file_name, command);
        if self.annotate {
            self.emit(vec![Asm::Comment(command.to_string())])?;
        }

        match command.kind() {
            CommandKind::Arithmetic => self.write_arithmetic(command.arg1()?.parse()?),
            CommandKind::Push => self.write_push(command.arg1()?.parse()?, command.arg2()?),
            CommandKind::Pop => self.write_pop(command.arg1()?.parse()?, command.arg2()?),
            CommandKind::Label => self.write_label(command.arg1()?),
            CommandKind::Goto => self.write_goto(command.arg1()?),
            CommandKind::IfGoto => self.write_if(command.arg1()?),
            CommandKind::Function => self.write_function(command.arg1()?, command.arg2()?),
            CommandKind::Call => self.write_call(command.arg1()?, command.arg2()?),
            CommandKind::Return => self.write_return(),
        }
    }

    /// Flush the output and give it back.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context(WriteSnafu)?;
        Ok(self.out)
    }
}
