//! Minimal Hack CPU used by the tests to check what generated code does
//! rather than what it looks like.

use std::collections::HashMap;

const RAM_SIZE: usize = 0x8000;
const FIRST_VARIABLE: i16 = 16;

#[derive(Debug)]
enum Op {
    At(i16),
    Compute {
        dest: String,
        comp: String,
        jump: String,
    },
}

pub struct Emulator {
    rom: Vec<Op>,
    symbols: HashMap<String, i16>,
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
}

fn predefined() -> HashMap<String, i16> {
    let mut symbols: HashMap<String, i16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 0x4000),
        ("KBD", 0x6000),
    ]
    .into_iter()
    .map(|(name, addr)| (name.to_string(), addr))
    .collect();
    for r in 0..16 {
        symbols.insert(format!("R{}", r), r);
    }
    symbols
}

impl Emulator {
    /// Load assembly text. Panics on anything the translator would never
    /// produce.
    pub fn new(asm: &str) -> Emulator {
        let mut rom = vec![];
        let mut symbols = predefined();
        let mut unresolved = vec![];

        for line in asm.lines() {
            let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
            if line.is_empty() {
                continue;
            }
            if let Some(label) = line.strip_prefix('(') {
                let label = label.strip_suffix(')').expect("unterminated label");
                let previous = symbols.insert(label.to_string(), rom.len() as i16);
                assert!(previous.is_none(), "duplicate label {}", label);
            } else if let Some(addr) = line.strip_prefix('@') {
                unresolved.push((rom.len(), addr.to_string()));
                rom.push(Op::At(0));
            } else {
                let (dest, rest) = line.split_once('=').unwrap_or(("", line));
                let (comp, jump) = rest.split_once(';').unwrap_or((rest, ""));
                rom.push(Op::Compute {
                    dest: dest.to_string(),
                    comp: comp.to_string(),
                    jump: jump.to_string(),
                });
            }
        }

        // Variables get addresses in order of first appearance
        let mut next_variable = FIRST_VARIABLE;
        for (pc, symbol) in unresolved {
            let value = match symbol.parse::<i16>() {
                Ok(value) => value,
                Err(_) => *symbols.entry(symbol).or_insert_with(|| {
                    next_variable += 1;
                    next_variable - 1
                }),
            };
            rom[pc] = Op::At(value);
        }

        Emulator {
            rom,
            symbols,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn address_of(&self, label: &str) -> Option<usize> {
        self.symbols.get(label).map(|&a| a as usize)
    }

    fn alu(&self, comp: &str) -> i16 {
        let d = self.d;
        let y = if comp.contains('M') {
            self.ram[self.a as u16 as usize]
        } else {
            self.a
        };
        match comp.replace('M', "A").as_str() {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => y,
            "!D" => !d,
            "!A" => !y,
            "-D" => d.wrapping_neg(),
            "-A" => y.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => y.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => y.wrapping_sub(1),
            "D+A" | "A+D" => d.wrapping_add(y),
            "D-A" => d.wrapping_sub(y),
            "A-D" => y.wrapping_sub(d),
            "D&A" | "A&D" => d & y,
            "D|A" | "A|D" => d | y,
            other => panic!("unsupported comp {}", other),
        }
    }

    /// Execute one instruction. Returns false once the PC runs off the end.
    pub fn step(&mut self) -> bool {
        if self.pc >= self.rom.len() {
            return false;
        }
        let (dest, comp, jump) = match &self.rom[self.pc] {
            Op::At(value) => {
                self.a = *value;
                self.pc += 1;
                return true;
            }
            Op::Compute { dest, comp, jump } => (dest.clone(), comp.clone(), jump.clone()),
        };

        let value = self.alu(&comp);
        let target = self.a;
        if dest.contains('M') {
            self.ram[target as u16 as usize] = value;
        }
        if dest.contains('A') {
            self.a = value;
        }
        if dest.contains('D') {
            self.d = value;
        }

        let taken = match jump.as_str() {
            "" => false,
            "JGT" => value > 0,
            "JEQ" => value == 0,
            "JGE" => value >= 0,
            "JLT" => value < 0,
            "JNE" => value != 0,
            "JLE" => value <= 0,
            "JMP" => true,
            other => panic!("unsupported jump {}", other),
        };
        self.pc = if taken { target as u16 as usize } else { self.pc + 1 };
        true
    }

    /// Run until the program falls off the end or `max_steps` is reached.
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.step() {
            steps += 1;
        }
        steps
    }

    /// Run until the PC reaches `label`. Panics if it never does.
    pub fn run_until(&mut self, label: &str, max_steps: usize) {
        let stop = self
            .address_of(label)
            .unwrap_or_else(|| panic!("no label {}", label));
        for _ in 0..max_steps {
            if self.pc == stop {
                return;
            }
            if !self.step() {
                break;
            }
        }
        assert_eq!(self.pc, stop, "never reached {}", label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_runs_hand_written_program() {
        // RAM[2] = RAM[0] + RAM[1]
        let mut emu = Emulator::new("@R0\nD=M\n@R1\nD=D+M\n@R2\nM=D\n");
        emu.ram[0] = 2;
        emu.ram[1] = 40;
        assert_eq!(emu.run(100), 6);
        assert_eq!(emu.ram[2], 42);
    }

    #[test]
    fn test_jumps_and_variables() {
        let mut emu = Emulator::new("@i\nM=1\n(LOOP)\n@i\nMD=M+1\n@10\nD=D-A\n@LOOP\nD;JLT\n");
        emu.run(1000);
        assert_eq!(emu.ram[FIRST_VARIABLE as usize], 10);
        assert_eq!(emu.address_of("LOOP"), Some(2));
    }
}
