use crate::execution_unit::OpClass;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(pub u8);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Imm(pub i64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemRef {
    pub base: Option<Reg>,
    pub offset: Imm,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueOrTag {
    Valid(i64),
    Invalid(Tag),
}

impl ValueOrTag {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValueOrTag::Valid(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Load,
    Store,
    Nop,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Inst {
    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Mul(Reg, Reg, Reg),
    Div(Reg, Reg, Reg),
    Load(Reg, MemRef),
    Store(Reg, MemRef),
    Nop,
}

impl Inst {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::Add(..) => Opcode::Add,
            Inst::Sub(..) => Opcode::Sub,
            Inst::Mul(..) => Opcode::Mul,
            Inst::Div(..) => Opcode::Div,
            Inst::Load(..) => Opcode::Load,
            Inst::Store(..) => Opcode::Store,
            Inst::Nop => Opcode::Nop,
        }
    }

    pub fn op_class(&self) -> Option<OpClass> {
        match self {
            Inst::Add(..) | Inst::Sub(..) => Some(OpClass::Alu),
            Inst::Mul(..) | Inst::Div(..) => Some(OpClass::Mul),
            Inst::Load(..) | Inst::Store(..) => Some(OpClass::Mem),
            Inst::Nop => None,
        }
    }

    pub fn dest(&self) -> Option<Reg> {
        match *self {
            Inst::Add(dst, _, _)
            | Inst::Sub(dst, _, _)
            | Inst::Mul(dst, _, _)
            | Inst::Div(dst, _, _)
            | Inst::Load(dst, _) => Some(dst),
            Inst::Store(_, _) | Inst::Nop => None,
        }
    }

    pub fn max_reg(&self) -> Option<u8> {
        let mem_regs = |r: Reg, m: &MemRef| {
            let mut max = r.0;
            if let Some(base) = m.base {
                max = max.max(base.0);
            }
            max
        };

        match *self {
            Inst::Add(d, a, b) | Inst::Sub(d, a, b) | Inst::Mul(d, a, b) | Inst::Div(d, a, b) => {
                Some(d.0.max(a.0).max(b.0))
            }
            Inst::Load(d, ref m) => Some(mem_regs(d, m)),
            Inst::Store(s, ref m) => Some(mem_regs(s, m)),
            Inst::Nop => None,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROB{}", self.0)
    }
}

impl FromStr for Inst {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, args) = s.split_once(' ').unwrap_or((s, ""));
        let args = args.split(',').collect::<Vec<_>>();

        let nth_arg = |n: usize| -> Result<&str, String> {
            args.get(n)
                .map(|s| s.trim())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
                .ok_or_else(|| format!("cannot fetch argument {n}"))
        };
        let reg_arg = |n: usize| -> Result<Reg, String> { Reg::from_str(nth_arg(n)?) };
        let mem_arg = |n: usize| -> Result<MemRef, String> { MemRef::from_str(nth_arg(n)?) };

        let inst = match op.to_lowercase().as_str() {
            "nop" => Inst::Nop,
            "add" => Inst::Add(reg_arg(0)?, reg_arg(1)?, reg_arg(2)?),
            "sub" => Inst::Sub(reg_arg(0)?, reg_arg(1)?, reg_arg(2)?),
            "mul" => Inst::Mul(reg_arg(0)?, reg_arg(1)?, reg_arg(2)?),
            "div" => Inst::Div(reg_arg(0)?, reg_arg(1)?, reg_arg(2)?),
            "ld" => Inst::Load(reg_arg(0)?, mem_arg(1)?),
            "st" => Inst::Store(reg_arg(0)?, mem_arg(1)?),
            _ => return Err(format!("unknown instruction: '{}'", op)),
        };

        Ok(inst)
    }
}

impl FromStr for Reg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('r').or_else(|| s.strip_prefix('R')) {
            Some(idx) => idx
                .parse::<u8>()
                .map(Reg)
                .map_err(|e| format!("invalid register '{s}': {e}")),
            None => Err(format!("unknown register: '{s}'")),
        }
    }
}

impl FromStr for Imm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val = if let Some(hex) = s.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix("-0x") {
            i64::from_str_radix(hex, 16).map(|v| -v)
        } else {
            i64::from_str(s)
        };

        val.map(Imm).map_err(|_| format!("invalid immediate: '{s}'"))
    }
}

impl FromStr for MemRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "#imm" is an absolute address with no base register.
        if let Some(imm) = s.strip_prefix('#') {
            return Ok(MemRef {
                base: None,
                offset: Imm::from_str(imm)?,
            });
        }

        // "[reg]", "[reg + imm]", "[reg - imm]"
        let inner = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .map(|s| s.trim())
            .ok_or_else(|| format!("invalid memory reference (no #/[]): '{s}'"))?;

        if let Ok(reg) = inner.parse::<Reg>() {
            return Ok(MemRef {
                base: Some(reg),
                offset: Imm(0),
            });
        }

        let (fst, snd) = inner
            .split_once(&['+', '-'])
            .map(|(a, b)| (a.trim(), b.trim()))
            .ok_or_else(|| format!("invalid memory reference (no +-): '{s}'"))?;

        let reg = Reg::from_str(fst)?;
        let imm = Imm::from_str(snd)?;
        let imm = if inner.contains('+') { imm.0 } else { -imm.0 };

        Ok(MemRef {
            base: Some(reg),
            offset: Imm(imm),
        })
    }
}
