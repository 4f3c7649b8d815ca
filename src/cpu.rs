use crate::{
    execution_unit::OpClass, inst::Reg, mem::Memory, program::Program, regs::RegSet,
};
use hashbrown::HashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Stopped,
}

#[derive(Debug, Copy, Clone)]
pub struct ClassConfig {
    pub rs_size: usize,
    pub fu_count: usize,
    pub fu_latency: u32,
}

#[derive(Debug, Copy, Clone)]
pub struct Config {
    pub reg_count: usize,
    pub rob_capacity: usize,
    pub alu: ClassConfig,
    pub mul: ClassConfig,
    pub mem: ClassConfig,
    pub max_cycles: u64,
}

impl Config {
    pub fn class(&self, class: OpClass) -> ClassConfig {
        match class {
            OpClass::Alu => self.alu,
            OpClass::Mul => self.mul,
            OpClass::Mem => self.mem,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reg_count: 16,
            rob_capacity: 8,
            alu: ClassConfig {
                rs_size: 4,
                fu_count: 2,
                fu_latency: 1,
            },
            mul: ClassConfig {
                rs_size: 2,
                fu_count: 1,
                fu_latency: 3,
            },
            mem: ClassConfig {
                rs_size: 4,
                fu_count: 1,
                fu_latency: 2,
            },
            max_cycles: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecResult {
    pub mem: Memory,
    pub regs: RegSet,
    pub cycles_taken: u64,
    pub insts_retired: u64,
}

pub trait Cpu {
    fn new(prog: Program, in_regs: HashMap<Reg, i64>, in_mem: Memory) -> Self;

    fn exec_all(self) -> ExecResult;
}
