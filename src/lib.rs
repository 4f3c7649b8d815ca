use hashbrown::HashMap;

use cpu::{Cpu, ExecResult};
use inst::Reg;
use mem::Memory;
use program::Program;

pub mod cpu;
pub mod emulated;
pub mod execution_unit;
pub mod inst;
pub mod mem;
pub mod out_of_order;
pub mod program;
pub mod queue;
pub mod regs;
pub mod reservation_station;
pub mod rob;
pub mod util;

pub fn parse_and_exec<C: Cpu>(src: &str, regs: HashMap<Reg, i64>, mem: Memory) -> ExecResult {
    let prog = src.parse::<Program>().expect("failed to parse program");
    C::new(prog, regs, mem).exec_all()
}
