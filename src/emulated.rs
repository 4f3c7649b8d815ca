use crate::{
    cpu::{Config, Cpu, CpuState, ExecResult},
    inst::{Inst, MemRef, Reg},
    mem::Memory,
    program::Program,
    regs::RegSet,
    util::Addr,
};
use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub struct Emulated {
    regs: RegSet,
    mem: Memory,
    prog: Program,
    pc: u32,
    cycles: u64,
    insts_retired: u64,
}

impl Cpu for Emulated {
    fn new(prog: Program, regs: HashMap<Reg, i64>, mem: Memory) -> Self {
        Self {
            regs: RegSet::new(Config::default().reg_count, regs),
            mem,
            prog,
            pc: 0,
            cycles: 0,
            insts_retired: 0,
        }
    }

    fn exec_all(mut self) -> ExecResult {
        while CpuState::Running == self.exec_one() {
            #[cfg(debug_assertions)]
            if std::env::var("VERBOSE").is_ok() {
                dbg!(&self.regs);
            }
        }

        ExecResult {
            mem: self.mem,
            regs: self.regs,
            cycles_taken: self.cycles,
            insts_retired: self.insts_retired,
        }
    }
}

impl Emulated {
    fn ref_to_addr(&self, mref: MemRef) -> Addr {
        let base = mref.base.map(|r| self.regs.get(r)).unwrap_or(0);
        Addr::from_effective(base.wrapping_add(mref.offset.0))
    }

    fn exec_one(&mut self) -> CpuState {
        let next_inst = match self.prog.fetch(self.pc) {
            Some(inst) => *inst,
            None => return CpuState::Stopped,
        };

        match next_inst {
            Inst::Add(dst, src0, src1) => {
                let val = self.regs.get(src0).wrapping_add(self.regs.get(src1));
                self.regs.set(dst, val);
            }
            Inst::Sub(dst, src0, src1) => {
                let val = self.regs.get(src0).wrapping_sub(self.regs.get(src1));
                self.regs.set(dst, val);
            }
            Inst::Mul(dst, src0, src1) => {
                let val = self.regs.get(src0).wrapping_mul(self.regs.get(src1));
                self.regs.set(dst, val);
            }
            Inst::Div(dst, src0, src1) => {
                let a = self.regs.get(src0);
                let b = self.regs.get(src1);
                let val = if b == 0 { 0 } else { a.wrapping_div(b) };
                self.regs.set(dst, val);
            }
            Inst::Load(dst, src) => {
                let val = self.mem.load(self.ref_to_addr(src));
                self.regs.set(dst, val);
            }
            Inst::Store(src, dst) => {
                let addr = self.ref_to_addr(dst);
                self.mem.store(addr, self.regs.get(src));
            }
            Inst::Nop => (),
        }

        self.pc += 1;
        self.insts_retired += 1;
        self.cycles += 1;

        CpuState::Running
    }
}
