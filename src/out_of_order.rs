use hashbrown::HashMap;
use strum::IntoEnumIterator;

use crate::{
    cpu::{Config, Cpu, ExecResult},
    execution_unit::{FunctionalUnit, OpClass},
    inst::{Inst, Opcode, Reg, Tag, ValueOrTag},
    mem::Memory,
    program::Program,
    regs::RegisterFile,
    reservation_station::ReservationStation,
    rob::{ReorderBuffer, RobEntry, RobKind},
    util::Addr,
};

#[derive(Debug, Clone)]
pub struct OutOfOrder {
    prog: Program,
    mem: Memory,
    reg_file: RegisterFile,
    rob: ReorderBuffer,
    stations: [ReservationStation; 3],
    units: [FunctionalUnit; 3],
    pc: u32,
    cycles: u64,
    insts_retired: u64,
    max_cycles: u64,
}

impl Cpu for OutOfOrder {
    fn new(prog: Program, regs: HashMap<Reg, i64>, mem: Memory) -> Self {
        Self::with_config(prog, regs, mem, Config::default())
    }

    fn exec_all(mut self) -> ExecResult {
        let max_cycles = self.max_cycles;
        self.run(max_cycles);

        ExecResult {
            regs: self.reg_file.get_reg_set(),
            mem: self.mem,
            cycles_taken: self.cycles,
            insts_retired: self.insts_retired,
        }
    }
}

impl OutOfOrder {
    pub fn with_config(
        prog: Program,
        regs: HashMap<Reg, i64>,
        mem: Memory,
        config: Config,
    ) -> Self {
        if let Some(max_reg) = prog.max_reg() {
            assert!(
                usize::from(max_reg) < config.reg_count,
                "invalid register r{max_reg}: only {} registers configured",
                config.reg_count,
            );
        }
        assert!(config.rob_capacity > 0, "ROB capacity must be at least 1");

        let station = |class: OpClass, prefix| {
            ReservationStation::new(prefix, config.class(class).rs_size)
        };
        let unit = |class: OpClass| {
            let c = config.class(class);
            FunctionalUnit::new(class, c.fu_latency, c.fu_count)
        };

        Self {
            prog,
            mem,
            reg_file: RegisterFile::new(config.reg_count, regs),
            rob: ReorderBuffer::new(config.rob_capacity),
            stations: [
                station(OpClass::Alu, 'A'),
                station(OpClass::Mul, 'M'),
                station(OpClass::Mem, 'L'),
            ],
            units: [
                unit(OpClass::Alu),
                unit(OpClass::Mul),
                unit(OpClass::Mem),
            ],
            pc: 0,
            cycles: 0,
            insts_retired: 0,
            max_cycles: config.max_cycles,
        }
    }

    // Stage order matters: dispatch precedes broadcast, so an entry whose
    // producer finishes this cycle dispatches on a later one, and commit
    // runs last so at most one instruction retires per cycle.
    pub fn run_cycle(&mut self) {
        self.cycles += 1;

        self.stage_issue();
        self.stage_dispatch();
        let finished = self.stage_execute();
        self.stage_writeback(finished);
        self.stage_commit();
    }

    pub fn run(&mut self, max_cycles: u64) {
        while !self.is_done() && self.cycles < max_cycles {
            self.run_cycle();

            if std::env::var("SINGLE_STEP").is_ok() {
                self.dump();
                std::io::stdin().read_line(&mut String::new()).unwrap();
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.insts_retired == self.prog.len() as u64
    }

    fn stage_issue(&mut self) {
        let inst = match self.prog.fetch(self.pc) {
            Some(inst) => *inst,
            None => return,
        };

        if self.rob.is_full() {
            return; // structural stall, retried next cycle
        }

        let class = match inst.op_class() {
            Some(class) => class,
            None => {
                // NOP consumes no resources at all.
                self.pc += 1;
                return;
            }
        };

        let rs_index = match self.stations[class as usize].find_free() {
            Some(idx) => idx,
            None => return, // no free station, stall
        };

        let kind = match inst {
            Inst::Load(..) => RobKind::Load,
            Inst::Store(..) => RobKind::Store,
            _ => RobKind::Alu,
        };
        let tag = self.rob.allocate(inst, inst.dest(), kind);

        // Sources are resolved against the pre-rename status, so an
        // instruction reading its own destination sees the old producer.
        let (a, b, offset) = match inst {
            Inst::Add(_, s0, s1)
            | Inst::Sub(_, s0, s1)
            | Inst::Mul(_, s0, s1)
            | Inst::Div(_, s0, s1) => (Some(self.resolve(s0)), Some(self.resolve(s1)), 0),
            Inst::Load(_, mref) => (mref.base.map(|r| self.resolve(r)), None, mref.offset.0),
            Inst::Store(src, mref) => (
                mref.base.map(|r| self.resolve(r)),
                Some(self.resolve(src)),
                mref.offset.0,
            ),
            Inst::Nop => unreachable!(),
        };

        let ent = self.stations[class as usize].get_mut(rs_index);
        ent.busy = true;
        ent.op = Some(inst.opcode());
        ent.a = a;
        ent.b = b;
        ent.dest = Some(tag);
        ent.offset = offset;
        ent.cycles_left = None;

        if let Some(dst) = inst.dest() {
            self.reg_file.set_status(dst, Some(tag));
        }

        self.pc += 1;
    }

    // A pending producer that has already written back is read out of the
    // ROB; its broadcast has passed and will not recur.
    fn resolve(&self, reg: Reg) -> ValueOrTag {
        match self.reg_file.operand(reg) {
            ValueOrTag::Invalid(tag) => match self.rob.get(tag) {
                Some(ent) if ent.ready => ValueOrTag::Valid(ent.value),
                _ => ValueOrTag::Invalid(tag),
            },
            valid => valid,
        }
    }

    fn stage_dispatch(&mut self) {
        for class in OpClass::iter() {
            let rs = &mut self.stations[class as usize];
            let fu = &mut self.units[class as usize];

            for idx in 0..rs.capacity() {
                if rs.get(idx).is_ready() && fu.can_accept() {
                    rs.get_mut(idx).cycles_left = Some(fu.latency());
                    fu.assign(idx);
                }
            }
        }
    }

    fn stage_execute(&mut self) -> Vec<(OpClass, usize)> {
        let mut finished = vec![];

        for class in OpClass::iter() {
            let done = self.units[class as usize].advance_cycle(&mut self.stations[class as usize]);
            finished.extend(done.into_iter().map(|idx| (class, idx)));
        }

        finished
    }

    fn stage_writeback(&mut self, finished: Vec<(OpClass, usize)>) {
        for (class, idx) in finished {
            self.produce_result(class, idx);
        }
    }

    fn produce_result(&mut self, class: OpClass, idx: usize) {
        let ent = self.stations[class as usize].get(idx).clone();
        debug_assert!(ent.busy, "finished index points at a free station");
        let dest = ent.dest.expect("finished entry has no ROB tag");

        let value = |opnd: Option<ValueOrTag>| match opnd {
            Some(ValueOrTag::Valid(v)) => v,
            Some(ValueOrTag::Invalid(tag)) => {
                panic!("dispatched entry still waiting on {tag}")
            }
            None => 0,
        };

        let (result, addr) = match ent.op.expect("occupied entry has no opcode") {
            Opcode::Add => (value(ent.a).wrapping_add(value(ent.b)), None),
            Opcode::Sub => (value(ent.a).wrapping_sub(value(ent.b)), None),
            Opcode::Mul => (value(ent.a).wrapping_mul(value(ent.b)), None),
            Opcode::Div => {
                let (a, b) = (value(ent.a), value(ent.b));
                // A zero divisor yields zero rather than faulting.
                (if b == 0 { 0 } else { a.wrapping_div(b) }, None)
            }
            Opcode::Load => {
                let addr = Addr::from_effective(value(ent.a).wrapping_add(ent.offset));
                // Loads read eagerly here; with a straight-line ISA no
                // squash can invalidate the read.
                (self.mem.load(addr), Some(addr))
            }
            Opcode::Store => {
                let addr = Addr::from_effective(value(ent.a).wrapping_add(ent.offset));
                // The value rides in the ROB; commit performs the write.
                (value(ent.b), Some(addr))
            }
            Opcode::Nop => unreachable!("NOP never occupies a station"),
        };

        self.rob.mark_ready(dest, result, addr);

        for station in &mut self.stations {
            station.broadcast(dest, result);
        }

        self.stations[class as usize].get_mut(idx).clear();
    }

    // Commit the ROB head to architectural state. Stores touch memory only
    // here, so they become visible strictly in program order.
    fn stage_commit(&mut self) {
        let ent = match self.rob.commit_head() {
            Some(ent) => ent,
            None => return,
        };

        match ent.kind {
            RobKind::Alu | RobKind::Load => {
                if let Some(dest) = ent.dest {
                    // Skip the write if a later instruction has renamed the
                    // register since; its value supersedes this one.
                    if self.reg_file.get_status(dest) == Some(ent.tag) {
                        self.reg_file.write(dest, ent.value);
                        self.reg_file.set_status(dest, None);
                    }
                }
            }
            RobKind::Store => {
                let addr = ent.addr.expect("store committed without an address");
                self.mem.store(addr, ent.value);
            }
        }

        self.insts_retired += 1;
    }

    #[allow(dead_code)]
    fn dump(&self) {
        dbg!(&self.reg_file);
        dbg!(&self.rob);
        dbg!(&self.stations);
        dbg!(&self.units);
    }

    // Read-only state accessors, for shells that poll between cycles.

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn insts_retired(&self) -> u64 {
        self.insts_retired
    }

    pub fn rob_entries(&self) -> impl Iterator<Item = &RobEntry> {
        self.rob.iter()
    }

    pub fn station(&self, class: OpClass) -> &ReservationStation {
        &self.stations[class as usize]
    }

    pub fn unit(&self, class: OpClass) -> &FunctionalUnit {
        &self.units[class as usize]
    }

    pub fn reg_file(&self) -> &RegisterFile {
        &self.reg_file
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn reg_status(&self, reg: Reg) -> Option<Tag> {
        self.reg_file.get_status(reg)
    }
}
