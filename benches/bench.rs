use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hashbrown::HashMap;
use tomasulo::{
    cpu::Cpu,
    inst::{Inst, Reg},
    mem::Memory,
    out_of_order::OutOfOrder,
    program::Program,
};

// A long dependent chain: every third instruction feeds the next, keeping
// the broadcast and rename paths hot.
fn dependency_chain(len: usize) -> Program {
    (0..len)
        .map(|i| match i % 3 {
            0 => Inst::Add(Reg(1), Reg(1), Reg(2)),
            1 => Inst::Mul(Reg(3), Reg(1), Reg(2)),
            _ => Inst::Sub(Reg(1), Reg(3), Reg(2)),
        })
        .collect()
}

fn run_chain(len: usize) -> u64 {
    let regs = HashMap::from_iter([(Reg(1), 1), (Reg(2), 2)]);
    OutOfOrder::new(dependency_chain(len), regs, Memory::default())
        .exec_all()
        .insts_retired
}

fn chain_1000(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_1000");
    group.sample_size(10);
    group.bench_function("dependent chain 1000", |b| {
        b.iter(|| run_chain(black_box(1000)))
    });
    group.finish();
}

criterion_group!(benches, chain_1000);
criterion_main!(benches);
