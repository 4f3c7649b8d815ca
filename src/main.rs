mod cpu;
mod emulated;
mod execution_unit;
mod inst;
mod mem;
mod out_of_order;
mod program;
mod queue;
mod regs;
mod reservation_station;
mod rob;
mod util;

use crate::{cpu::Cpu, mem::Memory};
use hashbrown::HashMap;
use std::time::Instant;

fn main() {
    let start = Instant::now();

    let file = std::env::args()
        .nth(1)
        .expect("required program file as argument");

    let contents = std::fs::read_to_string(&file).expect("failed to open file");

    let prog = contents
        .parse::<program::Program>()
        .expect("failed to parse program");

    let res = out_of_order::OutOfOrder::new(prog, HashMap::new(), Memory::default()).exec_all();
    dbg!(&res);

    println!("    EXECUTION COMPLETED");
    println!("    =====================");
    println!("    Instructions retired: {}", res.insts_retired);
    println!("            Cycles taken: {}", res.cycles_taken);
    println!(
        "  Instructions per clock: {:.2}",
        res.insts_retired as f32 / res.cycles_taken as f32
    );
    println!(
        "  Simulator time elapsed: {:.2}s",
        start.elapsed().as_secs_f32()
    );
}
