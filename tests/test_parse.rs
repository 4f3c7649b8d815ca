use tomasulo::{
    inst::{Imm, Inst, MemRef, Reg},
    program::Program,
};

#[test]
fn parse_program() {
    let src = "
        ; dependent chain with comments and blank lines
        ld r1, #10

        add r3, r1, r2  ; trailing comment
        st r3, [r1 + 2]
        nop
    ";

    let prog = src.parse::<Program>().expect("failed to parse program");

    assert_eq!(
        prog.insts,
        vec![
            Inst::Load(Reg(1), MemRef { base: None, offset: Imm(10) }),
            Inst::Add(Reg(3), Reg(1), Reg(2)),
            Inst::Store(Reg(3), MemRef { base: Some(Reg(1)), offset: Imm(2) }),
            Inst::Nop,
        ]
    );
    assert_eq!(prog.max_reg(), Some(3));
}

#[test]
fn parse_empty() {
    let prog = "\n  ; nothing but comments\n".parse::<Program>().unwrap();
    assert!(prog.is_empty());
    assert_eq!(prog.max_reg(), None);
}

#[test]
fn parse_errors_carry_line_numbers() {
    let err = "add r1, r2, r3\nbogus r1".parse::<Program>().unwrap_err();
    assert!(err.contains("line 2"), "unexpected error: {err}");
    assert!(err.contains("bogus"), "unexpected error: {err}");
}

#[test]
fn parse_mnemonic_case_insensitive() {
    let prog = "ADD r1, r2, r3\nLd r4, #0".parse::<Program>().unwrap();
    assert_eq!(prog.len(), 2);
}

#[test]
fn max_reg_covers_memref_bases() {
    let regs_used = |src: &str| -> Option<u8> {
        src.parse::<Program>().unwrap().max_reg()
    };

    assert_eq!(regs_used("ld r1, [r9 + 4]"), Some(9));
    assert_eq!(regs_used("st r2, [r7]"), Some(7));
    assert_eq!(regs_used("nop"), None);
}
