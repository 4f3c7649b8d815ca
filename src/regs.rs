use crate::inst::{Reg, Tag, ValueOrTag};
use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegSet {
    regs: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct RegisterFile {
    regs: RegSet,
    status: Vec<Option<Tag>>,
}

impl RegSet {
    pub fn new(count: usize, initial_regs: HashMap<Reg, i64>) -> Self {
        let mut regs = vec![0; count];
        for (reg, val) in initial_regs {
            let idx = Self::index(&regs, reg);
            regs[idx] = val;
        }

        Self { regs }
    }

    fn index(regs: &[i64], reg: Reg) -> usize {
        let idx = usize::from(reg.0);
        assert!(idx < regs.len(), "invalid register {reg}");
        idx
    }

    pub fn get(&self, reg: Reg) -> i64 {
        self.regs[Self::index(&self.regs, reg)]
    }

    pub fn set(&mut self, reg: Reg, val: i64) {
        let idx = Self::index(&self.regs, reg);
        self.regs[idx] = val;
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }
}

impl RegisterFile {
    pub fn new(count: usize, initial_regs: HashMap<Reg, i64>) -> Self {
        Self {
            regs: RegSet::new(count, initial_regs),
            status: vec![None; count],
        }
    }

    pub fn read(&self, reg: Reg) -> i64 {
        self.regs.get(reg)
    }

    pub fn write(&mut self, reg: Reg, val: i64) {
        self.regs.set(reg, val);
    }

    pub fn get_status(&self, reg: Reg) -> Option<Tag> {
        self.status[RegSet::index(&self.regs.regs, reg)]
    }

    // A pending tag is simply overwritten: the last issued writer wins.
    pub fn set_status(&mut self, reg: Reg, tag: Option<Tag>) {
        let idx = RegSet::index(&self.regs.regs, reg);
        self.status[idx] = tag;
    }

    pub fn operand(&self, reg: Reg) -> ValueOrTag {
        match self.get_status(reg) {
            Some(tag) => ValueOrTag::Invalid(tag),
            None => ValueOrTag::Valid(self.read(reg)),
        }
    }

    pub fn get_reg_set(&self) -> RegSet {
        self.regs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_seed() {
        let rs = RegSet::new(4, HashMap::from_iter([(Reg(1), 5), (Reg(3), -2)]));
        assert_eq!(rs.get(Reg(0)), 0);
        assert_eq!(rs.get(Reg(1)), 5);
        assert_eq!(rs.get(Reg(3)), -2);
    }

    #[test]
    fn test_status_last_writer_wins() {
        let mut rf = RegisterFile::new(4, HashMap::new());
        assert_eq!(rf.operand(Reg(1)), ValueOrTag::Valid(0));

        rf.set_status(Reg(1), Some(Tag(3)));
        assert_eq!(rf.operand(Reg(1)), ValueOrTag::Invalid(Tag(3)));

        // A later producer of the same register overwrites the pending tag.
        rf.set_status(Reg(1), Some(Tag(7)));
        assert_eq!(rf.operand(Reg(1)), ValueOrTag::Invalid(Tag(7)));

        rf.set_status(Reg(1), None);
        rf.write(Reg(1), 42);
        assert_eq!(rf.operand(Reg(1)), ValueOrTag::Valid(42));
    }

    #[test]
    #[should_panic(expected = "invalid register")]
    fn test_out_of_range() {
        let rf = RegisterFile::new(4, HashMap::new());
        let _ = rf.read(Reg(4));
    }
}
