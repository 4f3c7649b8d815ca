use crate::{
    inst::{Inst, Reg, Tag},
    queue::Queue,
    util::Addr,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RobKind {
    Alu,
    Load,
    Store,
}

#[derive(Debug, Clone)]
pub struct RobEntry {
    pub tag: Tag,
    pub inst: Inst,
    pub dest: Option<Reg>,
    pub kind: RobKind,
    pub ready: bool,
    pub value: i64,
    pub addr: Option<Addr>,
}

#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    rob: Queue<RobEntry>,
    next_tag: u32,
}

impl ReorderBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            rob: Queue::new(capacity),
            next_tag: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.rob.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.rob.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rob.len()
    }

    pub fn allocate(&mut self, inst: Inst, dest: Option<Reg>, kind: RobKind) -> Tag {
        let tag = Tag(self.next_tag);
        self.next_tag += 1;

        let pushed_back = self.rob.try_push(RobEntry {
            tag,
            inst,
            dest,
            kind,
            ready: false,
            value: 0,
            addr: None,
        });
        debug_assert!(pushed_back.is_none(), "allocate called on a full ROB");

        tag
    }

    pub fn mark_ready(&mut self, tag: Tag, value: i64, addr: Option<Addr>) {
        let ent = self
            .rob
            .iter_mut()
            .find(|ent| ent.tag == tag)
            .expect("no entry found in ROB");

        ent.ready = true;
        ent.value = value;
        ent.addr = addr;
    }

    pub fn get(&self, tag: Tag) -> Option<&RobEntry> {
        self.rob.iter().find(|ent| ent.tag == tag)
    }

    pub fn peek_head(&self) -> Option<&RobEntry> {
        self.rob.front()
    }

    pub fn commit_head(&mut self) -> Option<RobEntry> {
        if self.peek_head().map(|ent| ent.ready).unwrap_or(false) {
            self.rob.try_pop()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> {
        self.rob.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_commit() {
        let mut rob = ReorderBuffer::new(4);
        let t0 = rob.allocate(Inst::Nop, None, RobKind::Alu);
        let t1 = rob.allocate(Inst::Nop, None, RobKind::Alu);
        assert!(t0 < t1);

        // Completing out of order must not reorder commit.
        rob.mark_ready(t1, 2, None);
        assert!(rob.commit_head().is_none());

        rob.mark_ready(t0, 1, None);
        assert_eq!(rob.commit_head().map(|e| e.tag), Some(t0));
        assert_eq!(rob.commit_head().map(|e| e.tag), Some(t1));
        assert!(rob.commit_head().is_none());
    }

    #[test]
    fn test_capacity_blocks() {
        let mut rob = ReorderBuffer::new(2);
        assert!(!rob.is_full());
        let _ = rob.allocate(Inst::Nop, None, RobKind::Alu);
        let _ = rob.allocate(Inst::Nop, None, RobKind::Alu);
        assert!(rob.is_full());
    }

    #[test]
    fn test_tags_not_reused() {
        let mut rob = ReorderBuffer::new(1);
        let t0 = rob.allocate(Inst::Nop, None, RobKind::Alu);
        rob.mark_ready(t0, 0, None);
        let _ = rob.commit_head();

        let t1 = rob.allocate(Inst::Nop, None, RobKind::Alu);
        assert!(t1 > t0);
    }
}
