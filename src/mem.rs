use crate::util::Addr;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    mem: Vec<i64>,
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Self {
            mem: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    pub fn load(&self, addr: Addr) -> i64 {
        self.mem[self.index(addr)]
    }

    pub fn store(&mut self, addr: Addr, val: i64) {
        let idx = self.index(addr);
        self.mem[idx] = val;
    }

    fn index(&self, addr: Addr) -> usize {
        let idx = addr.0 as usize;
        assert!(idx < self.mem.len(), "address out of bounds: {addr:?}");
        idx
    }

    pub fn words(&self) -> &[i64] {
        &self.mem
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
