use crate::inst::Inst;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub insts: Vec<Inst>,
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut insts = Vec::default();

        for (i, line) in s.lines().enumerate() {
            // Strip comments and empty lines
            let line = line.trim();
            let line = &line[..line.find(';').unwrap_or(line.len())];
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            // Line numbers start at 1
            let i = i + 1;

            match Inst::from_str(line) {
                Ok(inst) => insts.push(inst),
                Err(e) => {
                    return Err(format!("error parsing instruction '{line}' on line {i}: {e}"))
                }
            }
        }

        Ok(Program { insts })
    }
}

impl Program {
    pub fn fetch(&self, pc: u32) -> Option<&Inst> {
        self.insts.get(pc as usize)
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn max_reg(&self) -> Option<u8> {
        self.insts.iter().filter_map(Inst::max_reg).max()
    }
}

impl FromIterator<Inst> for Program {
    fn from_iter<T: IntoIterator<Item = Inst>>(iter: T) -> Self {
        Program {
            insts: iter.into_iter().collect(),
        }
    }
}
