use crate::inst::{Opcode, Tag, ValueOrTag};

#[derive(Debug, Clone, Default)]
pub struct RsEntry {
    pub busy: bool,
    pub op: Option<Opcode>,
    pub a: Option<ValueOrTag>,
    pub b: Option<ValueOrTag>,
    pub dest: Option<Tag>,
    pub offset: i64,
    pub cycles_left: Option<u32>,
}

impl RsEntry {
    pub fn is_ready(&self) -> bool {
        let resolved = |opnd: &Option<ValueOrTag>| opnd.map_or(true, |v| v.is_valid());
        self.busy && resolved(&self.a) && resolved(&self.b) && self.cycles_left.is_none()
    }

    pub fn clear(&mut self) {
        *self = RsEntry::default();
    }
}

#[derive(Debug, Clone)]
pub struct ReservationStation {
    prefix: char,
    entries: Vec<RsEntry>,
}

impl ReservationStation {
    pub fn new(prefix: char, size: usize) -> Self {
        Self {
            prefix,
            entries: vec![RsEntry::default(); size],
        }
    }

    pub fn find_free(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.busy)
    }

    pub fn busy_count(&self) -> usize {
        self.entries.iter().filter(|e| e.busy).count()
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn slot_name(&self, idx: usize) -> String {
        format!("{}{}", self.prefix, idx)
    }

    pub fn get(&self, idx: usize) -> &RsEntry {
        &self.entries[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut RsEntry {
        &mut self.entries[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RsEntry> {
        self.entries.iter()
    }

    pub fn broadcast(&mut self, tag: Tag, value: i64) {
        for ent in self.entries.iter_mut().filter(|e| e.busy) {
            for opnd in [&mut ent.a, &mut ent.b] {
                if *opnd == Some(ValueOrTag::Invalid(tag)) {
                    *opnd = Some(ValueOrTag::Valid(value));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_index_order() {
        let mut rs = ReservationStation::new('A', 3);
        assert_eq!(rs.find_free(), Some(0));

        rs.get_mut(0).busy = true;
        assert_eq!(rs.find_free(), Some(1));

        rs.get_mut(1).busy = true;
        rs.get_mut(2).busy = true;
        assert_eq!(rs.find_free(), None);

        rs.get_mut(1).clear();
        assert_eq!(rs.find_free(), Some(1));
    }

    #[test]
    fn test_readiness() {
        let mut rs = ReservationStation::new('A', 1);
        let ent = rs.get_mut(0);
        ent.busy = true;
        ent.op = Some(Opcode::Add);
        ent.a = Some(ValueOrTag::Valid(1));
        ent.b = Some(ValueOrTag::Invalid(Tag(5)));
        assert!(!ent.is_ready());

        rs.broadcast(Tag(5), 42);
        assert!(rs.get(0).is_ready());
        assert_eq!(rs.get(0).b, Some(ValueOrTag::Valid(42)));

        // Dispatched entries are no longer ready.
        rs.get_mut(0).cycles_left = Some(3);
        assert!(!rs.get(0).is_ready());
    }

    #[test]
    fn test_broadcast_ignores_other_tags() {
        let mut rs = ReservationStation::new('M', 1);
        let ent = rs.get_mut(0);
        ent.busy = true;
        ent.a = Some(ValueOrTag::Invalid(Tag(1)));
        ent.b = None;

        rs.broadcast(Tag(2), 9);
        assert_eq!(rs.get(0).a, Some(ValueOrTag::Invalid(Tag(1))));
    }
}
