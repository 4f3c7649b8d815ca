use crate::reservation_station::ReservationStation;
use strum::{Display, EnumIter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter)]
pub enum OpClass {
    Alu,
    Mul,
    Mem,
}

#[derive(Debug, Copy, Clone)]
struct FuSlot {
    rs_index: usize,
    cycles_left: u32,
}

#[derive(Debug, Clone)]
pub struct FunctionalUnit {
    pub fu_type: OpClass,
    latency: u32,
    slots: Vec<Option<FuSlot>>,
}

impl FunctionalUnit {
    pub fn new(fu_type: OpClass, latency: u32, count: usize) -> Self {
        assert!(latency > 0, "functional unit latency must be at least 1");
        Self {
            fu_type,
            latency,
            slots: vec![None; count],
        }
    }

    pub fn latency(&self) -> u32 {
        self.latency
    }

    pub fn can_accept(&self) -> bool {
        self.slots.iter().any(|slot| slot.is_none())
    }

    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn assign(&mut self, rs_index: usize) {
        debug_assert!(self.can_accept(), "assign called with no free slot");

        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(FuSlot {
                rs_index,
                cycles_left: self.latency,
            });
        }
    }

    pub fn advance_cycle(&mut self, rs: &mut ReservationStation) -> Vec<usize> {
        let mut finished = vec![];

        for slot in &mut self.slots {
            if let Some(fu_slot) = slot {
                fu_slot.cycles_left = fu_slot.cycles_left.saturating_sub(1);
                rs.get_mut(fu_slot.rs_index).cycles_left = Some(fu_slot.cycles_left);

                if fu_slot.cycles_left == 0 {
                    finished.push(fu_slot.rs_index);
                    *slot = None;
                }
            }
        }

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_countdown() {
        let mut rs = ReservationStation::new('M', 2);
        rs.get_mut(0).busy = true;
        rs.get_mut(0).cycles_left = Some(3);

        let mut fu = FunctionalUnit::new(OpClass::Mul, 3, 1);
        assert!(fu.can_accept());
        fu.assign(0);
        assert!(!fu.can_accept());

        assert_eq!(fu.advance_cycle(&mut rs), vec![]);
        assert_eq!(rs.get(0).cycles_left, Some(2));
        assert_eq!(fu.advance_cycle(&mut rs), vec![]);
        assert_eq!(fu.advance_cycle(&mut rs), vec![0]);
        assert!(fu.can_accept());
    }

    #[test]
    fn test_simultaneous_finish_slot_order() {
        let mut rs = ReservationStation::new('A', 2);
        rs.get_mut(0).busy = true;
        rs.get_mut(1).busy = true;

        let mut fu = FunctionalUnit::new(OpClass::Alu, 1, 2);
        fu.assign(1);
        fu.assign(0);

        // Slot order, not assignment order.
        assert_eq!(fu.advance_cycle(&mut rs), vec![1, 0]);
    }

    #[test]
    fn test_capacity_respected() {
        let mut fu = FunctionalUnit::new(OpClass::Alu, 1, 2);
        fu.assign(0);
        fu.assign(1);
        assert!(!fu.can_accept());
        assert_eq!(fu.busy_count(), 2);
    }
}
