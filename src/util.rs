#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Addr(pub u32);

impl Addr {
    pub fn from_effective(addr: i64) -> Self {
        Addr(u32::try_from(addr).expect("address out of bounds"))
    }
}
