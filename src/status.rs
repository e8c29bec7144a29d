const DELETED: u8 = 1 << 0;
const TAGGED: u8 = 1 << 1;

/// Per element flags. Deleted elements stay in their arena as tombstones, so
/// handles to live elements remain stable.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Status {
    flags: u8,
}

impl Status {
    fn check(&self, i: u8) -> bool {
        self.flags & i > 0
    }

    fn set(&mut self, i: u8, flag: bool) {
        if flag {
            self.flags |= i;
        } else {
            self.flags &= !i;
        }
    }

    pub fn deleted(&self) -> bool {
        self.check(DELETED)
    }

    pub fn set_deleted(&mut self, flag: bool) {
        self.set(DELETED, flag);
    }

    pub fn tagged(&self) -> bool {
        self.check(TAGGED)
    }

    pub fn set_tagged(&mut self, flag: bool) {
        self.set(TAGGED, flag)
    }
}
