/// Latest-value command latch.
///
/// Writers overwrite; readers see the most recent value on every tick until
/// it is replaced. There is no queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSlot<T> {
    value: T,
    fresh: bool,
}

impl<T: Copy> CommandSlot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            fresh: false,
        }
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.fresh = true;
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Value written since the last call, if any.
    pub fn take_fresh(&mut self) -> Option<T> {
        if self.fresh {
            self.fresh = false;
            Some(self.value)
        } else {
            None
        }
    }
}

impl<T: Copy + Default> Default for CommandSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_value_wins() {
        let mut slot = CommandSlot::new(0);
        slot.set(1);
        slot.set(2);
        assert_eq!(slot.get(), 2);
        assert_eq!(slot.take_fresh(), Some(2));
        assert_eq!(slot.take_fresh(), None);
        // The value persists after being observed.
        assert_eq!(slot.get(), 2);
    }
}
