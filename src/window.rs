/// Fixed-size circular buffer of per-second counts with a running sum.
///
/// `sum()` always equals the total of the slots written so far (at most `N`
/// of them). A slot is zeroed when claimed and written exactly once per claim.
#[derive(Debug, Clone)]
pub struct RollingWindow<const N: usize> {
    slots: [u32; N],
    cursor: usize,
    filled: usize,
    sum: u64,
}

impl<const N: usize> RollingWindow<N> {
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            cursor: 0,
            filled: 0,
            sum: 0,
        }
    }

    /// Claims the slot under the cursor, stores `count` in it and advances.
    /// Returns the value that was evicted.
    pub fn push(&mut self, count: u32) -> u32 {
        let evicted = core::mem::replace(&mut self.slots[self.cursor], count);
        self.sum = self.sum - u64::from(evicted) + u64::from(count);
        self.cursor = (self.cursor + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }
        evicted
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Number of slots holding real history, saturating at `N`.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_full(&self) -> bool {
        self.filled == N
    }

    /// Value stored by the most recent push.
    pub fn latest(&self) -> Option<u32> {
        if self.filled == 0 {
            return None;
        }
        Some(self.slots[(self.cursor + N - 1) % N])
    }

    /// Written slots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let start = (self.cursor + N - self.filled) % N;
        (0..self.filled).map(move |i| self.slots[(start + i) % N])
    }
}

impl<const N: usize> Default for RollingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let window = RollingWindow::<4>::new();
        assert_eq!(window.sum(), 0);
        assert_eq!(window.filled(), 0);
        assert_eq!(window.latest(), None);
        assert_eq!(window.iter().count(), 0);
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut window = RollingWindow::<3>::new();
        assert_eq!(window.push(5), 0);
        window.push(7);
        window.push(1);
        assert!(window.is_full());
        assert_eq!(window.sum(), 13);

        assert_eq!(window.push(2), 5);
        assert_eq!(window.sum(), 10);
        assert_eq!(window.latest(), Some(2));

        let mut history = [0u32; 3];
        for (slot, value) in history.iter_mut().zip(window.iter()) {
            *slot = value;
        }
        assert_eq!(history, [7, 1, 2]);
    }

    #[test]
    fn sum_does_not_overflow_with_saturated_slots() {
        let mut window = RollingWindow::<60>::new();
        for _ in 0..120 {
            window.push(u32::MAX);
        }
        assert_eq!(window.sum(), 60 * u64::from(u32::MAX));
    }
}
