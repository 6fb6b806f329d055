use std::sync::atomic::{AtomicI64, Ordering};

/// Rotating slot selector, safe under unbounded concurrent callers.
///
/// A single shared counter advances by one atomic fetch-and-increment per
/// call. The raw remainder can turn negative once the counter wraps, so a
/// negative result is negated before use; the returned index always
/// satisfies `index < slot_count`.
#[derive(Debug)]
pub(crate) struct RoundRobin {
    slot_count: usize,
    cursor: AtomicI64,
}

impl RoundRobin {
    pub(crate) fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            cursor: AtomicI64::new(0),
        }
    }

    #[cfg(test)]
    fn with_cursor(slot_count: usize, cursor: i64) -> Self {
        Self {
            slot_count,
            cursor: AtomicI64::new(cursor),
        }
    }

    pub(crate) fn next_index(&self) -> usize {
        let raw = self.cursor.fetch_add(1, Ordering::Relaxed);

        let index = raw % self.slot_count as i64;
        let index = if index < 0 { -index } else { index };

        index as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_indices_in_order() {
        let selector = RoundRobin::new(3);

        let indices: Vec<usize> = (0..7).map(|_| selector.next_index()).collect();

        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn single_slot_always_selects_zero() {
        let selector = RoundRobin::new(1);

        for _ in 0..16 {
            assert_eq!(selector.next_index(), 0);
        }
    }

    #[test]
    fn stays_in_range_across_counter_wraparound() {
        let selector = RoundRobin::with_cursor(3, i64::MAX - 1);

        // Crosses i64::MAX into i64::MIN; the remainder goes negative there
        // and must come back normalized.
        let indices: Vec<usize> = (0..6).map(|_| selector.next_index()).collect();

        assert!(indices.iter().all(|&index| index < 3));
        // i64::MIN % 3 == -1 before normalization.
        assert_eq!(indices[2], 1);
    }

    #[test]
    fn distributes_exactly_under_concurrency() {
        use std::sync::Arc;

        let selector = Arc::new(RoundRobin::new(4));
        let mut counts = [0usize; 4];

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let selector = Arc::clone(&selector);
                    scope.spawn(move || {
                        let mut local = [0usize; 4];
                        for _ in 0..300 {
                            local[selector.next_index()] += 1;
                        }
                        local
                    })
                })
                .collect();

            for handle in handles {
                let local = handle.join().expect("selector thread should not panic");
                for (total, count) in counts.iter_mut().zip(local) {
                    *total += count;
                }
            }
        });

        assert_eq!(counts, [600, 600, 600, 600]);
    }
}
