// Randomized draft order over the selected captains.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::model::Captain;

/// Random source used to shuffle draft positions.
///
/// Tests and configured sessions seed it explicitly; production seeds it from
/// the wall clock.
#[derive(Debug, Clone)]
pub struct DraftRng {
    rng: StdRng,
    seed: u64,
}

impl DraftRng {
    pub fn seeded(seed: u64) -> Self {
        DraftRng {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the current time in nanoseconds.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::seeded(nanos)
    }

    /// The seed this source started from, logged so a draw can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for DraftRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Assign each captain a distinct position in `1..=N` from a uniformly random
/// permutation and return the captains sorted by position.
///
/// Positions are shuffled, then zipped with the captains in input order.
pub fn generate_draft_order<R: RngCore + ?Sized>(captains: &[Captain], rng: &mut R) -> Vec<Captain> {
    let mut positions: Vec<u32> = (1..=captains.len() as u32).collect();
    positions.shuffle(rng);

    let mut order: Vec<Captain> = captains
        .iter()
        .zip(positions)
        .map(|(captain, position)| Captain {
            order: Some(position),
            ..captain.clone()
        })
        .collect();

    order.sort_by_key(|c| c.order);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Id;

    fn captains(n: u64) -> Vec<Captain> {
        (1..=n)
            .map(|i| Captain {
                id: Id(i),
                name: format!("Captain {i}"),
                alt_name: String::new(),
                order: None,
            })
            .collect()
    }

    #[test]
    fn positions_are_a_permutation() {
        for n in 1..=12 {
            let mut rng = DraftRng::seeded(n);
            let order = generate_draft_order(&captains(n), &mut rng);
            assert_eq!(order.len() as u64, n);

            let positions: Vec<u32> = order.iter().map(|c| c.order.unwrap()).collect();
            let expected: Vec<u32> = (1..=n as u32).collect();
            assert_eq!(positions, expected, "sorted positions for n={n}");

            let mut ids: Vec<Id> = order.iter().map(|c| c.id).collect();
            ids.sort();
            assert_eq!(ids, (1..=n).map(Id).collect::<Vec<_>>());
        }
    }

    #[test]
    fn same_seed_same_order() {
        let a = generate_draft_order(&captains(8), &mut DraftRng::seeded(2024));
        let b = generate_draft_order(&captains(8), &mut DraftRng::seeded(2024));
        assert_eq!(a, b);
    }

    #[test]
    fn rerunning_draws_again() {
        let mut rng = DraftRng::seeded(7);
        let draws: Vec<Vec<Id>> = (0..10)
            .map(|_| {
                generate_draft_order(&captains(6), &mut rng)
                    .iter()
                    .map(|c| c.id)
                    .collect()
            })
            .collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn empty_input_gives_empty_order() {
        let order = generate_draft_order(&[], &mut DraftRng::seeded(1));
        assert!(order.is_empty());
    }

    #[test]
    fn seed_is_reported() {
        assert_eq!(DraftRng::seeded(99).seed(), 99);
    }
}
