use rand::Rng;

use crate::models::interval::TimeInterval;

/// Randomly packs up to `target_count` mutually non-overlapping slots.
///
/// Greedy: each round draws uniformly from the slots still compatible with
/// everything chosen so far, so it can stop short of `target_count` when an
/// early draw blocks the rest. Chosen slots come back in draw order.
pub fn select_slots<R: Rng + ?Sized>(
    slots: &[TimeInterval],
    target_count: usize,
    rng: &mut R,
) -> Vec<TimeInterval> {
    let mut chosen: Vec<TimeInterval> = Vec::with_capacity(target_count.min(slots.len()));
    let mut eligible: Vec<TimeInterval> = Vec::with_capacity(slots.len());
    for slot in slots {
        if !eligible.contains(slot) {
            eligible.push(*slot);
        }
    }

    while chosen.len() < target_count && !eligible.is_empty() {
        let picked = eligible.remove(rng.gen_range(0..eligible.len()));
        eligible.retain(|slot| !slot.overlaps(&picked));
        chosen.push(picked);
    }
    chosen
}
