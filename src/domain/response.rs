//! Response encoder: compresses the current interlock state into the
//! two-bit outbound summary the sibling controller reads. Reproduced
//! verbatim from the component design; the formula is unintuitive by
//! design (its source calls it "magic") but is a documented external
//! contract, not ours to simplify.

use crate::domain::ResponseWord;

/// `mode_is_zero` is `cfg.mode == 0` (controller globally off).
pub fn encode(nr_startable: u32, nr_stoppable: u32, mode_is_zero: bool) -> ResponseWord {
    if mode_is_zero || (nr_startable == 0 && nr_stoppable == 0) {
        return ResponseWord(0);
    }

    let mut k: u32 = 0;
    if nr_startable > 0 {
        k = 1;
    }
    if nr_startable == nr_stoppable {
        k = 0;
    }
    if nr_stoppable > 0 {
        k += 1 + nr_stoppable + nr_startable;
    }

    ResponseWord((k & 0b11) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_zero_is_always_zero() {
        assert_eq!(encode(2, 2, true), ResponseWord(0));
    }

    #[test]
    fn nothing_startable_or_stoppable_is_zero() {
        assert_eq!(encode(0, 0, false), ResponseWord(0));
    }

    #[test]
    fn one_startable_none_stoppable() {
        // k starts 1 (startable>0), not equal (1 != 0) so stays 1,
        // stoppable==0 so no addition. response = 1.
        assert_eq!(encode(1, 0, false), ResponseWord(1));
    }

    #[test]
    fn equal_counts_reset_k_before_stoppable_addition() {
        // nr_startable == nr_stoppable == 1: k set to 1 then reset to 0,
        // then stoppable>0 adds 1+1+1=3 -> k=3, truncated to 2 bits = 3.
        assert_eq!(encode(1, 1, false), ResponseWord(3));
    }

    #[test]
    fn truth_table_is_stable_for_full_input_range() {
        for startable in 0..=2u32 {
            for stoppable in 0..=2u32 {
                // Must not panic and must stay within 2 bits.
                let r = encode(startable, stoppable, false);
                assert!(r.bits() <= 3);
            }
        }
    }
}
