use std::num::NonZeroUsize;

use crate::PairId;

/// Split `ids` into consecutive batches of at most `max_size` pairs.
///
/// Order is preserved and every id lands in exactly one batch; only the last
/// batch may be shorter than `max_size`.
pub fn partition(ids: &[PairId], max_size: NonZeroUsize) -> impl Iterator<Item = &[PairId]> {
    ids.chunks(max_size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn splits_into_bounded_batches() {
        let ids: Vec<PairId> = (1..=450).map(PairId::new).collect();
        let batches: Vec<&[PairId]> = partition(&ids, size(200)).collect();

        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![200, 200, 50]);

        let rejoined: Vec<PairId> = batches.concat();
        assert_eq!(rejoined, ids);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let ids: Vec<PairId> = (0..400).map(PairId::new).collect();
        assert_eq!(partition(&ids, size(200)).count(), 2);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert_eq!(partition(&[], size(200)).count(), 0);
    }

    #[test]
    fn batch_size_one_yields_singletons() {
        let ids = [PairId::new(3), PairId::new(1)];
        let batches: Vec<&[PairId]> = partition(&ids, size(1)).collect();
        assert_eq!(batches, vec![&[PairId::new(3)][..], &[PairId::new(1)][..]]);
    }
}
