use super::demon::DemonId;
use super::intervals::IntervalStore;
use crate::basic_types::EmptyDomain;
use crate::containers::KeyedVec;
use crate::containers::RevBitSet;
use crate::peregrine_assert_simple;
use crate::state::TrailedInt;
use crate::state::TrailedValues;
use crate::variables::IntervalVar;
use crate::variables::SequenceVar;

/// The store of sequence variables.
///
/// A sequence orders a fixed set of intervals by growing a ranked-first
/// chain from the front and a ranked-last chain from the back. Both chains
/// and the ranked set are reversible; ranking an interval forces it to be
/// performed.
#[derive(Debug, Default)]
pub(crate) struct SequenceStore {
    sequences: KeyedVec<SequenceVar, SequenceData>,
    pending: Vec<SequenceVar>,
    is_pending: KeyedVec<SequenceVar, bool>,
}

#[derive(Debug)]
struct SequenceData {
    intervals: Vec<IntervalVar>,
    /// High-water storage for the ranked-first chain; the logical length is
    /// `count_first`.
    ranked_first: Vec<u32>,
    ranked_last: Vec<u32>,
    count_first: TrailedInt,
    count_last: TrailedInt,
    ranked: RevBitSet,
    demons: Vec<DemonId>,
}

impl SequenceStore {
    pub(crate) fn grow(
        &mut self,
        trailed: &mut TrailedValues,
        intervals: Vec<IntervalVar>,
    ) -> SequenceVar {
        let ranked = RevBitSet::new(trailed, intervals.len() as i64);
        self.is_pending.push(false);
        self.sequences.push(SequenceData {
            intervals,
            ranked_first: Vec::new(),
            ranked_last: Vec::new(),
            count_first: trailed.grow(0),
            count_last: trailed.grow(0),
            ranked,
            demons: Vec::new(),
        })
    }

    pub(crate) fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub(crate) fn intervals(&self, var: SequenceVar) -> &[IntervalVar] {
        &self.sequences[var].intervals
    }

    pub(crate) fn attach_demon(&mut self, var: SequenceVar, demon: DemonId) {
        let demons = &mut self.sequences[var].demons;
        if !demons.contains(&demon) {
            demons.push(demon);
        }
    }

    pub(crate) fn demons(&self, var: SequenceVar) -> &[DemonId] {
        &self.sequences[var].demons
    }

    pub(crate) fn drain_pending(&mut self, buffer: &mut Vec<SequenceVar>) {
        for &var in &self.pending {
            self.is_pending[var] = false;
        }
        buffer.append(&mut self.pending);
    }

    fn mark_pending(&mut self, var: SequenceVar) {
        if !self.is_pending[var] {
            self.is_pending[var] = true;
            self.pending.push(var);
        }
    }

    /// The interval indices ranked to run first, in rank order.
    pub(crate) fn ranked_first(&self, trailed: &TrailedValues, var: SequenceVar) -> Vec<u32> {
        let data = &self.sequences[var];
        let count = trailed.read(data.count_first) as usize;
        data.ranked_first[..count].to_vec()
    }

    /// The interval indices ranked to run last, in rank order from the back.
    pub(crate) fn ranked_last(&self, trailed: &TrailedValues, var: SequenceVar) -> Vec<u32> {
        let data = &self.sequences[var];
        let count = trailed.read(data.count_last) as usize;
        data.ranked_last[..count].to_vec()
    }

    pub(crate) fn is_ranked(&self, trailed: &TrailedValues, var: SequenceVar, index: u32) -> bool {
        self.sequences[var].ranked.contains(trailed, index as i64)
    }

    /// Indices neither ranked first nor last.
    pub(crate) fn unranked(&self, trailed: &TrailedValues, var: SequenceVar) -> Vec<u32> {
        let data = &self.sequences[var];
        (0..data.intervals.len() as u32)
            .filter(|&index| !data.ranked.contains(trailed, index as i64))
            .collect()
    }

    /// Rank the `index`-th interval as the next one to run. The interval
    /// must be performable.
    pub(crate) fn rank_first(
        &mut self,
        trailed: &mut TrailedValues,
        intervals: &mut IntervalStore,
        var: SequenceVar,
        index: u32,
    ) -> Result<(), EmptyDomain> {
        self.rank(trailed, intervals, var, index, true)
    }

    /// Rank the `index`-th interval as the next one to run from the back.
    pub(crate) fn rank_last(
        &mut self,
        trailed: &mut TrailedValues,
        intervals: &mut IntervalStore,
        var: SequenceVar,
        index: u32,
    ) -> Result<(), EmptyDomain> {
        self.rank(trailed, intervals, var, index, false)
    }

    fn rank(
        &mut self,
        trailed: &mut TrailedValues,
        intervals: &mut IntervalStore,
        var: SequenceVar,
        index: u32,
        first: bool,
    ) -> Result<(), EmptyDomain> {
        let data = &self.sequences[var];
        peregrine_assert_simple!((index as usize) < data.intervals.len());

        if data.ranked.contains(trailed, index as i64) {
            return Err(EmptyDomain);
        }
        let interval = data.intervals[index as usize];
        intervals.set_performed(trailed, interval, true)?;

        let data = &mut self.sequences[var];
        data.ranked.set(trailed, index as i64);

        let (chain, count) = if first {
            (&mut data.ranked_first, data.count_first)
        } else {
            (&mut data.ranked_last, data.count_last)
        };
        let position = trailed.read(count) as usize;
        if position < chain.len() {
            chain[position] = index;
        } else {
            chain.push(index);
        }
        trailed.add_assign(count, 1);

        self.mark_pending(var);
        Ok(())
    }
}
