use rand::seq::SliceRandom;
use tracing::debug;

use super::*;
use crate::core::random::RngStreams;

/// Outcome of one `topple` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToppleReport {
    /// Individual toppling events: the avalanche size contribution.
    pub events: u64,
    /// Sweeps over the grid (or over the active set) until stable.
    pub passes: u64,
}

impl Toppling {
    /// Relax the grid to a fixed point.
    ///
    /// Random strategies repeat until a pass topples nothing; FollowActivity
    /// repeats until the active set is empty after a pass. There is no pass cap: a rule and
    /// boundary that never lose grains can keep this running forever.
    pub fn topple(&mut self, streams: &mut RngStreams, coupled: Option<&Grid>) -> Result<ToppleReport> {
        self.check_coupling(coupled)?;
        let mut report = ToppleReport::default();

        match self.strategy {
            IterationStrategy::RandomAll | IterationStrategy::RandomFraction => {
                let visits = match self.strategy {
                    IterationStrategy::RandomFraction => {
                        (self.grid.width() as usize).min(self.sweep_order.len())
                    }
                    _ => self.sweep_order.len(),
                };
                loop {
                    self.sweep_order.shuffle(&mut streams.grid);
                    let mut toppled = false;
                    for c in 0..visits {
                        let idx = *fast!(self.sweep_order, [c]);
                        if self.visit(idx, streams, coupled)? {
                            report.events += 1;
                            toppled = true;
                        }
                    }
                    report.passes += 1;
                    if !toppled {
                        break;
                    }
                }
            }
            IterationStrategy::FollowActivity => {
                let mut batch = std::mem::take(&mut self.batch);
                let result = self.follow_activity(&mut batch, streams, coupled, &mut report);
                self.batch = batch;
                result?;
            }
        }

        debug!(
            "toppled {} cells in {} passes ({})",
            report.events, report.passes, self.rule
        );
        Ok(report)
    }

    fn follow_activity(
        &mut self,
        batch: &mut Vec<CellIndex>,
        streams: &mut RngStreams,
        coupled: Option<&Grid>,
        report: &mut ToppleReport,
    ) -> Result<()> {
        // At least one pass, even with nothing active: the grain counter
        // records every call.
        loop {
            // Extract, shuffle, then clear: toppling refills the set as it goes.
            self.active.drain_into(batch);
            batch.shuffle(&mut streams.grid);

            if report.passes == 0 {
                self.record_grains();
            }
            for &idx in batch.iter() {
                if self.visit(idx, streams, coupled)? {
                    report.events += 1;
                }
            }
            self.record_grains();
            report.passes += 1;
            if self.active.is_empty() {
                break;
            }
        }
        Ok(())
    }

    /// Resolve neighbours and topple one cell. Cells below threshold are
    /// skipped before any neighbour draw.
    #[inline]
    fn visit(&mut self, idx: CellIndex, streams: &mut RngStreams, coupled: Option<&Grid>) -> Result<bool> {
        if self.grid.slot(idx).height() < self.threshold {
            return Ok(false);
        }
        let (i, j) = self.grid.coords(idx);
        let neighbours = self.grid.neighbours(i, j, &mut streams.neighbour)?;
        self.topple_cell(idx, &neighbours, &mut streams.toppling, coupled)
    }

    /// Fail before any cell moves when the coupled rule cannot run.
    fn check_coupling(&self, coupled: Option<&Grid>) -> Result<()> {
        if self.rule != TopplingRule::Rossum2011 {
            return Ok(());
        }
        if self.dissipation_threshold <= 0.0 {
            return Err(SandpileError::invariant(
                "Rossum2011 needs a positive dissipation threshold",
            ));
        }
        match coupled {
            Some(field) if field.size() == self.grid.size() => Ok(()),
            Some(field) => Err(SandpileError::invariant(format!(
                "dissipation grid has {} cells, sand grid {}",
                field.size(),
                self.grid.size()
            ))),
            None => Err(SandpileError::ResourceMissing("dissipation grid")),
        }
    }

    fn record_grains(&mut self) {
        if let Some(counter) = self.during_avalanches.as_mut() {
            counter.add_event(self.grid.count_grains() as i64);
        }
    }
}
