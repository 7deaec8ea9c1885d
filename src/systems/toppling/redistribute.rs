use rand::Rng;

use super::*;
use crate::domain::cell::RESERVOIR;
use crate::domain::rules::Direction;
use crate::spatial::grid::Neighbours;

/// Chance per flocking move that a random neighbour gets a random direction.
const DIRECTION_NOISE: f64 = 0.01;

impl Toppling {
    /// Topple one cell into `neighbours` if it is at or above threshold.
    ///
    /// Returns whether the cell toppled. `rng` is the toppling stream;
    /// `coupled` is the dissipation field, required by `Rossum2011` only.
    pub fn topple_cell<R: Rng + ?Sized>(
        &mut self,
        idx: CellIndex,
        neighbours: &Neighbours,
        rng: &mut R,
        coupled: Option<&Grid>,
    ) -> Result<bool> {
        self.grid.check_index(idx)?;
        if idx == RESERVOIR {
            return Err(SandpileError::invariant("the reservoir never topples"));
        }
        if self.grid.slot(idx).height() < self.threshold {
            return Ok(false);
        }
        if neighbours.is_empty() {
            return Err(SandpileError::invariant(format!(
                "cell {idx} has no neighbours to topple into"
            )));
        }
        // neighbours resolved on another grid must not reach this one
        for &n in neighbours.iter() {
            self.grid.check_index(n)?;
        }

        let len = neighbours.len();
        match self.rule {
            TopplingRule::Undefined => {
                return Err(SandpileError::config("undefined toppling rule"));
            }
            TopplingRule::Rossum2011Diss => {
                self.flock(idx, neighbours, rng)?;
                // the field moves, it does not avalanche
                return Ok(false);
            }
            TopplingRule::MannaLin2010 => {
                let (decrease, portions) = self.shares(len, rng);
                self.grid.decrease(idx, decrease, &mut self.active)?;
                for &portion in &portions[..len] {
                    let target = neighbours[rng.gen_range(0..len)];
                    self.grid.increase(target, portion, &mut self.active)?;
                }
            }
            TopplingRule::BakTangWiesenfeld1987 => {
                let (decrease, portions) = self.shares(len, rng);
                self.grid.decrease(idx, decrease, &mut self.active)?;
                self.deliver(neighbours, &portions)?;
            }
            TopplingRule::LinEtal2006 => {
                let (decrease, portions) = self.shares(len, rng);
                self.grid.decrease(idx, decrease, &mut self.active)?;
                if self.dissipative_mode {
                    for (&target, &portion) in neighbours.iter().zip(&portions[..len]) {
                        if rng.gen::<f64>() < self.dissipation_rate {
                            continue;
                        }
                        self.grid.increase(target, portion, &mut self.active)?;
                    }
                } else {
                    self.deliver(neighbours, &portions)?;
                }
            }
            TopplingRule::Rossum2011 => {
                if self.dissipation_threshold <= 0.0 {
                    return Err(SandpileError::invariant(
                        "Rossum2011 needs a positive dissipation threshold",
                    ));
                }
                let field = coupled.ok_or(SandpileError::ResourceMissing("dissipation grid"))?;
                let absorbing = field.cell_at(idx)?.height() >= self.dissipation_threshold;
                let (decrease, portions) = self.shares(len, rng);
                self.grid.decrease(idx, decrease, &mut self.active)?;
                // dense field: grains vanish here
                if !absorbing {
                    self.deliver(neighbours, &portions)?;
                }
            }
        }

        Ok(true)
    }

    /// Move one grain along the cell's direction and hand the direction on.
    fn flock<R: Rng + ?Sized>(
        &mut self,
        idx: CellIndex,
        neighbours: &Neighbours,
        rng: &mut R,
    ) -> Result<()> {
        if neighbours.len() != Neighbours::CAPACITY {
            return Err(SandpileError::invariant(format!(
                "direction-biased toppling needs 4 neighbours, cell {idx} has {}",
                neighbours.len()
            )));
        }
        if self.grid.slot(idx).height() <= 0.0 {
            return Ok(());
        }

        let dir = self.grid.slot(idx).direction();
        let target = neighbours[dir.index()];
        self.grid.transfer(idx, target, 1.0)?;
        self.grid.slot_mut(target).set_direction(dir);

        if rng.gen::<f64>() < DIRECTION_NOISE {
            let victim = neighbours[rng.gen_range(0..Neighbours::CAPACITY)];
            let turn = Direction::from_index(rng.gen_range(0..4));
            self.grid.slot_mut(victim).set_direction(turn);
        }
        Ok(())
    }

    /// Grains leaving the cell, and per-neighbour shares summing to them.
    fn shares<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> (Grain, [Grain; 4]) {
        let decrease = if self.dissipation_amount > 0.0 {
            self.dissipation_amount
        } else {
            len as Grain
        };
        let mut portions = [0.0; Neighbours::CAPACITY];
        let equal = decrease / len as Grain;
        if self.equal_split {
            portions[..len].iter_mut().for_each(|p| *p = equal);
            return (decrease, portions);
        }

        let mut sum = 0.0;
        for p in portions[..len].iter_mut() {
            *p = rng.gen::<f64>();
            sum += *p;
        }
        if sum > 0.0 {
            let scale = decrease / sum;
            portions[..len].iter_mut().for_each(|p| *p *= scale);
        } else {
            portions[..len].iter_mut().for_each(|p| *p = equal);
        }
        (decrease, portions)
    }

    #[inline]
    fn deliver(&mut self, neighbours: &Neighbours, portions: &[Grain; 4]) -> Result<()> {
        for (&target, &portion) in neighbours.iter().zip(portions.iter()) {
            self.grid.increase(target, portion, &mut self.active)?;
        }
        Ok(())
    }
}
