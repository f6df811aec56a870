//! Automatic fan-out/join over the available parallelism.
//!
//! A [`Scheduler`] carries the degree of parallelism `P`. It is read once
//! when the scheduler is built (by default from rayon's pool size, which
//! honors `RAYON_NUM_THREADS`) and never re-sampled while a call is in
//! flight, so a single call always works with one consistent value.
//!
//! With `P == 1` the processor runs directly on the whole region. Otherwise
//! the region is partitioned into `P` pieces, `P - 1` of them are
//! dispatched as rayon tasks, the last one runs on the calling thread, and
//! the call returns only after all of them finished. Worker panics are
//! re-raised in the caller once every task is done.

use std::sync::{Mutex, PoisonError};

use log::debug;

use crate::geometry::{Point, Region};

use super::dispatch::Dispatcher;
use super::partition::{partition_arbitrary, partition_bubbles, partition_stripes, Lattice};
use super::processor::{all_points, RegionProcessor};

/// Parallel executor for region processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    parallelism: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::from_pool()
    }
}

impl Scheduler {
    /// Create a scheduler with a fixed degree of parallelism (at least 1).
    pub fn new(parallelism: usize) -> Self {
        Scheduler {
            parallelism: parallelism.max(1),
        }
    }

    /// A scheduler that never spawns tasks.
    pub fn sequential() -> Self {
        Scheduler::new(1)
    }

    /// A scheduler sized to the current rayon pool.
    pub fn from_pool() -> Self {
        Scheduler::new(rayon::current_num_threads())
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn partitions(&self) -> i32 {
        self.parallelism.min(i32::MAX as usize) as i32
    }

    // ========================================================================
    // Rectangle strategy
    // ========================================================================

    /// Run `rp` over `region`, split into `P` rectangles along the longer side.
    ///
    /// Pieces use the rounded-up size `ceil(len / P)`, so the last piece is
    /// the short one.
    pub fn run<P>(&self, region: Region, rp: &P)
    where
        P: RegionProcessor + ?Sized,
    {
        if self.parallelism == 1 {
            rp.process(region);
            return;
        }
        let parts: Vec<Region> = partition_arbitrary(region, self.partitions()).collect();
        debug!("running {} over {} rectangles", region, parts.len());
        fan_out(&parts, rp);
    }

    // ========================================================================
    // Stripe strategy
    // ========================================================================

    /// Run `rp` over `region`, split into exactly `P` stripes along the
    /// longer side.
    ///
    /// Stripes use the floor size `len / P` and the division remainder is
    /// folded into the final stripe, which runs on the calling thread.
    pub fn run_stripes<P>(&self, region: Region, rp: &P)
    where
        P: RegionProcessor + ?Sized,
    {
        if self.parallelism == 1 {
            rp.process(region);
            return;
        }
        let parts = partition_stripes(region, self.partitions());
        debug!("running {} over {} stripes", region, parts.len());
        fan_out(&parts, rp);
    }

    /// Call `f(x, y)` for every point of `region` using the stripe strategy.
    pub fn stripe<F>(&self, region: Region, f: F)
    where
        F: Fn(i32, i32) + Sync,
    {
        self.run_stripes(region, &all_points(|pt: Point| f(pt.x, pt.y)));
    }

    // ========================================================================
    // Bubble strategy
    // ========================================================================

    /// Call `pp` for every point of `region`, one task per lattice of a
    /// `(bw, bh)` bubble partition.
    ///
    /// Neighbouring points land in different tasks, so partial progress is
    /// spread evenly over the region instead of filling it block by block.
    /// Non-positive strides are a no-op.
    pub fn bubble<F>(&self, region: Region, bw: i32, bh: i32, pp: F)
    where
        F: Fn(Point) + Sync,
    {
        let lattices: Vec<Lattice> = partition_bubbles(region, bw, bh).collect();
        let visit = |lattice: &Lattice| lattice.points().for_each(&pp);

        if self.parallelism == 1 || lattices.len() < 2 {
            lattices.iter().for_each(visit);
            return;
        }

        debug!("running {} over {} lattices", region, lattices.len());
        rayon::scope(|s| {
            if let Some((last, rest)) = lattices.split_last() {
                for lattice in rest {
                    s.spawn(move |_| visit(lattice));
                }
                visit(last);
            }
        });
    }

    // ========================================================================
    // Fallible processors
    // ========================================================================

    /// Run a fallible processor with the rectangle strategy.
    ///
    /// Every partition runs to completion. Failures are collected on join
    /// and the error of the earliest failing partition (in partition order)
    /// is returned.
    pub fn try_run<E, F>(&self, region: Region, f: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(Region) -> Result<(), E> + Sync,
    {
        let failures: Mutex<Vec<(Region, E)>> = Mutex::new(Vec::new());
        let rp = |part: Region| {
            if let Err(e) = f(part) {
                failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((part, e));
            }
        };
        self.run(region, &rp);

        let failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if failures.len() > 1 {
            debug!("{} partitions of {} failed", failures.len(), region);
        }
        match failures.into_iter().min_by_key(|(part, _)| (part.min.y, part.min.x)) {
            Some((_, e)) => Err(e),
            None => Ok(()),
        }
    }
}

/// Dispatch all but the last piece, run the last one here, then join.
fn fan_out<P>(parts: &[Region], rp: &P)
where
    P: RegionProcessor + ?Sized,
{
    let Some((last, rest)) = parts.split_last() else {
        return;
    };
    if rest.is_empty() {
        rp.process(*last);
        return;
    }

    rayon::scope(|s| {
        let dispatcher = Dispatcher::new(s);
        for part in rest {
            dispatcher.dispatch(rp, *part);
        }
        rp.process(*last);
    });
}

/// Run `rp` over `region` with the default scheduler and wait for it.
///
/// This is the main entry point: the processor is only required to write
/// inside the region it is handed, and the result is identical to calling
/// it once over the whole region.
pub fn run_parallel<P>(region: Region, rp: &P)
where
    P: RegionProcessor + ?Sized,
{
    Scheduler::from_pool().run(region, rp);
}

/// Wrap `rp` so that each invocation is spread over the default scheduler.
///
/// The parallelism is sampled once, when the wrapper is created.
pub fn quick<P: RegionProcessor>(rp: P) -> impl RegionProcessor {
    let scheduler = Scheduler::from_pool();
    move |region: Region| scheduler.run(region, &rp)
}
