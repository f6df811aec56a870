//! Concurrent dispatch of region processors.
//!
//! A [`Dispatcher`] launches each invocation as an independent rayon task
//! and returns immediately. The enclosing [`rayon::scope`] is the join
//! barrier: once it returns every dispatched invocation has finished and
//! its writes are visible to the joining thread. A panic inside a task is
//! re-raised by the scope after all tasks finished, so a failing worker can
//! never leave the barrier waiting.
//!
//! The dispatcher does no partitioning of its own; see
//! [`super::Scheduler`] for the combination of both.

use log::trace;
use rayon::Scope;

use crate::geometry::Region;

use super::processor::RegionProcessor;

/// Spawns region processors onto a rayon scope.
#[derive(Clone, Copy)]
pub struct Dispatcher<'a, 'scope> {
    scope: &'a Scope<'scope>,
}

impl<'a, 'scope> Dispatcher<'a, 'scope> {
    pub fn new(scope: &'a Scope<'scope>) -> Self {
        Dispatcher { scope }
    }

    /// Run `rp` over `region` as a separate task. Fire-and-forget: the
    /// scope joins it.
    pub fn dispatch<P>(&self, rp: &'scope P, region: Region)
    where
        P: RegionProcessor + ?Sized,
    {
        trace!("dispatching {}", region);
        self.scope.spawn(move |_| rp.process(region));
    }

    /// Wrap `rp` so that every invocation is dispatched as its own task.
    pub fn wrap<P>(&self, rp: &'scope P) -> Concurrent<'a, 'scope, P>
    where
        P: RegionProcessor + ?Sized,
    {
        Concurrent {
            dispatcher: *self,
            rp,
        }
    }
}

/// A region processor that runs its inner processor asynchronously.
///
/// Composes with the partition combinators, e.g.
/// `n_rectangles(4, dispatcher.wrap(&rp))` runs four stripes concurrently.
pub struct Concurrent<'a, 'scope, P: ?Sized> {
    dispatcher: Dispatcher<'a, 'scope>,
    rp: &'scope P,
}

impl<P> RegionProcessor for Concurrent<'_, '_, P>
where
    P: RegionProcessor + ?Sized,
{
    fn process(&self, region: Region) {
        self.dispatcher.dispatch(self.rp, region);
    }
}
