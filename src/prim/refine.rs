//! Fixed-point refinement driver.
//!
//! Each pass refines the whole frontier. Primitives that decline to refine
//! are terminal and move to the output; everything they produce becomes the
//! next frontier. Refinement strictly lowers [`Complexity`](super::Complexity),
//! so the loop reaches a fixed point; the depth and primitive budgets bound
//! it regardless.

use std::sync::mpsc::channel;
use std::sync::Arc;

use rayon::prelude::*;

use super::{ChannelRefiner, CollectRefiner, PrimitiveHandle};
use crate::parms::{RefineParms, ViewportLod};

/// Outcome of [`refine_to_fixed_point`].
#[derive(Debug, Default)]
pub struct RefineResult {
    /// Terminal primitives. Order is unspecified when passes ran in parallel.
    pub primitives: Vec<PrimitiveHandle>,
    /// Passes run.
    pub passes: usize,
    /// A budget ran out before every primitive became terminal.
    pub truncated: bool,
}

/// Terminal and produced primitives of one pass.
struct Pass {
    done: Vec<PrimitiveHandle>,
    next: Vec<PrimitiveHandle>,
}

fn serial_pass(frontier: &[PrimitiveHandle], parms: &RefineParms) -> Pass {
    let mut done = Vec::new();
    let mut refiner = CollectRefiner::new(parms.allow_threading());
    for prim in frontier {
        if !prim.refine(&mut refiner, parms) {
            done.push(Arc::clone(prim));
        }
    }
    Pass {
        done,
        next: refiner.into_primitives(),
    }
}

fn parallel_pass(frontier: &[PrimitiveHandle], parms: &RefineParms) -> Pass {
    let (next_tx, next_rx) = channel();
    let (done_tx, done_rx) = channel();
    frontier.par_iter().for_each_with(
        (ChannelRefiner::new(next_tx), done_tx),
        |(refiner, done), prim| {
            if !prim.refine(refiner, parms) && done.send(Arc::clone(prim)).is_err() {
                tracing::debug!("refine receiver dropped, terminal primitive discarded");
            }
        },
    );
    // every sender clone is gone once for_each_with returns
    Pass {
        done: done_rx.try_iter().collect(),
        next: next_rx.try_iter().collect(),
    }
}

/// Refine `roots` until every primitive is terminal or a budget runs out.
///
/// On truncation the unrefined frontier is returned as is, capped so the
/// output never exceeds `max_primitives`.
pub fn refine_to_fixed_point(roots: Vec<PrimitiveHandle>, parms: &RefineParms) -> RefineResult {
    let mut result = RefineResult::default();
    if parms.viewport_lod() == ViewportLod::Hidden {
        tracing::debug!("viewport lod hidden, nothing to refine");
        return result;
    }

    let max_depth = parms.max_depth();
    let max_primitives = parms.max_primitives();
    let threading = parms.allow_threading();
    let mut frontier = roots;

    while !frontier.is_empty() {
        if result.passes >= max_depth {
            tracing::debug!(
                "refine depth budget {} exhausted with {} primitives pending",
                max_depth,
                frontier.len()
            );
            result.truncated = true;
            break;
        }
        result.passes += 1;

        let pass = if threading && frontier.len() > 1 {
            parallel_pass(&frontier, parms)
        } else {
            serial_pass(&frontier, parms)
        };
        tracing::trace!(
            pass = result.passes,
            frontier = frontier.len(),
            terminal = pass.done.len(),
            produced = pass.next.len(),
            "refine pass"
        );
        result.primitives.extend(pass.done);
        frontier = pass.next;

        if result.primitives.len() + frontier.len() > max_primitives {
            tracing::debug!("refine primitive budget {} exceeded", max_primitives);
            result.truncated = true;
            break;
        }
    }

    if result.truncated {
        let room = max_primitives.saturating_sub(result.primitives.len());
        frontier.truncate(room);
        result.primitives.extend(frontier);
        result.primitives.truncate(max_primitives);
    }
    tracing::debug!(
        "refined to {} primitives in {} passes{}",
        result.primitives.len(),
        result.passes,
        if result.truncated { " (truncated)" } else { "" }
    );
    result
}

/// Refine a single root.
pub fn refine_primitive(root: PrimitiveHandle, parms: &RefineParms) -> RefineResult {
    refine_to_fixed_point(vec![root], parms)
}
