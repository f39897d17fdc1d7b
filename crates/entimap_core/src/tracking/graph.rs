//! Depth-first traversal of object graphs.
//!
//! Traversal is driven by the consumer. Each call to `next` visits objects
//! until it finds one whose entry is still [`EntityState::Unknown`], and
//! yields that entry. On the following call the traversal looks at the
//! entry again: only if the consumer moved it out of `Unknown` are its
//! navigations walked. Entries that are already tracked are skipped along
//! with everything reachable only through them, which is what makes cyclic
//! graphs terminate.
//!
//! ```text
//! visit(o):
//!     entry = state_manager.get_or_create_entry(o)
//!     if entry.state != Unknown: return
//!     yield entry
//!     if entry.state != Unknown:
//!         for navigation in entry.entity_type.navigations:
//!             for related in entry[navigation]:
//!                 visit(related)
//! ```

use crate::error::{CoreError, CoreResult};
use crate::tracking::{EntityEntry, EntityRef, EntityState, StateManager};
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

/// Produces the entries reachable from a root object.
#[derive(Debug, Clone, Copy)]
pub struct EntityEntryGraphIterator<'a> {
    manager: &'a StateManager,
}

impl<'a> EntityEntryGraphIterator<'a> {
    /// Creates an iterator over objects tracked by `manager`.
    #[must_use]
    pub fn new(manager: &'a StateManager) -> Self {
        Self { manager }
    }

    /// Starts a traversal at `root`.
    ///
    /// The returned sequence is lazy and runs against live tracking state:
    /// every visited object gets an entry as a side effect, and calling
    /// this again re-runs the walk, possibly with a different result.
    ///
    /// Fails with [`CoreError::InvalidArgument`] if the root's type is not
    /// part of the model. Unmapped objects found deeper in the graph are
    /// yielded as errors and the walk continues past them.
    pub fn traverse_graph(&self, root: &EntityRef) -> CoreResult<GraphTraversal<'a>> {
        let name = root.entity_type_name();
        if self.manager.model().find_entity_type(name).is_none() {
            return Err(CoreError::invalid_argument(format!(
                "cannot track root of type '{name}': it is not part of the model"
            )));
        }

        Ok(GraphTraversal {
            manager: self.manager,
            stack: vec![Frame::Visit(root.clone())],
            emitted: None,
        })
    }
}

enum Frame<'a> {
    /// An object still to be looked at.
    Visit(EntityRef),
    /// An entry whose navigations are being walked.
    Expand {
        entry: EntityEntry<'a>,
        next_navigation: usize,
        pending: VecDeque<EntityRef>,
    },
}

/// A running graph traversal. See [`EntityEntryGraphIterator::traverse_graph`].
pub struct GraphTraversal<'a> {
    manager: &'a StateManager,
    stack: Vec<Frame<'a>>,
    /// Entry yielded by the previous call, checked again on resume.
    emitted: Option<EntityEntry<'a>>,
}

impl<'a> Iterator for GraphTraversal<'a> {
    type Item = CoreResult<EntityEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.emitted.take() {
            if entry.state() != EntityState::Unknown {
                self.stack.push(Frame::Expand {
                    entry,
                    next_navigation: 0,
                    pending: VecDeque::new(),
                });
            }
        }

        loop {
            match self.stack.pop()? {
                Frame::Visit(entity) => {
                    let entry = match self.manager.get_or_create_entry(&entity) {
                        Ok(entry) => entry,
                        Err(err) => return Some(Err(err)),
                    };
                    if entry.state() != EntityState::Unknown {
                        trace!(entity_type = entry.entity_type().name(), "Skipping tracked entry");
                        continue;
                    }
                    self.emitted = Some(entry.clone());
                    return Some(Ok(entry));
                }
                Frame::Expand {
                    entry,
                    next_navigation,
                    mut pending,
                } => {
                    if let Some(related) = pending.pop_front() {
                        self.stack.push(Frame::Expand {
                            entry,
                            next_navigation,
                            pending,
                        });
                        self.stack.push(Frame::Visit(related));
                        continue;
                    }

                    let Some(navigation) = entry.entity_type().navigations().get(next_navigation)
                    else {
                        continue;
                    };
                    let related = entry.navigation_value(navigation).into_vec();
                    self.stack.push(Frame::Expand {
                        entry,
                        next_navigation: next_navigation + 1,
                        pending: related.into(),
                    });
                }
            }
        }
    }
}

impl fmt::Debug for GraphTraversal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphTraversal")
            .field("depth", &self.stack.len())
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}
