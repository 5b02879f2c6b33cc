use super::entity::Orderable;
use super::model::OrderUpdate;
use super::repository::Repository;
use crate::error::ContentError;
use crate::storage::Storage;

/// A drag-and-drop move resolved against the sequence on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan<E> {
    /// The new sequence, `display_order` already renumbered.
    pub items: Vec<E>,
    pub updates: Vec<OrderUpdate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReorderOutcome<E> {
    Unchanged,
    Applied(Vec<E>),
}

/// Assigns `0..N-1` following the order of `ids`.
pub fn renumber(ids: &[i64]) -> Vec<OrderUpdate> {
    ids.iter()
        .zip(0..)
        .map(|(&id, display_order)| OrderUpdate { id, display_order })
        .collect()
}

/// Moves `dragged` to where `target` sits once `dragged` has been taken out.
///
/// Returns `None` when the drop changes nothing: same id, unknown id, or a
/// collection too short to reorder.
pub fn plan_move<E: Orderable>(current: &[E], dragged: i64, target: i64) -> Option<MovePlan<E>> {
    if dragged == target || current.len() < 2 {
        return None;
    }
    let from = current.iter().position(|item| item.id() == dragged)?;
    if !current.iter().any(|item| item.id() == target) {
        return None;
    }

    let mut items = current.to_vec();
    let moved = items.remove(from);
    let to = items.iter().position(|item| item.id() == target)?;
    items.insert(to, moved);

    let ids: Vec<i64> = items.iter().map(|item| item.id()).collect();
    let updates = renumber(&ids);
    for (item, update) in items.iter_mut().zip(&updates) {
        item.set_display_order(update.display_order);
    }
    Some(MovePlan { items, updates })
}

/// Persists drag-and-drop moves for one orderable collection.
pub struct OrderingController<S, E> {
    repo: Repository<S, E>,
}

impl<S, E> OrderingController<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Orderable,
{
    pub fn new(repo: Repository<S, E>) -> Self {
        Self { repo }
    }

    /// Plans the move, writes the whole batch in one transaction and returns
    /// the refetched list. On error nothing was written and the caller keeps
    /// `current`.
    pub async fn drop_onto(
        &self,
        current: &[E],
        dragged: i64,
        target: i64,
    ) -> Result<ReorderOutcome<E>, ContentError> {
        let Some(plan) = plan_move(current, dragged, target) else {
            log::debug!("ignoring drop of {} {} onto {}", E::KIND, dragged, target);
            return Ok(ReorderOutcome::Unchanged);
        };

        self.repo.apply_order(plan.updates).await?;

        match self.repo.list().await {
            Ok(items) => Ok(ReorderOutcome::Applied(items)),
            Err(err) => {
                log::warn!("refetch after {} reorder failed: {}", E::KIND, err);
                Ok(ReorderOutcome::Applied(plan.items))
            }
        }
    }
}
