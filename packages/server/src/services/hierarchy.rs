use std::collections::HashSet;
use std::future::Future;

use crate::error::AppError;

/// Check that `parent_id` may become the parent of node `node_id` (`None` for a
/// node that does not exist yet).
///
/// `parent_of(id)` returns `Ok(None)` when node `id` does not exist and
/// `Ok(Some(parent))` otherwise. The walk stops at a root, on a revisit of an
/// already broken chain, or when it reaches `node_id`.
pub async fn ensure_valid_parent<F, Fut, E>(
    kind: &str,
    node_id: Option<i32>,
    parent_id: i32,
    mut parent_of: F,
) -> Result<(), AppError>
where
    F: FnMut(i32) -> Fut,
    Fut: Future<Output = Result<Option<Option<i32>>, E>>,
    AppError: From<E>,
{
    if node_id == Some(parent_id) {
        return Err(AppError::Validation(format!("A {kind} cannot be its own parent")));
    }

    let mut current = parent_of(parent_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Parent {kind} not found")))?;

    let Some(node_id) = node_id else {
        return Ok(());
    };

    let mut seen = HashSet::from([parent_id]);
    while let Some(ancestor) = current {
        if ancestor == node_id {
            return Err(AppError::Validation(format!(
                "Parent would create a cycle in the {kind} hierarchy"
            )));
        }
        if !seen.insert(ancestor) {
            break;
        }
        current = parent_of(ancestor).await?.flatten();
    }
    Ok(())
}
