//! Ordinal ("quest 2") to task id resolution.

use qm_protocol::{TaskId, TaskSnapshot};

/// Map a 1-based display position to the id of the task shown there.
///
/// Returns `None` for 0 or anything past the end of the snapshot.
pub fn resolve_position(ordinal: u64, snapshot: &TaskSnapshot) -> Option<TaskId> {
    let index = usize::try_from(ordinal.checked_sub(1)?).ok()?;
    snapshot.get(index).map(|task| task.id)
}
