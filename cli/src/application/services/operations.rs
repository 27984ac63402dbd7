//! Completion of long-running provider operations.

use crate::application::ports::ComputeApi;
use crate::domain::CloudError;
use crate::domain::compute::Operation;

/// Wait for `operation` to reach `DONE` and surface its error payload.
///
/// The provider's wait endpoint may return before the operation finishes,
/// so it is re-issued until the status is `DONE`.
///
/// # Errors
///
/// Returns the transport/API error of a wait call, or
/// [`CloudError::Operation`] when the finished operation reports errors.
pub async fn complete_operation(
    client: &impl ComputeApi,
    project_id: &str,
    operation: Operation,
) -> Result<Operation, CloudError> {
    let mut operation = operation;
    while !operation.is_done() {
        tracing::debug!(operation = %operation.name, status = %operation.status, "waiting for operation");
        operation = client.wait_operation(project_id, &operation).await?;
    }
    operation.into_result()
}
