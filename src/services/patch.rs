use json_patch::{patch, Patch, PatchOperation};

use crate::entities::Entity;

use super::ServiceError;

/// Applies an RFC 6902 patch to an entity and reads the result back as the
/// entity type, so a patch cannot leave a record the type would reject.
pub fn apply_patch<T: Entity>(existing: &T, operations: &Patch) -> Result<T, ServiceError> {
    validate_operations(&operations.0)?;

    let mut document = serde_json::to_value(existing).map_err(|e| {
        ServiceError::InvalidArgument(format!("{} could not be serialized: {}", T::schema().name, e))
    })?;

    patch(&mut document, &operations.0)
        .map_err(|e| ServiceError::InvalidArgument(format!("Patch operation failed: {}", e)))?;

    let patched: T = serde_json::from_value(document).map_err(|e| {
        ServiceError::InvalidArgument(format!("Patched {} is invalid: {}", T::schema().name, e))
    })?;

    // Whole-document operations at "" bypass the path check
    if patched.id() != existing.id() {
        return Err(id_modified());
    }
    Ok(patched)
}

fn id_modified() -> ServiceError {
    ServiceError::InvalidArgument("Cannot modify id with patch".to_string())
}

/// The primary key is immutable through patches
fn validate_operations(operations: &[PatchOperation]) -> Result<(), ServiceError> {
    for op in operations {
        let mut paths = vec![operation_path(op)];
        if let PatchOperation::Move(move_op) = op {
            paths.push(move_op.from.as_str());
        }
        if paths.iter().any(|p| *p == "/id" || p.starts_with("/id/")) {
            return Err(id_modified());
        }
    }
    Ok(())
}

fn operation_path(op: &PatchOperation) -> &str {
    match op {
        PatchOperation::Add(add_op) => add_op.path.as_str(),
        PatchOperation::Remove(remove_op) => remove_op.path.as_str(),
        PatchOperation::Replace(replace_op) => replace_op.path.as_str(),
        PatchOperation::Move(move_op) => move_op.path.as_str(),
        PatchOperation::Copy(copy_op) => copy_op.path.as_str(),
        PatchOperation::Test(test_op) => test_op.path.as_str(),
    }
}
