use regex::Regex;

// Recoverable failure signatures. These are deliberate, minimal
// classifiers over raw tool output: both needles of a signature must be
// present for it to match, anything else stays unrecoverable.

/// First half of the state-lock signature.
pub const LOCK_ERROR_NEEDLE: &str = "Error acquiring the state lock";
/// Second half of the state-lock signature, reported by the lock table's
/// conditional write.
pub const LOCK_CONDITION_NEEDLE: &str = "ConditionalCheckFailedException";

/// First half of the pre-existing-table signature.
pub const TABLE_IN_USE_NEEDLE: &str = "ResourceInUseException";
/// Second half of the pre-existing-table signature.
pub const TABLE_EXISTS_NEEDLE: &str = "Table already exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverableFailure {
    /// Another run holds the remote state lock. Recovery: force-unlock the
    /// embedded lock id, then retry once.
    StateLockConflict { lock_id: String },
    /// The fixed-name demo table survives from an earlier deployment.
    /// Recovery: import it at its expected address, then retry once.
    KvTableExists,
}

/// Classifies combined terraform output into one of the recoverable
/// failure classes, if any. The lock conflict additionally requires an
/// embedded lock identifier; without one there is nothing to unlock.
pub fn classify_failure(output: &str) -> Option<RecoverableFailure> {
    if output.contains(LOCK_ERROR_NEEDLE) && output.contains(LOCK_CONDITION_NEEDLE) {
        if let Some(lock_id) = extract_lock_id(output) {
            return Some(RecoverableFailure::StateLockConflict { lock_id });
        }
    }

    if output.contains(TABLE_IN_USE_NEEDLE) && output.contains(TABLE_EXISTS_NEEDLE) {
        return Some(RecoverableFailure::KvTableExists);
    }

    None
}

fn extract_lock_id(output: &str) -> Option<String> {
    let re = Regex::new(r"ID:\s+([0-9a-fA-F-]+)").ok()?;
    re.captures(output).map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOCK_OUTPUT: &str = r#"
Error: Error acquiring the state lock

Error message: operation error DynamoDB: PutItem,
ConditionalCheckFailedException: The conditional request failed
Lock Info:
  ID:        5e3f6a5f-1c2d-4e3f-8a9b-0c1d2e3f4a5b
  Path:      tfstate-bucket/demo/terraform.tfstate
  Operation: OperationTypePlan
"#;

    #[test]
    fn test_lock_conflict_is_classified_with_lock_id() {
        let classified = classify_failure(LOCK_OUTPUT);
        assert_eq!(
            classified,
            Some(RecoverableFailure::StateLockConflict {
                lock_id: "5e3f6a5f-1c2d-4e3f-8a9b-0c1d2e3f4a5b".to_string()
            })
        );
    }

    #[test]
    fn test_lock_needles_must_co_occur() {
        let only_acquire = "Error: Error acquiring the state lock\n  ID: 1234";
        assert_eq!(classify_failure(only_acquire), None);

        let only_condition = "ConditionalCheckFailedException: The conditional request failed";
        assert_eq!(classify_failure(only_condition), None);
    }

    #[test]
    fn test_lock_conflict_without_id_is_not_recoverable() {
        let output = "Error acquiring the state lock\nConditionalCheckFailedException";
        assert_eq!(classify_failure(output), None);
    }

    #[test]
    fn test_existing_table_is_classified() {
        let output = r#"
Error: creating DynamoDB Table (autodeploy-demo-kv): operation error
DynamoDB: CreateTable, ResourceInUseException: Table already exists:
autodeploy-demo-kv
"#;
        assert_eq!(classify_failure(output), Some(RecoverableFailure::KvTableExists));
    }

    #[test]
    fn test_table_needles_must_co_occur() {
        let output = "ResourceInUseException: something else entirely";
        assert_eq!(classify_failure(output), None);
    }

    #[test]
    fn test_unrelated_failure_is_not_recoverable() {
        let output = "Error: Invalid provider configuration";
        assert_eq!(classify_failure(output), None);
    }
}
