// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use parking_lot::Mutex;
use tonic::Code;
use ulid::Ulid;

use vitrine_grpc::grpc::{operation, start_operation_request, ErrorStatus, Operation};

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("operation '{0}' was not found")]
    NotFound(String),
}

/// Bookkeeping store for simulated long-running operations.
///
/// An operation record is rendered eagerly from the outcome the caller asked
/// for; no background worker ever advances state. Once a record is done it
/// is immutable, and records are only removed by an explicit delete. The
/// store is unbounded for the process lifetime, which is acceptable for a
/// test double.
#[derive(Debug, Default)]
pub struct OperationStore {
    operations: Mutex<HashMap<String, Operation>>,
}

impl OperationStore {
    /// Registers a new operation with the requested terminal state, or a
    /// pending one when no outcome was requested.
    pub fn register(&self, outcome: Option<start_operation_request::Outcome>) -> Operation {
        let name = format!("operations/{}", Ulid::new());
        let (done, result) = match outcome {
            Some(start_operation_request::Outcome::Success(payload)) => {
                (true, Some(operation::Result::Response(payload)))
            }
            Some(start_operation_request::Outcome::Error(error)) => {
                (true, Some(operation::Result::Error(error)))
            }
            None => (false, None),
        };
        let operation = Operation { name, done, result };
        self.operations
            .lock()
            .insert(operation.name.clone(), operation.clone());
        operation
    }

    pub fn get(&self, name: &str) -> Result<Operation, OperationError> {
        self.operations
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| OperationError::NotFound(name.to_owned()))
    }

    /// Snapshot of all records, sorted by name so listings are
    /// deterministic.
    pub fn list(&self) -> Vec<Operation> {
        let mut operations: Vec<_> = self.operations.lock().values().cloned().collect();
        operations.sort_by(|a, b| a.name.cmp(&b.name));
        operations
    }

    /// Marks a pending record as done with a cancelled error. Cancelling an
    /// already-done record is a no-op; the terminal result is never
    /// overwritten.
    pub fn cancel(&self, name: &str) -> Result<Operation, OperationError> {
        let mut operations = self.operations.lock();
        let Some(operation) = operations.get_mut(name) else {
            return Err(OperationError::NotFound(name.to_owned()));
        };
        if !operation.done {
            operation.done = true;
            operation.result = Some(operation::Result::Error(ErrorStatus {
                code: Code::Cancelled as i32,
                message: "the operation was cancelled".to_owned(),
                details: vec![],
            }));
        }
        Ok(operation.clone())
    }

    pub fn delete(&self, name: &str) -> Result<(), OperationError> {
        self.operations
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| OperationError::NotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vitrine_grpc::grpc::OperationResult;

    fn success_outcome(content: &str) -> Option<start_operation_request::Outcome> {
        Some(start_operation_request::Outcome::Success(OperationResult {
            content: content.to_owned(),
        }))
    }

    #[test]
    fn done_records_carry_the_requested_result() {
        let store = OperationStore::default();

        let operation = store.register(success_outcome("payload"));
        assert!(operation.done);
        assert_eq!(
            operation.result,
            Some(operation::Result::Response(OperationResult {
                content: "payload".to_owned()
            }))
        );
        assert_eq!(store.get(&operation.name).unwrap(), operation);

        let failed = store.register(Some(start_operation_request::Outcome::Error(ErrorStatus {
            code: Code::DataLoss as i32,
            message: "gone".to_owned(),
            details: vec![],
        })));
        assert!(failed.done);
        assert!(matches!(failed.result, Some(operation::Result::Error(_))));
    }

    #[test]
    fn unknown_names_are_reported() {
        let store = OperationStore::default();
        assert!(matches!(
            store.get("operations/unknown"),
            Err(OperationError::NotFound(_))
        ));
        assert!(matches!(
            store.cancel("operations/unknown"),
            Err(OperationError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("operations/unknown"),
            Err(OperationError::NotFound(_))
        ));
    }

    #[test]
    fn cancel_finishes_pending_records_once() {
        let store = OperationStore::default();
        let pending = store.register(None);
        assert!(!pending.done);

        let cancelled = store.cancel(&pending.name).unwrap();
        assert!(cancelled.done);
        assert!(matches!(
            cancelled.result,
            Some(operation::Result::Error(ref error)) if error.code == Code::Cancelled as i32
        ));

        // idempotent, and it never touches a terminal result
        let done = store.register(success_outcome("kept"));
        let after_cancel = store.cancel(&done.name).unwrap();
        assert_eq!(after_cancel, done);
    }

    #[test]
    fn delete_removes_the_record() {
        let store = OperationStore::default();
        let operation = store.register(None);
        store.delete(&operation.name).unwrap();
        assert!(matches!(
            store.get(&operation.name),
            Err(OperationError::NotFound(_))
        ));
    }

    #[test]
    fn list_enumerates_every_record() {
        let store = OperationStore::default();
        let first = store.register(None);
        let second = store.register(success_outcome("x"));
        let mut names: Vec<_> = store.list().into_iter().map(|op| op.name).collect();
        names.sort();
        let mut expected = vec![first.name, second.name];
        expected.sort();
        assert_eq!(names, expected);
    }
}
