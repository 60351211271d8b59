// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tonic::Code;
use ulid::Ulid;

use vitrine_grpc::grpc::ErrorStatus;

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("a non-empty list of responses must be specified")]
    MissingOutcomes,
    #[error("a retry id must be specified")]
    MissingId,
    #[error("retry entry '{0}' was not found")]
    NotFound(String),
}

/// The result of consuming one scripted outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Succeeded,
    Failed(ErrorStatus),
}

/// Plays back caller-provided retry scripts.
///
/// Each entry is an ordered queue of outcomes keyed by an opaque id; every
/// `pop_next_outcome` call consumes exactly one. An entry lives in the table
/// for as long as it has unconsumed outcomes: consuming an OK outcome or
/// draining the queue removes it, and later calls report the id as unknown.
#[derive(Debug, Default)]
pub struct RetrySequencer {
    entries: Mutex<HashMap<String, VecDeque<ErrorStatus>>>,
}

impl RetrySequencer {
    /// Registers a new script and hands back the id to replay it with.
    pub fn setup(&self, outcomes: Vec<ErrorStatus>) -> Result<String, RetryError> {
        if outcomes.is_empty() {
            return Err(RetryError::MissingOutcomes);
        }
        let id = format!("retry/{}", Ulid::new());
        self.entries.lock().insert(id.clone(), outcomes.into());
        Ok(id)
    }

    /// Atomically consumes the next outcome for `id`.
    ///
    /// The check/pop/update-or-delete decision happens under the lock as one
    /// unit, so concurrent callers each observe exactly one script step.
    pub fn pop_next_outcome(&self, id: &str) -> Result<Attempt, RetryError> {
        if id.is_empty() {
            return Err(RetryError::MissingId);
        }
        let mut entries = self.entries.lock();
        let Some(queue) = entries.get_mut(id) else {
            return Err(RetryError::NotFound(id.to_owned()));
        };
        match queue.pop_front() {
            Some(outcome) if outcome.code == Code::Ok as i32 => {
                entries.remove(id);
                Ok(Attempt::Succeeded)
            }
            Some(outcome) => {
                if queue.is_empty() {
                    entries.remove(id);
                }
                Ok(Attempt::Failed(outcome))
            }
            None => {
                // entries are removed before they can drain; an empty
                // leftover counts as already consumed
                entries.remove(id);
                Err(RetryError::NotFound(id.to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: Code, message: &str) -> ErrorStatus {
        ErrorStatus {
            code: code as i32,
            message: message.to_owned(),
            details: vec![],
        }
    }

    fn success() -> ErrorStatus {
        failure(Code::Ok, "")
    }

    #[test]
    fn script_progresses_in_insertion_order() {
        let sequencer = RetrySequencer::default();
        let id = sequencer
            .setup(vec![
                failure(Code::Unavailable, "try again"),
                failure(Code::Unavailable, "still not there"),
                success(),
            ])
            .unwrap();

        assert_eq!(
            sequencer.pop_next_outcome(&id).unwrap(),
            Attempt::Failed(failure(Code::Unavailable, "try again"))
        );
        assert_eq!(
            sequencer.pop_next_outcome(&id).unwrap(),
            Attempt::Failed(failure(Code::Unavailable, "still not there"))
        );
        assert_eq!(sequencer.pop_next_outcome(&id).unwrap(), Attempt::Succeeded);
        // the OK consumed the entry
        assert!(matches!(
            sequencer.pop_next_outcome(&id),
            Err(RetryError::NotFound(_))
        ));
    }

    #[test]
    fn exhausted_script_without_ok_is_removed() {
        let sequencer = RetrySequencer::default();
        let id = sequencer.setup(vec![failure(Code::Internal, "boom")]).unwrap();

        assert_eq!(
            sequencer.pop_next_outcome(&id).unwrap(),
            Attempt::Failed(failure(Code::Internal, "boom"))
        );
        assert!(matches!(
            sequencer.pop_next_outcome(&id),
            Err(RetryError::NotFound(_))
        ));
    }

    #[test]
    fn empty_script_is_rejected() {
        let sequencer = RetrySequencer::default();
        assert!(matches!(
            sequencer.setup(vec![]),
            Err(RetryError::MissingOutcomes)
        ));
    }

    #[test]
    fn empty_and_unknown_ids_are_rejected() {
        let sequencer = RetrySequencer::default();
        assert!(matches!(
            sequencer.pop_next_outcome(""),
            Err(RetryError::MissingId)
        ));
        assert!(matches!(
            sequencer.pop_next_outcome("retry/unknown"),
            Err(RetryError::NotFound(_))
        ));
    }

    #[test]
    fn setups_get_distinct_ids() {
        let sequencer = RetrySequencer::default();
        let first = sequencer.setup(vec![success()]).unwrap();
        let second = sequencer.setup(vec![success()]).unwrap();
        assert_ne!(first, second);
    }
}
