// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The simulation engine behind the conformance test-double server.
//!
//! None of this performs real work: long-running operations are bookkeeping
//! entries, retries play back a caller-provided script, and the streaming
//! calls echo their inputs. The point is to expose every call shape and
//! failure mode a generated client library has to handle, deterministically.

pub mod clock;
pub mod grpc;
pub mod operations;
pub mod pagination;
pub mod retry;
