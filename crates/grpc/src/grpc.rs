// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

tonic::include_proto!("vitrine.conformance");

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("conformance_svc");

pub mod pb_conversions {
    use tonic::{Code, Status};

    use super::{echo_request, EchoRequest, ErrorStatus};

    /// Turns a caller-supplied error descriptor into the failure it asks the
    /// server to simulate. A missing descriptor, or one carrying the OK
    /// sentinel code, means "no error".
    pub fn injected_status(error: Option<&ErrorStatus>) -> Option<Status> {
        let error = error?;
        if error.code == Code::Ok as i32 {
            return None;
        }
        Some(Status::new(Code::from(error.code), error.message.clone()))
    }

    impl From<&ErrorStatus> for Status {
        fn from(error: &ErrorStatus) -> Self {
            Status::new(Code::from(error.code), error.message.clone())
        }
    }

    impl EchoRequest {
        /// Splits the request into the content to echo and the failure to
        /// inject instead, if any.
        pub fn into_parts(self) -> (String, Option<Status>) {
            match self.response {
                Some(echo_request::Response::Content(content)) => (content, None),
                Some(echo_request::Response::Error(error)) => {
                    (String::new(), injected_status(Some(&error)))
                }
                None => (String::new(), None),
            }
        }
    }
}
