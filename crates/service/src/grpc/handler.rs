// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

use vitrine_grpc::grpc::conformance_svc_server::{ConformanceSvc, ConformanceSvcServer};
use vitrine_grpc::grpc::operations_svc_server::{OperationsSvc, OperationsSvcServer};
use vitrine_grpc::grpc::pb_conversions::injected_status;
use vitrine_grpc::grpc::{
    timeout_request, CancelOperationRequest, DeleteOperationRequest, EchoRequest, EchoResponse,
    ExpandRequest, FlatteningCheck, GetOperationRequest, ListOperationsRequest,
    ListOperationsResponse, Operation, PaginationRequest, PaginationResponse, ResourceNameCheck,
    RetryId, SetupRetryRequest, StartOperationRequest, TimeoutRequest, TimeoutResponse,
};

use crate::clock::Clock;
use crate::operations::{OperationError, OperationStore};
use crate::pagination::{paginate, PaginationError};
use crate::retry::{Attempt, RetryError, RetrySequencer};

/// Grpc handler for the conformance facade service.
///
/// Holds the process-wide simulation state; one instance is constructed at
/// startup and shared across all in-flight calls.
pub struct ConformanceHandler {
    retries: Arc<RetrySequencer>,
    operations: Arc<OperationStore>,
    clock: Arc<dyn Clock>,
}

impl ConformanceHandler {
    pub fn new(
        retries: Arc<RetrySequencer>,
        operations: Arc<OperationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            retries,
            operations,
            clock,
        }
    }

    pub fn into_server(self) -> ConformanceSvcServer<Self> {
        ConformanceSvcServer::new(self)
    }
}

#[async_trait]
impl ConformanceSvc for ConformanceHandler {
    async fn echo(&self, request: Request<EchoRequest>) -> Result<Response<EchoResponse>, Status> {
        let (content, error) = request.into_inner().into_parts();
        if let Some(status) = error {
            return Err(status);
        }
        Ok(Response::new(EchoResponse { content }))
    }

    type ExpandStream = BoxStream<'static, Result<EchoResponse, Status>>;

    async fn expand(
        &self,
        request: Request<ExpandRequest>,
    ) -> Result<Response<Self::ExpandStream>, Status> {
        let ExpandRequest { content, error } = request.into_inner();
        // an injected error terminates the stream only after every word was
        // sent; already-emitted messages are never rolled back
        let trailer = injected_status(error.as_ref());
        let words: Vec<String> = content.split_whitespace().map(str::to_owned).collect();

        let stream = try_stream! {
            for word in words {
                yield EchoResponse { content: word };
            }
            if let Some(status) = trailer {
                Err(status)?;
            }
        };

        Ok(Response::new(Box::pin(stream)))
    }

    async fn collect(
        &self,
        request: Request<Streaming<EchoRequest>>,
    ) -> Result<Response<EchoResponse>, Status> {
        let mut inbound = request.into_inner();
        let mut parts = Vec::new();
        while let Some(message) = inbound.message().await? {
            let (content, error) = message.into_parts();
            if let Some(status) = error {
                // abort right away; the partial accumulation is discarded
                return Err(status);
            }
            if !content.is_empty() {
                parts.push(content);
            }
        }
        Ok(Response::new(EchoResponse {
            content: parts.join(" "),
        }))
    }

    type ChatStream = BoxStream<'static, Result<EchoResponse, Status>>;

    async fn chat(
        &self,
        request: Request<Streaming<EchoRequest>>,
    ) -> Result<Response<Self::ChatStream>, Status> {
        let mut inbound = request.into_inner();

        let outbound = try_stream! {
            while let Some(message) = inbound.message().await? {
                let (content, error) = message.into_parts();
                if let Some(status) = error {
                    Err(status)?;
                }
                yield EchoResponse { content };
            }
        };

        Ok(Response::new(Box::pin(outbound)))
    }

    async fn timeout(
        &self,
        request: Request<TimeoutRequest>,
    ) -> Result<Response<TimeoutResponse>, Status> {
        let TimeoutRequest {
            response_delay,
            response,
        } = request.into_inner();

        let delay = response_delay
            .map(Duration::try_from)
            .transpose()
            .map_err(|_| Status::invalid_argument("the response delay must not be negative"))?
            .unwrap_or_default();
        self.clock.sleep(delay).await;

        match response {
            Some(timeout_request::Response::Error(error)) => {
                match injected_status(Some(&error)) {
                    Some(status) => Err(status),
                    None => Ok(Response::new(TimeoutResponse::default())),
                }
            }
            Some(timeout_request::Response::Success(success)) => Ok(Response::new(success)),
            None => Ok(Response::new(TimeoutResponse::default())),
        }
    }

    async fn setup_retry(
        &self,
        request: Request<SetupRetryRequest>,
    ) -> Result<Response<RetryId>, Status> {
        let id = self.retries.setup(request.into_inner().responses)?;
        debug!(%id, "Registered retry script");
        Ok(Response::new(RetryId { id }))
    }

    async fn retry(&self, request: Request<RetryId>) -> Result<Response<()>, Status> {
        let id = request.into_inner().id;
        match self.retries.pop_next_outcome(&id)? {
            Attempt::Succeeded => Ok(Response::new(())),
            // the popped outcome is surfaced verbatim, not reinterpreted
            Attempt::Failed(outcome) => Err(Status::from(&outcome)),
        }
    }

    async fn start_operation(
        &self,
        request: Request<StartOperationRequest>,
    ) -> Result<Response<Operation>, Status> {
        let operation = self.operations.register(request.into_inner().outcome);
        debug!(name = %operation.name, done = operation.done, "Registered operation");
        Ok(Response::new(operation))
    }

    async fn paginate(
        &self,
        request: Request<PaginationRequest>,
    ) -> Result<Response<PaginationResponse>, Status> {
        let PaginationRequest {
            page_size,
            page_size_override,
            page_token,
            max_response,
        } = request.into_inner();
        let page = paginate(page_size, page_size_override, &page_token, max_response)?;
        Ok(Response::new(PaginationResponse {
            responses: page.items,
            next_page_token: page.next_page_token,
        }))
    }

    async fn check_flattening(
        &self,
        request: Request<FlatteningCheck>,
    ) -> Result<Response<FlatteningCheck>, Status> {
        Ok(Response::new(request.into_inner()))
    }

    async fn check_resource_name(
        &self,
        request: Request<ResourceNameCheck>,
    ) -> Result<Response<ResourceNameCheck>, Status> {
        Ok(Response::new(request.into_inner()))
    }
}

/// Grpc handler for the operation-lifecycle service; shares the operation
/// table with the facade.
pub struct OperationsHandler {
    operations: Arc<OperationStore>,
}

impl OperationsHandler {
    pub fn new(operations: Arc<OperationStore>) -> Self {
        Self { operations }
    }

    pub fn into_server(self) -> OperationsSvcServer<Self> {
        OperationsSvcServer::new(self)
    }
}

#[async_trait]
impl OperationsSvc for OperationsHandler {
    async fn get_operation(
        &self,
        request: Request<GetOperationRequest>,
    ) -> Result<Response<Operation>, Status> {
        let operation = self.operations.get(&request.into_inner().name)?;
        Ok(Response::new(operation))
    }

    async fn list_operations(
        &self,
        _request: Request<ListOperationsRequest>,
    ) -> Result<Response<ListOperationsResponse>, Status> {
        Ok(Response::new(ListOperationsResponse {
            operations: self.operations.list(),
        }))
    }

    async fn cancel_operation(
        &self,
        request: Request<CancelOperationRequest>,
    ) -> Result<Response<()>, Status> {
        self.operations.cancel(&request.into_inner().name)?;
        Ok(Response::new(()))
    }

    async fn delete_operation(
        &self,
        request: Request<DeleteOperationRequest>,
    ) -> Result<Response<()>, Status> {
        self.operations.delete(&request.into_inner().name)?;
        Ok(Response::new(()))
    }
}

impl From<RetryError> for Status {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::MissingOutcomes | RetryError::MissingId => {
                Status::invalid_argument(err.to_string())
            }
            RetryError::NotFound(_) => Status::not_found(err.to_string()),
        }
    }
}

impl From<OperationError> for Status {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::NotFound(_) => Status::not_found(err.to_string()),
        }
    }
}

impl From<PaginationError> for Status {
    fn from(err: PaginationError) -> Self {
        Status::invalid_argument(err.to_string())
    }
}
