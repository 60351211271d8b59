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

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrine_grpc::grpc::FILE_DESCRIPTOR_SET;
use vitrine_service::clock::{Clock, TokioClock};
use vitrine_service::grpc::handler::{ConformanceHandler, OperationsHandler};
use vitrine_service::operations::OperationStore;
use vitrine_service::retry::RetrySequencer;

mod options;
mod signal;

use options::Options;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = Options::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Process-wide simulation state, shared by both services
    let retries = Arc::new(RetrySequencer::default());
    let operations = Arc::new(OperationStore::default());
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let span_factory = tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO);

    info!(address = %options.bind_address, "Conformance server listening");

    tonic::transport::Server::builder()
        .layer(TraceLayer::new_for_grpc().make_span_with(span_factory))
        .add_service(ConformanceHandler::new(retries, operations.clone(), clock).into_server())
        .add_service(OperationsHandler::new(operations).into_server())
        .add_service(reflection_service)
        .serve_with_shutdown(options.bind_address, signal::shutdown())
        .await?;

    info!("Conformance server shut down");
    Ok(())
}
