// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::SocketAddr;

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Options {
    /// Address to bind the gRPC endpoint to.
    #[arg(
        long = "bind-address",
        env = "VITRINE_BIND_ADDRESS",
        default_value = "0.0.0.0:7469"
    )]
    pub bind_address: SocketAddr,
}
