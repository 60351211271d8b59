// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

// Unix-specific signal handling
#[cfg(unix)]
mod platform {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::info;

    pub async fn shutdown() {
        let signal = tokio::select! {
            () = await_signal(SignalKind::interrupt()) => "SIGINT",
            () = await_signal(SignalKind::terminate()) => "SIGTERM",
        };

        info!(%signal, "Received signal, starting shutdown.");
    }

    async fn await_signal(kind: SignalKind) {
        signal(kind)
            .expect("failed to register signal handler")
            .recv()
            .await;
    }
}

#[cfg(not(unix))]
mod platform {
    use tracing::info;

    pub async fn shutdown() {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C, starting shutdown.");
    }
}

pub use platform::shutdown;
