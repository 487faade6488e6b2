// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keepsake CLI entrypoint.
//!
//! Serves the visitor session HTTP surface at `http://127.0.0.1:<port>/` backed by the
//! in-process cache.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use keepsake::cache::MemoryCache;
use keepsake::config::PersistConfig;
use keepsake::http::{router, AppState};

const DEFAULT_HTTP_PORT: u16 = 27436;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file.toml>] [--port <port>]\n\n--config loads namespace, cookie and purge settings (defaults apply when omitted).\n--port selects the HTTP port (0 = ephemeral; default {DEFAULT_HTTP_PORT}).\n\nLog verbosity follows RUST_LOG (default `info`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<String>,
    port: Option<u16>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.config_path = Some(path);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "keepsake".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        let config = match &options.config_path {
            Some(path) => PersistConfig::load(path)?,
            None => PersistConfig::default(),
        };
        let cache = MemoryCache::new().with_namespace(config.namespace.clone());
        let state = AppState::new(Arc::new(config), Arc::new(cache));
        let port = options.port.unwrap_or(DEFAULT_HTTP_PORT);

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
            tracing::info!(addr = %listener.local_addr()?, "serving visitor sessions");

            axum::serve(listener, router(state))
                .with_graceful_shutdown(async {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %err, "cannot listen for ctrl-c");
                        std::future::pending::<()>().await;
                    }
                })
                .await?;

            tracing::info!("shut down");
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("keepsake: {err}");
        std::process::exit(1);
    }
}
