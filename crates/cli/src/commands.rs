//! Subcommand implementations.
//!
//! Each command builds a fresh worker over the configured cache database,
//! runs one event against it, and prints the outcome as JSON on stdout.
//! Worker lifecycle state is per-process; cached entries persist in SQLite
//! across invocations.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use http::{HeaderMap, Method, header};
use tokio::sync::oneshot;

use petrel_client::{FetchConfig, HttpFetcher};
use petrel_core::cache::key;
use petrel_core::{AppConfig, CacheDb, MemoryQueue, PendingSyncTask, Request};
use petrel_worker::{HostMessage, ServiceWorker};

use crate::cli::{InstallArgs, ResolveArgs, SyncArgs};

async fn build_worker(config: AppConfig) -> Result<(ServiceWorker, Arc<MemoryQueue>)> {
    let store = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig::from_app(&config))?;
    let queue = Arc::new(MemoryQueue::new());
    let worker = ServiceWorker::new(config, store, Arc::new(fetcher), queue.clone())?;
    Ok((worker, queue))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn install(config: AppConfig, args: InstallArgs) -> Result<()> {
    let (worker, _queue) = build_worker(config).await?;

    let report = worker.on_install().await?;
    print_json(&report)?;

    if args.skip_waiting {
        let activation = worker.skip_waiting().await?;
        print_json(&activation)?;
    }

    Ok(())
}

pub async fn activate(config: AppConfig) -> Result<()> {
    let (worker, _queue) = build_worker(config).await?;

    // Lifecycle state does not outlive the process, so activation always
    // starts by installing the current generation.
    worker.on_install().await?;
    let report = worker.on_activate().await?;
    print_json(&report)?;

    Ok(())
}

pub async fn resolve(config: AppConfig, args: ResolveArgs) -> Result<()> {
    let url = key::absolutize(&args.url, &config.origin_url()?)?;
    let (worker, _queue) = build_worker(config).await?;

    let mut request = Request::get(url);
    if let Some(accept) = &args.accept {
        request = request.with_header(header::ACCEPT, accept);
    }

    let response = worker.on_fetch(request).await?;
    tracing::info!("resolved with status {}", response.status.as_u16());
    std::io::stdout().write_all(&response.body)?;

    Ok(())
}

pub async fn sync(config: AppConfig, args: SyncArgs) -> Result<()> {
    let origin = config.origin_url()?;
    let (worker, queue) = build_worker(config).await?;

    for (index, task) in args.task.iter().enumerate() {
        queue
            .push(PendingSyncTask {
                id: format!("cli-{index}"),
                method: Method::POST,
                url: key::absolutize(task, &origin)?,
                headers: HeaderMap::new(),
                body: None,
            })
            .await;
    }

    let report = worker.on_sync(&args.tag).await?;
    print_json(&report)?;

    Ok(())
}

pub async fn version(config: AppConfig) -> Result<()> {
    let (worker, _queue) = build_worker(config).await?;

    let (reply, info) = oneshot::channel();
    worker.on_message(HostMessage::GetVersion { reply }).await?;
    print_json(&info.await?)?;

    Ok(())
}
