//! # Example: eager vs lazy ordered merge behind a closed gate
//!
//! Two items are submitted while the gate is closed; a third source opens the gate after a
//! few seconds. The eager merge completes, the lazy one never starts the releasing source.
//! Spawning the releasing source before the lazy composition starts makes it complete too.
//!
//! ```text
//! RUST_LOG=deferred_gate=debug cargo run --example merge_sequential
//! ```

use std::time::Duration;

use deferred_gate::merge::{concat_sequential, merge_sequential};
use deferred_gate::{
    DeferredKeyedService, EventKind, ReleaseGate, ServiceConfig, ServiceError, WorkItem, uppercase,
};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryFutureExt};
use tracing_subscriber::EnvFilter;

type Source = BoxFuture<'static, Result<String, ServiceError>>;

fn sources(
    service: &DeferredKeyedService<u32, String>,
    gate: &ReleaseGate,
) -> Result<Vec<Source>, ServiceError> {
    let first = service.submit(WorkItem::new(1, "first".to_string()))?;
    let second = service.submit(WorkItem::new(2, "second".to_string()))?;

    let gate = gate.clone();
    let proceed = async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        println!("[proceed] opening the gate");
        gate.release();
        Ok("PROCEEDED".to_string())
    };

    Ok(vec![
        first.map_ok(|res| res.value).boxed(),
        second.map_ok(|res| res.value).boxed(),
        proceed.boxed(),
    ])
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // eager: every source is polled up front, so the gate opens at ~3s
    let gate = ReleaseGate::closed();
    let service = DeferredKeyedService::new(gate.clone(), uppercase, ServiceConfig::default());

    let mut events = service.bus().subscribe();
    tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            if ev.kind == EventKind::ItemWaiting {
                println!("[event] {:?} attempt={:?}", ev.key, ev.attempt);
            }
        }
    });

    let merged = tokio::time::timeout(
        Duration::from_secs(6),
        merge_sequential(sources(&service, &gate)?).collect::<Vec<_>>(),
    )
    .await?;
    for res in merged {
        println!("[eager] {}", res?);
    }

    // lazy: the releasing source sits behind two items that wait for it
    let gate = ReleaseGate::closed();
    let service = DeferredKeyedService::new(gate.clone(), uppercase, ServiceConfig::default());

    let lazy = tokio::time::timeout(
        Duration::from_secs(6),
        concat_sequential(sources(&service, &gate)?).collect::<Vec<_>>(),
    )
    .await;
    match lazy {
        Ok(_) => println!("[lazy] completed (unexpected)"),
        Err(_) => println!(
            "[lazy] timed out: gate released={}, pending={:?}",
            gate.is_released(),
            service.pending_keys()
        ),
    }
    service.shutdown();

    // lazy again, but the releasing source is spawned before the composition starts
    let gate = ReleaseGate::closed();
    let service = DeferredKeyedService::new(gate.clone(), uppercase, ServiceConfig::default());

    let mut started = sources(&service, &gate)?;
    if let Some(proceed) = started.pop() {
        let proceed = tokio::spawn(proceed).map(|joined| {
            joined.unwrap_or_else(|err| {
                Err(ServiceError::Interrupted {
                    key: "proceed".to_string(),
                    reason: err.to_string(),
                })
            })
        });
        started.push(proceed.boxed());
    }

    let spawned = tokio::time::timeout(
        Duration::from_secs(6),
        concat_sequential(started).collect::<Vec<_>>(),
    )
    .await?;
    for res in spawned {
        println!("[lazy, spawned] {}", res?);
    }

    Ok(())
}
