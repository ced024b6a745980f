//! # Example: idle_demo
//!
//! Minimal end-to-end demonstration of idle supervision.
//!
//! Demonstrates how to:
//! - Implement [`CompileService`] for a stub delegate.
//! - Wire a [`ShutdownFn`] target that is invoked when idleness elapses.
//! - Observe lifecycle events with a custom [`Subscribe`] implementation.
//!
//! ## Flow
//! ```text
//! IdleSupervisor::new ──► timer armed (300ms window)
//!   compile #1        ──► timer disarmed, delegate runs, timer re-armed
//!   compile #2        ──► same
//!   (no further calls)
//!   t+300ms           ──► ShutdownFn fires with the idle reason
//! ```
//!
//! Run with: `cargo run --example idle_demo`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use idlevisor::{
    CompilationResult, CompileRequest, CompileService, Config, Event, IdleSupervisor,
    ServiceError, ShutdownFn, Subscribe, SysInfo,
};

/// Stub delegate that pretends every compilation takes 50ms.
struct SlowEcho;

#[async_trait]
impl CompileService for SlowEcho {
    async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
        Ok(SysInfo::new(4, 1 << 30))
    }

    async fn compile(&self, req: CompileRequest) -> Result<CompilationResult, ServiceError> {
        println!("[delegate] compiling invocation={}", req.invocation_id);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(CompilationResult::new(0))
    }

    async fn shutdown(&self) -> Result<(), ServiceError> {
        println!("[delegate] shutdown");
        Ok(())
    }

    async fn server_settings(&self) -> Result<String, ServiceError> {
        Ok("--demo".into())
    }
}

/// Prints every lifecycle event as it happens.
struct Printer;

#[async_trait]
impl Subscribe for Printer {
    async fn on_event(&self, event: &Event) {
        println!("[event] seq={} kind={:?}", event.seq, event.kind);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ServiceError> {
    let mut cfg = Config::default();
    cfg.idle_timeout = Duration::from_millis(300);

    let fired = Arc::new(Notify::new());
    let target = {
        let fired = Arc::clone(&fired);
        ShutdownFn::arc(move |reason: String| {
            let fired = Arc::clone(&fired);
            async move {
                println!("[target] {reason}");
                fired.notify_one();
            }
        })
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Printer)];
    let sup = IdleSupervisor::new(Arc::new(SlowEcho), target, cfg, subs);

    for i in 1..=2 {
        let req = CompileRequest {
            protocol_id: "demo-1".into(),
            invocation_id: format!("inv-{i}"),
            ..CompileRequest::default()
        };
        let result = sup.compile(req).await?;
        println!("[caller] compile #{i} success={}", result.is_success());
    }

    println!("[caller] going quiet; waiting for the idle window to close...");
    fired.notified().await;
    Ok(())
}
