//! fleet-reporter-demo - 事件发件箱演示
//!
//! 多个生产者并发上报事件，Checkin 循环周期性“上传”（写日志）并 ack。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use fleet_reporter::{
    event_subtype, AppState, Backend, CheckinLoop, FleetEvent, LifecycleReporter, LogBackend,
    ReportEvent, Reporter, ReporterConfig, StaticAgentInfo, Uploader,
};
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 只打日志的 Uploader
struct LogUploader;

impl Uploader for LogUploader {
    async fn upload(&self, events: &[Arc<FleetEvent>]) -> fleet_reporter::Result<()> {
        for event in events {
            let json = serde_json::to_string(event.as_ref())?;
            tracing::info!("⬆️ {}", json);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("fleet_reporter=debug".parse()?))
        .init();

    tracing::info!("🚀 fleet-reporter-demo v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ReporterConfig::from_env();
    config.reporting_check_frequency = Duration::from_secs(1);
    config.validate()?;

    let info = Arc::new(StaticAgentInfo::generate());
    let reporter = Arc::new(Reporter::new(info, &config));
    let lifecycle = Arc::new(LifecycleReporter::new(vec![
        reporter.clone() as Arc<dyn Backend>,
        Arc::new(LogBackend::default()),
    ]));

    // 生产者
    let mut producers = Vec::new();
    for app in 0..3 {
        let lifecycle = lifecycle.clone();
        producers.push(tokio::spawn(async move {
            let app_id = app.to_string();
            let app_name = format!("app-{}", app);
            for round in 0..5 {
                let state = if round % 4 == 3 {
                    AppState::Failed(format!("round {}", round))
                } else {
                    AppState::Running
                };
                if let Err(e) = lifecycle.on_state_change(&app_id, &app_name, state) {
                    tracing::warn!("Report failed: {}", e);
                }
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        }));
    }

    reporter.report(ReportEvent::action_result(
        event_subtype::ACKNOWLEDGED,
        "demo action acknowledged",
    ))?;

    // Checkin 循环
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let checkin = Arc::new(CheckinLoop::new(reporter.clone(), LogUploader, &config));
    let checkin_handle = {
        let checkin = checkin.clone();
        tokio::spawn(async move { checkin.run(shutdown_rx).await })
    };

    for producer in producers {
        producer.await?;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    shutdown_tx.send(true)?;
    checkin_handle.await?;
    lifecycle.close()?;

    tracing::info!("👋 fleet-reporter-demo exiting, pending={}", reporter.len());
    Ok(())
}
