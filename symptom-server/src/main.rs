//! 症状分析服务主程序

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use symptom_analysis::AnalysisEngine;
use symptom_database::{DatabasePool, DatabaseQueries, PostgresAnalysisStore};
use symptom_integration::ChatCompletionConnector;
use symptom_web::{AppState, WebServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigValidator, ServiceConfig};

/// 症状分析服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "symptom-server")]
#[command(about = "Health Symptom Checker API 服务器")]
struct Args {
    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.host, args.port, args.log_level);

    // 初始化日志，RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动症状分析服务...");
    match args.config.as_deref() {
        Some(path) => info!("Configuration loaded from: {}", path),
        None => info!("Configuration loaded from environment"),
    }
    ConfigValidator::new().validate(&config)?;
    config.log_summary();

    // 数据库
    let pool = DatabasePool::new(&config.database.settings())?;
    if config.database.auto_migrate {
        if let Err(e) = DatabaseQueries::new(&pool).create_tables().await {
            warn!("Database schema bootstrap failed, analyses will not be saved until it is reachable: {}", e);
        }
    }
    match pool.ping().await {
        Ok(()) => info!("Database connection verified"),
        Err(e) => warn!("Database unreachable at startup: {}", e),
    }

    // 分析引擎
    let connector = ChatCompletionConnector::new(config.llm.connector_config())?;
    let store = PostgresAnalysisStore::new(pool.clone());
    let engine = AnalysisEngine::new(
        Arc::new(connector),
        Arc::new(store),
        config.llm.completion_settings(),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    let server = WebServer::new(
        addr,
        AppState::new(Arc::new(engine)),
        &config.server.cors_allowed_origins,
    );
    server.run(shutdown_signal()).await?;

    pool.close().await;
    info!("症状分析服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
