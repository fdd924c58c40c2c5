/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ToolKind};
use crate::error::AppResult;

/// 初始化 tracing 订阅者
///
/// 日志写到 stderr，stdout 留给视图快照。`RUST_LOG` 优先于 `verbose`。
/// 重复调用不会报错（测试里可能多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n测验会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    let tool = match config.tool {
        ToolKind::Author => "出题工具",
        ToolKind::Display => "答题工具",
    };
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", tool);
    info!("📁 数据目录: {}", config.data_dir);
    info!("⏱️ 防抖时长: {}ms", config.debounce_ms);
    info!("{}", "=".repeat(60));
}

/// 记录会话结束信息
///
/// # 参数
/// - `handled`: 处理的输入行数
/// - `failed`: 处理失败的行数
/// - `log_file_path`: 日志文件路径
pub fn log_session_end(handled: usize, failed: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话结束");
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 处理: {} 条", handled);
    info!("❌ 失败: {} 条", failed);
    info!("{}", "=".repeat(60));
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
