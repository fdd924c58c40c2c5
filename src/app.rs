//! 命令行驱动
//!
//! 从 stdin 逐行读取 JSON 命令（视图意图或宿主事件），交给当前工具的会话处理，
//! 每处理一行就向 stdout 输出一行视图快照。stdin 结束时等待全部保存完成再退出。

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::{Config, ToolKind};
use crate::error::AppResult;
use crate::infrastructure::{Host, HostEvent};
use crate::models::load_quiz_seed;
use crate::utils::logging::{init_log_file, log_session_end, log_startup, truncate_text};
use crate::view::Intent;
use crate::workflow::{AuthorSession, DisplaySession};

/// 一行输入
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Command {
    Intent(Intent),
    Host(HostEvent),
}

enum Session {
    Author(AuthorSession),
    Display(DisplaySession),
}

/// 应用主结构
pub struct App {
    config: Config,
    host: Host,
    session: Session,
    listener: Option<JoinHandle<()>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件 {}", config.output_log_file))?;

        log_startup(&config);

        let host = Host::file_backed(&config)?;

        if let Some(seed_file) = &config.seed_file {
            let seed = load_quiz_seed(Path::new(seed_file))
                .await
                .with_context(|| format!("加载种子文件失败: {}", seed_file))?;
            host.seed_if_empty(seed).await?;
        }

        let session = match config.tool {
            ToolKind::Author => Session::Author(AuthorSession::load(&host, &config).await?),
            ToolKind::Display => Session::Display(DisplaySession::load(&host, &config).await?),
        };

        let listener = match &session {
            Session::Author(author) => Some(author.spawn_event_listener(host.subscribe())),
            Session::Display(_) => None,
        };

        Ok(Self {
            config,
            host,
            session,
            listener,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        let mut handled = 0usize;
        let mut failed = 0usize;

        self.write_snapshot(&mut stdout).await?;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            handled += 1;
            if let Err(e) = self.dispatch(line).await {
                failed += 1;
                error!("❌ 处理失败 [{}]: {}", truncate_text(line, 60), e);
            }

            self.write_snapshot(&mut stdout).await?;
        }

        info!("输入结束，等待保存完成...");
        if let Session::Author(author) = &self.session {
            author.shutdown().await;
        }
        if let Some(listener) = &self.listener {
            listener.abort();
        }

        log_session_end(handled, failed, &self.config.output_log_file);
        Ok(())
    }

    async fn dispatch(&self, line: &str) -> AppResult<()> {
        let command: Command = serde_json::from_str(line)?;
        debug!("收到命令: {:?}", command);

        match (command, &self.session) {
            (Command::Host(event), _) => {
                self.host.emit(event);
            }
            (Command::Intent(intent), Session::Author(author)) => {
                if let Some(handle) = author.handle(intent)? {
                    handle.detach();
                }
            }
            (Command::Intent(intent), Session::Display(display)) => {
                display.handle(intent).await?;
            }
        }
        Ok(())
    }

    async fn write_snapshot(&self, stdout: &mut tokio::io::Stdout) -> Result<()> {
        let mut json = match &self.session {
            Session::Author(author) => serde_json::to_string(&author.view())?,
            Session::Display(display) => serde_json::to_string(&display.view())?,
        };
        json.push('\n');
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
