//! 宿主上下文 - 基础设施层
//!
//! 把宿主提供的全部协作者打包在一起：三份文档存储、评分接口、
//! 标识生成器，以及"全部保存"事件的订阅通道。

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::file_store::JsonFileStore;
use crate::infrastructure::grader::{Grader, LocalGrader};
use crate::infrastructure::ids::{IdGenerator, UuidIdGenerator};
use crate::infrastructure::store::DocumentStore;
use crate::models::{CriteriaMap, QuizSeed, SavedSelection, SetupDocument};

/// 宿主推送的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// 宿主要求立即保存全部数据
    SaveAll,
}

#[derive(Clone)]
pub struct Host {
    pub setup: Arc<dyn DocumentStore<SetupDocument>>,
    pub criteria: Arc<dyn DocumentStore<CriteriaMap>>,
    pub user: Arc<dyn DocumentStore<SavedSelection>>,
    pub grader: Arc<dyn Grader>,
    pub ids: Arc<dyn IdGenerator>,
    events: broadcast::Sender<HostEvent>,
}

impl Host {
    pub fn new(
        setup: Arc<dyn DocumentStore<SetupDocument>>,
        criteria: Arc<dyn DocumentStore<CriteriaMap>>,
        user: Arc<dyn DocumentStore<SavedSelection>>,
        grader: Arc<dyn Grader>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            setup,
            criteria,
            user,
            grader,
            ids,
            events,
        }
    }

    /// 以 JSON 文件为后端的宿主，评分在本地对照判分标准完成
    pub fn file_backed(config: &Config) -> AppResult<Self> {
        let dir = Path::new(&config.data_dir);
        let criteria: Arc<dyn DocumentStore<CriteriaMap>> =
            Arc::new(JsonFileStore::new(dir, "criteria")?);

        info!("📁 数据目录: {}", dir.display());

        Ok(Self::new(
            Arc::new(JsonFileStore::new(dir, "setup")?),
            criteria.clone(),
            Arc::new(JsonFileStore::new(dir, format!("user.{}", config.user_id))?),
            Arc::new(LocalGrader::new(criteria)),
            Arc::new(UuidIdGenerator),
        ))
    }

    /// 订阅宿主事件
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }

    /// 推送事件，返回收到事件的订阅者数量
    pub fn emit(&self, event: HostEvent) -> usize {
        let receivers = self.events.send(event).unwrap_or(0);
        debug!("宿主事件 {:?} 已推送给 {} 个订阅者", event, receivers);
        receivers
    }

    /// 设置文档从未保存过时写入种子数据；返回是否写入
    pub async fn seed_if_empty(&self, seed: QuizSeed) -> AppResult<bool> {
        if self.setup.retrieve().await?.is_some() {
            debug!("设置文档已存在，跳过种子数据");
            return Ok(false);
        }

        let (setup, criteria) = seed.into_documents();
        self.setup.replace(setup).await?;
        self.criteria.replace(criteria).await?;
        info!("🌱 已写入种子数据");
        Ok(true)
    }
}
