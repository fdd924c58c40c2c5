//! JSON 文件文档存储 - 基础设施层
//!
//! 每份文档对应数据目录下的一个 `<key>.json` 文件；
//! 替换先写临时文件再重命名，读到的永远是完整文档。
//! 同一存储上的替换依次执行，重命名顺序与替换开始的顺序一致。

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult, StoreError};
use crate::infrastructure::store::DocumentStore;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("合法的正则表达式"))
}

pub struct JsonFileStore<T> {
    key: String,
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// 在 `dir` 下为 `key` 创建文件存储
    ///
    /// key 只允许字母、数字、`_`、`.`、`-`，且不能以符号开头。
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> AppResult<Self> {
        let key = key.into();
        if !key_pattern().is_match(&key) || key.contains("..") {
            return Err(AppError::Store(StoreError::InvalidDocumentKey { key }));
        }
        let path = dir.as_ref().join(format!("{}.json", key));
        Ok(Self {
            key,
            path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.key
    }

    async fn retrieve(&self) -> AppResult<Option<T>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[{}] 文档尚未保存过", self.key);
                return Ok(None);
            }
            Err(e) => return Err(AppError::retrieve_failed(self.key.clone(), e)),
        };
        let body = serde_json::from_str(&content)?;
        Ok(Some(body))
    }

    async fn replace(&self, body: T) -> AppResult<T> {
        let content = serde_json::to_string_pretty(&body)?;
        let _writing = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::replace_failed(self.key.clone(), e))?;
        }

        let tmp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp_path, &content)
            .await
            .map_err(|e| AppError::replace_failed(self.key.clone(), e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| AppError::replace_failed(self.key.clone(), e))?;

        debug!("[{}] 已写入 {} 字节", self.key, content.len());

        // 规范副本以落盘内容为准
        Ok(serde_json::from_str(&content)?)
    }
}
