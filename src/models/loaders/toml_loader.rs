//! 批次文件加载器
//!
//! 批次文件是 TOML：一张 `settings` 表加一个 `rows` 数组。
//! 原始 CSV 到行的映射在上游完成，这里只接受已映射好的行。

use crate::models::row::ImportRow;
use crate::models::settings::Settings;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个完整的待处理批次
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    /// 批次设置（缺省字段取默认值）
    #[serde(default)]
    pub settings: Settings,
    /// 已映射的行
    #[serde(default)]
    pub rows: Vec<ImportRow>,
    /// 来源文件路径（加载后填充）
    #[serde(skip)]
    pub file_path: Option<String>,
}

/// 从 TOML 文件加载一个批次
pub async fn load_batch_from_toml(path: &Path) -> Result<BatchFile> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取批次文件: {}", path.display()))?;

    let mut batch: BatchFile = toml::from_str(&content)
        .with_context(|| format!("无法解析批次文件: {}", path.display()))?;

    batch.file_path = Some(path.to_string_lossy().to_string());

    Ok(batch)
}

/// 从文件夹加载所有批次文件
///
/// 单个文件解析失败只记录警告，不影响其余批次。
pub async fn load_all_batch_files(folder_path: &str) -> Result<Vec<BatchFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut batches = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_batch_from_toml(&path).await {
                Ok(batch) => {
                    tracing::info!("成功加载 {} 行", batch.rows.len());
                    batches.push(batch);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(batches)
}

/// 把附件文件夹读入内存映射（文件名 → 内容）
pub async fn load_attachment_folder(
    folder_path: &str,
) -> Result<std::collections::HashMap<String, Vec<u8>>> {
    let folder = PathBuf::from(folder_path);
    let mut files = std::collections::HashMap::new();

    if !folder.exists() {
        // 附件目录是可选的
        return Ok(files);
    }

    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取附件文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let content = fs::read(&path)
                .await
                .with_context(|| format!("无法读取附件: {}", path.display()))?;
            files.insert(name, content);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_file_parses_settings_and_rows() {
        let content = r#"
            [settings]
            autoCreate = true
            defaultCurrency = "EUR"

            [[rows]]
            BillNumber = "B1"
            CustomerName = "Acme"
        "#;

        let batch: BatchFile = toml::from_str(content).unwrap();
        assert!(batch.settings.auto_create);
        assert_eq!(batch.settings.default_currency, "EUR");
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].bill_number, "B1");
        // 未给出的字段落到空字符串
        assert_eq!(batch.rows[0].vendor_name, "");
    }
}
