//! 附件挂接服务 - 业务能力层
//!
//! 文件名来自行内分号分隔的字段，整组去重后逐个上传。
//! 单个文件的失败只记录在自己的结果里，从不影响账单或其他文件。

use crate::clients::api::{AccountingApi, AttachableEntity};
use crate::models::{AttachmentResult, AttachmentStatus, BillGroup, FileMap};
use indexmap::IndexSet;
use tracing::{info, warn};

/// 文件缺失时记录的错误文本
pub const MISSING_FILE_ERROR: &str = "File not found in uploads";

/// 收集一个组引用的全部附件文件名（保序去重）
pub fn collect_filenames(group: &BillGroup) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for (_, row) in &group.rows {
        for name in row.attachment_names() {
            names.insert(name);
        }
    }
    names
}

/// 附件挂接器
pub struct AttachmentLinker<'a, A> {
    api: &'a A,
    files: &'a FileMap,
}

impl<'a, A: AccountingApi> AttachmentLinker<'a, A> {
    pub fn new(api: &'a A, files: &'a FileMap) -> Self {
        Self { api, files }
    }

    /// 上传并挂到账单，逐文件记录独立结果
    pub async fn attach_to_bill(
        &self,
        names: &IndexSet<String>,
        bill_id: &str,
    ) -> Vec<AttachmentResult> {
        let mut results = Vec::with_capacity(names.len());

        for name in names {
            let Some(content) = self.files.get(name) else {
                warn!("⚠️ 附件缺失: {}", name);
                results.push(AttachmentResult {
                    filename: name.clone(),
                    status: AttachmentStatus::Error,
                    attachable_id: None,
                    error: Some(MISSING_FILE_ERROR.to_string()),
                });
                continue;
            };

            match self
                .api
                .upload_attachment(name, content, AttachableEntity::Bill, bill_id)
                .await
            {
                Ok(attachable_id) => {
                    info!("✓ 附件已上传: {}", name);
                    results.push(AttachmentResult {
                        filename: name.clone(),
                        status: AttachmentStatus::Success,
                        attachable_id: Some(attachable_id),
                        error: None,
                    });
                }
                Err(fault) => {
                    warn!("⚠️ 附件上传失败 {}: {}", name, fault.message_text());
                    results.push(AttachmentResult {
                        filename: name.clone(),
                        status: AttachmentStatus::Error,
                        attachable_id: None,
                        error: Some(fault.message_text()),
                    });
                }
            }
        }

        results
    }

    /// 尽力而为地把同一批文件再挂到发票上
    ///
    /// 这里的失败只记日志，不进结果，也不改变行状态。
    pub async fn attach_to_invoice_best_effort(&self, names: &IndexSet<String>, invoice_id: &str) {
        for name in names {
            let Some(content) = self.files.get(name) else {
                continue;
            };

            if let Err(fault) = self
                .api
                .upload_attachment(name, content, AttachableEntity::Invoice, invoice_id)
                .await
            {
                warn!(
                    "⚠️ 附件同步到发票失败 {}: {}",
                    name,
                    fault.message_text()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportRow;

    #[test]
    fn filenames_are_deduplicated_across_the_group() {
        let group = BillGroup {
            bill_number: "B1".to_string(),
            rows: vec![
                (
                    0,
                    ImportRow {
                        attachments: "a.pdf; b.png".to_string(),
                        ..Default::default()
                    },
                ),
                (
                    1,
                    ImportRow {
                        attachments: "b.png;c.jpg".to_string(),
                        ..Default::default()
                    },
                ),
            ],
        };

        let names: Vec<_> = collect_filenames(&group).into_iter().collect();
        assert_eq!(names, vec!["a.pdf", "b.png", "c.jpg"]);
    }
}
