pub mod documents;
pub mod group;
pub mod loaders;
pub mod result;
pub mod row;
pub mod settings;

pub use documents::{
    BillDocument, BillLine, CustomField, EntityRef, InvoiceDocument, POINT_OF_CONTACT_FIELD,
};
pub use group::BillGroup;
pub use loaders::{load_all_batch_files, load_batch_from_toml, BatchFile};
pub use result::{AttachmentResult, AttachmentStatus, DryRunResult, ProcessingResult, RowStatus};
pub use row::ImportRow;
pub use settings::{Environment, Settings};

/// 附件内存映射：文件名 → 文件内容
pub type FileMap = std::collections::HashMap<String, Vec<u8>>;
