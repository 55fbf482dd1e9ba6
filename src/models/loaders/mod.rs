pub mod toml_loader;

pub use toml_loader::{load_all_batch_files, load_attachment_folder, load_batch_from_toml, BatchFile};
