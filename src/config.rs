/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 批次 TOML 文件存放目录
    pub batch_folder: String,
    /// 附件文件存放目录
    pub attachments_folder: String,
    /// 只做试运行（校验 + 叙述意图，不提交）
    pub dry_run: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 记账 API 配置 ---
    pub api_base_url_sandbox: String,
    pub api_base_url_production: String,
    pub api_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_folder: "batches".to_string(),
            attachments_folder: "attachments".to_string(),
            dry_run: false,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            api_base_url_sandbox: "https://api-sandbox.ledgerbooks.com/v3".to_string(),
            api_base_url_production: "https://api.ledgerbooks.com/v3".to_string(),
            api_token: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            batch_folder: std::env::var("BATCH_FOLDER").unwrap_or(default.batch_folder),
            attachments_folder: std::env::var("ATTACHMENTS_FOLDER").unwrap_or(default.attachments_folder),
            dry_run: std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dry_run),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            api_base_url_sandbox: std::env::var("API_BASE_URL_SANDBOX").unwrap_or(default.api_base_url_sandbox),
            api_base_url_production: std::env::var("API_BASE_URL_PRODUCTION").unwrap_or(default.api_base_url_production),
            api_token: std::env::var("API_TOKEN").unwrap_or(default.api_token),
        }
    }
}
