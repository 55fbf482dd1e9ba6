use anyhow::Result;
use bill_batch_submit::config::Config;
use bill_batch_submit::logger;
use bill_batch_submit::orchestrator::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
