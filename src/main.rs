use anyhow::Result;
use pvgis_enrich::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    App::new(config)?.run().await;

    Ok(())
}
