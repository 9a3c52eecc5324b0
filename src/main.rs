//! # 粘贴灰度对比工具 — 应用入口
//!
//! - 带参数运行：每个参数是一张本地图片，合成一次粘贴事件，处理完写出页面后退出。
//! - 无参数运行：监听系统剪贴板，每次变化按一次粘贴处理，Ctrl+C 退出；
//!   每次粘贴前重读设置文件，改动无需重启即可生效。

use std::path::PathBuf;

use paste_luma::clipboard::{self, PasteEvent};
use paste_luma::error::AppError;
use paste_luma::image_handler::ImageHandler;
use paste_luma::page::Page;
use paste_luma::session::PasteSession;
use paste_luma::settings;
use tokio::sync::mpsc;

const PAGE_TITLE: &str = "paste-luma";
const PASTE_QUEUE_CAPACITY: usize = 16;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("启动失败: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let settings = settings::load_app_settings()?;
    let config = settings.image_config()?;
    let output_path = settings.output_path.clone();
    log::info!(
        "setup: strategy={} output={}",
        config.grayscale_strategy.as_str(),
        output_path.display()
    );

    let mut session = PasteSession::new(ImageHandler::new(config), Page::new(PAGE_TITLE));

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if !paths.is_empty() {
        let report = session.handle_paste(PasteEvent::from_paths(paths)).await?;
        for failure in &report.failures {
            log::error!("❌ {failure}");
        }
        session.page().write_to(&output_path)?;
        log::info!("📄 已写出 {} 个结果到 {}", report.rendered, output_path.display());
        return Ok(());
    }

    session.apply_settings(&settings)?;
    let (tx, mut rx) = mpsc::channel::<PasteEvent>(PASTE_QUEUE_CAPACITY);
    let _monitor = clipboard::listener::start_monitoring(tx);

    session.page().write_to(&output_path)?;
    log::info!("📋 等待粘贴，结果页面: {}", output_path.display());

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    log::warn!("📋 剪贴板监听已结束");
                    break;
                };

                refresh_settings(&session);
                match session.handle_paste(event).await {
                    Ok(report) if report.rendered > 0 => {
                        if let Err(err) = session.page().write_to(&output_path) {
                            log::error!("写出页面失败: {err}");
                        }
                    }
                    Ok(_) => {}
                    Err(err) => log::warn!("⚠️ 本次粘贴未处理: {err}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("收到退出信号");
                break;
            }
        }
    }

    Ok(())
}

/// 每次粘贴前重读设置文件；文件无效时沿用当前设置。输出路径只在启动时读取。
fn refresh_settings(session: &PasteSession) {
    match settings::load_app_settings().and_then(|settings| session.apply_settings(&settings)) {
        Ok(_) => {}
        Err(err) => log::warn!("⚠️ 设置文件无效，沿用当前设置: {err}"),
    }
}
