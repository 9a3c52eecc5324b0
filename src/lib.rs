//! # 粘贴灰度对比工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  系统剪贴板 ── clipboard-master 监听线程                 │
//! │       │  (arboard 快照 → PasteEvent)                     │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↓ tokio mpsc
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  session ── 一次处理一个粘贴事件                         │
//! │   ├─ clipboard       条目校验 · 读成 Data URL            │
//! │   ├─ image_handler   解码 · 绘图表面 · 像素变换 · 编码   │
//! │   └─ page            #content 结果容器（新结果在前）     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`clipboard`] | 粘贴事件模型、文件条目读取、系统剪贴板快照与监听 |
//! | [`image_handler`] | Data URL 解码、绘图表面、灰度变换策略、色彩空间工具 |
//! | [`page`] | 内存页面与 HTML 快照输出 |
//! | [`session`] | 串联一次粘贴的完整处理流程 |
//! | [`settings`] | JSON 设置文件读取 |

pub mod error;
pub mod clipboard;
pub mod image_handler;
pub mod page;
pub mod session;
pub mod settings;
