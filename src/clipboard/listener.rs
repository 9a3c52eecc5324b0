//! 剪贴板监听
//!
//! # 设计思路
//!
//! 通过 `clipboard-master` 在独立线程监听系统剪贴板变化，每次变化视为一次“粘贴”：
//! 读取快照并通过 `tokio::sync::mpsc` 通道交给会话循环。
//!
//! # 实现思路
//!
//! - 同一次复制常触发多次变化通知，按最小间隔节流：窗口内只投递第一次，其余通知丢弃，
//!   避免一次复制在页面上出现两份结果。
//! - 监听器异常退出后按指数退避重启；通道关闭（会话结束）后监听线程自行退出。

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clipboard_master::{CallbackResult, ClipboardHandler, Master};
use tokio::sync::mpsc;

use super::PasteEvent;
use super::snapshot::capture_paste_event;

pub const CLIPBOARD_EVENT_MIN_INTERVAL_DEFAULT_MS: u64 = 80;
const CLIPBOARD_EVENT_MIN_INTERVAL_MIN_MS: u64 = 20;
const CLIPBOARD_EVENT_MIN_INTERVAL_MAX_MS: u64 = 5_000;
const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

static CLIPBOARD_EVENT_MIN_INTERVAL_MS: AtomicU64 =
    AtomicU64::new(CLIPBOARD_EVENT_MIN_INTERVAL_DEFAULT_MS);

fn normalize_clipboard_event_min_interval_ms(value_ms: u64) -> u64 {
    value_ms.clamp(
        CLIPBOARD_EVENT_MIN_INTERVAL_MIN_MS,
        CLIPBOARD_EVENT_MIN_INTERVAL_MAX_MS,
    )
}

/// 更新剪贴板变化的最小处理间隔（毫秒），超出 20~5000 的值会被钳制。
pub fn apply_event_min_interval(value_ms: u64) {
    let normalized = normalize_clipboard_event_min_interval_ms(value_ms);
    CLIPBOARD_EVENT_MIN_INTERVAL_MS.store(normalized, Ordering::Relaxed);
    log::debug!("📋 剪贴板监听节流间隔已更新: {}ms", normalized);
}

fn current_event_min_interval_ms() -> u64 {
    CLIPBOARD_EVENT_MIN_INTERVAL_MS.load(Ordering::Relaxed)
}

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

fn debounce_remaining(elapsed: Duration, min_interval: Duration) -> Option<Duration> {
    if elapsed >= min_interval {
        None
    } else {
        Some(min_interval - elapsed)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum DebounceDecision {
    EmitNow,
    Drop { remaining: Duration },
}

fn decide_debounce_action(elapsed: Duration, min_interval: Duration) -> DebounceDecision {
    match debounce_remaining(elapsed, min_interval) {
        Some(remaining) => DebounceDecision::Drop { remaining },
        None => DebounceDecision::EmitNow,
    }
}

/// 剪贴板事件处理器（内部实现）
///
/// 每个事件都会在页面上追加结果，因此节流窗口内的后续通知直接丢弃，不做尾沿补发。
struct Handler {
    tx: mpsc::Sender<PasteEvent>,
    capture: fn() -> PasteEvent,
    last_emit_at: Option<Instant>,
}

impl Handler {
    fn new(tx: mpsc::Sender<PasteEvent>) -> Self {
        Self::with_capture(tx, capture_paste_event)
    }

    fn with_capture(tx: mpsc::Sender<PasteEvent>, capture: fn() -> PasteEvent) -> Self {
        Self {
            tx,
            capture,
            last_emit_at: None,
        }
    }

    /// 读取快照并送入通道；通道已关闭时返回 `false`。
    fn send_paste_event(&self) -> bool {
        let event = (self.capture)();
        if self.tx.blocking_send(event).is_err() {
            log::info!("📋 粘贴通道已关闭，停止投递");
            return false;
        }
        true
    }
}

impl ClipboardHandler for Handler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        if self.tx.is_closed() {
            return CallbackResult::Stop;
        }

        let now = Instant::now();
        let min_interval_ms = current_event_min_interval_ms();
        let min_interval = Duration::from_millis(min_interval_ms);
        let elapsed = self
            .last_emit_at
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(min_interval);

        match decide_debounce_action(elapsed, min_interval) {
            DebounceDecision::Drop { remaining } => {
                log::trace!(
                    "⏱️ 剪贴板变化已丢弃：{}ms < {}ms（剩余 {}ms）",
                    elapsed.as_millis(),
                    min_interval_ms,
                    remaining.as_millis()
                );
                CallbackResult::Next
            }
            DebounceDecision::EmitNow => {
                self.last_emit_at = Some(now);
                if self.send_paste_event() {
                    CallbackResult::Next
                } else {
                    CallbackResult::Stop
                }
            }
        }
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

/// 在后台线程启动剪贴板监控
///
/// # 参数
/// * `tx` - 粘贴事件通道；接收端关闭后监控线程退出
pub fn start_monitoring(tx: mpsc::Sender<PasteEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut restart_attempt: u32 = 0;
        while !tx.is_closed() {
            match Master::new(Handler::new(tx.clone())) {
                Ok(mut master) => {
                    restart_attempt = 0;
                    log::info!("📋 剪贴板监听已启动");
                    let _ = master.run();
                    if tx.is_closed() {
                        break;
                    }
                    log::warn!("📋 剪贴板监听已退出，将尝试重启");
                }
                Err(err) => {
                    log::error!("📋 创建剪贴板监听失败: {}", err);
                }
            }

            restart_attempt = restart_attempt.saturating_add(1);
            let backoff_ms = compute_restart_backoff_ms(restart_attempt);
            log::warn!("📋 剪贴板监听 {}ms 后重试（attempt={}）", backoff_ms, restart_attempt);
            thread::sleep(Duration::from_millis(backoff_ms));
        }
        log::info!("📋 剪贴板监听线程退出");
    })
}
