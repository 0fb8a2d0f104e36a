//! Mock 终端
//!
//! 按脚本返回按键，并记录所有屏幕操作，用于无硬件测试。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::MinitelError;
use crate::keys::Key;
use crate::{SCREEN_WIDTH, Terminal};

/// 记录的屏幕操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenOp {
    ClearAll,
    ClearScreen,
    Status { text: String, inverse: bool },
    Text { text: String, x: u8, y: u8 },
    Beep,
}

#[derive(Debug, Default)]
struct MockTerminalState {
    /// 脚本按键（`None` 表示一次超时）
    keys: VecDeque<Option<Key>>,
    ops: Vec<ScreenOp>,
    /// 记录的 `read_key` 超时参数
    waits: Vec<Duration>,
}

/// 模拟终端
///
/// 克隆体共享同一状态，测试可以在终端被移交后继续检查。
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    state: Arc<Mutex<MockTerminalState>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带按键脚本的终端
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Option<Key>>,
    {
        let terminal = Self::new();
        terminal.push_keys(keys);
        terminal
    }

    /// 追加按键脚本
    pub fn push_keys<I>(&self, keys: I)
    where
        I: IntoIterator<Item = Option<Key>>,
    {
        self.lock().keys.extend(keys);
    }

    /// 所有屏幕操作
    pub fn ops(&self) -> Vec<ScreenOp> {
        self.lock().ops.clone()
    }

    /// 所有显示过的文本
    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                ScreenOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// 包含 `needle` 的文本显示次数
    pub fn count_text(&self, needle: &str) -> usize {
        self.texts().iter().filter(|t| t.contains(needle)).count()
    }

    /// 蜂鸣次数
    pub fn beeps(&self) -> usize {
        self.lock()
            .ops
            .iter()
            .filter(|op| matches!(op, ScreenOp::Beep))
            .count()
    }

    /// 剩余未读的脚本按键数
    pub fn pending_keys(&self) -> usize {
        self.lock().keys.len()
    }

    /// `read_key` 收到的超时参数
    pub fn waits(&self) -> Vec<Duration> {
        self.lock().waits.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTerminalState> {
        // 测试线程 panic 后仍允许检查状态
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: ScreenOp) {
        self.lock().ops.push(op);
    }
}

impl Terminal for MockTerminal {
    fn screen_width(&self) -> usize {
        SCREEN_WIDTH
    }

    fn clear_all(&mut self) -> Result<(), MinitelError> {
        self.record(ScreenOp::ClearAll);
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), MinitelError> {
        self.record(ScreenOp::ClearScreen);
        Ok(())
    }

    fn display_status(&mut self, text: &str, inverse: bool) -> Result<(), MinitelError> {
        self.record(ScreenOp::Status {
            text: text.to_string(),
            inverse,
        });
        Ok(())
    }

    fn display_text(&mut self, text: &str, x: u8, y: u8) -> Result<(), MinitelError> {
        self.record(ScreenOp::Text {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }

    fn read_key(&mut self, max_wait: Duration) -> Result<Option<Key>, MinitelError> {
        let mut state = self.lock();
        state.waits.push(max_wait);
        // 脚本耗尽视为超时
        Ok(state.keys.pop_front().flatten())
    }

    fn beep(&mut self) -> Result<(), MinitelError> {
        self.record(ScreenOp::Beep);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_keys_then_timeout() {
        let mut term = MockTerminal::with_keys([Some(Key::Char('1')), None]);
        let wait = Duration::from_secs(1);
        assert_eq!(term.read_key(wait).unwrap(), Some(Key::Char('1')));
        assert_eq!(term.read_key(wait).unwrap(), None);
        assert_eq!(term.read_key(wait).unwrap(), None);
        assert_eq!(term.waits().len(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let term = MockTerminal::new();
        let mut handle = term.clone();
        handle.display_text("hello", 0, 1).unwrap();
        handle.beep().unwrap();
        assert_eq!(term.count_text("hello"), 1);
        assert_eq!(term.beeps(), 1);
    }

    #[test]
    fn test_wait_for_key_skips_invalid() {
        let mut term = MockTerminal::with_keys([Some(Key::Char('x')), Some(Key::RETOUR)]);
        let key = term
            .wait_for_key(&[Key::RETOUR], Duration::from_secs(5))
            .unwrap();
        assert_eq!(key, Some(Key::RETOUR));
        assert_eq!(term.beeps(), 0);
    }
}
