//! # YouPinitel Minitel Adapter
//!
//! Minitel 终端的薄适配层，只覆盖演示程序需要的能力：
//! - 清屏、定位输出、状态行（反显）
//! - 带超时的按键读取
//! - 蜂鸣
//!
//! 完整的 Videotex 协议不在本 crate 范围内。

use std::time::{Duration, Instant};

pub mod error;
pub mod keys;
pub mod minitel;
pub mod videotex;

#[cfg(feature = "mock")]
pub mod mock;

pub use error::MinitelError;
pub use keys::{FunctionKey, Key};
pub use minitel::{DEFAULT_BAUDRATE, Minitel};

#[cfg(feature = "mock")]
pub use mock::{MockTerminal, ScreenOp};

/// Minitel 屏幕宽度（字符）
pub const SCREEN_WIDTH: usize = 40;

/// Minitel 屏幕高度（不含状态行）
pub const SCREEN_HEIGHT: u8 = 24;

/// 终端能力集
///
/// 坐标约定：`x` 为从 0 开始的列号，`y` 为行号（1..=24，0 为状态行）。
pub trait Terminal {
    /// 屏幕宽度（字符数）
    fn screen_width(&self) -> usize {
        SCREEN_WIDTH
    }

    /// 清除整个屏幕（包括状态行）
    fn clear_all(&mut self) -> Result<(), MinitelError>;

    /// 清除屏幕内容（保留状态行）
    fn clear_screen(&mut self) -> Result<(), MinitelError>;

    /// 在状态行显示文本
    fn display_status(&mut self, text: &str, inverse: bool) -> Result<(), MinitelError>;

    /// 在指定位置显示文本
    fn display_text(&mut self, text: &str, x: u8, y: u8) -> Result<(), MinitelError>;

    /// 在指定行居中显示文本
    ///
    /// 指定 `pad` 时整行用该字符填充。
    fn display_text_center(
        &mut self,
        text: &str,
        y: u8,
        pad: Option<char>,
    ) -> Result<(), MinitelError> {
        let width = self.screen_width();
        match pad {
            Some(fill) => self.display_text(&center(text, width, fill), 0, y),
            None => {
                let len = text.chars().count();
                let x = width.saturating_sub(len) / 2;
                self.display_text(text, x as u8, y)
            },
        }
    }

    /// 读取一个按键
    ///
    /// 超过 `max_wait` 仍无输入时返回 `None`。
    fn read_key(&mut self, max_wait: Duration) -> Result<Option<Key>, MinitelError>;

    /// 等待 `valid` 中的某个按键，其他按键被忽略
    fn wait_for_key(
        &mut self,
        valid: &[Key],
        max_wait: Duration,
    ) -> Result<Option<Key>, MinitelError> {
        let deadline = Instant::now() + max_wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match self.read_key(remaining)? {
                None => return Ok(None),
                Some(key) if valid.contains(&key) => return Ok(Some(key)),
                Some(key) => tracing::debug!("ignoring key {:?}", key),
            }
        }
    }

    /// 发出蜂鸣
    fn beep(&mut self) -> Result<(), MinitelError>;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn screen_width(&self) -> usize {
        (**self).screen_width()
    }

    fn clear_all(&mut self) -> Result<(), MinitelError> {
        (**self).clear_all()
    }

    fn clear_screen(&mut self) -> Result<(), MinitelError> {
        (**self).clear_screen()
    }

    fn display_status(&mut self, text: &str, inverse: bool) -> Result<(), MinitelError> {
        (**self).display_status(text, inverse)
    }

    fn display_text(&mut self, text: &str, x: u8, y: u8) -> Result<(), MinitelError> {
        (**self).display_text(text, x, y)
    }

    fn display_text_center(
        &mut self,
        text: &str,
        y: u8,
        pad: Option<char>,
    ) -> Result<(), MinitelError> {
        (**self).display_text_center(text, y, pad)
    }

    fn read_key(&mut self, max_wait: Duration) -> Result<Option<Key>, MinitelError> {
        (**self).read_key(max_wait)
    }

    fn wait_for_key(
        &mut self,
        valid: &[Key],
        max_wait: Duration,
    ) -> Result<Option<Key>, MinitelError> {
        (**self).wait_for_key(valid, max_wait)
    }

    fn beep(&mut self) -> Result<(), MinitelError> {
        (**self).beep()
    }
}

/// 将文本居中到 `width` 宽，两侧用 `fill` 填充
///
/// 奇数余量时多出的填充字符放在右侧。文本超宽时原样返回。
pub fn center(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;

    let mut line = String::with_capacity(width);
    line.extend(std::iter::repeat_n(fill, left));
    line.push_str(text);
    line.extend(std::iter::repeat_n(fill, right));
    line
}

/// 左对齐并填充到 `width` 宽
pub fn ljust(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut line = text.to_string();
    line.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center_even_padding() {
        assert_eq!(center("ab", 6, '-'), "--ab--");
    }

    #[test]
    fn test_center_odd_padding_goes_right() {
        assert_eq!(center("abc", 6, '-'), "-abc--");
    }

    #[test]
    fn test_center_overflow_is_unchanged() {
        assert_eq!(center("abcdef", 4, '-'), "abcdef");
    }

    #[test]
    fn test_center_counts_chars_not_bytes() {
        let line = center("é", 3, ' ');
        assert_eq!(line.chars().count(), 3);
        assert_eq!(line, " é ");
    }

    #[test]
    fn test_ljust() {
        assert_eq!(ljust("Démo", 6), "Démo  ");
        assert_eq!(ljust("abcdef", 3), "abcdef");
    }

    proptest! {
        #[test]
        fn prop_center_keeps_text_in_the_middle(text in "[a-zé ]{0,50}", width in 0usize..60) {
            let line = center(&text, width, '-');
            let len = text.chars().count();
            prop_assert_eq!(line.chars().count(), len.max(width));
            prop_assert!(line.contains(text.as_str()));
            if len < width {
                let left = line.chars().take_while(|c| *c == '-').count();
                let right = line.chars().rev().take_while(|c| *c == '-').count();
                prop_assert!(right == left || right == left + 1);
            }
        }
    }
}
