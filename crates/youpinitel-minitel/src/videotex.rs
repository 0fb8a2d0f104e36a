//! Videotex 控制码与文本编码
//!
//! 只包含演示程序用到的子集。

/// 蜂鸣
pub const BEL: u8 = 0x07;
/// 换行
pub const LF: u8 = 0x0A;
/// 清屏（光标回到第 1 行第 1 列）
pub const FF: u8 = 0x0C;
/// 清除至行尾
pub const CAN: u8 = 0x18;
/// G2 字符集单字符切换（重音字符）
pub const SS2: u8 = 0x19;
/// 转义
pub const ESC: u8 = 0x1B;
/// 光标定位
pub const US: u8 = 0x1F;

/// 反显开始（`ESC ]`）
pub const INVERSE_ON: [u8; 2] = [ESC, 0x5D];
/// 反显结束（`ESC \`）
pub const INVERSE_OFF: [u8; 2] = [ESC, 0x5C];

/// 无法编码字符的替代字符
const REPLACEMENT: u8 = b'?';

/// 光标定位序列
///
/// `row` 为 0..=24（0 为状态行），`col` 为从 0 开始的列号。
pub fn cursor_goto(row: u8, col: u8) -> [u8; 3] {
    [US, 0x40 + row, 0x41 + col]
}

/// G2 重音符号
fn diacritic(c: char) -> Option<(u8, u8)> {
    // (重音代码, 基础字母)
    let pair = match c {
        'à' => (0x41, b'a'),
        'è' => (0x41, b'e'),
        'ù' => (0x41, b'u'),
        'é' => (0x42, b'e'),
        'â' => (0x43, b'a'),
        'ê' => (0x43, b'e'),
        'î' => (0x43, b'i'),
        'ô' => (0x43, b'o'),
        'û' => (0x43, b'u'),
        'ë' => (0x48, b'e'),
        'ï' => (0x48, b'i'),
        'ü' => (0x48, b'u'),
        'ç' => (0x4B, b'c'),
        _ => return None,
    };
    Some(pair)
}

/// 将 Unicode 文本编码为 Minitel 字节流
///
/// ASCII 可打印字符原样输出，法语重音字符使用 SS2 序列，其余字符替换为 `?`。
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            out.push(c as u8);
        } else if let Some((accent, base)) = diacritic(c) {
            out.extend_from_slice(&[SS2, accent, base]);
        } else {
            out.push(REPLACEMENT);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii_passthrough() {
        assert_eq!(encode_text("Menu 1"), b"Menu 1".to_vec());
    }

    #[test]
    fn test_encode_accents() {
        assert_eq!(encode_text("é"), vec![SS2, 0x42, b'e']);
        assert_eq!(encode_text("à"), vec![SS2, 0x41, b'a']);
        assert_eq!(encode_text("ç"), vec![SS2, 0x4B, b'c']);
    }

    #[test]
    fn test_encode_unknown_is_replaced() {
        assert_eq!(encode_text("a€\tb"), b"a??b".to_vec());
    }

    #[test]
    fn test_cursor_goto() {
        assert_eq!(cursor_goto(0, 0), [US, 0x40, 0x41]);
        assert_eq!(cursor_goto(23, 0), [US, 0x57, 0x41]);
        assert_eq!(cursor_goto(5, 12), [US, 0x45, 0x4D]);
    }
}
