//! 键盘模型
//!
//! Minitel 功能键以 `SEP`（0x13）前缀加一个代码字节发送。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 功能键前缀
pub const SEP: u8 = 0x13;

/// Minitel 功能键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FunctionKey {
    Envoi = 0x41,
    Retour = 0x42,
    Repetition = 0x43,
    Guide = 0x44,
    Annulation = 0x45,
    Sommaire = 0x46,
    Correction = 0x47,
    Suite = 0x48,
    ConnexionFin = 0x59,
}

/// 一次按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// 可打印字符
    Char(char),
    /// 功能键
    Function(FunctionKey),
}

impl Key {
    pub const ENVOI: Key = Key::Function(FunctionKey::Envoi);
    pub const RETOUR: Key = Key::Function(FunctionKey::Retour);
    pub const SOMMAIRE: Key = Key::Function(FunctionKey::Sommaire);
    pub const CORRECTION: Key = Key::Function(FunctionKey::Correction);

    /// 按键对应的数字（仅 `'0'..='9'`）
    pub fn digit(&self) -> Option<u32> {
        match self {
            Key::Char(c) => c.to_digit(10),
            Key::Function(_) => None,
        }
    }

    /// 按键序列字节
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf).as_bytes().to_vec()
            },
            Key::Function(f) => vec![SEP, f.into()],
        }
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

impl From<FunctionKey> for Key {
    fn from(f: FunctionKey) -> Self {
        Key::Function(f)
    }
}
