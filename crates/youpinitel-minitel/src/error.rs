//! Minitel 适配层错误类型定义

use thiserror::Error;

/// Minitel 适配层错误类型
#[derive(Error, Debug)]
pub enum MinitelError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 串口打开失败
    #[error("unable to open Minitel port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// 坐标超出屏幕范围
    #[error("position out of screen: x={x}, y={y}")]
    OutOfScreen { x: u8, y: u8 },
}
