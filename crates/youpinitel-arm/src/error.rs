//! 机械臂层错误类型定义

use thiserror::Error;

/// 机械臂层错误类型
#[derive(Error, Debug)]
pub enum ArmError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 串口打开失败
    #[error("unable to open arm port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// 等待响应超时
    #[error("Operation timeout")]
    Timeout,

    /// 固件未在限定时间内就绪
    #[error("arm interface not ready after {0:?}")]
    NotReady(std::time::Duration),

    /// 固件返回错误
    #[error("firmware error: {0}")]
    Firmware(String),

    /// 响应无法解析
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// 伺服驱动打开失败
    #[error("unable to open servo driver on {port}: {message}")]
    Driver { port: String, message: String },

    /// 伺服驱动错误
    #[error("servo {id}: {message}")]
    Servo { id: u8, message: String },

    /// 会话总线错误
    #[error("bus error: {0}")]
    Bus(#[from] zbus::Error),

    /// 未知关节
    #[error("unknown joint: {0}")]
    UnknownJoint(String),

    /// 未知硬件代
    #[error("unknown arm generation: {0}")]
    UnknownGeneration(String),

    /// 关节未配置
    #[error("joint {0} is not available on this arm")]
    JointUnavailable(crate::JointName),

    /// 动作步持续时间无效
    #[error("invalid gesture step duration: {0}s")]
    InvalidDuration(f64),

    /// 动作序列编码失败
    #[error("gesture encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JointName;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ArmError::Servo {
                id: 3,
                message: "timeout".into()
            }
            .to_string(),
            "servo 3: timeout"
        );
        assert_eq!(
            ArmError::JointUnavailable(JointName::WristRot).to_string(),
            "joint wrist_rot is not available on this arm"
        );
        assert_eq!(
            ArmError::UnknownJoint("knee".into()).to_string(),
            "unknown joint: knee"
        );
    }
}
