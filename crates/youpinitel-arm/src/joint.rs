//! 关节与硬件代

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArmError;

/// 关节名称
///
/// 排序即 [`Pose`](crate::Pose) 中的遍历顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    Base,
    Shoulder,
    Elbow,
    Wrist,
    WristRot,
    Gripper,
}

impl JointName {
    /// 全部关节
    pub const ALL: [JointName; 6] = [
        JointName::Base,
        JointName::Shoulder,
        JointName::Elbow,
        JointName::Wrist,
        JointName::WristRot,
        JointName::Gripper,
    ];

    /// 线上名称
    pub fn as_str(&self) -> &'static str {
        match self {
            JointName::Base => "base",
            JointName::Shoulder => "shoulder",
            JointName::Elbow => "elbow",
            JointName::Wrist => "wrist",
            JointName::WristRot => "wrist_rot",
            JointName::Gripper => "gripper",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JointName::ALL
            .into_iter()
            .find(|j| j.as_str() == s)
            .ok_or_else(|| ArmError::UnknownJoint(s.to_string()))
    }
}

/// 机械臂硬件代
///
/// 启动时确定一次，之后作为参数显式传递。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmGeneration {
    /// Youpi 教学臂（Arduino 接口板）
    #[default]
    Youpi,
    /// 上一代 AX-12 伺服臂（USB2AX 接口）
    Ax12,
}

impl ArmGeneration {
    /// Youpi 接口板固定波特率
    pub const YOUPI_BAUDRATE: u32 = 9600;

    /// AX-12 总线默认波特率
    pub const AX12_DEFAULT_BAUDRATE: u32 = 1_000_000;

    /// 本地串口波特率
    ///
    /// Youpi 忽略配置值。
    pub fn local_baudrate(&self, configured: Option<u32>) -> u32 {
        match self {
            ArmGeneration::Youpi => Self::YOUPI_BAUDRATE,
            ArmGeneration::Ax12 => configured.unwrap_or(Self::AX12_DEFAULT_BAUDRATE),
        }
    }

    /// 手动控制时的运动速度（`None` 为固件默认速度）
    pub fn manual_speed(&self) -> Option<f64> {
        match self {
            ArmGeneration::Youpi => None,
            ArmGeneration::Ax12 => Some(10.0),
        }
    }

    /// 肘关节"向上"对应的角度符号
    pub fn elbow_up_sign(&self) -> f64 {
        match self {
            ArmGeneration::Youpi => -1.0,
            ArmGeneration::Ax12 => 1.0,
        }
    }

    /// 是否有腕部旋转关节
    pub fn has_wrist_rotation(&self) -> bool {
        matches!(self, ArmGeneration::Youpi)
    }

    /// 该代机械臂的关节集合
    pub fn joints(&self) -> Vec<JointName> {
        JointName::ALL
            .into_iter()
            .filter(|j| *j != JointName::WristRot || self.has_wrist_rotation())
            .collect()
    }
}

impl fmt::Display for ArmGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmGeneration::Youpi => f.write_str("Youpi"),
            ArmGeneration::Ax12 => f.write_str("AX12"),
        }
    }
}

impl FromStr for ArmGeneration {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "youpi" => Ok(ArmGeneration::Youpi),
            "ax12" | "ax-12" => Ok(ArmGeneration::Ax12),
            _ => Err(ArmError::UnknownGeneration(s.to_string())),
        }
    }
}
