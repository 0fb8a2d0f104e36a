//! # YouPinitel Arm
//!
//! 机械臂门面层：
//! - 关节、姿态（Pose）、动作序列（Gesture）数据模型
//! - 统一的 [`Arm`] 能力集
//! - 两种传输：本地串口（Youpi 固件 / AX-12 总线）与会话总线上的远程控制器
//!
//! 伺服控制本身由固件或远程服务完成，本 crate 只负责下发命令。

pub mod arm;
pub mod dynamixel;
pub mod error;
pub mod gesture;
pub mod joint;
mod link;
pub mod pose;
pub mod remote;
pub mod youpi;

#[cfg(feature = "mock")]
pub mod mock;

pub use arm::{Arm, GRIPPER_CLOSED_ANGLE, GRIPPER_OPEN_ANGLE};
pub use dynamixel::{DriverBus, DynamixelArm, JointConfig, Orientation, ServoBus};
pub use error::ArmError;
pub use gesture::{Clock, Gesture, GestureStep, SystemClock, play};
pub use joint::{ArmGeneration, JointName};
pub use pose::Pose;
pub use remote::{ArmBus, RemoteArm, ZbusArmBus};
pub use youpi::YoupiArm;

#[cfg(feature = "mock")]
pub use mock::{ArmCommand, MockArm};
