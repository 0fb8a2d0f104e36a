//! 机械臂能力集

use crate::error::ArmError;
use crate::gesture::Gesture;
use crate::joint::{ArmGeneration, JointName};
use crate::pose::Pose;

/// 夹爪张开角度
pub const GRIPPER_OPEN_ANGLE: f64 = 100.0;

/// 夹爪闭合角度
pub const GRIPPER_CLOSED_ANGLE: f64 = 150.0;

/// 统一的机械臂接口
///
/// 本地串口和远程总线两种传输都实现这个 trait，上层不关心具体传输。
pub trait Arm {
    /// 硬件代
    fn generation(&self) -> ArmGeneration;

    /// 可用关节
    fn joint_names(&self) -> Vec<JointName>;

    /// 是否有该关节
    fn has_joint(&self, joint: JointName) -> bool {
        self.joint_names().contains(&joint)
    }

    /// 读取关节当前角度
    fn current_angle(&mut self, joint: JointName) -> Result<f64, ArmError>;

    /// 设置关节目标角度，不等待运动完成
    ///
    /// `speed` 为 `None` 时使用设备默认速度。
    fn set_goal_angle(
        &mut self,
        joint: JointName,
        angle: f64,
        speed: Option<f64>,
    ) -> Result<(), ArmError>;

    /// 当前姿态快照
    fn get_pose(&mut self) -> Result<Pose, ArmError> {
        let mut angles = Vec::new();
        for joint in self.joint_names() {
            angles.push((joint, self.current_angle(joint)?));
        }
        Ok(angles.into_iter().collect())
    }

    /// 回到初始位置（阻塞直到完成）
    fn reset(&mut self) -> Result<(), ArmError>;

    /// 张开夹爪
    fn open_gripper(&mut self) -> Result<(), ArmError> {
        self.set_goal_angle(JointName::Gripper, GRIPPER_OPEN_ANGLE, None)
    }

    /// 闭合夹爪
    fn close_gripper(&mut self) -> Result<(), ArmError> {
        self.set_goal_angle(JointName::Gripper, GRIPPER_CLOSED_ANGLE, None)
    }

    /// 执行动作序列（阻塞直到最后一步结束）
    fn execute_gesture(&mut self, gesture: &Gesture) -> Result<(), ArmError>;
}
