//! Mock 机械臂
//!
//! 记录所有命令并维护关节角度，用于无硬件测试。

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::arm::Arm;
use crate::error::ArmError;
use crate::gesture::Gesture;
use crate::joint::{ArmGeneration, JointName};
use crate::pose::Pose;

/// 记录的命令
#[derive(Debug, Clone, PartialEq)]
pub enum ArmCommand {
    SetGoal {
        joint: JointName,
        angle: f64,
        speed: Option<f64>,
    },
    OpenGripper,
    CloseGripper,
    Reset,
    Gesture(Gesture),
}

#[derive(Debug)]
struct MockArmState {
    angles: BTreeMap<JointName, f64>,
    commands: Vec<ArmCommand>,
    home: Pose,
}

/// 模拟机械臂
///
/// 克隆体共享同一状态。
#[derive(Debug, Clone)]
pub struct MockArm {
    generation: ArmGeneration,
    state: Arc<Mutex<MockArmState>>,
}

impl MockArm {
    /// 所有关节处于初始姿态（姿态中没有的关节为 0）
    pub fn new(generation: ArmGeneration) -> Self {
        let home = Pose::home();
        let angles = generation
            .joints()
            .into_iter()
            .map(|j| (j, home.angle(j).unwrap_or_default()))
            .collect();
        Self {
            generation,
            state: Arc::new(Mutex::new(MockArmState {
                angles,
                commands: Vec::new(),
                home,
            })),
        }
    }

    /// 所有命令
    pub fn commands(&self) -> Vec<ArmCommand> {
        self.lock().commands.clone()
    }

    /// 关节角度快照
    pub fn angles(&self) -> BTreeMap<JointName, f64> {
        self.lock().angles.clone()
    }

    /// 下发过的动作序列
    pub fn gestures(&self) -> Vec<Gesture> {
        self.lock()
            .commands
            .iter()
            .filter_map(|c| match c {
                ArmCommand::Gesture(g) => Some(g.clone()),
                _ => None,
            })
            .collect()
    }

    /// 回零次数
    pub fn resets(&self) -> usize {
        self.lock()
            .commands
            .iter()
            .filter(|c| matches!(c, ArmCommand::Reset))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockArmState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(state: &mut MockArmState, pose: &Pose) {
        for (joint, angle) in pose.iter() {
            if let Some(slot) = state.angles.get_mut(&joint) {
                *slot = angle;
            }
        }
    }
}

impl Arm for MockArm {
    fn generation(&self) -> ArmGeneration {
        self.generation
    }

    fn joint_names(&self) -> Vec<JointName> {
        self.lock().angles.keys().copied().collect()
    }

    fn current_angle(&mut self, joint: JointName) -> Result<f64, ArmError> {
        self.lock()
            .angles
            .get(&joint)
            .copied()
            .ok_or(ArmError::JointUnavailable(joint))
    }

    fn set_goal_angle(
        &mut self,
        joint: JointName,
        angle: f64,
        speed: Option<f64>,
    ) -> Result<(), ArmError> {
        let mut state = self.lock();
        let slot = state
            .angles
            .get_mut(&joint)
            .ok_or(ArmError::JointUnavailable(joint))?;
        *slot = angle;
        state.commands.push(ArmCommand::SetGoal {
            joint,
            angle,
            speed,
        });
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ArmError> {
        let mut state = self.lock();
        let home = state.home.clone();
        Self::apply(&mut state, &home);
        state.commands.push(ArmCommand::Reset);
        Ok(())
    }

    fn open_gripper(&mut self) -> Result<(), ArmError> {
        self.lock().commands.push(ArmCommand::OpenGripper);
        Ok(())
    }

    fn close_gripper(&mut self) -> Result<(), ArmError> {
        self.lock().commands.push(ArmCommand::CloseGripper);
        Ok(())
    }

    fn execute_gesture(&mut self, gesture: &Gesture) -> Result<(), ArmError> {
        let mut state = self.lock();
        for step in gesture.steps() {
            if let Some(pose) = &step.pose {
                Self::apply(&mut state, pose);
            }
        }
        state.commands.push(ArmCommand::Gesture(gesture.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_angles_follow_home_pose() {
        let arm = MockArm::new(ArmGeneration::Youpi);
        let angles = arm.angles();
        assert_eq!(angles.len(), 6);
        assert_eq!(angles[&JointName::Shoulder], 260.0);
        assert_eq!(angles[&JointName::WristRot], 0.0);
    }

    #[test]
    fn test_set_goal_and_reset() {
        let mut arm = MockArm::new(ArmGeneration::Ax12);
        arm.set_goal_angle(JointName::Base, 100.0, Some(10.0)).unwrap();
        assert_eq!(arm.current_angle(JointName::Base).unwrap(), 100.0);
        arm.reset().unwrap();
        assert_eq!(arm.current_angle(JointName::Base).unwrap(), 240.0);
        assert_eq!(arm.resets(), 1);
    }

    #[test]
    fn test_missing_joint() {
        let mut arm = MockArm::new(ArmGeneration::Ax12);
        assert!(arm.set_goal_angle(JointName::WristRot, 1.0, None).is_err());
        assert!(arm.commands().is_empty());
    }
}
