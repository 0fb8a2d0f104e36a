//! 姿态：关节 → 目标角度（度）

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::joint::JointName;

/// 姿态快照
///
/// 构造后不可变，只作为运动目标使用。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose {
    angles: BTreeMap<JointName, f64>,
}

impl Pose {
    /// 内置初始姿态
    pub fn home() -> Self {
        Self::from([
            (JointName::Shoulder, 260.0),
            (JointName::Elbow, 15.0),
            (JointName::Base, 240.0),
            (JointName::Wrist, 55.0),
            (JointName::Gripper, 150.0),
        ])
    }

    /// 指定关节的目标角度
    pub fn angle(&self, joint: JointName) -> Option<f64> {
        self.angles.get(&joint).copied()
    }

    /// 按关节顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (JointName, f64)> + '_ {
        self.angles.iter().map(|(j, a)| (*j, *a))
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

impl<const N: usize> From<[(JointName, f64); N]> for Pose {
    fn from(angles: [(JointName, f64); N]) -> Self {
        Self {
            angles: BTreeMap::from(angles),
        }
    }
}

impl FromIterator<(JointName, f64)> for Pose {
    fn from_iter<I: IntoIterator<Item = (JointName, f64)>>(iter: I) -> Self {
        Self {
            angles: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (joint, angle) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={:.1}", joint, angle)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_pose() {
        let home = Pose::home();
        assert_eq!(home.len(), 5);
        assert_eq!(home.angle(JointName::Shoulder), Some(260.0));
        assert_eq!(home.angle(JointName::WristRot), None);
    }

    #[test]
    fn test_iteration_follows_joint_order() {
        let pose = Pose::from([(JointName::Gripper, 1.0), (JointName::Base, 2.0)]);
        let joints: Vec<_> = pose.iter().map(|(j, _)| j).collect();
        assert_eq!(joints, vec![JointName::Base, JointName::Gripper]);
    }

    #[test]
    fn test_json_form() {
        let pose = Pose::from([(JointName::Base, 200.0)]);
        assert_eq!(serde_json::to_string(&pose).unwrap(), r#"{"base":200.0}"#);

        let parsed: Pose = serde_json::from_str(r#"{"elbow":60,"wrist_rot":5.5}"#).unwrap();
        assert_eq!(parsed.angle(JointName::Elbow), Some(60.0));
        assert_eq!(parsed.angle(JointName::WristRot), Some(5.5));
    }

    #[test]
    fn test_display() {
        let pose = Pose::from([(JointName::Elbow, 15.0), (JointName::Base, 240.0)]);
        assert_eq!(pose.to_string(), "base=240.0, elbow=15.0");
    }
}
