//! 挥手打招呼

use anyhow::Result;
use youpinitel_arm::{Gesture, JointName, Pose};

use crate::session::Session;

pub const LABEL: &str = "dis bonjour avec le bras";

/// 手臂伸展姿态
fn pose_extended() -> Pose {
    Pose::from([
        (JointName::Shoulder, 170.0),
        (JointName::Elbow, 60.0),
        (JointName::Base, 240.0),
        (JointName::Wrist, 202.0),
        (JointName::Gripper, 150.0),
    ])
}

/// 打招呼动作序列
pub fn greeting_gesture(home: &Pose) -> Gesture {
    let to_the_right = Pose::from([(JointName::Base, 200.0)]);
    let to_the_left = Pose::from([(JointName::Base, 280.0)]);

    Gesture::new([
        (Some(pose_extended()), 1.0),
        (None, 0.5),
        (Some(to_the_right), 0.5),
        (Some(to_the_left), 1.0),
        (Some(pose_extended()), 0.5),
        (None, 1.0),
        (Some(home.clone()), 2.0),
    ])
}

pub fn run(session: &mut Session) -> Result<()> {
    session
        .terminal
        .display_text_center(" je vous dis bonjour ", 23, Some('-'))?;
    let gesture = greeting_gesture(&session.home);
    session.arm.execute_gesture(&gesture)?;
    Ok(())
}
