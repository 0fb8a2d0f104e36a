//! 手动关节控制
//!
//! 每个按键对应一个关节增量，读取当前角度、加上步长后下发目标，不等待到位。

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};
use youpinitel_arm::{ArmGeneration, JointName};
use youpinitel_minitel::Key;

use crate::session::Session;

pub const LABEL: &str = "contrôle manuel";

/// 单次按键等待上限，超时即退出
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// 每次按键的角度步长（度）
const STEP: f64 = 5.0;

const LEGEND: [&str; 11] = [
    "Utilisez les touches du clavier",
    "pour contrôler le bras.",
    "",
    "1 4 : épaule",
    "2 5 : coude",
    "3 6 : poignet",
    "7 9 : rotation bras",
    "* # : rotation pince",
    "O F : ouverture/fermeture pince",
    "",
    " R  : retour position initiale",
];

/// 按键动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManualAction {
    /// 关节增量（度）
    Move(JointName, f64),
    OpenGripper,
    CloseGripper,
    Home,
}

/// 手动控制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManualState {
    AwaitingKey,
    Exiting,
}

/// 按键到动作的映射；未映射的按键返回 `None`
pub fn action_for(key: Key, generation: ArmGeneration) -> Option<ManualAction> {
    let Key::Char(c) = key else {
        return None;
    };
    let elbow_up = STEP * generation.elbow_up_sign();

    let action = match c.to_ascii_uppercase() {
        '1' => ManualAction::Move(JointName::Shoulder, STEP),
        '4' => ManualAction::Move(JointName::Shoulder, -STEP),
        '2' => ManualAction::Move(JointName::Elbow, elbow_up),
        '5' => ManualAction::Move(JointName::Elbow, -elbow_up),
        '3' => ManualAction::Move(JointName::Wrist, STEP),
        '6' => ManualAction::Move(JointName::Wrist, -STEP),
        '7' => ManualAction::Move(JointName::Base, STEP),
        '9' => ManualAction::Move(JointName::Base, -STEP),
        '*' if generation.has_wrist_rotation() => ManualAction::Move(JointName::WristRot, -STEP),
        '#' if generation.has_wrist_rotation() => ManualAction::Move(JointName::WristRot, STEP),
        'O' => ManualAction::OpenGripper,
        'F' => ManualAction::CloseGripper,
        'R' => ManualAction::Home,
        _ => return None,
    };
    Some(action)
}

fn render(session: &mut Session) -> Result<()> {
    let terminal = session.terminal.as_mut();
    terminal.clear_screen()?;
    for (line, text) in (4u8..).zip(LEGEND) {
        terminal.display_text(text, 0, line)?;
    }
    terminal.display_text_center("Retour : menu principal", 23, None)?;
    Ok(())
}

fn apply(session: &mut Session, action: ManualAction) -> Result<()> {
    match action {
        ManualAction::Move(joint, delta) => {
            let speed = session.generation().manual_speed();
            let current = session.arm.current_angle(joint)?;
            let target = current + delta;
            info!(
                "moving joint {} from angle {:5.1} to angle {:5.1}",
                joint, current, target
            );
            session.arm.set_goal_angle(joint, target, speed)?;
        },
        ManualAction::OpenGripper => session.arm.open_gripper()?,
        ManualAction::CloseGripper => session.arm.close_gripper()?,
        ManualAction::Home => session.move_arm_home()?,
    }
    Ok(())
}

pub fn run(session: &mut Session) -> Result<()> {
    render(session)?;

    let generation = session.generation();
    let mut state = ManualState::AwaitingKey;
    while state == ManualState::AwaitingKey {
        state = match session.terminal.read_key(IDLE_TIMEOUT)? {
            None | Some(Key::RETOUR) => ManualState::Exiting,
            Some(key) => {
                match action_for(key, generation) {
                    Some(action) => apply(session, action)?,
                    None => {
                        debug!("unmapped key {:?}", key);
                        session.terminal.beep()?;
                    },
                }
                ManualState::AwaitingKey
            },
        };
    }

    let terminal = session.terminal.as_mut();
    terminal.clear_screen()?;
    terminal.display_text_center("Réinitialisation du bras", 5, None)?;
    terminal.display_text_center("Veuillez patienter...", 7, None)?;
    session.move_arm_home()
}
