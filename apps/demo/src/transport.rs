//! 机械臂连接方式选择
//!
//! 启动时根据配置只选一次：本地串口（按机械臂代际选择链路）或会话总线上的远程控制器。

use anyhow::{Context, Result, bail};
use tracing::info;
use youpinitel_arm::youpi::READY_TIMEOUT;
use youpinitel_arm::{Arm, ArmGeneration, DynamixelArm, Pose, RemoteArm, YoupiArm};
use youpinitel_minitel::Terminal;

use crate::config::{ArmTransport, Settings};

/// 建立机械臂连接
///
/// 返回机械臂和它的回零姿态。
pub fn connect_arm(
    settings: &Settings,
    terminal: &mut dyn Terminal,
) -> Result<(Box<dyn Arm>, Pose)> {
    match &settings.arm {
        ArmTransport::Local { port, baudrate } => {
            let path = port.to_string_lossy();
            match settings.generation {
                ArmGeneration::Youpi => {
                    terminal.display_text_center("Initialisation du bras", 5, None)?;
                    terminal.display_text_center("Veuillez patienter...", 7, None)?;

                    let mut arm = YoupiArm::open(&path)
                        .with_context(|| format!("unable to connect to arm on {}", path))?;
                    arm.wait_for_ready(READY_TIMEOUT)
                        .context("arm interface initialization failed")?;
                    terminal.clear_screen()?;

                    let home = arm.get_pose().context("unable to read arm home pose")?;
                    info!("arm home pose:");
                    for (joint, angle) in home.iter() {
                        info!("- {:<10} : {:5.1}", joint, angle);
                    }
                    Ok((Box::new(arm), home))
                },
                ArmGeneration::Ax12 => {
                    if settings.joints.is_empty() {
                        bail!("no joint defined in configuration for AX12 arm");
                    }
                    let arm = DynamixelArm::open(&path, *baudrate, settings.joints.clone())
                        .with_context(|| format!("unable to connect to arm on {}", path))?;
                    Ok((Box::new(arm), Pose::home()))
                },
            }
        },
        ArmTransport::Remote { busname } => {
            let arm = RemoteArm::connect(busname, settings.generation)
                .with_context(|| format!("unable to connect to arm controller '{}'", busname))?;
            Ok((Box::new(arm), Pose::home()))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use youpinitel_minitel::MockTerminal;

    fn settings(generation: ArmGeneration, arm: ArmTransport) -> Settings {
        Settings {
            minitel_port: PathBuf::from("/dev/null"),
            minitel_baudrate: 1200,
            arm,
            generation,
            joints: BTreeMap::new(),
        }
    }

    #[test]
    fn test_ax12_without_joints_fails_before_opening_port() {
        let settings = settings(
            ArmGeneration::Ax12,
            ArmTransport::Local {
                // 不存在的路径：若尝试打开会得到另一种错误
                port: PathBuf::from("/dev/youpinitel-missing-port"),
                baudrate: 1_000_000,
            },
        );
        let mut terminal = MockTerminal::new();

        let err = connect_arm(&settings, &mut terminal).err().unwrap();
        assert_eq!(err.to_string(), "no joint defined in configuration for AX12 arm");
        assert!(terminal.ops().is_empty());
    }

    #[test]
    fn test_youpi_open_failure_is_reported_with_port() {
        let settings = settings(
            ArmGeneration::Youpi,
            ArmTransport::Local {
                port: PathBuf::from("/dev/youpinitel-missing-port"),
                baudrate: 9600,
            },
        );
        let mut terminal = MockTerminal::new();

        let err = connect_arm(&settings, &mut terminal).err().unwrap();
        assert_eq!(
            err.to_string(),
            "unable to connect to arm on /dev/youpinitel-missing-port"
        );
        // 等待提示已经显示
        assert_eq!(terminal.count_text("Initialisation du bras"), 1);
        assert_eq!(terminal.count_text("Veuillez patienter..."), 1);
    }
}
