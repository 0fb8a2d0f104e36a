//! Youpi 本地接口（Arduino 接口板）
//!
//! 接口板固件使用行文本协议，每条命令一行，应答一行：
//!
//! | 命令 | 应答 |
//! |---|---|
//! | `MOVE <joint> <angle>` | `OK` |
//! | `ANGLE <joint>` | `OK <angle>` |
//! | `POSE` | `OK base=<a> shoulder=<a> ...` |
//! | `HOME` | 回零完成后 `OK` |
//! | `GRIP OPEN` / `GRIP CLOSE` | `OK` |
//!
//! 出错时应答 `ERR <message>`。上电后固件发送一行 `READY`。

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::arm::Arm;
use crate::error::ArmError;
use crate::gesture::{Clock, Gesture, SystemClock, play};
use crate::joint::{ArmGeneration, JointName};
use crate::link::{open_serial, read_line};
use crate::pose::Pose;

/// 普通命令应答超时
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// 回零命令应答超时
const HOME_TIMEOUT: Duration = Duration::from_secs(60);

/// 默认就绪等待时间
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// 通过 Arduino 接口板连接的 Youpi
pub struct YoupiArm<L> {
    port: L,
    clock: Box<dyn Clock>,
}

impl YoupiArm<Box<dyn serialport::SerialPort>> {
    /// 打开接口板串口
    pub fn open(path: &str) -> Result<Self, ArmError> {
        info!(
            "opening Youpi interface on {} (baudrate={})",
            path,
            ArmGeneration::YOUPI_BAUDRATE
        );
        let port = open_serial(path, ArmGeneration::YOUPI_BAUDRATE)?;
        Ok(Self::new(port))
    }
}

impl<L: Read + Write> YoupiArm<L> {
    pub fn new(port: L) -> Self {
        Self {
            port,
            clock: Box::new(SystemClock),
        }
    }

    /// 替换动作回放使用的计时源
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// 取回底层字节流
    pub fn into_inner(self) -> L {
        self.port
    }

    /// 阻塞等待固件发送 `READY`
    pub fn wait_for_ready(&mut self, timeout: Duration) -> Result<(), ArmError> {
        let deadline = Instant::now() + timeout;
        loop {
            match read_line(&mut self.port, deadline) {
                Ok(line) if line.trim() == "READY" => {
                    debug!("Youpi interface ready");
                    return Ok(());
                },
                Ok(line) => trace!("ignoring banner line {:?}", line),
                Err(ArmError::Timeout) => return Err(ArmError::NotReady(timeout)),
                Err(e) => return Err(e),
            }
        }
    }

    fn request(&mut self, command: &str, timeout: Duration) -> Result<String, ArmError> {
        transact(&mut self.port, command, timeout)
    }
}

/// 发送一条命令并读取应答负载
fn transact<L: Read + Write>(
    port: &mut L,
    command: &str,
    timeout: Duration,
) -> Result<String, ArmError> {
    trace!("arm <- {:?}", command);
    port.write_all(command.as_bytes())?;
    port.write_all(b"\n")?;
    port.flush()?;

    let deadline = Instant::now() + timeout;
    loop {
        let line = read_line(port, deadline)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "OK" {
            return Ok(String::new());
        }
        if let Some(payload) = line.strip_prefix("OK ") {
            return Ok(payload.trim().to_string());
        }
        if let Some(message) = line.strip_prefix("ERR") {
            return Err(ArmError::Firmware(message.trim().to_string()));
        }
        return Err(ArmError::InvalidResponse(line.to_string()));
    }
}

fn move_command(joint: JointName, angle: f64) -> String {
    format!("MOVE {} {:.1}", joint, angle)
}

fn parse_angle(payload: &str) -> Result<f64, ArmError> {
    payload
        .parse::<f64>()
        .map_err(|_| ArmError::InvalidResponse(format!("not an angle: {:?}", payload)))
}

/// 解析 `base=240.0 shoulder=260.0 ...`
fn parse_pose(payload: &str) -> Result<Pose, ArmError> {
    payload
        .split_whitespace()
        .map(|item| -> Result<(JointName, f64), ArmError> {
            let (name, angle) = item
                .split_once('=')
                .ok_or_else(|| ArmError::InvalidResponse(format!("bad pose item: {:?}", item)))?;
            Ok((name.parse::<JointName>()?, parse_angle(angle)?))
        })
        .collect()
}

impl<L: Read + Write> Arm for YoupiArm<L> {
    fn generation(&self) -> ArmGeneration {
        ArmGeneration::Youpi
    }

    fn joint_names(&self) -> Vec<JointName> {
        ArmGeneration::Youpi.joints()
    }

    fn current_angle(&mut self, joint: JointName) -> Result<f64, ArmError> {
        let payload = self.request(&format!("ANGLE {}", joint), REPLY_TIMEOUT)?;
        parse_angle(&payload)
    }

    fn set_goal_angle(
        &mut self,
        joint: JointName,
        angle: f64,
        _speed: Option<f64>,
    ) -> Result<(), ArmError> {
        // 固件自行控制速度
        self.request(&move_command(joint, angle), REPLY_TIMEOUT)
            .map(|_| ())
    }

    fn get_pose(&mut self) -> Result<Pose, ArmError> {
        let payload = self.request("POSE", REPLY_TIMEOUT)?;
        parse_pose(&payload)
    }

    fn reset(&mut self) -> Result<(), ArmError> {
        self.request("HOME", HOME_TIMEOUT).map(|_| ())
    }

    fn open_gripper(&mut self) -> Result<(), ArmError> {
        self.request("GRIP OPEN", REPLY_TIMEOUT).map(|_| ())
    }

    fn close_gripper(&mut self) -> Result<(), ArmError> {
        self.request("GRIP CLOSE", REPLY_TIMEOUT).map(|_| ())
    }

    fn execute_gesture(&mut self, gesture: &Gesture) -> Result<(), ArmError> {
        let Self { port, clock } = self;
        play(gesture, clock.as_mut(), |joint, angle| {
            transact(port, &move_command(joint, angle), REPLY_TIMEOUT).map(|_| ())
        })
    }
}
