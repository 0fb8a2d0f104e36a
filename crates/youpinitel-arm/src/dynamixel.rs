//! AX-12 本地接口（经 USB2AX）
//!
//! 伺服通信由 `dynamixel_driver` 完成，本模块只负责关节配置：
//! 逻辑角度与伺服角度之间的方向、偏移和限位换算。
//! 驱动是异步的，这里用单线程 tokio runtime 同步调用。

use std::collections::BTreeMap;

use dynamixel_driver::DynamixelDriver;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::arm::Arm;
use crate::error::ArmError;
use crate::gesture::{Clock, Gesture, SystemClock, play};
use crate::joint::{ArmGeneration, JointName};
use crate::pose::Pose;

/// AX-12 行程（度）
pub const AX12_RANGE_DEGREES: f64 = 300.0;

/// 回零动作时长（秒）
const HOMING_SECONDS: f64 = 2.0;

/// 关节安装方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Direct,
    Indirect,
}

/// 单个关节的伺服配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// 伺服 ID
    pub id: u8,
    #[serde(default)]
    pub orientation: Orientation,
    /// 逻辑角度 0 对应的伺服角度（度）
    #[serde(default)]
    pub angle_offset: f64,
    #[serde(default)]
    pub angle_min: f64,
    #[serde(default = "default_angle_max")]
    pub angle_max: f64,
}

fn default_angle_max() -> f64 {
    AX12_RANGE_DEGREES
}

impl JointConfig {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            orientation: Orientation::Direct,
            angle_offset: 0.0,
            angle_min: 0.0,
            angle_max: AX12_RANGE_DEGREES,
        }
    }

    /// 限位和偏移均为有限值且 `angle_min <= angle_max`
    pub fn has_valid_limits(&self) -> bool {
        self.angle_min.is_finite()
            && self.angle_max.is_finite()
            && self.angle_offset.is_finite()
            && self.angle_min <= self.angle_max
    }

    /// 逻辑角度 → 伺服角度（0..=300 度）
    ///
    /// 先按关节限位截断，再按方向和偏移换算。
    pub fn angle_to_servo(&self, angle: f64) -> f64 {
        // max/min 而非 clamp：限位异常时不 panic
        let angle = angle.max(self.angle_min).min(self.angle_max);
        let servo = match self.orientation {
            Orientation::Direct => self.angle_offset + angle,
            Orientation::Indirect => AX12_RANGE_DEGREES - (self.angle_offset + angle),
        };
        servo.max(0.0).min(AX12_RANGE_DEGREES)
    }

    /// 伺服角度 → 逻辑角度
    pub fn servo_to_angle(&self, servo: f64) -> f64 {
        match self.orientation {
            Orientation::Direct => servo - self.angle_offset,
            Orientation::Indirect => AX12_RANGE_DEGREES - servo - self.angle_offset,
        }
    }
}

/// 按伺服 ID 读写位置（度）
pub trait ServoBus {
    fn write_degrees(&mut self, id: u8, degrees: f64) -> Result<(), ArmError>;

    fn read_degrees(&mut self, id: u8) -> Result<f64, ArmError>;
}

/// 基于 `dynamixel_driver` 的伺服总线
pub struct DriverBus {
    runtime: Runtime,
    driver: DynamixelDriver,
}

impl DriverBus {
    /// 打开 USB2AX 串口
    pub fn open(path: &str, baudrate: u32) -> Result<Self, ArmError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        // 串口需要在 runtime 上下文中注册
        let driver = {
            let _guard = runtime.enter();
            DynamixelDriver::with_baud_rate(path, baudrate).map_err(|e| ArmError::Driver {
                port: path.to_string(),
                message: e.to_string(),
            })?
        };
        Ok(Self { runtime, driver })
    }
}

impl ServoBus for DriverBus {
    fn write_degrees(&mut self, id: u8, degrees: f64) -> Result<(), ArmError> {
        let Self { runtime, driver } = self;
        runtime
            .block_on(driver.write_position_degrees(id, (degrees as f32).into()))
            .map_err(|e| ArmError::Servo {
                id,
                message: e.to_string(),
            })
    }

    fn read_degrees(&mut self, id: u8) -> Result<f64, ArmError> {
        let Self { runtime, driver } = self;
        let degrees = runtime
            .block_on(driver.read_position_degrees(id))
            .map_err(|e| ArmError::Servo {
                id,
                message: e.to_string(),
            })?;
        Ok(f64::from(degrees))
    }
}

/// AX-12 伺服臂
pub struct DynamixelArm<B> {
    bus: B,
    joints: BTreeMap<JointName, JointConfig>,
    home: Pose,
    clock: Box<dyn Clock>,
}

impl DynamixelArm<DriverBus> {
    /// 打开 USB2AX 串口
    pub fn open(
        path: &str,
        baudrate: u32,
        joints: BTreeMap<JointName, JointConfig>,
    ) -> Result<Self, ArmError> {
        info!("opening AX12 bus on {} (baudrate={})", path, baudrate);
        Ok(Self::new(DriverBus::open(path, baudrate)?, joints))
    }
}

impl<B: ServoBus> DynamixelArm<B> {
    pub fn new(bus: B, joints: BTreeMap<JointName, JointConfig>) -> Self {
        Self {
            bus,
            joints,
            home: Pose::home(),
            clock: Box::new(SystemClock),
        }
    }

    /// 替换动作回放使用的计时源
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// 替换回零姿态
    pub fn with_home(mut self, home: Pose) -> Self {
        self.home = home;
        self
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn config(&self, joint: JointName) -> Result<&JointConfig, ArmError> {
        self.joints
            .get(&joint)
            .ok_or(ArmError::JointUnavailable(joint))
    }
}

fn move_joint<B: ServoBus>(bus: &mut B, config: &JointConfig, angle: f64) -> Result<(), ArmError> {
    bus.write_degrees(config.id, config.angle_to_servo(angle))
}

impl<B: ServoBus> Arm for DynamixelArm<B> {
    fn generation(&self) -> ArmGeneration {
        ArmGeneration::Ax12
    }

    fn joint_names(&self) -> Vec<JointName> {
        self.joints.keys().copied().collect()
    }

    fn current_angle(&mut self, joint: JointName) -> Result<f64, ArmError> {
        let config = self.config(joint)?.clone();
        let servo = self.bus.read_degrees(config.id)?;
        Ok(config.servo_to_angle(servo))
    }

    fn set_goal_angle(
        &mut self,
        joint: JointName,
        angle: f64,
        speed: Option<f64>,
    ) -> Result<(), ArmError> {
        let config = self.config(joint)?.clone();
        if let Some(speed) = speed {
            // 驱动不提供移动速度寄存器，伺服按当前设置运行
            debug!("moving speed {} rpm requested for {}, using servo setting", speed, joint);
        }
        move_joint(&mut self.bus, &config, angle)
    }

    fn reset(&mut self) -> Result<(), ArmError> {
        let gesture = Gesture::single(self.home.clone(), HOMING_SECONDS);
        self.execute_gesture(&gesture)
    }

    fn execute_gesture(&mut self, gesture: &Gesture) -> Result<(), ArmError> {
        let Self {
            bus, joints, clock, ..
        } = self;
        play(gesture, clock.as_mut(), |joint, angle| {
            let config = joints.get(&joint).ok_or(ArmError::JointUnavailable(joint))?;
            move_joint(bus, config, angle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::time::Duration;

    /// 记录写入的伺服角度
    #[derive(Debug, Default)]
    struct FakeServos {
        positions: HashMap<u8, f64>,
        writes: Vec<(u8, f64)>,
    }

    impl ServoBus for FakeServos {
        fn write_degrees(&mut self, id: u8, degrees: f64) -> Result<(), ArmError> {
            self.writes.push((id, degrees));
            self.positions.insert(id, degrees);
            Ok(())
        }

        fn read_degrees(&mut self, id: u8) -> Result<f64, ArmError> {
            self.positions.get(&id).copied().ok_or(ArmError::Servo {
                id,
                message: "no status".to_string(),
            })
        }
    }

    struct NoWait;

    impl Clock for NoWait {
        fn sleep(&mut self, _duration: Duration) {}
    }

    fn arm() -> DynamixelArm<FakeServos> {
        let mut shoulder = JointConfig::new(2);
        shoulder.orientation = Orientation::Indirect;
        let joints = BTreeMap::from([
            (JointName::Base, JointConfig::new(1)),
            (JointName::Shoulder, shoulder),
        ]);
        DynamixelArm::new(FakeServos::default(), joints).with_clock(NoWait)
    }

    #[test]
    fn test_angle_conversion() {
        let config = JointConfig::new(1);
        assert_eq!(config.angle_to_servo(150.0), 150.0);
        assert_eq!(config.angle_to_servo(400.0), 300.0);
        assert_eq!(config.angle_to_servo(-5.0), 0.0);

        let mut reversed = JointConfig::new(2);
        reversed.orientation = Orientation::Indirect;
        reversed.angle_offset = 10.0;
        assert_eq!(reversed.angle_to_servo(20.0), 270.0);
        assert_eq!(reversed.servo_to_angle(270.0), 20.0);
    }

    #[test]
    fn test_reversed_limits_do_not_panic() {
        let config: JointConfig = serde_json::from_str(r#"{"id": 1, "angle_max": -10}"#).unwrap();
        assert!(!config.has_valid_limits());
        let servo = config.angle_to_servo(20.0);
        assert!((0.0..=AX12_RANGE_DEGREES).contains(&servo));
    }

    #[test]
    fn test_valid_limits() {
        assert!(JointConfig::new(1).has_valid_limits());
        let mut config = JointConfig::new(1);
        config.angle_offset = f64::NAN;
        assert!(!config.has_valid_limits());
    }

    #[test]
    fn test_set_goal_angle_writes_servo_degrees() {
        let mut arm = arm();
        arm.set_goal_angle(JointName::Base, 120.0, Some(10.0)).unwrap();
        arm.set_goal_angle(JointName::Shoulder, 100.0, None).unwrap();
        assert_eq!(arm.into_inner().writes, vec![(1, 120.0), (2, 200.0)]);
    }

    #[test]
    fn test_current_angle_follows_orientation() {
        let mut arm = arm();
        arm.set_goal_angle(JointName::Shoulder, 40.0, None).unwrap();
        assert_eq!(arm.current_angle(JointName::Shoulder).unwrap(), 40.0);
    }

    #[test]
    fn test_servo_error_is_propagated() {
        let mut arm = arm();
        assert!(matches!(
            arm.current_angle(JointName::Base),
            Err(ArmError::Servo { id: 1, .. })
        ));
    }

    #[test]
    fn test_unconfigured_joint() {
        let mut arm = arm();
        assert!(matches!(
            arm.set_goal_angle(JointName::Gripper, 100.0, None),
            Err(ArmError::JointUnavailable(JointName::Gripper))
        ));
        assert!(arm.into_inner().writes.is_empty());
    }

    #[test]
    fn test_reset_plays_home_gesture() {
        let home = Pose::from([(JointName::Base, 150.0), (JointName::Shoulder, 0.0)]);
        let mut arm = arm().with_home(home);

        arm.reset().unwrap();

        assert_eq!(arm.into_inner().writes, vec![(1, 150.0), (2, 300.0)]);
    }

    #[test]
    fn test_joint_config_defaults_from_json() {
        let config: JointConfig = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(config, JointConfig::new(4));
    }

    proptest! {
        #[test]
        fn prop_round_trip_inside_limits(angle in 0.0f64..250.0, offset in 0.0f64..50.0) {
            let mut config = JointConfig::new(1);
            config.angle_offset = offset;
            let back = config.servo_to_angle(config.angle_to_servo(angle));
            prop_assert!((back - angle).abs() < 1e-9);
        }

        #[test]
        fn prop_servo_angle_stays_in_range(
            angle in -1000.0f64..1000.0,
            offset in -50.0f64..50.0,
            min in -400.0f64..400.0,
            max in -400.0f64..400.0,
        ) {
            let mut config = JointConfig::new(1);
            config.angle_offset = offset;
            config.angle_min = min;
            config.angle_max = max;
            let servo = config.angle_to_servo(angle);
            prop_assert!((0.0..=AX12_RANGE_DEGREES).contains(&servo));
        }
    }
}
