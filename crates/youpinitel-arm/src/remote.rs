//! 远程机械臂（会话总线上的控制器服务）
//!
//! 控制器服务在 `/service` 发布机械臂对象，每个关节在 `/joint/<name>` 发布独立对象。
//! 动作序列以 JSON 形式一次性下发。

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};
use zbus::blocking::{Connection, Proxy};

use crate::arm::Arm;
use crate::error::ArmError;
use crate::gesture::Gesture;
use crate::joint::{ArmGeneration, JointName};
use crate::pose::Pose;

/// 服务对象路径
pub const SERVICE_OBJECT_PATH: &str = "/service";

/// 服务接口名
pub const SERVICE_INTERFACE: &str = "org.pobot.nros.Arm";

/// 关节接口名
pub const JOINT_INTERFACE: &str = "org.pobot.nros.Joint";

/// 关节对象路径
pub fn joint_object_path(joint: &str) -> String {
    format!("/joint/{}", joint)
}

/// 远程控制器调用
///
/// 只解析服务名并调用方法，不涉及总线传输本身。
pub trait ArmBus {
    /// 远端关节名称
    fn joint_names(&mut self) -> Result<Vec<String>, ArmError>;

    fn get_pose(&mut self) -> Result<HashMap<String, f64>, ArmError>;

    fn reset(&mut self) -> Result<(), ArmError>;

    /// 下发 JSON 形式的动作序列
    fn execute_gesture(&mut self, gesture_json: &str) -> Result<(), ArmError>;

    fn joint_current_angle(&mut self, joint: &str) -> Result<f64, ArmError>;

    /// `speed` 为 0 表示远端默认速度
    fn joint_set_goal_angle(&mut self, joint: &str, angle: f64, speed: f64)
    -> Result<(), ArmError>;
}

/// 基于 zbus 的会话总线实现
pub struct ZbusArmBus {
    service: Proxy<'static>,
    joints: BTreeMap<String, Proxy<'static>>,
}

impl ZbusArmBus {
    /// 连接服务，并为远端报告的每个关节建立代理
    pub fn connect(busname: &str) -> Result<Self, ArmError> {
        info!("connecting to arm controller '{}'", busname);
        let connection = Connection::session()?;
        let service = Proxy::new(
            &connection,
            busname.to_string(),
            SERVICE_OBJECT_PATH,
            SERVICE_INTERFACE,
        )?;

        let names: Vec<String> = service.call("get_joint_names", &())?;
        let mut joints = BTreeMap::new();
        for name in names {
            let proxy = Proxy::new(
                &connection,
                busname.to_string(),
                joint_object_path(&name),
                JOINT_INTERFACE,
            )?;
            debug!("joint proxy created for {}", name);
            joints.insert(name, proxy);
        }

        Ok(Self { service, joints })
    }

    fn joint(&self, joint: &str) -> Result<&Proxy<'static>, ArmError> {
        self.joints
            .get(joint)
            .ok_or_else(|| ArmError::UnknownJoint(joint.to_string()))
    }
}

impl ArmBus for ZbusArmBus {
    fn joint_names(&mut self) -> Result<Vec<String>, ArmError> {
        Ok(self.joints.keys().cloned().collect())
    }

    fn get_pose(&mut self) -> Result<HashMap<String, f64>, ArmError> {
        Ok(self.service.call("get_pose", &())?)
    }

    fn reset(&mut self) -> Result<(), ArmError> {
        Ok(self.service.call("reset", &())?)
    }

    fn execute_gesture(&mut self, gesture_json: &str) -> Result<(), ArmError> {
        Ok(self.service.call("execute_gesture", &(gesture_json,))?)
    }

    fn joint_current_angle(&mut self, joint: &str) -> Result<f64, ArmError> {
        Ok(self.joint(joint)?.call("get_current_angle", &())?)
    }

    fn joint_set_goal_angle(
        &mut self,
        joint: &str,
        angle: f64,
        speed: f64,
    ) -> Result<(), ArmError> {
        // immediate=true, wait=false
        Ok(self
            .joint(joint)?
            .call("set_goal_angle", &(angle, speed, true, false))?)
    }
}

/// 通过总线控制的机械臂
pub struct RemoteArm<B> {
    bus: B,
    generation: ArmGeneration,
    joints: Vec<JointName>,
}

impl<B: ArmBus> RemoteArm<B> {
    /// 查询远端关节并建立映射
    ///
    /// 不认识的关节名被忽略。
    pub fn new(mut bus: B, generation: ArmGeneration) -> Result<Self, ArmError> {
        let mut joints = Vec::new();
        for name in bus.joint_names()? {
            match name.parse::<JointName>() {
                Ok(joint) => joints.push(joint),
                Err(_) => warn!("ignoring unknown remote joint '{}'", name),
            }
        }
        joints.sort();
        info!("remote arm joints: {:?}", joints);
        Ok(Self {
            bus,
            generation,
            joints,
        })
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn check_joint(&self, joint: JointName) -> Result<(), ArmError> {
        if self.joints.contains(&joint) {
            Ok(())
        } else {
            Err(ArmError::JointUnavailable(joint))
        }
    }
}

impl RemoteArm<ZbusArmBus> {
    /// 连接会话总线上的控制器
    pub fn connect(busname: &str, generation: ArmGeneration) -> Result<Self, ArmError> {
        Self::new(ZbusArmBus::connect(busname)?, generation)
    }
}

impl<B: ArmBus> Arm for RemoteArm<B> {
    fn generation(&self) -> ArmGeneration {
        self.generation
    }

    fn joint_names(&self) -> Vec<JointName> {
        self.joints.clone()
    }

    fn current_angle(&mut self, joint: JointName) -> Result<f64, ArmError> {
        self.check_joint(joint)?;
        self.bus.joint_current_angle(joint.as_str())
    }

    fn set_goal_angle(
        &mut self,
        joint: JointName,
        angle: f64,
        speed: Option<f64>,
    ) -> Result<(), ArmError> {
        self.check_joint(joint)?;
        self.bus
            .joint_set_goal_angle(joint.as_str(), angle, speed.unwrap_or(0.0))
    }

    fn get_pose(&mut self) -> Result<Pose, ArmError> {
        let pose = self
            .bus
            .get_pose()?
            .into_iter()
            .filter_map(|(name, angle)| match name.parse::<JointName>() {
                Ok(joint) => Some((joint, angle)),
                Err(_) => {
                    warn!("ignoring unknown remote joint '{}' in pose", name);
                    None
                },
            })
            .collect();
        Ok(pose)
    }

    fn reset(&mut self) -> Result<(), ArmError> {
        self.bus.reset()
    }

    fn execute_gesture(&mut self, gesture: &Gesture) -> Result<(), ArmError> {
        let json = gesture.to_json()?;
        debug!("sending gesture ({} steps) to remote arm", gesture.len());
        self.bus.execute_gesture(&json)
    }
}
