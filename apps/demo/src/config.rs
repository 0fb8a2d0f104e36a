//! 配置加载
//!
//! JSON 配置文件 + 命令行覆盖项 → [`Settings`]。
//! 命令行值优先于文件值；设备路径在构造时必须存在。

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use youpinitel_arm::{ArmGeneration, JointConfig, JointName};
use youpinitel_minitel::DEFAULT_BAUDRATE;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "youpinitel-demo.json";

/// 内置默认配置
pub const DEFAULT_CONFIG: &str = include_str!("../data/youpinitel-demo.json");

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("missing configuration key: {0}")]
    MissingKey(&'static str),

    #[error("port not found: {}", .0.display())]
    PortNotFound(PathBuf),

    #[error("at least one of arm_port or arm_busname must be provided")]
    NoArmTransport,

    #[error("invalid angle limits for joint {0}")]
    InvalidJointLimits(JointName),

    #[error("unable to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    minitel: Option<MinitelSection>,
    arm: Option<ArmSection>,
}

#[derive(Debug, Deserialize)]
struct MinitelSection {
    port: Option<PathBuf>,
    baudrate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ArmSection {
    port: Option<PathBuf>,
    baudrate: Option<u32>,
    busname: Option<String>,
    generation: Option<ArmGeneration>,
    #[serde(default)]
    joints: BTreeMap<JointName, JointConfig>,
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub minitel_port: Option<PathBuf>,
    pub arm_port: Option<PathBuf>,
    pub arm_busname: Option<String>,
    pub arm_generation: Option<ArmGeneration>,
}

/// 机械臂连接方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmTransport {
    /// 本地串口
    Local { port: PathBuf, baudrate: u32 },
    /// 会话总线上的控制器服务
    Remote { busname: String },
}

/// 解析后的运行配置
#[derive(Debug, Clone)]
pub struct Settings {
    pub minitel_port: PathBuf,
    pub minitel_baudrate: u32,
    pub arm: ArmTransport,
    pub generation: ArmGeneration,
    /// AX-12 关节定义
    pub joints: BTreeMap<JointName, JointConfig>,
}

impl Settings {
    /// 从 JSON 读取并应用覆盖项
    pub fn load<R: Read>(reader: R, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file: FileConfig = serde_json::from_reader(reader)?;
        Self::resolve(file, overrides)
    }

    /// 从 JSON 文件读取
    pub fn load_file(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(file, overrides)
    }

    fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let minitel = file.minitel.ok_or(ConfigError::MissingKey("minitel"))?;
        let arm = file.arm.ok_or(ConfigError::MissingKey("arm"))?;

        let minitel_port = overrides
            .minitel_port
            .clone()
            .or(minitel.port)
            .ok_or(ConfigError::MissingKey("minitel.port"))?;
        let minitel_port = existing(minitel_port)?;

        let generation = overrides
            .arm_generation
            .or(arm.generation)
            .unwrap_or_default();

        // 命令行优先，其次文件；同一来源中串口优先于总线
        let transport = match (&overrides.arm_port, &overrides.arm_busname) {
            (Some(port), _) => Some(Endpoint::Port(port.clone())),
            (None, Some(busname)) => Some(Endpoint::Bus(busname.clone())),
            (None, None) => match (arm.port, arm.busname) {
                (Some(port), _) => Some(Endpoint::Port(port)),
                (None, Some(busname)) => Some(Endpoint::Bus(busname)),
                (None, None) => None,
            },
        };

        let arm_transport = match transport.ok_or(ConfigError::NoArmTransport)? {
            Endpoint::Port(port) => ArmTransport::Local {
                port: existing(port)?,
                baudrate: generation.local_baudrate(arm.baudrate),
            },
            Endpoint::Bus(busname) => ArmTransport::Remote { busname },
        };

        if let Some((joint, _)) = arm.joints.iter().find(|(_, c)| !c.has_valid_limits()) {
            return Err(ConfigError::InvalidJointLimits(*joint));
        }

        Ok(Self {
            minitel_port,
            minitel_baudrate: minitel.baudrate.unwrap_or(DEFAULT_BAUDRATE),
            arm: arm_transport,
            generation,
            joints: arm.joints,
        })
    }
}

enum Endpoint {
    Port(PathBuf),
    Bus(String),
}

fn existing(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::PortNotFound(path))
    }
}

/// 默认配置文件位置
///
/// root 用户使用 `/etc`，其他用户使用 `~/.youpinitel`。
pub fn default_config_path() -> PathBuf {
    if running_as_root() {
        Path::new("/etc").join(CONFIG_FILE_NAME)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".youpinitel")
            .join(CONFIG_FILE_NAME)
    }
}

#[cfg(unix)]
fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}

/// 安装默认配置文件
///
/// 目标已存在时保持不变并返回 `false`。
pub fn install_default_config(path: &Path) -> Result<bool, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path.exists() {
        info!(
            "configuration file already installed: keeping {} unchanged",
            path.display()
        );
        return Ok(false);
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_error)?;
    }
    fs::write(path, DEFAULT_CONFIG).map_err(io_error)?;
    info!("configuration file installed in {}", path.display());
    Ok(true)
}
