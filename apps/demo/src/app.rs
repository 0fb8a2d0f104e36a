//! 应用实例：配置 → 终端 → 机械臂 → 主菜单

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use youpinitel_minitel::{Minitel, Terminal, ljust};

use crate::config::{ConfigError, Overrides, Settings};
use crate::session::Session;
use crate::transport::connect_arm;

/// 状态行标题
const BANNER: &str = "Démonstration YouPinitel";

pub struct Application {
    settings: Settings,
}

impl Application {
    /// 读取并校验配置
    ///
    /// 此阶段不打开任何设备。
    pub fn new(config_file: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        info!("configuration file : {}", config_file.display());
        info!("overrides : {:?}", overrides);

        let settings = Settings::load_file(config_file, overrides)?;
        info!("Minitel port : {}", settings.minitel_port.display());
        info!("arm transport : {:?} ({})", settings.arm, settings.generation);
        Ok(Self { settings })
    }

    /// 打开设备并运行主菜单，直到用户退出
    pub fn run(&self) -> Result<()> {
        let port = self.settings.minitel_port.to_string_lossy();
        let mut minitel = Minitel::open(&port, self.settings.minitel_baudrate)
            .with_context(|| format!("unable to open Minitel on {}", port))?;

        minitel.clear_all()?;
        let width = minitel.screen_width();
        minitel.display_status(&ljust(BANNER, width), true)?;

        let (arm, home) = connect_arm(&self.settings, &mut minitel)?;

        let mut session = Session::new(Box::new(minitel), arm, home);
        session.run_menu()?;
        info!("demonstration ended");
        Ok(())
    }
}
