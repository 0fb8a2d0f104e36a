//! # YouPinitel demo
//!
//! 用 Minitel 终端操控 Youpi 教学机械臂（或 AX-12 机械臂）的演示程序。
//!
//! ```bash
//! # 安装默认配置文件
//! youpinitel-demo --install-config
//!
//! # 使用默认配置启动
//! youpinitel-demo
//!
//! # 覆盖串口并打开调试日志
//! youpinitel-demo -m /dev/ttyUSB1 -p /dev/ttyACM1 -g ax12 -d
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use youpinitel_arm::ArmGeneration;

mod app;
mod config;
mod demos;
mod menu;
mod session;
mod transport;

use app::Application;
use config::{Overrides, default_config_path, install_default_config};

/// YouPinitel 演示程序
#[derive(Parser, Debug)]
#[command(name = "youpinitel-demo")]
#[command(about = "Youpi arm demonstration driven by a Minitel terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Minitel 串口
    #[arg(short = 'm', long)]
    minitel_port: Option<PathBuf>,

    /// 机械臂串口（本地连接）
    #[arg(short = 'p', long)]
    arm_port: Option<PathBuf>,

    /// 机械臂控制器服务名（远程连接）
    #[arg(short = 'b', long)]
    arm_busname: Option<String>,

    /// 机械臂代际（youpi | ax12）
    #[arg(short = 'g', long)]
    arm_generation: Option<ArmGeneration>,

    /// 配置文件路径
    #[arg(short = 'c', long)]
    config_file: Option<PathBuf>,

    /// 调试日志
    #[arg(short = 'd', long)]
    debug: bool,

    /// 安装默认配置文件后退出
    #[arg(long)]
    install_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            minitel_port: self.minitel_port.clone(),
            arm_port: self.arm_port.clone(),
            arm_busname: self.arm_busname.clone(),
            arm_generation: self.arm_generation,
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,youpinitel_demo={level},youpinitel_arm={level},youpinitel_minitel={level}"
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_file = cli.config_file.clone().unwrap_or_else(default_config_path);

    if cli.install_config {
        return match install_default_config(&config_file) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("unable to install configuration file ({})", e);
                ExitCode::FAILURE
            },
        };
    }

    let app = match Application::new(&config_file, &cli.overrides()) {
        Ok(app) => app,
        Err(e) => {
            error!("unable to initialize application instance ({})", e);
            return ExitCode::FAILURE;
        },
    };

    match app.run() {
        Ok(()) => {
            info!("bye");
            ExitCode::SUCCESS
        },
        Err(e) if cli.debug => {
            error!("{:?}", e);
            ExitCode::FAILURE
        },
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        },
    }
}
