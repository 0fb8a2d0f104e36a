//! 运行会话：终端 + 机械臂 + 主菜单状态机

use anyhow::{Context, Result};
use tracing::{debug, info};
use youpinitel_arm::{Arm, ArmGeneration, Clock, Gesture, Pose, SystemClock};
use youpinitel_minitel::Terminal;

use crate::demos::DemoRegistry;
use crate::menu::Menu;

/// 主菜单标题
const MENU_TITLE: &str = "Menu principal";

/// 告别语
pub const FAREWELL: &str = "Damien & Eric vous disent à bientôt.";

/// AX-12 回零动作时长（秒）
const HOMING_SECONDS: f64 = 2.0;

/// 主菜单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    ShowingMenu,
    RunningDemo(usize),
    Exiting,
}

/// 一次运行会话
///
/// 独占终端和机械臂，直到主菜单退出。
pub struct Session {
    pub(crate) terminal: Box<dyn Terminal>,
    pub(crate) arm: Box<dyn Arm>,
    /// 回零姿态
    pub(crate) home: Pose,
    pub(crate) clock: Box<dyn Clock>,
    demos: DemoRegistry,
}

impl Session {
    pub fn new(terminal: Box<dyn Terminal>, arm: Box<dyn Arm>, home: Pose) -> Self {
        Self {
            terminal,
            arm,
            home,
            clock: Box::new(SystemClock),
            demos: DemoRegistry::builtin(),
        }
    }

    /// 替换演示程序中的等待计时源
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn generation(&self) -> ArmGeneration {
        self.arm.generation()
    }

    /// 主菜单循环，直到用户退出
    pub fn run_menu(&mut self) -> Result<()> {
        let labels = self.demos.labels();
        debug!(
            "{} demos registered: {:?}",
            self.demos.len(),
            self.demos.names()
        );
        let mut state = MenuState::ShowingMenu;

        loop {
            state = match state {
                MenuState::ShowingMenu => {
                    info!("displaying main menu");
                    let menu = Menu::new(MENU_TITLE, &labels)
                        .prompt("Votre choix", 20)
                        .line_skip(2)
                        .margin_top(1)
                        .footer(" SOMMAIRE: fin ", 23);
                    match menu.get_choice(self.terminal.as_mut())? {
                        Some(index) => MenuState::RunningDemo(index),
                        None => MenuState::Exiting,
                    }
                },
                MenuState::RunningDemo(index) => {
                    let entry = *self.demos.get(index);
                    info!("selected demo : {}", entry.label);
                    (entry.handler)(self)
                        .with_context(|| format!("demo '{}' failed", entry.name))?;
                    MenuState::ShowingMenu
                },
                MenuState::Exiting => break,
            };
        }

        self.terminal.clear_all()?;
        self.terminal.display_text(FAREWELL, 0, 1)?;
        Ok(())
    }

    /// 回到初始位置（阻塞）
    ///
    /// Youpi 使用固件回零，AX-12 播放一步回零动作。
    pub fn move_arm_home(&mut self) -> Result<()> {
        info!("moving arm to its home position...");
        match self.generation() {
            ArmGeneration::Youpi => self.arm.reset()?,
            ArmGeneration::Ax12 => {
                let gesture = Gesture::single(self.home.clone(), HOMING_SECONDS);
                self.arm.execute_gesture(&gesture)?;
            },
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;
    use youpinitel_arm::{ArmCommand, MockArm};
    use youpinitel_minitel::{Key, MockTerminal};

    /// 不等待的计时源
    pub(crate) struct NoWait;

    impl Clock for NoWait {
        fn sleep(&mut self, _duration: Duration) {}
    }

    pub(crate) fn session(
        keys: Vec<Option<Key>>,
        generation: ArmGeneration,
    ) -> (Session, MockTerminal, MockArm) {
        let terminal = MockTerminal::with_keys(keys);
        let arm = MockArm::new(generation);
        let session = Session::new(
            Box::new(terminal.clone()),
            Box::new(arm.clone()),
            Pose::home(),
        )
        .with_clock(NoWait);
        (session, terminal, arm)
    }

    #[test]
    fn test_timeout_in_main_menu_exits_with_single_farewell() {
        let (mut session, terminal, arm) = session(vec![None], ArmGeneration::Youpi);
        session.run_menu().unwrap();

        assert_eq!(terminal.count_text(FAREWELL), 1);
        assert!(arm.commands().is_empty());
        assert_eq!(terminal.pending_keys(), 0);
    }

    #[test]
    fn test_sommaire_exits() {
        let (mut session, terminal, _) = session(vec![Some(Key::SOMMAIRE)], ArmGeneration::Youpi);
        session.run_menu().unwrap();
        assert_eq!(terminal.count_text(FAREWELL), 1);
    }

    #[test]
    fn test_demo_runs_then_menu_is_shown_again() {
        let keys = vec![
            Some(Key::Char('1')),
            Some(Key::ENVOI),
            // 说明页等待 RETOUR
            Some(Key::RETOUR),
            None,
        ];
        let (mut session, terminal, _) = session(keys, ArmGeneration::Youpi);
        session.run_menu().unwrap();

        assert_eq!(terminal.count_text(MENU_TITLE), 2);
        assert_eq!(terminal.count_text("La rencontre des années 80:"), 1);
        assert_eq!(terminal.count_text(FAREWELL), 1);
    }

    #[test]
    fn test_greeting_demo_plays_gesture() {
        let keys = vec![Some(Key::Char('2')), Some(Key::ENVOI), None];
        let (mut session, _, arm) = session(keys, ArmGeneration::Youpi);
        session.run_menu().unwrap();

        let gestures = arm.gestures();
        assert_eq!(gestures.len(), 1);
        assert_eq!(gestures[0].len(), 7);
    }

    #[test]
    fn test_move_arm_home_youpi_uses_reset() {
        let (mut session, _, arm) = session(vec![], ArmGeneration::Youpi);
        session.move_arm_home().unwrap();
        assert_eq!(arm.commands(), vec![ArmCommand::Reset]);
    }

    #[test]
    fn test_move_arm_home_ax12_plays_home_gesture() {
        let (mut session, _, arm) = session(vec![], ArmGeneration::Ax12);
        session.move_arm_home().unwrap();
        assert_eq!(
            arm.commands(),
            vec![ArmCommand::Gesture(Gesture::single(Pose::home(), 2.0))]
        );
    }
}
