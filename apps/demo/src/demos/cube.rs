//! 移动魔方（占位）

use std::time::Duration;

use anyhow::Result;

use crate::session::Session;

pub const LABEL: &str = "déplace le Rubik's cube";

pub fn run(session: &mut Session) -> Result<()> {
    session
        .terminal
        .display_text_center(" moving the cube ", 23, Some('-'))?;
    session.clock.sleep(Duration::from_secs(3));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::session;
    use youpinitel_arm::ArmGeneration;

    #[test]
    fn test_placeholder_does_not_move_arm() {
        let (mut session, terminal, arm) = session(vec![], ArmGeneration::Youpi);
        run(&mut session).unwrap();
        assert_eq!(terminal.count_text(" moving the cube "), 1);
        assert!(arm.commands().is_empty());
    }
}
