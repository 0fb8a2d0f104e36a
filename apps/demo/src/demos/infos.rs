//! 说明页

use std::time::Duration;

use anyhow::Result;
use youpinitel_minitel::Key;

use crate::session::Session;

pub const LABEL: &str = "quelques explications";

/// 等待返回键的最长时间
const MAX_WAIT: Duration = Duration::from_secs(300);

const TEXT: [&str; 17] = [
    "La rencontre des années 80:",
    "",
    "Youpi: ",
    "   Un bras robotique pour l'enseignement",
    "",
    "Le Minitel: ",
    "   L'ancêtre d'Internet",
    "",
    "... et du 21ème siècle:",
    "",
    "L'Arduino: ",
    "   Une carte pour l'initiation à la ",
    "   programmation des micro-contrôleurs",
    "",
    "La RaspberryPi: ",
    "   Un ordinateur de la taille d'une ",
    "   carte de crédit",
];

pub fn run(session: &mut Session) -> Result<()> {
    let terminal = session.terminal.as_mut();
    terminal.clear_screen()?;
    for (line, text) in (2u8..).zip(TEXT) {
        terminal.display_text(text, 0, line)?;
    }

    terminal.display_text_center("Retour : menu principal", 23, None)?;
    terminal.wait_for_key(&[Key::RETOUR], MAX_WAIT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::session;
    use youpinitel_arm::ArmGeneration;
    use youpinitel_minitel::ScreenOp;

    #[test]
    fn test_text_fits_on_screen() {
        for text in TEXT {
            assert!(text.chars().count() <= 40, "too long: {:?}", text);
        }
    }

    #[test]
    fn test_renders_and_waits_for_retour() {
        let (mut session, terminal, arm) =
            session(vec![Some(Key::Char('x')), Some(Key::RETOUR)], ArmGeneration::Youpi);
        run(&mut session).unwrap();

        assert!(terminal.ops().contains(&ScreenOp::Text {
            text: "   carte de crédit".to_string(),
            x: 0,
            y: 18
        }));
        assert_eq!(terminal.count_text("Retour : menu principal"), 1);
        assert_eq!(terminal.pending_keys(), 0);
        assert!(arm.commands().is_empty());
    }
}
