//! 编号菜单
//!
//! 数字键输入编号，ENVOI 确认，CORRECTION 删除，SOMMAIRE 放弃。

use std::time::Duration;

use tracing::debug;
use youpinitel_minitel::{Key, MinitelError, Terminal};

/// 菜单输入最长空闲时间
pub const MENU_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// 编号菜单
pub struct Menu<'a> {
    title: &'a str,
    choices: &'a [&'a str],
    prompt: &'a str,
    /// 选项之间的行距
    line_skip: u8,
    /// 标题上方空行数
    margin_top: u8,
    prompt_line: u8,
    footer: Option<(String, u8)>,
    max_wait: Duration,
}

impl<'a> Menu<'a> {
    pub fn new(title: &'a str, choices: &'a [&'a str]) -> Self {
        Self {
            title,
            choices,
            prompt: "Votre choix",
            line_skip: 2,
            margin_top: 1,
            prompt_line: 20,
            footer: None,
            max_wait: MENU_IDLE_TIMEOUT,
        }
    }

    pub fn prompt(mut self, prompt: &'a str, line: u8) -> Self {
        self.prompt = prompt;
        self.prompt_line = line;
        self
    }

    pub fn line_skip(mut self, line_skip: u8) -> Self {
        self.line_skip = line_skip.max(1);
        self
    }

    pub fn margin_top(mut self, margin_top: u8) -> Self {
        self.margin_top = margin_top;
        self
    }

    /// 在 `line` 行居中显示的页脚（`-` 填充）
    pub fn footer(mut self, text: impl Into<String>, line: u8) -> Self {
        self.footer = Some((text.into(), line));
        self
    }

    /// 绘制菜单
    pub fn render(&self, terminal: &mut dyn Terminal) -> Result<(), MinitelError> {
        terminal.clear_screen()?;

        let mut line = 1 + self.margin_top;
        terminal.display_text_center(self.title, line, None)?;
        let underline = "-".repeat(self.title.chars().count());
        terminal.display_text_center(&underline, line + 1, None)?;

        line += 1 + self.line_skip;
        for (index, choice) in self.choices.iter().enumerate() {
            terminal.display_text(&format!("{} - {}", index + 1, choice), 2, line)?;
            line += self.line_skip;
        }

        terminal.display_text(&self.prompt_text(), 0, self.prompt_line)?;

        if let Some((text, footer_line)) = &self.footer {
            terminal.display_text_center(text, *footer_line, Some('-'))?;
        }
        Ok(())
    }

    fn prompt_text(&self) -> String {
        format!("{} : ", self.prompt)
    }

    /// 最多需要的数字位数
    fn max_digits(&self) -> usize {
        self.choices.len().max(1).to_string().len()
    }

    fn echo(&self, terminal: &mut dyn Terminal, input: &str) -> Result<(), MinitelError> {
        let x = self.prompt_text().chars().count() as u8;
        let field = format!("{:<width$}", input, width = self.max_digits());
        terminal.display_text(&field, x, self.prompt_line)
    }

    /// 绘制并等待用户选择
    ///
    /// 返回从 0 开始的选项下标；SOMMAIRE 或超时返回 `None`。
    pub fn get_choice(&self, terminal: &mut dyn Terminal) -> Result<Option<usize>, MinitelError> {
        self.render(terminal)?;

        let mut input = String::new();
        loop {
            let Some(key) = terminal.read_key(self.max_wait)? else {
                debug!("menu timeout");
                return Ok(None);
            };

            match key {
                Key::SOMMAIRE => return Ok(None),
                Key::ENVOI => {
                    match input.parse::<usize>() {
                        Ok(n) if (1..=self.choices.len()).contains(&n) => {
                            return Ok(Some(n - 1));
                        },
                        _ => {
                            debug!("invalid menu choice {:?}", input);
                            terminal.beep()?;
                            input.clear();
                            self.echo(terminal, &input)?;
                        },
                    }
                },
                Key::CORRECTION => {
                    input.pop();
                    self.echo(terminal, &input)?;
                },
                Key::Char(c) if c.is_ascii_digit() && input.len() < self.max_digits() => {
                    input.push(c);
                    self.echo(terminal, &input)?;
                },
                _ => terminal.beep()?,
            }
        }
    }
}
