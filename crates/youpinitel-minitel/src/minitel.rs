//! Minitel 串口终端

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::MinitelError;
use crate::keys::{FunctionKey, Key, SEP};
use crate::videotex::{
    BEL, CAN, FF, INVERSE_OFF, INVERSE_ON, LF, cursor_goto, encode_text,
};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH, Terminal};

/// Minitel 默认波特率
pub const DEFAULT_BAUDRATE: u32 = 1200;

/// 串口读超时（轮询粒度）
const READ_POLL: Duration = Duration::from_millis(100);

/// `SEP` 之后等待代码字节的最长时间
const SEP_FOLLOWUP: Duration = Duration::from_millis(500);

/// 通过串口连接的 Minitel
pub struct Minitel<P> {
    port: P,
}

impl Minitel<Box<dyn serialport::SerialPort>> {
    /// 打开 Minitel 串口（7 数据位、偶校验、1 停止位）
    pub fn open(path: &str, baudrate: u32) -> Result<Self, MinitelError> {
        debug!("opening Minitel on {} ({} bauds)", path, baudrate);
        let port = serialport::new(path, baudrate)
            .data_bits(serialport::DataBits::Seven)
            .parity(serialport::Parity::Even)
            .stop_bits(serialport::StopBits::One)
            .timeout(READ_POLL)
            .open()
            .map_err(|source| MinitelError::Open {
                port: path.to_string(),
                source,
            })?;
        Ok(Self::new(port))
    }
}

impl<P: Read + Write> Minitel<P> {
    /// 在已打开的字节流上创建终端
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// 取回底层字节流
    pub fn into_inner(self) -> P {
        self.port
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), MinitelError> {
        trace!("minitel <- {}", hex::encode(bytes));
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    /// 读取一个字节，截止时间到达时返回 `None`
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>, MinitelError> {
        let mut buf = [0u8; 1];
        loop {
            if Instant::now() >= deadline {
                return Ok(None);
            }
            match self.port.read(&mut buf) {
                Ok(0) => std::thread::sleep(Duration::from_millis(10)),
                Ok(_) => {
                    trace!("minitel -> {:02x}", buf[0]);
                    // 7 位终端，去掉校验位
                    return Ok(Some(buf[0] & 0x7F));
                },
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {},
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<P: Read + Write> Terminal for Minitel<P> {
    fn clear_all(&mut self) -> Result<(), MinitelError> {
        let mut seq = vec![FF];
        seq.extend_from_slice(&cursor_goto(0, 0));
        seq.extend_from_slice(&[CAN, LF]);
        self.send(&seq)
    }

    fn clear_screen(&mut self) -> Result<(), MinitelError> {
        self.send(&[FF])
    }

    fn display_status(&mut self, text: &str, inverse: bool) -> Result<(), MinitelError> {
        let mut seq = cursor_goto(0, 0).to_vec();
        if inverse {
            seq.extend_from_slice(&INVERSE_ON);
        }
        seq.extend(encode_text(text));
        if inverse {
            seq.extend_from_slice(&INVERSE_OFF);
        }
        // 离开状态行
        seq.push(LF);
        self.send(&seq)
    }

    fn display_text(&mut self, text: &str, x: u8, y: u8) -> Result<(), MinitelError> {
        if usize::from(x) >= SCREEN_WIDTH || y > SCREEN_HEIGHT {
            return Err(MinitelError::OutOfScreen { x, y });
        }
        let mut seq = cursor_goto(y, x).to_vec();
        seq.extend(encode_text(text));
        self.send(&seq)
    }

    fn read_key(&mut self, max_wait: Duration) -> Result<Option<Key>, MinitelError> {
        let deadline = Instant::now() + max_wait;
        loop {
            let Some(byte) = self.read_byte(deadline)? else {
                return Ok(None);
            };

            if byte == SEP {
                let followup = Instant::now() + SEP_FOLLOWUP;
                let Some(code) = self.read_byte(followup)? else {
                    debug!("SEP without function code");
                    continue;
                };
                match FunctionKey::try_from(code) {
                    Ok(key) => return Ok(Some(Key::Function(key))),
                    Err(_) => debug!("unknown function code {:02x}", code),
                }
            } else if (0x20..0x7F).contains(&byte) {
                return Ok(Some(Key::Char(byte as char)));
            } else {
                debug!("ignoring control byte {:02x}", byte);
            }
        }
    }

    fn beep(&mut self) -> Result<(), MinitelError> {
        self.send(&[BEL])
    }
}
