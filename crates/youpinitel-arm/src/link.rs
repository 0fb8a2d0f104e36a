//! 串口链路的带截止时间读取

use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::ArmError;

/// 串口读超时（轮询粒度）
pub(crate) const READ_POLL: Duration = Duration::from_millis(50);

/// 打开本地串口
pub(crate) fn open_serial(
    path: &str,
    baudrate: u32,
) -> Result<Box<dyn serialport::SerialPort>, ArmError> {
    serialport::new(path, baudrate)
        .timeout(READ_POLL)
        .open()
        .map_err(|source| ArmError::Open {
            port: path.to_string(),
            source,
        })
}

/// 读取一个字节，截止时间到达时返回 `None`
pub(crate) fn read_byte<R: Read + ?Sized>(
    reader: &mut R,
    deadline: Instant,
) -> Result<Option<u8>, ArmError> {
    let mut buf = [0u8; 1];
    loop {
        if Instant::now() >= deadline {
            return Ok(None);
        }
        match reader.read(&mut buf) {
            Ok(0) => std::thread::sleep(Duration::from_millis(5)),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {},
            Err(e) => return Err(e.into()),
        }
    }
}

/// 填满 `buf`，超时返回 [`ArmError::Timeout`]
pub(crate) fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    deadline: Instant,
) -> Result<(), ArmError> {
    for slot in buf.iter_mut() {
        *slot = read_byte(reader, deadline)?.ok_or(ArmError::Timeout)?;
    }
    trace!("arm -> {}", hex::encode(&*buf));
    Ok(())
}

/// 读取一行（不含行尾），忽略 `\r`
pub(crate) fn read_line<R: Read + ?Sized>(
    reader: &mut R,
    deadline: Instant,
) -> Result<String, ArmError> {
    let mut line = Vec::new();
    loop {
        match read_byte(reader, deadline)?.ok_or(ArmError::Timeout)? {
            b'\n' => break,
            b'\r' => {},
            byte => line.push(byte),
        }
    }
    let line = String::from_utf8(line)
        .map_err(|e| ArmError::InvalidResponse(format!("non UTF-8 line: {}", e)))?;
    trace!("arm -> {:?}", line);
    Ok(line)
}
