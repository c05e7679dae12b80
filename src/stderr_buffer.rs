use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log lines are stored instead of being
/// written over the alternate screen.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

pub fn is_active() -> bool {
    buffer().is_some()
}

/// Store `msg` if buffering is active; otherwise print it to stderr.
pub fn push(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `io::Write` handle used as the tracing writer.
///
/// The fmt layer writes one formatted event per `write` call, so each call
/// becomes one buffered line.
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferedStderr;

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = buffer();
        match guard.as_mut() {
            Some(lines) => {
                let text = String::from_utf8_lossy(buf);
                lines.extend(text.lines().map(str::to_string));
                Ok(buf.len())
            }
            None => {
                drop(guard);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if is_active() {
            Ok(())
        } else {
            io::stderr().flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The buffer is process-global and the installed subscriber may add
    // lines from other tests; only check our own lines and their order.
    #[test]
    fn test_buffering_lifecycle() {
        activate();
        assert!(is_active());

        push("buffer-test first".to_string());
        let mut writer = BufferedStderr;
        writer.write_all(b"buffer-test second\nbuffer-test third\n").unwrap();
        writer.flush().unwrap();

        let ours: Vec<String> = drain()
            .into_iter()
            .filter(|line| line.starts_with("buffer-test "))
            .collect();
        assert_eq!(
            ours,
            vec!["buffer-test first", "buffer-test second", "buffer-test third"]
        );
        assert!(!is_active());
    }
}
