//! Exit-key listener: a line of `q`, `quit` or ESC on stdin ends the session.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

const ESC: &str = "\u{1b}";

pub fn is_exit_key(line: &str) -> bool {
    let key = line.trim_matches(|c: char| c == '\r' || c == '\n' || c == ' ' || c == '\t');
    key == ESC || key.eq_ignore_ascii_case("q") || key.eq_ignore_ascii_case("quit")
}

/// Watch stdin on a detached `handspin-keys` thread.
pub fn spawn_listener(stop: Arc<AtomicBool>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("handspin-keys".to_string())
        .spawn(move || listen(io::stdin().lock(), &stop))
}

/// Read lines until an exit key, EOF or `stop` is already raised.
///
/// EOF does not raise `stop`: a session started with stdin closed keeps
/// running until Ctrl-C.
pub(crate) fn listen<R: BufRead>(mut input: R, stop: &AtomicBool) {
    let mut line = String::new();
    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                debug!("stdin closed; exit keys unavailable");
                break;
            }
            Ok(_) if is_exit_key(&line) => {
                info!("exit key received");
                stop.store(true, Ordering::SeqCst);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "stdin read failed; exit keys unavailable");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn recognises_exit_keys() {
        assert!(is_exit_key("q\n"));
        assert!(is_exit_key("QUIT\r\n"));
        assert!(is_exit_key("\u{1b}\n"));
        assert!(!is_exit_key("quite\n"));
        assert!(!is_exit_key("\n"));
    }

    #[test]
    fn exit_line_raises_stop() {
        let stop = AtomicBool::new(false);
        listen(Cursor::new("hello\n\nq\nnever read\n"), &stop);
        assert!(stop.load(Ordering::SeqCst));
    }

    #[test]
    fn eof_leaves_stop_untouched() {
        let stop = AtomicBool::new(false);
        listen(Cursor::new("spin\nfaster\n"), &stop);
        assert!(!stop.load(Ordering::SeqCst));
    }
}
