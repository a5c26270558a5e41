use skyburst::{Relay, Spawner};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Locks the relay shared with the feed thread.
pub fn lock(relay: &Mutex<Relay>) -> MutexGuard<'_, Relay> {
    relay.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Follows a JSON-lines file or FIFO on a background thread.
///
/// Each complete line goes through the shared relay and any resulting launch
/// is queued with `spawner`; the scene itself stays on the frame loop.
/// Reaching the end of input waits for more lines, so a relay process can
/// keep appending. The thread ends once the scene is gone.
pub fn follow(path: PathBuf, relay: Arc<Mutex<Relay>>, spawner: Spawner) -> JoinHandle<()> {
    thread::spawn(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open event feed");
                return;
            }
        };
        info!(path = %path.display(), "following event feed");

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        loop {
            match reader.read_line(&mut line) {
                // Nothing new, or a line still being written
                Ok(0) => thread::sleep(Duration::from_millis(100)),
                Ok(_) if !line.ends_with('\n') => thread::sleep(Duration::from_millis(20)),
                Ok(_) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !forward(trimmed, &relay, &spawner) {
                        debug!("scene dropped, feed stopped");
                        return;
                    }
                    line.clear();
                }
                Err(e) => {
                    warn!(error = %e, "event feed read failed");
                    return;
                }
            }
        }
    })
}

/// Returns false once the spawner has nowhere to deliver to.
fn forward(line: &str, relay: &Mutex<Relay>, spawner: &Spawner) -> bool {
    let request = match lock(relay).accept(line, Instant::now()) {
        Ok(Some(request)) => request,
        Ok(None) => return true,
        Err(e) => {
            warn!(error = %e, "skipping feed line");
            return true;
        }
    };
    spawner.spawn(request).is_some()
}
