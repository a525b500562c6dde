//! Lecture temporisée et annulable d'une [`Animation`] dans le terminal.
//!
//! The player redraws every frame in place: it writes the frame, moves the
//! cursor back to the frame's first line, then waits on the stop channel for
//! the frame delay. A stop request wakes the wait immediately.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::cursor::{MoveTo, MoveToColumn, MoveToNextLine, MoveToPreviousLine};
use crossterm::queue;
use crossterm::style::{Print, ResetColor};
use crossterm::terminal::{Clear, ClearType};
use flume::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use sg_core::config::PlaybackConfig;

use crate::compositor::Animation;

/// Côté émetteur du canal d'arrêt. Clonable, un clone par source d'arrêt.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    /// Ask the player to stop. Idempotent.
    pub fn stop(&self) {
        // Full means a stop is already pending.
        let _ = self.tx.try_send(());
    }
}

/// Côté récepteur, consulté par le player.
///
/// Once every [`StopHandle`] is dropped the signal reads as stopped.
#[derive(Debug)]
pub struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    /// Block for up to `timeout`. Returns `true` if playback must stop.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Non-blocking check.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }
}

/// Crée une paire (handle, signal) reliée par un canal flume.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use sg_anim::player::stop_channel;
///
/// let (handle, signal) = stop_channel();
/// assert!(!signal.wait(Duration::ZERO));
/// handle.stop();
/// assert!(signal.wait(Duration::from_secs(10)));
/// ```
#[must_use]
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = flume::bounded(1);
    (StopHandle { tx }, StopSignal { rx })
}

/// Joue une [`Animation`] sur un flux de sortie.
pub struct Player<'a> {
    animation: &'a Animation,
    zero_delay: Duration,
    max_loops: Option<u32>,
}

impl<'a> Player<'a> {
    /// Player for `animation` with the zero-delay substitute and loop bound of `config`.
    #[must_use]
    pub fn new(animation: &'a Animation, config: &PlaybackConfig) -> Self {
        Self {
            animation,
            zero_delay: config.min_frame_delay(),
            max_loops: config.max_loops,
        }
    }

    /// Play until `stop` fires or `max_loops` passes are done.
    ///
    /// Nothing is written if `stop` has already fired. Otherwise the screen is
    /// cleared once and, on exit, colors are reset and the cursor is left on
    /// the line below the last frame drawn.
    ///
    /// # Errors
    /// Any write error on `out`.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use sg_anim::compositor::{Animation, Container, Disposal};
    /// use sg_anim::player::{stop_channel, Player};
    /// use sg_core::bitmap::Bitmap;
    /// use sg_core::config::{PlaybackConfig, RenderConfig};
    ///
    /// let container = Container {
    ///     frames: vec![Bitmap::from_fn(2, 4, |_, _| [255, 0, 0, 255])],
    ///     delays: vec![Duration::ZERO],
    ///     disposals: vec![Disposal::Keep],
    ///     width: 2,
    ///     height: 4,
    /// };
    /// let anim = Animation::composite(&container, &RenderConfig::default()).unwrap();
    /// let config = PlaybackConfig { min_frame_delay_ms: 0, max_loops: Some(2) };
    ///
    /// let (_handle, signal) = stop_channel();
    /// let mut out = Vec::new();
    /// Player::new(&anim, &config).play(&mut out, &signal).unwrap();
    /// let text = String::from_utf8(out).unwrap();
    /// assert_eq!(text.matches("\x1b[48;5;196m").count(), 2);
    /// ```
    pub fn play<W: Write>(&self, out: &mut W, stop: &StopSignal) -> io::Result<()> {
        if stop.is_stopped() {
            log::debug!("Lecture annulée avant la première frame");
            return Ok(());
        }

        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

        let frames = self.animation.frames();
        let mut last_lines = 0;
        let mut pass: u32 = 0;
        'passes: loop {
            if self.max_loops.is_some_and(|max| pass >= max) {
                break;
            }
            for frame in frames {
                queue!(out, Print(frame.text()))?;
                last_lines = frame.lines();
                rewind(out, last_lines)?;
                out.flush()?;
                if stop.wait(self.hold_time(frame.delay())) {
                    break 'passes;
                }
            }
            pass = pass.saturating_add(1);
        }
        log::debug!("Lecture terminée après {pass} passe(s)");

        queue!(out, ResetColor)?;
        if last_lines > 0 {
            queue!(out, MoveToNextLine(cursor_lines(last_lines)))?;
        }
        out.write_all(b"\n")?;
        out.flush()
    }

    /// How long a frame stays up. Only frames without a delay get the substitute.
    fn hold_time(&self, delay: Duration) -> Duration {
        if delay.is_zero() { self.zero_delay } else { delay }
    }
}

/// Ramène le curseur au début de la première ligne de la frame.
fn rewind<W: Write>(out: &mut W, lines: usize) -> io::Result<()> {
    if lines == 0 {
        queue!(out, MoveToColumn(0))
    } else {
        queue!(out, MoveToPreviousLine(cursor_lines(lines)))
    }
}

fn cursor_lines(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}

/// Lecture en cours sur un thread dédié.
pub struct Playback {
    stop: StopHandle,
    handle: thread::JoinHandle<io::Result<()>>,
}

impl Playback {
    /// A handle that stops this playback, e.g. for a Ctrl-C handler.
    #[must_use]
    pub fn stopper(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request a stop without waiting for it.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Wait for the player thread to finish.
    ///
    /// # Errors
    /// The player's write error, or an error if the thread panicked.
    pub fn join(self) -> io::Result<()> {
        // `self.stop` stays alive until the thread is joined.
        self.handle
            .join()
            .map_err(|_| io::Error::other("le thread de lecture a paniqué"))?
    }
}

/// Lance la lecture de `animation` sur stdout dans un thread dédié.
///
/// The stop pair comes from the caller so that stop sources (a Ctrl-C
/// handler) can be wired before anything is written. A stop sent before the
/// thread starts makes it exit without output.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_playback(
    animation: Arc<Animation>,
    config: PlaybackConfig,
    stop: StopHandle,
    signal: StopSignal,
) -> io::Result<Playback> {
    log::info!("Lecture démarrée ({} frames)", animation.len());
    let handle = thread::Builder::new()
        .name("sg-player".to_string())
        .spawn(move || {
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            Player::new(&animation, &config).play(&mut out, &signal)
        })?;
    Ok(Playback { stop, handle })
}
