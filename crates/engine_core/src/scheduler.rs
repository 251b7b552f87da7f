//! Tick-loop scheduler: drives the simulation at a fixed rate on its own
//! thread, with pause, slow mode, and cooperative shutdown.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::time::SimClock;

/// Upper bound on a single paused wait, so the loop re-checks its control
/// flags even if no resume/stop notification arrives.
const PAUSE_WAIT: Duration = Duration::from_millis(100);

/// Anything the scheduler can drive. One call per elapsed tick.
pub trait Simulation: Send + 'static {
    fn tick(&mut self, dt: f32);
}

#[derive(Debug, Default)]
struct Control {
    paused: bool,
    stopping: bool,
    slow_mode: bool,
}

struct Shared<S> {
    sim: Mutex<S>,
    control: Mutex<Control>,
    wake: Condvar,
}

/// Fixed-rate tick loop around a [`Simulation`].
///
/// The simulation lives behind a mutex so the loop thread owns each tick
/// exclusively; readers take short locks between ticks (see
/// [`Engine::try_with_sim`]) and skip the frame when the lock is contended.
pub struct Engine<S: Simulation> {
    shared: Arc<Shared<S>>,
    tick_hz: f64,
    slow_hz: f64,
    thread: Option<JoinHandle<()>>,
}

impl<S: Simulation> Engine<S> {
    pub fn new(sim: S, tick_hz: f64, slow_hz: f64) -> Self {
        Self {
            shared: Arc::new(Shared {
                sim: Mutex::new(sim),
                control: Mutex::new(Control::default()),
                wake: Condvar::new(),
            }),
            tick_hz,
            slow_hz,
            thread: None,
        }
    }

    /// Begin ticking. Does nothing if the loop is already running.
    pub fn start(&mut self) {
        if self.thread.is_some() {
            return;
        }
        {
            let mut control = self.shared.control.lock().unwrap();
            control.stopping = false;
        }
        let shared = Arc::clone(&self.shared);
        let mut clock = SimClock::new(self.tick_hz, self.slow_hz);
        log::info!("engine: tick loop starting at {} Hz", self.tick_hz);
        self.thread = Some(std::thread::spawn(move || loop {
            // Honor control flags once per iteration; a paused loop sleeps
            // in a bounded wait instead of spinning.
            let was_paused;
            {
                let mut control = shared.control.lock().unwrap();
                if control.stopping {
                    break;
                }
                was_paused = control.paused;
                while control.paused && !control.stopping {
                    let (guard, _) = shared.wake.wait_timeout(control, PAUSE_WAIT).unwrap();
                    control = guard;
                }
                if control.stopping {
                    break;
                }
                clock.set_slow_mode(control.slow_mode);
            }
            if was_paused {
                // Paused time never becomes catch-up ticks.
                clock.skip_to_now();
            }

            clock.update();
            let dt = clock.step_seconds();
            while clock.should_tick() {
                shared.sim.lock().unwrap().tick(dt);
            }
            std::thread::sleep(clock.until_next_tick().min(PAUSE_WAIT));
        }));
    }

    /// Request termination and block until the loop thread has exited.
    pub fn stop(&mut self) {
        {
            let mut control = self.shared.control.lock().unwrap();
            control.stopping = true;
        }
        self.shared.wake.notify_all();
        if let Some(handle) = self.thread.take() {
            handle.join().expect("engine tick thread panicked");
            log::info!("engine: tick loop stopped");
        }
    }

    /// Suspend tick production. Simulation state is untouched.
    pub fn pause(&self) {
        self.shared.control.lock().unwrap().paused = true;
    }

    /// Resume tick production after a pause.
    pub fn resume(&self) {
        self.shared.control.lock().unwrap().paused = false;
        self.shared.wake.notify_all();
    }

    /// Retune the tick interval for precision-input slow motion.
    pub fn set_slow_mode(&self, on: bool) {
        self.shared.control.lock().unwrap().slow_mode = on;
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.control.lock().unwrap().paused
    }

    /// Run `f` with exclusive access to the simulation, blocking until the
    /// current tick (if any) finishes. Used for intents and lifecycle calls.
    pub fn with_sim<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.shared.sim.lock().unwrap())
    }

    /// Run `f` only if the simulation is not mid-tick. Returns `None` on
    /// contention so presentation can skip the frame rather than block.
    pub fn try_with_sim<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        match self.shared.sim.try_lock() {
            Ok(sim) => Some(f(&sim)),
            Err(_) => None,
        }
    }
}

impl<S: Simulation> Drop for Engine<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
