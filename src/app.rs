use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event};

use crate::config::Config;
use crate::coordinator::{TaskCoordinator, TaskEvent};
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model};
use crate::{elog_debug, elog_error, Result};

const MAX_BG_MESSAGES: usize = 50;
const IDLE_SLEEP: Duration = Duration::from_micros(500);

/// Owns the model and the task coordinator. Turns terminal input and worker
/// events into messages, runs `update`, executes the resulting commands and
/// publishes snapshots to the render thread.
pub struct LogicThread;

impl LogicThread {
    pub fn run(config: Config, state_tx: Sender<RenderState>, shutdown: Arc<AtomicBool>) -> Result<()> {
        elog_debug!(
            "LogicThread::run size={} dist={} sim={}",
            config.network.size,
            config.network.distribution.label(),
            config.simulation.sim_type.label()
        );
        let coordinator = TaskCoordinator::new();
        let mut model = Model::new(config);
        let result = Self::event_loop(&mut model, &coordinator, &state_tx, &shutdown);

        shutdown.store(true, Ordering::Relaxed);
        coordinator.shutdown();
        result
    }

    fn event_loop(
        model: &mut Model,
        coordinator: &TaskCoordinator,
        state_tx: &Sender<RenderState>,
        shutdown: &AtomicBool,
    ) -> Result<()> {
        send_state(state_tx, model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) => Message::Key(key),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };
                if dispatch(model, coordinator, msg) {
                    return Ok(());
                }
                if model.dirty {
                    send_state(state_tx, model);
                    model.dirty = false;
                }
            }

            // Worker events (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(event) = coordinator.events().try_recv() else {
                    break;
                };
                if dispatch(model, coordinator, event_message(event)) {
                    return Ok(());
                }
            }

            if model.dirty {
                send_state(state_tx, model);
                model.dirty = false;
            }

            std::thread::sleep(IDLE_SLEEP);
        }
    }
}

/// Map a worker event to the message `update` consumes.
pub fn event_message(event: TaskEvent) -> Message {
    match event {
        TaskEvent::Progress { id, percent, .. } => Message::TaskProgress { id, percent },
        TaskEvent::Finished { id, kind, outcome } => Message::TaskFinished { id, kind, outcome },
    }
}

/// Run a message through `update` and execute its commands. Commands may
/// produce follow-up messages, which are handled in order.
///
/// Returns true when the app should quit.
pub fn dispatch(model: &mut Model, coordinator: &TaskCoordinator, msg: Message) -> bool {
    let mut pending = VecDeque::from([msg]);
    while let Some(msg) = pending.pop_front() {
        for cmd in update(model, msg) {
            match execute_command(coordinator, cmd) {
                Step::Continue => {}
                Step::Reply(reply) => pending.push_back(reply),
                Step::Quit => return true,
            }
        }
    }
    false
}

enum Step {
    Continue,
    Reply(Message),
    Quit,
}

fn execute_command(coordinator: &TaskCoordinator, cmd: Command) -> Step {
    match cmd {
        Command::StartTask(request) => {
            let kind = request.kind();
            elog_debug!("Command::StartTask kind={}", kind);
            match coordinator.start(request) {
                Ok(id) => Step::Reply(Message::TaskStarted { id, kind }),
                Err(error) => Step::Reply(Message::TaskRejected { kind, error }),
            }
        }

        Command::CancelTask => {
            elog_debug!("Command::CancelTask");
            coordinator.cancel();
            Step::Continue
        }

        Command::SaveConfig(config) => {
            elog_debug!("Command::SaveConfig");
            match config.save() {
                Ok(()) => Step::Reply(Message::ConfigSaved),
                Err(e) => {
                    elog_error!("Config save failed: {}", e);
                    Step::Reply(Message::ConfigSaveFailed(e.to_string()))
                }
            }
        }

        Command::Quit => {
            elog_debug!("Command::Quit");
            Step::Quit
        }
    }
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}
