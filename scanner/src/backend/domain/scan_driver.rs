//! # Scan Driver
//!
//! Runs a [`ScanSessionController`] on its own task and feeds it page
//! commands and decoder reports one at a time.
//!
//! Commands are applied in the order they arrive. While a camera
//! acquisition is pending the driver keeps reading commands: a `Teardown`
//! abandons the acquisition and releases immediately, any toggles are
//! queued and replayed once the acquisition settles. Dropping every
//! [`ScanDriverHandle`] counts as a teardown.

use shared::ScanViewState;
use std::collections::VecDeque;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use super::commands::ScanCommand;
use super::scan_controller::ScanSessionController;
use crate::backend::camera::{CameraDecoder, DecodeEvent};
use crate::backend::domain::models::ScanError;

/// Owner-side handle of a spawned driver
pub struct ScanDriverHandle {
    commands: UnboundedSender<ScanCommand>,
    view: watch::Receiver<ScanViewState>,
    task: JoinHandle<()>,
}

impl ScanDriverHandle {
    /// Forward the activation flag. Returns false if the driver has stopped.
    pub fn set_active(&self, requested: bool) -> bool {
        self.commands.send(ScanCommand::SetActive(requested)).is_ok()
    }

    pub fn teardown(&self) -> bool {
        self.commands.send(ScanCommand::Teardown).is_ok()
    }

    /// Latest view state, updated on every change
    pub fn view_state(&self) -> watch::Receiver<ScanViewState> {
        self.view.clone()
    }

    /// Tear down and wait for the driver task to finish
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.commands.send(ScanCommand::Teardown);
        self.task.await
    }
}

/// Spawn a driver task that owns `controller`
pub fn spawn_driver<C>(controller: ScanSessionController<C>) -> ScanDriverHandle
where
    C: CameraDecoder + 'static,
{
    let (commands, commands_rx) = mpsc::unbounded_channel();
    let view = controller.subscribe();
    let task = tokio::spawn(run(controller, commands_rx));
    ScanDriverHandle {
        commands,
        view,
        task,
    }
}

enum Input {
    Command(Option<ScanCommand>),
    Decode(Option<DecodeEvent>),
}

enum ActivationStep {
    Settled(Result<(), ScanError>),
    Command(Option<ScanCommand>),
}

async fn run<C: CameraDecoder>(
    mut controller: ScanSessionController<C>,
    mut commands: UnboundedReceiver<ScanCommand>,
) {
    let mut pending: VecDeque<ScanCommand> = VecDeque::new();
    debug!("Scan driver started");

    loop {
        let command = match pending.pop_front() {
            Some(command) => command,
            None => {
                let input = tokio::select! {
                    command = commands.recv() => Input::Command(command),
                    event = controller.next_event() => Input::Decode(event),
                };

                match input {
                    Input::Decode(Some(event)) => {
                        controller.handle_event(event);
                        continue;
                    }
                    Input::Decode(None) | Input::Command(None) => ScanCommand::Teardown,
                    Input::Command(Some(command)) => command,
                }
            }
        };

        match command {
            ScanCommand::Teardown => break,
            ScanCommand::SetActive(false) => {
                let _ = controller.set_active(false).await;
            }
            ScanCommand::SetActive(true) => {
                let settled = {
                    let activation = controller.set_active(true);
                    tokio::pin!(activation);

                    loop {
                        let step = tokio::select! {
                            result = &mut activation => ActivationStep::Settled(result),
                            command = commands.recv() => ActivationStep::Command(command),
                        };

                        match step {
                            ActivationStep::Settled(result) => break Some(result),
                            ActivationStep::Command(None)
                            | ActivationStep::Command(Some(ScanCommand::Teardown)) => break None,
                            ActivationStep::Command(Some(command)) => {
                                debug!("Queueing {:?} until camera acquisition settles", command);
                                pending.push_back(command);
                            }
                        }
                    }
                };

                match settled {
                    Some(Ok(())) => {}
                    Some(Err(e)) => debug!("Activation did not start scanning: {}", e),
                    None => {
                        info!("Teardown requested while camera acquisition was pending");
                        break;
                    }
                }
            }
        }
    }

    controller.teardown();
    debug!("Scan driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::camera::VideoSurface;
    use crate::backend::test_utils::{ManualCamera, RecordingPresenter};
    use shared::ScanStatus;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn wait_for_status(
        view: &mut watch::Receiver<ScanViewState>,
        status: ScanStatus,
    ) -> ScanViewState {
        timeout(Duration::from_secs(2), async {
            loop {
                if view.borrow_and_update().status == status {
                    return (*view.borrow()).clone();
                }
                view.changed().await.unwrap();
            }
        })
        .await
        .expect("timed out waiting for status")
    }

    #[tokio::test]
    async fn test_driver_scans_and_decodes() {
        let camera = ManualCamera::new();
        let presenter = Arc::new(RecordingPresenter::default());
        let controller =
            ScanSessionController::new(camera.clone(), VideoSurface::new("qr-video"), presenter.clone());
        let driver = spawn_driver(controller);
        let mut view = driver.view_state();

        driver.set_active(true);
        wait_for_status(&mut view, ScanStatus::Scanning).await;

        let sink = camera.last_sink().unwrap();
        sink.failed(crate::backend::domain::models::DecodeError::NotFound);
        sink.decoded("INVOICE-4471:EUR-12.50");

        let state = timeout(Duration::from_secs(2), async {
            loop {
                view.changed().await.unwrap();
                let state = (*view.borrow_and_update()).clone();
                if state.result.is_some() {
                    return state;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(state.status, ScanStatus::Idle);
        assert_eq!(state.result.unwrap().payload, "INVOICE-4471:EUR-12.50");
        assert_eq!(camera.live_handles(), 0);

        driver.shutdown().await.unwrap();
        assert_eq!(presenter.results().len(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_tears_down() {
        let camera = ManualCamera::new();
        let presenter = Arc::new(RecordingPresenter::default());
        let controller =
            ScanSessionController::new(camera.clone(), VideoSurface::new("qr-video"), presenter);
        let driver = spawn_driver(controller);
        let mut view = driver.view_state();

        driver.set_active(true);
        wait_for_status(&mut view, ScanStatus::Scanning).await;
        let ScanDriverHandle { commands, task, .. } = driver;
        drop(commands);

        timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
        assert_eq!(camera.live_handles(), 0);
    }
}
