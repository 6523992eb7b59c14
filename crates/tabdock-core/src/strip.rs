//! Tab strip runtime
//!
//! One explicitly constructed `TabStrip` per tab list. Host commands, input
//! events and async completions all go through one queue, so every handler
//! runs to completion before the next starts. The controller's effects are
//! executed here: host requests are forwarded, fetches and hover timers are
//! spawned on tokio and report back through the same queue.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tabdock_tabs::{
    DragPayload, Effect, Fetch, Icon, TabId, TabListController, TimerEffect, TimerToken,
};

use crate::command::{CommandOutput, HostCommand, InputEvent};
use crate::config::Config;
use crate::error::CoreError;
use crate::host::{HostBridge, ViewSink};
use crate::resize::ResizeDrag;
use crate::Result;

#[derive(Debug)]
pub enum StripEvent {
    Command {
        command: HostCommand,
        reply: Option<oneshot::Sender<Result<CommandOutput>>>,
    },
    Input(InputEvent),
    Fetched {
        fetch: Fetch,
        value: Option<String>,
    },
    HoverElapsed {
        tab: TabId,
        token: TimerToken,
    },
    SettleDrag,
    Snapshot(oneshot::Sender<Vec<TabSnapshot>>),
    Shutdown,
}

/// Read-only view of one tab, in visual order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub title: String,
    pub icon: Icon,
    pub active: bool,
}

pub struct TabStrip<H: HostBridge> {
    controller: TabListController,
    host: Arc<H>,
    config: Config,
    resize: ResizeDrag,
    events_tx: mpsc::UnboundedSender<StripEvent>,
    events_rx: mpsc::UnboundedReceiver<StripEvent>,
    /// Armed hover timers
    timers: HashMap<TimerToken, JoinHandle<()>>,
    /// Render surface
    views: Option<Box<dyn ViewSink>>,
}

impl<H: HostBridge> TabStrip<H> {
    pub fn new(config: Config, host: H) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller =
            TabListController::new().with_reload_action(config.menu.reload_icon_title);

        Self {
            controller,
            host: Arc::new(host),
            config,
            resize: ResizeDrag::default(),
            events_tx,
            events_rx,
            timers: HashMap::new(),
            views: None,
        }
    }

    /// Publish view changes to the render surface.
    pub fn with_view_sink(mut self, views: impl ViewSink) -> Self {
        self.views = Some(Box::new(views));
        self
    }

    pub fn handle(&self) -> StripHandle {
        StripHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Process queued events until shut down.
    pub async fn run(mut self) {
        tracing::info!("Tab strip started");

        while let Some(event) = self.events_rx.recv().await {
            if matches!(event, StripEvent::Shutdown) {
                break;
            }
            self.dispatch(event);
        }

        for (_, timer) in self.timers.drain() {
            timer.abort();
        }

        tracing::info!("Tab strip stopped");
    }

    pub fn dispatch(&mut self, event: StripEvent) {
        match event {
            StripEvent::Command { command, reply } => {
                let result = self.execute(command);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            StripEvent::Input(input) => self.input(input),
            StripEvent::Fetched { fetch, value } => self.apply_fetched(fetch, value),
            StripEvent::HoverElapsed { tab, token } => {
                self.timers.remove(&token);
                self.controller.hover_elapsed(tab, token);
                self.flush();
            }
            StripEvent::SettleDrag => {
                self.controller.settle_drag();
                self.flush();
            }
            StripEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            StripEvent::Shutdown => {}
        }
    }

    /// Run one host command.
    pub fn execute(&mut self, command: HostCommand) -> Result<CommandOutput> {
        tracing::debug!(command = command.name(), "Host command");

        let output = match command {
            HostCommand::CreateTab { title, id } => {
                self.controller.create_tab(title, id)?;
                CommandOutput::Done
            }
            HostCommand::RemoveTab { id } => {
                self.controller.remove_tab(id)?;
                CommandOutput::Done
            }
            HostCommand::ActivateTab { id } => {
                self.controller.activate_tab(id)?;
                CommandOutput::Done
            }
            HostCommand::GetContextMenu => CommandOutput::Menu(self.controller.context_menu()),
            HostCommand::ExecuteMenuItem { key } => {
                self.controller.execute_menu_action(&key);
                CommandOutput::Done
            }
        };

        self.flush();
        Ok(output)
    }

    /// Apply one input event from the render surface.
    pub fn input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Click { id } => self.controller.click(id),
            InputEvent::CloseClicked { id } => self.controller.close_clicked(id),
            InputEvent::PointerEnter { id } => self.controller.pointer_enter(id),
            InputEvent::PointerLeave { id } => self.controller.pointer_leave(id),
            InputEvent::DragStart { id } => self.controller.drag_start(id),
            InputEvent::DragEnter { id, types } => {
                let payload = DragPayload::classify(&types, &self.config.tab_drag_type);
                self.controller.drag_enter(id, payload);
            }
            InputEvent::DragOver {
                id,
                types,
                pointer_y,
                bounds,
            } => {
                let payload = DragPayload::classify(&types, &self.config.tab_drag_type);
                self.controller.drag_over(id, payload, pointer_y, &bounds);
            }
            InputEvent::DragLeave { id } => self.controller.drag_leave(id),
            InputEvent::Drop { id } => self.controller.drop_on(id),
            InputEvent::DragEnd => self.controller.drag_end(),
            InputEvent::ResizeStart { client_x } => self.resize.press(client_x),
            InputEvent::ResizeMove { screen_x } => {
                if let Some(request) = self.resize.motion(screen_x) {
                    self.host.send(request);
                }
            }
            InputEvent::ResizeEnd => self.resize.release(),
        }

        self.flush();
    }

    pub fn snapshot(&self) -> Vec<TabSnapshot> {
        self.controller
            .tabs()
            .map(|tab| TabSnapshot {
                id: tab.id(),
                title: tab.title().to_string(),
                icon: tab.icon().clone(),
                active: tab.is_active(),
            })
            .collect()
    }

    fn apply_fetched(&mut self, fetch: Fetch, value: Option<String>) {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return;
        };

        match fetch {
            Fetch::GetIcon { id } => {
                if let Some(icon) = Icon::from_host(&value) {
                    self.controller.update_icon(id, icon);
                }
            }
            Fetch::GetTitle { id } => {
                self.controller.update_title(id, value);
            }
        }

        self.flush();
    }

    fn flush(&mut self) {
        for effect in self.controller.take_effects() {
            match effect {
                Effect::Request(request) => self.host.send(request),
                Effect::Fetch(fetch) => self.spawn_fetch(fetch),
                Effect::Timer(TimerEffect::Arm { tab, token }) => self.arm_timer(tab, token),
                Effect::Timer(TimerEffect::Cancel { token }) => {
                    if let Some(timer) = self.timers.remove(&token) {
                        timer.abort();
                    }
                }
                Effect::SettleDrag => {
                    let _ = self.events_tx.send(StripEvent::SettleDrag);
                }
                Effect::View(change) => {
                    if let Some(views) = &self.views {
                        views.publish(change);
                    }
                }
            }
        }
    }

    fn spawn_fetch(&self, fetch: Fetch) {
        tracing::debug!(tab_id = %fetch.tab(), ?fetch, "Pulling from host");
        let host = Arc::clone(&self.host);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let value = match fetch {
                Fetch::GetIcon { id } => host.get_icon(id).await,
                Fetch::GetTitle { id } => host.get_title(id).await,
            };
            let _ = events.send(StripEvent::Fetched { fetch, value });
        });
    }

    fn arm_timer(&mut self, tab: TabId, token: TimerToken) {
        let delay = self.config.hover_activate_delay();
        let events = self.events_tx.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(StripEvent::HoverElapsed { tab, token });
        });

        if let Some(stale) = self.timers.insert(token, timer) {
            stale.abort();
        }
    }
}

/// Cloneable sender into a running [`TabStrip`].
#[derive(Clone)]
pub struct StripHandle {
    events: mpsc::UnboundedSender<StripEvent>,
}

impl StripHandle {
    pub async fn command(&self, command: HostCommand) -> Result<CommandOutput> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(StripEvent::Command {
                command,
                reply: Some(reply),
            })
            .map_err(|_| CoreError::Closed)?;
        response.await.map_err(|_| CoreError::Closed)?
    }

    pub fn input(&self, event: InputEvent) -> Result<()> {
        self.events
            .send(StripEvent::Input(event))
            .map_err(|_| CoreError::Closed)
    }

    pub async fn snapshot(&self) -> Result<Vec<TabSnapshot>> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(StripEvent::Snapshot(reply))
            .map_err(|_| CoreError::Closed)?;
        response.await.map_err(|_| CoreError::Closed)
    }

    pub fn shutdown(&self) {
        let _ = self.events.send(StripEvent::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tabdock_tabs::{HostRequest, MenuAction, TabError, ViewChange};

    const ICON: &str = "data:image/png;base64,iVBORw0KGgo=";

    /// Records requests and answers pulls after a fixed delay.
    #[derive(Clone, Default)]
    struct RecordingHost {
        requests: Arc<Mutex<Vec<HostRequest>>>,
        fetch_delay: Duration,
    }

    impl RecordingHost {
        fn with_fetch_delay(fetch_delay: Duration) -> Self {
            Self {
                fetch_delay,
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<HostRequest> {
            self.requests.lock().clone()
        }
    }

    impl HostBridge for RecordingHost {
        async fn get_icon(&self, _id: TabId) -> Option<String> {
            tokio::time::sleep(self.fetch_delay).await;
            Some(ICON.to_string())
        }

        async fn get_title(&self, id: TabId) -> Option<String> {
            tokio::time::sleep(self.fetch_delay).await;
            Some(format!("Window {id}"))
        }

        fn send(&self, request: HostRequest) {
            self.requests.lock().push(request);
        }
    }

    fn id(raw: u64) -> TabId {
        TabId::new(raw)
    }

    fn create(raw: u64) -> HostCommand {
        HostCommand::CreateTab {
            title: format!("Tab {raw}"),
            id: id(raw),
        }
    }

    fn external_enter(raw: u64) -> InputEvent {
        InputEvent::DragEnter {
            id: id(raw),
            types: vec!["Files".to_string()],
        }
    }

    async fn start(host: RecordingHost, config: Config, tabs: &[u64]) -> StripHandle {
        let strip = TabStrip::new(config, host);
        let handle = strip.handle();
        tokio::spawn(strip.run());
        for raw in tabs {
            handle.command(create(*raw)).await.unwrap();
        }
        handle
    }

    fn activations(host: &RecordingHost) -> Vec<HostRequest> {
        host.requests()
            .into_iter()
            .filter(|r| matches!(r, HostRequest::ActivateTab { .. }))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_icon_fetch_applies_after_create() {
        let host = RecordingHost::with_fetch_delay(Duration::from_millis(50));
        let handle = start(host, Config::default(), &[1]).await;

        let before = handle.snapshot().await.unwrap();
        assert!(before[0].icon.is_placeholder());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let after = handle.snapshot().await.unwrap();
        assert_eq!(after[0].icon.src(), ICON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_icon_fetch_after_removal_is_discarded() {
        let host = RecordingHost::with_fetch_delay(Duration::from_millis(50));
        let handle = start(host, Config::default(), &[1]).await;

        handle
            .command(HostCommand::RemoveTab { id: id(1) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(handle.snapshot().await.unwrap().is_empty());
        // the strip is still alive and consistent
        handle.command(create(1)).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contract_violations_are_reported() {
        let handle = start(RecordingHost::default(), Config::default(), &[1]).await;

        let err = handle.command(create(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::Tab(TabError::DuplicateId(_))));

        let err = handle
            .command(HostCommand::ActivateTab { id: id(5) })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Tab(TabError::UnknownId(_))));

        assert_eq!(handle.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_activation_fires_after_delay() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1, 2]).await;
        handle
            .command(HostCommand::ActivateTab { id: id(1) })
            .await
            .unwrap();

        handle.input(external_enter(2)).unwrap();
        handle.snapshot().await.unwrap();

        tokio::time::sleep(Duration::from_millis(499)).await;
        handle.snapshot().await.unwrap();
        assert!(activations(&host).is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        handle.snapshot().await.unwrap();
        assert_eq!(
            activations(&host),
            vec![HostRequest::ActivateTab { id: id(2) }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_before_delay_cancels_activation() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1, 2]).await;

        handle.input(external_enter(2)).unwrap();
        handle.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        handle.input(InputEvent::DragLeave { id: id(2) }).unwrap();
        handle.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        handle.snapshot().await.unwrap();
        assert!(activations(&host).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_leave_keeps_timer_running() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1, 2]).await;

        handle.input(external_enter(2)).unwrap();
        handle.input(external_enter(2)).unwrap();
        handle.input(InputEvent::DragLeave { id: id(2) }).unwrap();
        handle.snapshot().await.unwrap();

        tokio::time::sleep(Duration::from_millis(600)).await;
        handle.snapshot().await.unwrap();
        assert_eq!(
            activations(&host),
            vec![HostRequest::ActivateTab { id: id(2) }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay() {
        let host = RecordingHost::default();
        let config = Config {
            hover_activate_delay_ms: 100,
            ..Config::default()
        };
        let handle = start(host.clone(), config, &[1, 2]).await;

        handle.input(external_enter(2)).unwrap();
        handle.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.snapshot().await.unwrap();
        assert_eq!(activations(&host).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_drag_reorders_and_settles() {
        let host = RecordingHost::default();
        let strip = TabStrip::new(Config::default(), host);
        let (views_tx, mut views_rx) = mpsc::unbounded_channel::<ViewChange>();
        let strip = strip.with_view_sink(views_tx);
        let handle = strip.handle();
        tokio::spawn(strip.run());
        for raw in [1, 2, 3] {
            handle.command(create(raw)).await.unwrap();
        }

        let tab_types = vec![Config::default().tab_drag_type];
        handle.input(InputEvent::DragStart { id: id(1) }).unwrap();
        handle
            .input(InputEvent::DragOver {
                id: id(3),
                types: tab_types,
                pointer_y: 110.0,
                bounds: tabdock_tabs::Bounds::new(0.0, 80.0, 200.0, 40.0),
            })
            .unwrap();
        handle.snapshot().await.unwrap();
        handle.snapshot().await.unwrap();
        handle.input(InputEvent::DragEnd).unwrap();

        let order: Vec<u64> = handle
            .snapshot()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id.get())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);

        let mut changes = Vec::new();
        while let Ok(change) = views_rx.try_recv() {
            changes.push(change);
        }
        let moved = changes
            .iter()
            .position(|c| matches!(c, ViewChange::Moved { .. }))
            .unwrap();
        let settled = changes
            .iter()
            .position(|c| matches!(c, ViewChange::DragStyle { in_motion: true, .. }))
            .unwrap();
        let ended = changes
            .iter()
            .position(|c| matches!(c, ViewChange::DragStyle { in_motion: false, .. }))
            .unwrap();
        // the settle was queued behind the drag-over already waiting
        assert!(moved < settled);
        assert!(settled < ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_drag_over_does_not_reorder() {
        let handle = start(RecordingHost::default(), Config::default(), &[1, 2]).await;

        handle.input(InputEvent::DragStart { id: id(1) }).unwrap();
        handle
            .input(InputEvent::DragOver {
                id: id(2),
                types: vec!["Files".to_string()],
                pointer_y: 75.0,
                bounds: tabdock_tabs::Bounds::new(0.0, 40.0, 200.0, 40.0),
            })
            .unwrap();

        let order: Vec<u64> = handle
            .snapshot()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id.get())
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_protocol_close_others() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1, 2, 3]).await;

        let output = handle.command(HostCommand::GetContextMenu).await.unwrap();
        assert_eq!(output, CommandOutput::Menu(None));

        handle.input(InputEvent::PointerEnter { id: id(2) }).unwrap();
        let output = handle.command(HostCommand::GetContextMenu).await.unwrap();
        let CommandOutput::Menu(Some(items)) = output else {
            panic!("expected a menu");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].key, MenuAction::CloseOthers);

        handle
            .command(HostCommand::ExecuteMenuItem {
                key: "close_others".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            host.requests(),
            vec![
                HostRequest::CloseTab { id: id(1) },
                HostRequest::CloseTab { id: id(3) },
            ]
        );

        // target was cleared
        handle
            .command(HostCommand::ExecuteMenuItem {
                key: "close".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(host.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_icon_title() {
        let host = RecordingHost::default();
        let config = Config {
            menu: crate::config::MenuConfig {
                reload_icon_title: true,
            },
            ..Config::default()
        };
        let handle = start(host, config, &[4]).await;

        handle.input(InputEvent::PointerEnter { id: id(4) }).unwrap();
        handle.command(HostCommand::GetContextMenu).await.unwrap();
        handle
            .command(HostCommand::ExecuteMenuItem {
                key: "reload_icon_title".to_string(),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let tabs = handle.snapshot().await.unwrap();
        assert_eq!(tabs[0].title, "Window 4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_and_resize_requests() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1, 2]).await;
        handle
            .command(HostCommand::ActivateTab { id: id(1) })
            .await
            .unwrap();

        handle.input(InputEvent::Click { id: id(1) }).unwrap();
        handle.input(InputEvent::Click { id: id(2) }).unwrap();
        handle.input(InputEvent::ResizeMove { screen_x: 500 }).unwrap();
        handle.input(InputEvent::ResizeStart { client_x: 3 }).unwrap();
        handle.input(InputEvent::ResizeMove { screen_x: 500 }).unwrap();
        handle.input(InputEvent::ResizeEnd).unwrap();
        handle.snapshot().await.unwrap();

        assert_eq!(
            host.requests(),
            vec![
                HostRequest::ActivateTab { id: id(2) },
                HostRequest::HorizontalResize { delta: 497 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_with_extreme_coordinates_keeps_strip_alive() {
        let host = RecordingHost::default();
        let handle = start(host.clone(), Config::default(), &[1]).await;

        handle.input(InputEvent::ResizeStart { client_x: 10 }).unwrap();
        handle
            .input(InputEvent::ResizeMove { screen_x: i32::MIN })
            .unwrap();

        let output = handle.command(HostCommand::GetContextMenu).await.unwrap();
        assert_eq!(output, CommandOutput::Menu(None));
        assert_eq!(
            host.requests(),
            vec![HostRequest::HorizontalResize { delta: i32::MIN }]
        );
    }

    #[tokio::test]
    async fn test_handle_after_shutdown() {
        let strip = TabStrip::new(Config::default(), RecordingHost::default());
        let handle = strip.handle();
        let running = tokio::spawn(strip.run());

        handle.shutdown();
        running.await.unwrap();

        assert!(matches!(
            handle.command(HostCommand::GetContextMenu).await,
            Err(CoreError::Closed)
        ));
        assert!(handle.input(InputEvent::DragEnd).is_err());
    }
}
