//! Badge controller
//!
//! Owns the display, the QR encoder and the store handle. The firmware
//! calls [`BadgeController::tick`] every few milliseconds with the raw
//! button level and forwards transport events as they arrive. Each tick:
//!
//! 1. services the gesture detector
//! 2. handles at most one pending request (clear > content > status)
//! 3. flushes changed state to storage
//! 4. decides whether the badge may sleep

use heapless::String;
use pixeltag_hal::KeyValueStore;
use pixeltag_protocol::mirror::{format_battery, format_response, MAX_RESPONSE_LEN};
use pixeltag_protocol::{Command, MirrorField, TransportEvent};

use super::power::{battery_percent, PowerDirective, WakeReason};
use crate::config::{BadgeConfig, ButtonAction};
use crate::content::{persist, ContentStore, DisplayMode};
use crate::input::{
    reduce_command, reduce_gesture, reduce_oversized, ButtonGesture, ContentChange, GestureDetector,
    PendingRequest, RequestQueue, WriteOutcome,
};
use crate::render::{compose_scene, PaintJob, RefreshOutcome, RefreshTracker};
use crate::traits::{Glyphs, PaperDisplay, QrEncoder};

/// Controller run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Ticking normally
    Awake,
    /// Sleeping until `wake`
    Asleep,
    /// Stopped by the user; terminal until reset
    Halted,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub gesture: ButtonGesture,
    pub refresh: Option<RefreshOutcome>,
    pub power: PowerDirective,
}

impl TickReport {
    fn idle(power: PowerDirective) -> Self {
        Self {
            gesture: ButtonGesture::None,
            refresh: None,
            power,
        }
    }
}

/// The badge state machine
pub struct BadgeController<D, Q, S> {
    config: BadgeConfig,
    display: D,
    encoder: Q,
    storage: S,
    store: ContentStore,
    queue: RequestQueue,
    gestures: GestureDetector,
    refresh: RefreshTracker,
    connected: bool,
    sleep_deadline: u64,
    state: RunState,
}

impl<D, Q, S> BadgeController<D, Q, S>
where
    D: PaperDisplay + Glyphs,
    Q: QrEncoder,
    S: KeyValueStore,
{
    /// Create a controller; it stays asleep until the first `wake`
    pub fn new(config: BadgeConfig, display: D, encoder: Q, storage: S) -> Self {
        Self {
            gestures: GestureDetector::new(&config),
            config,
            display,
            encoder,
            storage,
            store: ContentStore::default(),
            queue: RequestQueue::new(),
            refresh: RefreshTracker::new(),
            connected: false,
            sleep_deadline: 0,
            state: RunState::Asleep,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn refresh_tracker(&self) -> &RefreshTracker {
        &self.refresh
    }

    /// Start or resume after power-on or sleep
    ///
    /// Restores persisted state, re-arms the sleep timer for the
    /// advertising window and, for power-on and button wakes, queues a
    /// repaint of the current mode. `pressed` is the button level at wake.
    pub fn wake(&mut self, now: u64, reason: WakeReason, pressed: bool) {
        if self.state == RunState::Halted {
            return;
        }

        let restored = persist::load(&mut self.storage);
        self.store = ContentStore::from_persisted(restored);
        self.queue.clear();
        self.gestures.reset(now, pressed);
        self.state = RunState::Awake;
        self.sleep_deadline = now + self.config.advertise_window_ms as u64;

        if reason.renders() {
            self.queue.push(PendingRequest::Content(ContentChange {
                mode: self.store.current_mode(),
                redraw: true,
            }));
        }
        info!("Wake ({}), mode={}", reason, self.store.current_mode());
    }

    /// Handle a transport event
    ///
    /// Returns the mirror field to answer when the event was a query.
    pub fn on_transport(&mut self, event: TransportEvent<'_>, now: u64) -> Option<MirrorField> {
        if self.state == RunState::Halted {
            debug!("Halted, ignoring transport event");
            return None;
        }

        match event {
            TransportEvent::Connected => {
                info!("Central connected");
                self.connected = true;
                self.sleep_deadline = now + self.config.awake_timeout_ms as u64;
                None
            }
            TransportEvent::Disconnected => {
                info!("Central disconnected");
                self.connected = false;
                self.sleep_deadline = now + self.config.awake_timeout_ms as u64;
                None
            }
            TransportEvent::Oversized => {
                reduce_oversized(&mut self.queue);
                None
            }
            TransportEvent::DataWritten(token) => {
                match reduce_command(Command::parse(token), &mut self.store, &mut self.queue) {
                    WriteOutcome::Query(field) => Some(field),
                    _ => None,
                }
            }
        }
    }

    /// Answer a mirror query
    pub fn mirror(&self, field: MirrorField, battery_mv: Option<u16>) -> String<MAX_RESPONSE_LEN> {
        match field {
            MirrorField::Name | MirrorField::Title | MirrorField::Contact => {
                format_response(field, field.extract(self.store.info()).unwrap_or(""))
            }
            MirrorField::QrUrl => format_response(field, self.store.qr()),
            MirrorField::BatteryLevel => {
                format_battery(battery_mv.map(battery_percent).unwrap_or(0))
            }
        }
    }

    /// Run one loop iteration
    pub fn tick(&mut self, now: u64, pressed: bool) -> TickReport {
        match self.state {
            RunState::Halted => return TickReport::idle(PowerDirective::Halt),
            RunState::Asleep => return TickReport::idle(PowerDirective::Sleep),
            RunState::Awake => {}
        }

        let gesture = self.gestures.update(now, pressed);
        let action = reduce_gesture(
            gesture,
            &self.config.actions,
            &mut self.store,
            &mut self.queue,
        );
        if let Some(action @ (ButtonAction::Halt | ButtonAction::BlankAndHalt)) = action {
            let refresh = self.halt(action);
            return TickReport {
                gesture,
                refresh,
                power: PowerDirective::Halt,
            };
        }

        let refresh = match self.queue.pop() {
            Some(request) => self.process(request),
            None => None,
        };
        self.flush();

        let mut power = PowerDirective::StayAwake;
        if !self.connected
            && now >= self.sleep_deadline
            && self.queue.is_empty()
            && !self.gestures.is_busy()
        {
            info!("Awake timeout reached, sleeping");
            self.quiesce();
            self.state = RunState::Asleep;
            power = PowerDirective::Sleep;
        }

        TickReport {
            gesture,
            refresh,
            power,
        }
    }

    fn process(&mut self, request: PendingRequest) -> Option<RefreshOutcome> {
        trace!("Processing {}", request);
        match request {
            PendingRequest::Clear => {
                let already_blank = self.store.current_mode() == DisplayMode::Blank;
                self.store.clear_all();
                if already_blank {
                    debug!("Already blank, skipping clear");
                    self.store.revert_request();
                    return None;
                }
                self.render(PaintJob::Blank)
            }
            PendingRequest::Content(change) => {
                let mode = match change.mode {
                    DisplayMode::Status => DisplayMode::Info,
                    mode => mode,
                };
                if mode == DisplayMode::Qr && self.store.qr().is_empty() && !change.redraw {
                    info!("QR requested without data, reverting");
                    self.store.revert_request();
                    return None;
                }
                if !change.redraw
                    && mode == self.store.current_mode()
                    && !self.store.is_dirty(mode)
                {
                    return None;
                }
                self.render(PaintJob::for_mode(mode))
            }
            PendingRequest::Status(message) => self.render(PaintJob::Status(message)),
        }
    }

    /// Plan, compose and execute one refresh
    fn render(&mut self, job: PaintJob) -> Option<RefreshOutcome> {
        let plan = self.refresh.plan(job, self.display.bounds());
        info!("Refresh {} ({})", job, plan.class);

        // The scene borrows the store; it must be gone before confirm_mode
        let result = {
            let scene = compose_scene(
                job,
                plan.target,
                &self.display,
                &mut self.encoder,
                self.store.info(),
                self.store.qr(),
            );
            self.refresh
                .execute(&mut self.display, &plan, |d| scene.draw(d))
        };

        if let Err(e) = self.display.hibernate() {
            warn!("Display hibernate failed: {}", e);
        }
        self.store.confirm_mode(job.mode());

        match result {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Refresh failed: {}", e);
                None
            }
        }
    }

    fn flush(&mut self) {
        if !self.store.has_unsaved() {
            return;
        }
        if let Err(e) = self.store.flush(&mut self.storage) {
            warn!("Persisting state failed: {}", e);
        }
    }

    fn quiesce(&mut self) {
        if let Err(e) = self.display.hibernate() {
            warn!("Display hibernate failed: {}", e);
        }
    }

    fn halt(&mut self, action: ButtonAction) -> Option<RefreshOutcome> {
        info!("Halting ({})", action);
        self.queue.clear();
        let refresh = if action == ButtonAction::BlankAndHalt {
            self.store.clear_all();
            self.render(PaintJob::Blank)
        } else {
            None
        };
        self.flush();
        self.quiesce();
        self.state = RunState::Halted;
        refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{QrCodegenEncoder, DATA_TOO_LONG, NO_QR_DATA};
    use crate::content::persist::{save_mode, save_text, DEFAULT_INFO};
    use crate::mock::{MemoryStore, RecordingDisplay, Window};
    use crate::render::{status_rect, RefreshClass};
    use crate::traits::Rect;
    use pixeltag_hal::StorageKey;

    type Controller = BadgeController<RecordingDisplay, QrCodegenEncoder, MemoryStore>;

    const PANEL: Rect = Rect::new(0, 0, 250, 122);

    fn controller_with(storage: MemoryStore) -> Controller {
        BadgeController::new(
            BadgeConfig::default(),
            RecordingDisplay::new(250, 122),
            QrCodegenEncoder::new(),
            storage,
        )
    }

    fn booted() -> Controller {
        let mut c = controller_with(MemoryStore::new());
        c.wake(0, WakeReason::PowerOn, false);
        c.tick(0, false);
        c
    }

    fn write(c: &mut Controller, token: &str, now: u64) -> Option<MirrorField> {
        c.on_transport(TransportEvent::DataWritten(token), now)
    }

    /// Tick every 10 ms over [from, to)
    fn run(c: &mut Controller, from: u64, to: u64, pressed: bool) -> heapless::Vec<TickReport, 8> {
        let mut reports = heapless::Vec::new();
        let mut t = from;
        while t < to {
            let report = c.tick(t, pressed);
            if report.refresh.is_some() || report.gesture != ButtonGesture::None {
                let _ = reports.push(report);
            }
            t += 10;
        }
        reports
    }

    #[test]
    fn test_boot_renders_defaults() {
        let c = booted();
        let pass = c.display().last_pass().unwrap();
        assert!(pass.is_full());
        assert!(pass.has_text("Default Name"));
        assert!(pass.has_text("Default Title"));
        assert_eq!(c.store().info(), DEFAULT_INFO);
        assert_eq!(c.store().current_mode(), DisplayMode::Info);
    }

    #[test]
    fn test_boot_restores_persisted_state() {
        let mut mem = MemoryStore::new();
        save_mode(&mut mem, DisplayMode::Qr).unwrap();
        save_text(&mut mem, StorageKey::InfoText, "Ada\nEngineer").unwrap();
        save_text(&mut mem, StorageKey::QrText, "https://example.com/a").unwrap();

        let mut c = controller_with(mem);
        c.wake(0, WakeReason::PowerOn, false);
        let report = c.tick(0, false);

        assert_eq!(report.refresh.unwrap().class, RefreshClass::Full);
        assert_eq!(c.store().current_mode(), DisplayMode::Qr);
        assert_eq!(c.store().info(), "Ada\nEngineer");
        let pass = c.display().last_pass().unwrap();
        assert!(pass.dark_fills > 0);
        assert!(PANEL.contains_rect(&pass.ink));
    }

    #[test]
    fn test_unavailable_storage_still_boots() {
        let mut c = controller_with(MemoryStore::unavailable());
        c.wake(0, WakeReason::PowerOn, false);
        c.tick(0, false);
        assert!(c.display().last_pass().unwrap().has_text("No Info Received Yet."));
    }

    #[test]
    fn test_info_write_renders_and_persists() {
        let mut c = booted();
        write(&mut c, "data:personal:Grace Hopper\\nAdmiral", 10);
        let report = c.tick(10, false);

        assert_eq!(report.refresh.unwrap().class, RefreshClass::Full);
        let pass = c.display().last_pass().unwrap();
        assert!(pass.has_text("Grace Hopper"));
        assert!(pass.has_text("Admiral"));
        assert!(PANEL.contains_rect(&pass.ink));
        assert!(c.storage().contains(StorageKey::InfoText));

        // Survives a wake
        let mut c2 = controller_with(MemoryStore::new());
        core::mem::swap(&mut c2.storage, &mut c.storage);
        c2.wake(0, WakeReason::Button, true);
        assert_eq!(c2.store().info(), "Grace Hopper\nAdmiral");
    }

    #[test]
    fn test_qr_write_switches_mode() {
        let mut c = booted();
        write(&mut c, "data:qr:https://example.com/a", 10);
        c.tick(10, false);
        assert_eq!(c.store().current_mode(), DisplayMode::Qr);
        let pass = c.display().last_pass().unwrap();
        assert!(pass.is_full());
        assert!(pass.dark_fills > 0);
        assert!(PANEL.contains_rect(&pass.ink));
    }

    #[test]
    fn test_oversized_shows_status_after_blank_pass() {
        let mut c = booted();
        let mut token: heapless::String<128> = heapless::String::try_from("data:qr:").unwrap();
        for _ in 0..91 {
            token.push('z').unwrap();
        }
        write(&mut c, &token, 10);
        let passes_before = c.display().passes().len();
        let report = c.tick(10, false);

        let outcome = report.refresh.unwrap();
        assert_eq!(outcome.class, RefreshClass::Partial);
        assert!(outcome.blank_sub_pass);
        assert_eq!(c.store().qr(), "");
        assert_eq!(c.store().current_mode(), DisplayMode::Status);

        let passes = c.display().passes();
        assert_eq!(passes.len(), passes_before + 2);
        assert!(passes[passes_before].is_blank());
        let status = &passes[passes_before + 1];
        assert_eq!(status.window, Window::Partial(status_rect(PANEL)));
        assert!(status.has_text(DATA_TOO_LONG));
        assert!(status_rect(PANEL).contains_rect(&status.ink));

        // A second status is partial without another blank pass
        write(&mut c, &token, 20);
        let report = c.tick(20, false);
        assert!(!report.refresh.unwrap().blank_sub_pass);
    }

    #[test]
    fn test_link_overflow_shows_status() {
        let mut c = booted();
        write(&mut c, "data:qr:https://example.com/a", 10);
        c.tick(10, false);

        assert_eq!(c.on_transport(TransportEvent::Oversized, 20), None);
        let report = c.tick(20, false);
        assert!(report.refresh.is_some());
        assert!(c.display().last_pass().unwrap().has_text(DATA_TOO_LONG));
        assert_eq!(c.store().qr(), "https://example.com/a");
    }

    #[test]
    fn test_clear_and_clear_again() {
        let mut c = booted();
        write(&mut c, "COMMAND:CLEAR", 10);
        let report = c.tick(10, false);
        assert!(report.refresh.is_some());
        assert!(c.display().last_pass().unwrap().is_blank());
        assert_eq!(c.store().current_mode(), DisplayMode::Blank);

        write(&mut c, "clear", 20);
        let report = c.tick(20, false);
        assert!(report.refresh.is_none());
    }

    #[test]
    fn test_qr_mode_without_data_reverts() {
        let mut c = booted();
        let passes = c.display().passes().len();
        write(&mut c, "display:qr", 10);
        let report = c.tick(10, false);
        assert!(report.refresh.is_none());
        assert_eq!(c.display().passes().len(), passes);
        assert_eq!(c.store().current_mode(), DisplayMode::Info);
        assert_eq!(c.store().requested_mode(), DisplayMode::Info);
    }

    #[test]
    fn test_restored_empty_qr_shows_message() {
        let mut mem = MemoryStore::new();
        save_mode(&mut mem, DisplayMode::Qr).unwrap();
        let mut c = controller_with(mem);
        c.wake(0, WakeReason::PowerOn, false);
        c.tick(0, false);
        assert!(c.display().last_pass().unwrap().has_text(NO_QR_DATA));
    }

    #[test]
    fn test_same_mode_request_is_noop() {
        let mut c = booted();
        write(&mut c, "display:info", 10);
        assert!(c.tick(10, false).refresh.is_none());
    }

    #[test]
    fn test_button_cycles_modes() {
        let mut c = booted();
        write(&mut c, "data:qr:https://example.com/a", 10);
        write(&mut c, "display:info", 10);
        c.tick(10, false);
        assert_eq!(c.store().current_mode(), DisplayMode::Info);

        run(&mut c, 20, 100, true);
        let reports = run(&mut c, 100, 1000, false);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].gesture, ButtonGesture::SingleClick);
        assert_eq!(c.store().current_mode(), DisplayMode::Qr);

        // Cooldown: the next click is ignored
        run(&mut c, 1000, 1100, true);
        run(&mut c, 1100, 2000, false);
        assert_eq!(c.store().current_mode(), DisplayMode::Qr);

        run(&mut c, 6000, 6100, true);
        run(&mut c, 6100, 7000, false);
        assert_eq!(c.store().current_mode(), DisplayMode::Blank);
        assert!(c.display().last_pass().unwrap().is_blank());
    }

    #[test]
    fn test_double_click_blanks_and_halts() {
        let mut c = booted();
        run(&mut c, 10, 100, true);
        run(&mut c, 100, 200, false);
        let mut halted = false;
        let mut t = 200;
        while t < 300 {
            let report = c.tick(t, true);
            if report.power == PowerDirective::Halt {
                halted = true;
                assert!(report.refresh.is_some());
                break;
            }
            t += 10;
        }
        assert!(halted);
        assert_eq!(c.state(), RunState::Halted);
        assert!(c.display().last_pass().unwrap().is_blank());

        // Everything afterwards is ignored
        assert_eq!(write(&mut c, "read:name", 400), None);
        assert_eq!(c.tick(400, false).power, PowerDirective::Halt);
        c.wake(500, WakeReason::Button, true);
        assert_eq!(c.state(), RunState::Halted);
    }

    #[test]
    fn test_halt_only_keeps_image() {
        let mut config = BadgeConfig::default();
        config.actions = crate::config::ButtonActions::halt_only();
        let mut c = BadgeController::new(
            config,
            RecordingDisplay::new(250, 122),
            QrCodegenEncoder::new(),
            MemoryStore::new(),
        );
        c.wake(0, WakeReason::PowerOn, false);
        c.tick(0, false);
        let passes = c.display().passes().len();

        run(&mut c, 10, 100, true);
        let mut t = 100;
        let mut report = c.tick(t, false);
        while report.power != PowerDirective::Halt && t < 1000 {
            t += 10;
            report = c.tick(t, false);
        }
        assert_eq!(report.power, PowerDirective::Halt);
        assert!(report.refresh.is_none());
        assert_eq!(c.display().passes().len(), passes);
    }

    #[test]
    fn test_sleeps_after_timeout_when_disconnected() {
        let mut c = booted();
        assert_eq!(c.tick(59_990, false).power, PowerDirective::StayAwake);
        assert_eq!(c.tick(60_000, false).power, PowerDirective::Sleep);
        assert_eq!(c.state(), RunState::Asleep);
        assert!(c.display().hibernations() > 0);
    }

    #[test]
    fn test_connection_keeps_awake_and_disconnect_resets_timer() {
        let mut c = booted();
        c.on_transport(TransportEvent::Connected, 1000);
        assert_eq!(c.tick(120_000, false).power, PowerDirective::StayAwake);

        c.on_transport(TransportEvent::Disconnected, 130_000);
        assert_eq!(c.tick(189_990, false).power, PowerDirective::StayAwake);
        assert_eq!(c.tick(190_000, false).power, PowerDirective::Sleep);
    }

    #[test]
    fn test_no_sleep_mid_gesture() {
        let mut c = booted();
        run(&mut c, 59_800, 59_900, true);
        assert_eq!(c.tick(60_000, false).power, PowerDirective::StayAwake);
    }

    #[test]
    fn test_button_wake_rerenders_timer_wake_does_not() {
        let mut c = booted();
        c.tick(60_000, false);
        assert_eq!(c.state(), RunState::Asleep);

        let passes = c.display().passes().len();
        c.wake(100_000, WakeReason::Timer, false);
        c.tick(100_000, false);
        assert_eq!(c.display().passes().len(), passes);

        c.tick(160_000, false);
        c.wake(200_000, WakeReason::Button, true);
        let report = c.tick(200_000, true);
        assert!(report.refresh.is_some());
        assert_eq!(c.display().passes().len(), passes + 1);
        // Releasing the wake press is not a click
        let reports = run(&mut c, 200_010, 201_000, false);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_persist_failure_not_fatal() {
        let mut mem = MemoryStore::new();
        mem.fail_writes(true);
        let mut c = controller_with(mem);
        c.wake(0, WakeReason::PowerOn, false);
        c.tick(0, false);
        write(&mut c, "data:personal:Ada", 10);
        let report = c.tick(10, false);
        assert!(report.refresh.is_some());
        assert_eq!(c.store().info(), "Ada");
    }

    #[test]
    fn test_mirror_fields() {
        let mut c = booted();
        write(&mut c, "data:personal:Ada\\nEngineer\\nada@example.com", 10);
        write(&mut c, "data:qr:https://example.com/a", 10);
        assert_eq!(write(&mut c, "read:title", 10), Some(MirrorField::Title));

        assert_eq!(c.mirror(MirrorField::Name, None).as_str(), "name:Ada\n");
        assert_eq!(c.mirror(MirrorField::Title, None).as_str(), "title:Engineer\n");
        assert_eq!(
            c.mirror(MirrorField::Contact, None).as_str(),
            "contact:ada@example.com\n"
        );
        assert_eq!(
            c.mirror(MirrorField::QrUrl, None).as_str(),
            "qr:https://example.com/a\n"
        );
        assert_eq!(
            c.mirror(MirrorField::BatteryLevel, Some(3900)).as_str(),
            "battery:75\n"
        );
    }
}
