//! Session controller: the kiosk's single owner of session state.
//!
//! The controller consumes decoded serial events, front-panel requests and
//! timer ticks, calls the directory collaborators, and produces device
//! commands and display notifications. It runs on one task and owns the
//! session, the deposit batch and every timer, so nothing here is locked.
//!
//! # Timers
//!
//! All timing decisions take an explicit `now`, which keeps the controller
//! deterministic under test:
//!
//! - **debounce**: a batch commits once no deposit arrived for `debounce_ms`
//! - **settle**: logout waits until `settle_ms` after the last deposit
//! - **inactivity**: a logged-in user with no activity for `timeout_secs` is
//!   logged out
//!
//! # Deposits and logout
//!
//! One increment call per batch, awaited before anything else happens. A
//! logout request while a batch is open or settling moves the session to
//! `LoggingOut`; the logout completes on the first tick after the batch has
//! committed (or failed) and the settle window has passed.
//!
//! # Examples
//!
//! ```no_run
//! use kiosk_core::{TokenId, UserId, UserInfo};
//! use kiosk_directory::{InMemoryCreditStore, StaticIdentityResolver};
//! use kiosk_hardware::CommandSender;
//! use kiosk_session::{Notifier, SessionConfig, SessionController};
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let alice = UserId::new("alice").unwrap();
//! let resolver = StaticIdentityResolver::new().with_token(TokenId::new("AB12").unwrap(), alice.clone());
//! let store = InMemoryCreditStore::new().with_user(alice, UserInfo::new(50, false));
//!
//! let (commands, _device) = CommandSender::channel(32);
//! let (notifier, _display) = Notifier::channel();
//! let (_events_tx, events) = mpsc::channel(100);
//! let (_control_tx, control) = mpsc::channel(8);
//!
//! SessionController::new(resolver, store, commands, notifier, SessionConfig::default())
//!     .run(events, control)
//!     .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use kiosk_core::{Credits, Error, Result, TokenId, UserId, UserInfo};
use kiosk_directory::{CreditStore, DirectoryError, IdentityResolver};
use kiosk_hardware::CommandSender;
use kiosk_protocol::{DeviceCommand, SerialEvent};
use kiosk_storage::{DepositLedger, SqliteDepositLedger};

use crate::config::SessionConfig;
use crate::control::ControlRequest;
use crate::notification::{Notification, Notifier};
use crate::session::{MoneyBatch, Session};
use crate::state_machine::{SessionState, StateMachine};

pub const AUTH_FAILED_MESSAGE: &str = "Could not authenticate user, please contact a drink admin";
pub const FETCH_FAILED_MESSAGE: &str =
    "Could not fetch account information, please contact a drink admin";
pub const COMMIT_FAILED_MESSAGE: &str =
    "Could not add money to account, please contact a Drink Admin";
pub const LOG_OUT_FIRST_MESSAGE: &str = "Please log out before another user logs in";
pub const UNCLAIMED_DEPOSIT_MESSAGE: &str =
    "Money was inserted while nobody was logged in, please contact a drink admin";
pub const DOOR_DENIED_MESSAGE: &str = "Only drink admins can open the money door";

/// Why a session is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Requested,
    Inactivity,
    Shutdown,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutReason::Requested => write!(f, "logout button"),
            LogoutReason::Inactivity => write!(f, "inactivity"),
            LogoutReason::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Drives the kiosk session.
pub struct SessionController<R, S> {
    resolver: R,
    store: S,
    ledger: Option<SqliteDepositLedger>,
    commands: CommandSender,
    notifier: Notifier,
    config: SessionConfig,
    machine: StateMachine,
    session: Option<Session>,
    batch: MoneyBatch,
    last_activity: Instant,
    pending_logout: Option<LogoutReason>,
}

impl<R, S> SessionController<R, S>
where
    R: IdentityResolver,
    S: CreditStore,
{
    pub fn new(
        resolver: R,
        store: S,
        commands: CommandSender,
        notifier: Notifier,
        config: SessionConfig,
    ) -> Self {
        Self {
            resolver,
            store,
            ledger: None,
            commands,
            notifier,
            config,
            machine: StateMachine::new(),
            session: None,
            batch: MoneyBatch::default(),
            last_activity: Instant::now(),
            pending_logout: None,
        }
    }

    /// Record every committed deposit in `ledger`.
    pub fn with_ledger(mut self, ledger: SqliteDepositLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn state(&self) -> SessionState {
        *self.machine.current_state()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn batch(&self) -> &MoneyBatch {
        &self.batch
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Apply one decoded serial event.
    ///
    /// Every event, valid or not, counts as activity.
    pub async fn handle_event(&mut self, event: SerialEvent, now: Instant) -> Result<()> {
        self.last_activity = now;

        match event {
            SerialEvent::TokenScanned(token) => self.on_token(token, now).await,
            SerialEvent::MoneyDeposited(amount) => self.on_deposit(amount, now).await,
            SerialEvent::InvalidInput(raw) => {
                info!(input = %raw.escape_debug(), "Ignoring invalid input");
                Ok(())
            }
        }
    }

    /// Apply one front-panel request.
    pub async fn handle_control(&mut self, request: ControlRequest, now: Instant) -> Result<()> {
        match request {
            ControlRequest::Logout => self.request_logout(now),
            ControlRequest::ToggleMoneyDoor => {
                self.last_activity = now;
                self.toggle_money_door();
                Ok(())
            }
        }
    }

    /// Evaluate the timers: commit a quiet batch, enforce the inactivity
    /// timeout, and finish a deferred logout once money has settled.
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        if self.batch.is_due(now, self.config.debounce_window()) {
            self.commit().await?;
        }

        if matches!(
            self.state(),
            SessionState::LoggedInIdle | SessionState::LoggedInCounting
        ) && now.saturating_duration_since(self.last_activity) >= self.config.inactivity_timeout()
        {
            self.begin_logout(LogoutReason::Inactivity, now)?;
        }

        if self.state() == SessionState::LoggingOut
            && !self.batch.is_open()
            && !self.batch.is_settling(now, self.config.settle_window())
        {
            let reason = self.pending_logout.unwrap_or(LogoutReason::Requested);
            self.finalize_logout(reason)?;
        }

        Ok(())
    }

    /// Explicit logout. Deferred while money is pending.
    pub fn request_logout(&mut self, now: Instant) -> Result<()> {
        match self.state() {
            SessionState::LoggedOut => {
                debug!("Logout requested with nobody logged in");
                Ok(())
            }
            SessionState::LoggingOut => {
                debug!("Logout already pending");
                Ok(())
            }
            SessionState::LoggedInIdle | SessionState::LoggedInCounting => {
                self.begin_logout(LogoutReason::Requested, now)
            }
        }
    }

    /// Open or close the money door for an admin session.
    pub fn toggle_money_door(&mut self) {
        let Some(session) = self.session.as_mut() else {
            debug!("Money door request with nobody logged in");
            return;
        };

        if !session.is_admin {
            warn!(user = %session.user, "Money door request from a non-admin");
            self.notifier
                .notify(Notification::append_log(DOOR_DENIED_MESSAGE));
            return;
        }

        let command = if session.door_open {
            DeviceCommand::CloseMoneyDoor
        } else {
            DeviceCommand::OpenMoneyDoor
        };
        session.door_open = !session.door_open;

        info!(user = %session.user, open = session.door_open, "Money door toggled");
        self.commands.send(command);
    }

    /// Run until the device link closes.
    ///
    /// The loop never exits on a failed step; failures are logged and the
    /// session stays in a safe state. On exit any open batch is committed
    /// and the session is logged out.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SerialEvent>,
        mut control: mpsc::Receiver<ControlRequest>,
    ) {
        let mut poll = tokio::time::interval(self.config.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;

        info!(
            timeout_secs = self.config.timeout_secs,
            debounce_ms = self.config.debounce_ms,
            settle_ms = self.config.settle_ms,
            "Session loop started"
        );

        loop {
            let result = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()).await,
                    None => break,
                },
                request = control.recv(), if control_open => match request {
                    Some(request) => self.handle_control(request, Instant::now()).await,
                    None => {
                        debug!("Control channel closed");
                        control_open = false;
                        Ok(())
                    }
                },
                _ = poll.tick() => self.tick(Instant::now()).await,
            };

            if let Err(e) = result {
                error!(error = %e, state = %self.state(), "Session step failed");
            }
        }

        info!("Device link closed, stopping session loop");
        if let Err(e) = self.shutdown().await {
            error!(error = %e, "Session shutdown failed");
        }
    }

    /// Commit any open batch and end the session.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.batch.is_open() {
            self.commit().await?;
        }

        if self.state().is_logged_in() {
            self.finalize_logout(LogoutReason::Shutdown)?;
        }

        Ok(())
    }

    async fn on_token(&mut self, token: TokenId, now: Instant) -> Result<()> {
        if let Some(session) = &self.session {
            if session.token == token {
                debug!(session = %session.id, "Current token scanned again, ignoring");
            } else {
                warn!(
                    user = %session.user,
                    token = %token,
                    "Different token scanned during a session, rejecting"
                );
                self.notifier
                    .notify(Notification::append_log(LOG_OUT_FIRST_MESSAGE));
            }
            return Ok(());
        }

        self.login(token, now).await
    }

    async fn login(&mut self, token: TokenId, now: Instant) -> Result<()> {
        let timeout = self.config.call_timeout();

        let user = match with_timeout(timeout, "identity lookup", self.resolver.resolve(&token)).await
        {
            Ok(user) => user,
            Err(e) => {
                warn!(token = %token, kind = e.kind(), error = %e, "Could not authenticate token");
                self.reject_login(AUTH_FAILED_MESSAGE);
                return Ok(());
            }
        };

        let info = match with_timeout(timeout, "account lookup", self.store.get_user_info(&user)).await
        {
            Ok(info) => info,
            Err(e) => {
                warn!(user = %user, kind = e.kind(), error = %e, "Could not fetch account information");
                self.reject_login(FETCH_FAILED_MESSAGE);
                return Ok(());
            }
        };

        let is_admin = info.is_admin || self.config.is_admin_override(&user);
        self.machine.transition_to(SessionState::LoggedInIdle)?;

        let session = Session::new(token, user, UserInfo::new(info.credits, is_admin));
        info!(
            session = %session.id,
            user = %session.user,
            credits = session.credits,
            is_admin,
            "User logged in"
        );

        self.batch.clear();
        self.pending_logout = None;
        self.last_activity = now;
        self.commands.send(DeviceCommand::Arm);
        self.notifier.notify(Notification::NewUser {
            user_id: session.user.clone(),
            credits: session.credits,
            is_admin,
        });
        self.session = Some(session);

        Ok(())
    }

    fn reject_login(&self, message: &str) {
        self.commands.send(DeviceCommand::Disarm);
        self.notifier.notify(Notification::append_log(message));
    }

    async fn on_deposit(&mut self, amount: u32, now: Instant) -> Result<()> {
        // A batch that went quiet before the next poll is committed on its own
        if self.batch.is_due(now, self.config.debounce_window()) {
            self.commit().await?;
        }

        match self.state() {
            SessionState::LoggedOut => {
                warn!(amount, "Money deposited with nobody logged in, not credited");
                self.commands.send(DeviceCommand::Disarm);
                self.notifier
                    .notify(Notification::append_log(UNCLAIMED_DEPOSIT_MESSAGE));
            }
            SessionState::LoggedInIdle => {
                self.machine.transition_to(SessionState::LoggedInCounting)?;
                self.batch.add(amount, now);
                debug!(amount, "Deposit batch opened");
            }
            SessionState::LoggedInCounting | SessionState::LoggingOut => {
                self.batch.add(amount, now);
                debug!(amount, pending = self.batch.accumulated(), "Deposit added to batch");
            }
        }

        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let amount = self.batch.take();

        let Some(user) = self.session.as_ref().map(|session| session.user.clone()) else {
            error!(amount, "Deposit batch open without a session, discarding");
            return Err(Error::NoActiveSession);
        };

        if amount > 0 {
            let result = with_timeout(
                self.config.call_timeout(),
                "credit increment",
                self.store.increment_credits(&user, amount),
            )
            .await;

            match result {
                Ok(new_credits) => self.on_committed(&user, amount, new_credits).await,
                Err(e) => {
                    error!(
                        user = %user,
                        amount,
                        kind = e.kind(),
                        error = %e,
                        "Could not add money to account, batch discarded"
                    );
                    self.notifier
                        .notify(Notification::append_log(COMMIT_FAILED_MESSAGE));
                }
            }
        } else {
            debug!(user = %user, "Empty deposit batch closed");
        }

        if self.state() == SessionState::LoggedInCounting {
            self.machine.transition_to(SessionState::LoggedInIdle)?;
        }

        Ok(())
    }

    async fn on_committed(&mut self, user: &UserId, amount: Credits, new_credits: Credits) {
        if let Some(session) = self.session.as_mut() {
            session.credits = new_credits;
        }

        info!(user = %user, amount, new_credits, "Deposit committed");
        self.notifier.notify(Notification::MoneyAdded {
            amount,
            new_credits,
        });
        self.notifier.notify(Notification::append_log(format!(
            "Added {amount} drink credits to {user}'s account"
        )));

        if let Some(ledger) = &self.ledger
            && let Err(e) = ledger.record_deposit(user, amount).await
        {
            warn!(user = %user, amount, error = %e, "Could not record deposit in ledger");
        }
    }

    fn begin_logout(&mut self, reason: LogoutReason, now: Instant) -> Result<()> {
        if self.batch.is_open() || self.batch.is_settling(now, self.config.settle_window()) {
            info!(
                %reason,
                pending = self.batch.accumulated(),
                "Logout deferred until deposits settle"
            );
            self.machine.transition_to(SessionState::LoggingOut)?;
            self.pending_logout = Some(reason);
            return Ok(());
        }

        self.finalize_logout(reason)
    }

    fn finalize_logout(&mut self, reason: LogoutReason) -> Result<()> {
        self.machine.transition_to(SessionState::LoggedOut)?;

        if let Some(session) = self.session.take() {
            if session.door_open {
                info!(user = %session.user, "Closing money door on logout");
                self.commands.send(DeviceCommand::CloseMoneyDoor);
            }
            info!(session = %session.id, user = %session.user, %reason, "User logged out");
        }

        self.batch.clear();
        self.pending_logout = None;
        self.commands.send(DeviceCommand::LogoutSignal);
        self.notifier.notify(Notification::Logout);

        Ok(())
    }
}

/// Bound a directory call by `timeout`, reporting expiry as unavailable.
async fn with_timeout<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = kiosk_directory::Result<T>>,
) -> kiosk_directory::Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(DirectoryError::unavailable(format!(
            "{operation} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_directory::{InMemoryCreditStore, StaticIdentityResolver};
    use tokio::sync::mpsc::{Receiver, UnboundedReceiver};

    type Controller = SessionController<StaticIdentityResolver, InMemoryCreditStore>;

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn token(raw: &str) -> TokenId {
        TokenId::new(raw).unwrap()
    }

    fn controller(
        is_admin: bool,
    ) -> (
        Controller,
        InMemoryCreditStore,
        Receiver<DeviceCommand>,
        UnboundedReceiver<Notification>,
    ) {
        let resolver = StaticIdentityResolver::new().with_token(token("AB12"), alice());
        let store = InMemoryCreditStore::new().with_user(alice(), UserInfo::new(50, is_admin));
        let (commands, device) = CommandSender::channel(32);
        let (notifier, display) = Notifier::channel();
        let controller = SessionController::new(
            resolver,
            store.clone(),
            commands,
            notifier,
            SessionConfig::default(),
        );
        (controller, store, device, display)
    }

    fn drain<T>(rx: &mut Receiver<T>) -> Vec<T> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn drain_notifications(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_changes_nothing() {
        let (mut controller, _store, mut device, mut display) = controller(false);
        let now = Instant::now();

        controller
            .handle_event(SerialEvent::InvalidInput("x:zz".to_string()), now)
            .await
            .unwrap();

        assert_eq!(controller.state(), SessionState::LoggedOut);
        assert!(drain(&mut device).is_empty());
        assert!(drain_notifications(&mut display).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_counts_as_activity() {
        let (mut controller, _store, _device, _display) = controller(false);
        let start = Instant::now();
        let timeout = controller.config.inactivity_timeout();

        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), start)
            .await
            .unwrap();
        controller
            .handle_event(
                SerialEvent::InvalidInput("noise".to_string()),
                start + timeout - Duration::from_secs(1),
            )
            .await
            .unwrap();
        controller.tick(start + timeout).await.unwrap();

        assert_eq!(controller.state(), SessionState::LoggedInIdle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_admin_cannot_open_door() {
        let (mut controller, _store, mut device, mut display) = controller(false);
        let now = Instant::now();
        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), now)
            .await
            .unwrap();
        drain(&mut device);
        drain_notifications(&mut display);

        controller
            .handle_control(ControlRequest::ToggleMoneyDoor, now)
            .await
            .unwrap();

        assert!(drain(&mut device).is_empty());
        assert_eq!(
            drain_notifications(&mut display),
            vec![Notification::append_log(DOOR_DENIED_MESSAGE)]
        );
        assert!(!controller.session().unwrap().door_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_door_toggle_and_close_on_logout() {
        let (mut controller, _store, mut device, _display) = controller(true);
        let now = Instant::now();
        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), now)
            .await
            .unwrap();

        controller
            .handle_control(ControlRequest::ToggleMoneyDoor, now)
            .await
            .unwrap();
        assert!(controller.session().unwrap().door_open);

        controller
            .handle_control(ControlRequest::Logout, now)
            .await
            .unwrap();

        assert_eq!(
            drain(&mut device),
            vec![
                DeviceCommand::Arm,
                DeviceCommand::OpenMoneyDoor,
                DeviceCommand::CloseMoneyDoor,
                DeviceCommand::LogoutSignal,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_door_toggle_closes_when_open() {
        let (mut controller, _store, mut device, _display) = controller(true);
        let now = Instant::now();
        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), now)
            .await
            .unwrap();

        controller.toggle_money_door();
        controller.toggle_money_door();

        assert!(!controller.session().unwrap().door_open);
        assert_eq!(
            drain(&mut device),
            vec![
                DeviceCommand::Arm,
                DeviceCommand::OpenMoneyDoor,
                DeviceCommand::CloseMoneyDoor,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_override_list() {
        let resolver = StaticIdentityResolver::new().with_token(token("AB12"), alice());
        let store = InMemoryCreditStore::new().with_user(alice(), UserInfo::new(5, false));
        let (commands, _device) = CommandSender::channel(32);
        let (notifier, mut display) = Notifier::channel();
        let config = SessionConfig {
            admins: vec!["alice".to_string()],
            ..Default::default()
        };
        let mut controller = SessionController::new(resolver, store, commands, notifier, config);

        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), Instant::now())
            .await
            .unwrap();

        assert!(controller.session().unwrap().is_admin);
        assert_eq!(
            drain_notifications(&mut display),
            vec![Notification::NewUser {
                user_id: alice(),
                credits: 5,
                is_admin: true,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_skips_store() {
        let (mut controller, store, _device, mut display) = controller(false);
        let start = Instant::now();
        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), start)
            .await
            .unwrap();
        drain_notifications(&mut display);

        controller
            .handle_event(SerialEvent::MoneyDeposited(0), start)
            .await
            .unwrap();
        assert_eq!(controller.state(), SessionState::LoggedInCounting);

        controller.tick(start + Duration::from_secs(2)).await.unwrap();

        assert_eq!(controller.state(), SessionState::LoggedInIdle);
        assert!(store.increments().await.is_empty());
        assert!(drain_notifications(&mut display).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let resolver = StaticIdentityResolver::new().with_token(token("AB12"), alice());
        let store = InMemoryCreditStore::new()
            .with_user(alice(), UserInfo::new(50, false))
            .with_latency(Duration::from_secs(30));
        let (commands, mut device) = CommandSender::channel(32);
        let (notifier, mut display) = Notifier::channel();
        let mut controller =
            SessionController::new(resolver, store, commands, notifier, SessionConfig::default());

        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), Instant::now())
            .await
            .unwrap();

        assert_eq!(controller.state(), SessionState::LoggedOut);
        assert_eq!(drain(&mut device), vec![DeviceCommand::Disarm]);
        assert_eq!(
            drain_notifications(&mut display),
            vec![Notification::append_log(FETCH_FAILED_MESSAGE)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_commits_open_batch() {
        let (mut controller, store, mut device, mut display) = controller(false);
        let now = Instant::now();
        controller
            .handle_event(SerialEvent::TokenScanned(token("AB12")), now)
            .await
            .unwrap();
        controller
            .handle_event(SerialEvent::MoneyDeposited(10), now)
            .await
            .unwrap();
        drain_notifications(&mut display);

        controller.shutdown().await.unwrap();

        assert_eq!(store.increments().await, vec![(alice(), 10)]);
        assert_eq!(controller.state(), SessionState::LoggedOut);
        assert_eq!(
            drain(&mut device),
            vec![DeviceCommand::Arm, DeviceCommand::LogoutSignal]
        );
        let notifications = drain_notifications(&mut display);
        assert_eq!(
            notifications.first(),
            Some(&Notification::MoneyAdded {
                amount: 10,
                new_credits: 60
            })
        );
        assert_eq!(notifications.last(), Some(&Notification::Logout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_maps_expiry_to_unavailable() {
        let result: kiosk_directory::Result<()> = with_timeout(
            Duration::from_millis(10),
            "probe",
            std::future::pending(),
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.kind(), "service_unavailable");
        assert!(error.to_string().contains("probe timed out after 10ms"));
    }
}
