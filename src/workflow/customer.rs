//! Customer lifecycle: registration, support call and incident update

use super::{CallCenterModel, DbOperation, Flow, SupportFlow};
use crate::simulation::{Guard, Process, ProcessContext, RetryPolicy, SimTime, Step, Wake};
use crate::types::{Activity, CustomerId, ProcessId, SupportOutcome};
use std::rc::Rc;
use tracing::info;

#[derive(Debug)]
enum NewCustomerState {
    Idle,
    Registering,
    Inserting(DbOperation),
    Done,
}

/// Registration of a customer the database did not recognise
///
/// Yields `true` once the customer is inserted, `false` when registration
/// fails.
#[derive(Debug)]
pub struct NewCustomerRegistration {
    model: Rc<CallCenterModel>,
    retry: RetryPolicy,
    started: SimTime,
    state: NewCustomerState,
}

impl NewCustomerRegistration {
    /// Create a registration attempt
    pub fn new(model: Rc<CallCenterModel>) -> Self {
        let retry = RetryPolicy::new(model.scenario.high_level_failure_probability);
        Self { model, retry, started: SimTime::ZERO, state: NewCustomerState::Idle }
    }

    fn next_insert(&mut self, cx: &mut ProcessContext<'_>) -> Step<bool> {
        if self.retry.should_retry(cx.rng()) {
            let mut insert = self.model.database.register_to_service();
            let step = insert.resume(cx, Wake::Start);
            self.state = NewCustomerState::Inserting(insert);
            return step;
        }
        cx.exit(Activity::RegisterNewCustomer, self.started);
        Step::Ready(true)
    }
}

impl Flow for NewCustomerRegistration {
    type Output = bool;

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<bool> {
        match (std::mem::replace(&mut self.state, NewCustomerState::Done), wake) {
            (NewCustomerState::Idle, Wake::Start) => {
                self.started = cx.now();
                cx.enter(Activity::RegisterNewCustomer);
                self.state = NewCustomerState::Registering;
                Step::timeout(cx.sample(self.model.params.register_new_customer_time))
            }
            (NewCustomerState::Registering, Wake::Timer) => {
                if cx.draw() > self.model.params.registration_failure_rate {
                    self.next_insert(cx)
                } else {
                    info!("Failed to register new customer. Terminating connection.");
                    cx.exit(Activity::RegisterNewCustomer, self.started);
                    Step::Ready(false)
                }
            }
            (NewCustomerState::Inserting(mut insert), wake) => match insert.resume(cx, wake) {
                Step::Pending(y) => {
                    self.state = NewCustomerState::Inserting(insert);
                    Step::Pending(y)
                }
                Step::Ready(_) => self.next_insert(cx),
            },
            (state, wake) => {
                panic!("new customer registration in state {:?} cannot handle {:?}", state, wake)
            }
        }
    }
}

#[derive(Debug)]
enum RegistrationState {
    Idle,
    Identifying(DbOperation),
    Registering(NewCustomerRegistration),
    Done,
}

/// Registration check run by every arriving customer
///
/// Each attempt identifies the customer in the database and, if they are not
/// eligible, tries to register them. Attempts repeat with the scenario's
/// high-level failure probability; the result of the last attempt decides
/// whether the customer is served.
#[derive(Debug)]
pub struct RegistrationFlow {
    model: Rc<CallCenterModel>,
    retry: RetryPolicy,
    started: SimTime,
    registered: bool,
    state: RegistrationState,
}

impl RegistrationFlow {
    /// Create the registration check
    pub fn new(model: Rc<CallCenterModel>) -> Self {
        let retry = RetryPolicy::new(model.scenario.high_level_failure_probability);
        Self {
            model,
            retry,
            started: SimTime::ZERO,
            registered: false,
            state: RegistrationState::Idle,
        }
    }

    fn next_attempt(&mut self, cx: &mut ProcessContext<'_>) -> Step<bool> {
        if self.retry.should_retry(cx.rng()) {
            let mut identify = self.model.database.identify();
            let step = identify.resume(cx, Wake::Start);
            self.state = RegistrationState::Identifying(identify);
            return step;
        }
        cx.exit(Activity::IsRegistered, self.started);
        Step::Ready(self.registered)
    }

    fn on_identified(&mut self, cx: &mut ProcessContext<'_>, eligible: bool) -> Step<bool> {
        self.registered = eligible;
        if eligible {
            return self.next_attempt(cx);
        }
        let mut registration = NewCustomerRegistration::new(Rc::clone(&self.model));
        match registration.resume(cx, Wake::Start) {
            Step::Pending(y) => {
                self.state = RegistrationState::Registering(registration);
                Step::Pending(y)
            }
            Step::Ready(registered) => {
                self.registered = registered;
                self.next_attempt(cx)
            }
        }
    }
}

impl Flow for RegistrationFlow {
    type Output = bool;

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<bool> {
        match (std::mem::replace(&mut self.state, RegistrationState::Done), wake) {
            (RegistrationState::Idle, Wake::Start) => {
                self.started = cx.now();
                cx.enter(Activity::IsRegistered);
                info!("check if customer registered");
                self.next_attempt(cx)
            }
            (RegistrationState::Identifying(mut identify), wake) => {
                match identify.resume(cx, wake) {
                    Step::Pending(y) => {
                        self.state = RegistrationState::Identifying(identify);
                        Step::Pending(y)
                    }
                    Step::Ready(eligible) => self.on_identified(cx, eligible),
                }
            }
            (RegistrationState::Registering(mut registration), wake) => {
                match registration.resume(cx, wake) {
                    Step::Pending(y) => {
                        self.state = RegistrationState::Registering(registration);
                        Step::Pending(y)
                    }
                    Step::Ready(registered) => {
                        self.registered = registered;
                        self.next_attempt(cx)
                    }
                }
            }
            (state, wake) => panic!("registration in state {:?} cannot handle {:?}", state, wake),
        }
    }
}

#[derive(Debug)]
enum CustomerPhase {
    Registration(RegistrationFlow),
    WaitingForBot,
    InCall { bot: Guard, support: SupportFlow },
    WaitingForUpdater,
    UpdatingIncident { updater: Guard, started: SimTime },
    Finished,
}

/// One customer from arrival to the closing of their incident
#[derive(Debug)]
pub struct CustomerProcess {
    id: CustomerId,
    model: Rc<CallCenterModel>,
    phase: CustomerPhase,
}

impl CustomerProcess {
    /// Create the process for customer `id`
    pub fn new(id: CustomerId, model: Rc<CallCenterModel>) -> Self {
        let registration = RegistrationFlow::new(Rc::clone(&model));
        Self { id, model, phase: CustomerPhase::Registration(registration) }
    }

    /// Customer identity
    pub fn customer_id(&self) -> CustomerId {
        self.id
    }

    fn on_registration(&mut self, cx: &mut ProcessContext<'_>, registered: bool) -> Step<()> {
        if !registered {
            cx.counters().increment_rejected();
            self.phase = CustomerPhase::Finished;
            return Step::Ready(());
        }
        info!("enters waiting queue");
        self.phase = CustomerPhase::WaitingForBot;
        Step::acquire(self.model.facilities.bots)
    }

    fn on_call_finished(
        &mut self,
        cx: &mut ProcessContext<'_>,
        outcome: SupportOutcome,
    ) -> Step<()> {
        info!(%outcome, "left call");
        let counters = cx.counters();
        counters.increment_handled();
        match outcome {
            SupportOutcome::Resolved => counters.increment_resolved(),
            SupportOutcome::HardwareReferral => counters.increment_hardware_referrals(),
            SupportOutcome::Escalated => counters.increment_escalations(),
        }
        self.phase = CustomerPhase::WaitingForUpdater;
        Step::acquire(self.model.facilities.updaters)
    }
}

impl Process for CustomerProcess {
    fn id(&self) -> ProcessId {
        ProcessId::Customer(self.id)
    }

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<()> {
        match (std::mem::replace(&mut self.phase, CustomerPhase::Finished), wake) {
            (CustomerPhase::Registration(mut registration), wake) => {
                match registration.resume(cx, wake) {
                    Step::Pending(y) => {
                        self.phase = CustomerPhase::Registration(registration);
                        Step::Pending(y)
                    }
                    Step::Ready(registered) => self.on_registration(cx, registered),
                }
            }
            (CustomerPhase::WaitingForBot, Wake::Granted(bot)) => {
                info!("enters call");
                let mut support = SupportFlow::new(self.id, Rc::clone(&self.model));
                match support.resume(cx, Wake::Start) {
                    Step::Pending(y) => {
                        self.phase = CustomerPhase::InCall { bot, support };
                        Step::Pending(y)
                    }
                    Step::Ready(outcome) => {
                        drop(bot);
                        self.on_call_finished(cx, outcome)
                    }
                }
            }
            (CustomerPhase::InCall { bot, mut support }, wake) => match support.resume(cx, wake) {
                Step::Pending(y) => {
                    self.phase = CustomerPhase::InCall { bot, support };
                    Step::Pending(y)
                }
                Step::Ready(outcome) => {
                    drop(bot);
                    self.on_call_finished(cx, outcome)
                }
            },
            (CustomerPhase::WaitingForUpdater, Wake::Granted(updater)) => {
                let started = cx.now();
                cx.enter(Activity::UpdateIncident);
                self.phase = CustomerPhase::UpdatingIncident { updater, started };
                Step::timeout(cx.sample(self.model.params.avg_incident_update_time))
            }
            (CustomerPhase::UpdatingIncident { updater, started }, Wake::Timer) => {
                info!("Connection is cleaned");
                cx.exit(Activity::UpdateIncident, started);
                cx.counters().increment_incidents_updated();
                drop(updater);
                Step::Ready(())
            }
            (phase, wake) => {
                panic!("customer {} in phase {:?} cannot handle {:?}", self.id, phase, wake)
            }
        }
    }
}
