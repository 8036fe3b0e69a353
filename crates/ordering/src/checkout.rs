//! Checkout state machine.
//!
//! Every customer action is a [`Command`]. [`apply`] checks the command's
//! guard against the session and, only when it passes, mutates the session
//! and reports what to show next. A rejected command leaves the session
//! exactly as it was.

use chrono::NaiveDate;
use leipomo_core::{CheckoutStep, SlotTime, YearMonth};
use thiserror::Error;

use crate::cart::{CartError, CartItem, LineRef};
use crate::schedule::{Availability, CalendarView, MonthResolution, PickupCheck};
use crate::session::OrderSession;

/// A customer action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a fresh order from the catalog. Empties the cart.
    StartOrder,
    AddItem { item: CartItem, quantity: i64 },
    ChangeQuantity { line: LineRef, delta: i64 },
    RemoveLine { key: String },
    /// Empty the cart. The caller confirms with the customer first.
    ClearCart,
    BeginCheckout,
    SubmitName(String),
    SubmitEmail(String),
    SubmitPhone(String),
    ShowMonth(YearMonth),
    NextMonth,
    PreviousMonth,
    SelectDate(NaiveDate),
    SelectTime(SlotTime),
    SubmitNote(String),
    Back,
}

impl Command {
    /// Whether the command needs pickup availability to be evaluated.
    #[must_use]
    pub const fn needs_schedule(&self) -> bool {
        matches!(
            self,
            Self::NextMonth
                | Self::PreviousMonth
                | Self::SelectDate(_)
                | Self::SelectTime(_)
                | Self::SubmitNote(_)
        )
    }

    /// Short name for logs. Never includes customer input.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartOrder => "start_order",
            Self::AddItem { .. } => "add_item",
            Self::ChangeQuantity { .. } => "change_quantity",
            Self::RemoveLine { .. } => "remove_line",
            Self::ClearCart => "clear_cart",
            Self::BeginCheckout => "begin_checkout",
            Self::SubmitName(_) => "submit_name",
            Self::SubmitEmail(_) => "submit_email",
            Self::SubmitPhone(_) => "submit_phone",
            Self::ShowMonth(_) => "show_month",
            Self::NextMonth => "next_month",
            Self::PreviousMonth => "previous_month",
            Self::SelectDate(_) => "select_date",
            Self::SelectTime(_) => "select_time",
            Self::SubmitNote(_) => "submit_note",
            Self::Back => "back",
        }
    }
}

/// What to show after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Category browsing.
    Catalog,
    /// The cart summary.
    Cart,
    /// The prompt for a checkout step.
    Step(CheckoutStep),
    /// Everything is collected; place the order.
    Submit,
}

/// Reasons a command is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cannot check out with an empty cart")]
    EmptyCart,

    #[error("no checkout in progress")]
    NotInCheckout,

    #[error("expected the {expected} step, currently at {actual}")]
    WrongStep {
        expected: CheckoutStep,
        actual: CheckoutStep,
    },

    #[error("{0} must not be empty")]
    BlankField(CheckoutStep),

    #[error("{0} is not available for pickup")]
    DateUnavailable(NaiveDate),

    #[error("{0} is not an available pickup time")]
    SlotUnavailable(SlotTime),

    #[error("pickup date and time must be chosen first")]
    MissingPickup,

    #[error("chosen pickup is no longer valid: {0:?}")]
    PickupExpired(PickupCheck),

    #[error("pickup hours are not available")]
    ScheduleUnavailable,

    #[error("ordering is unavailable while order constraints cannot be loaded")]
    OrderingUnavailable,

    #[error(transparent)]
    Cart(#[from] CartError),
}

impl CheckoutError {
    /// Message suitable for display to the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty. Add something before checking out.",
            Self::NotInCheckout | Self::WrongStep { .. } => {
                "That answer does not belong to the current question."
            }
            Self::BlankField(CheckoutStep::Name) => "Please enter your name.",
            Self::BlankField(CheckoutStep::Email) => "Please enter your email address.",
            Self::BlankField(CheckoutStep::Phone) => "Please enter your phone number.",
            Self::BlankField(_) => "Please fill in this field.",
            Self::DateUnavailable(_) => "That day is not available for pickup. Please choose another.",
            Self::SlotUnavailable(_) => "That time is not available. Please choose another.",
            Self::MissingPickup => "Please choose a pickup date and time first.",
            Self::PickupExpired(_) => {
                "Your pickup time is no longer available. Please choose a new time."
            }
            Self::ScheduleUnavailable => "Pickup times cannot be shown right now.",
            Self::OrderingUnavailable => {
                "Online ordering is temporarily unavailable. Please try again later."
            }
            Self::Cart(err) => err.user_message(),
        }
    }
}

/// Apply `command` to `session`.
///
/// `availability` must reflect the current wall clock; date and time
/// selections are validated against it at the moment they are made.
///
/// # Errors
///
/// Returns `CheckoutError` when the command's guard fails. The session is
/// not modified in that case.
pub fn apply(
    session: &mut OrderSession,
    command: Command,
    availability: Option<&Availability<'_>>,
) -> Result<Transition, CheckoutError> {
    match command {
        Command::StartOrder => {
            session.cart.clear();
            session.step = None;
            Ok(Transition::Catalog)
        }
        Command::AddItem { item, quantity } => {
            session.cart.add_item(&item, quantity);
            Ok(after_cart_change(session))
        }
        Command::ChangeQuantity { line, delta } => {
            session.cart.change_quantity(&line, delta)?;
            Ok(after_cart_change(session))
        }
        Command::RemoveLine { key } => {
            session.cart.remove_line(&key);
            Ok(after_cart_change(session))
        }
        Command::ClearCart => {
            session.cart.clear();
            Ok(after_cart_change(session))
        }
        Command::BeginCheckout => {
            if session.cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            session.step = Some(CheckoutStep::Name);
            Ok(Transition::Step(CheckoutStep::Name))
        }
        Command::SubmitName(value) => {
            submit_text(session, CheckoutStep::Name, &value, |s| &mut s.name)
        }
        Command::SubmitEmail(value) => {
            submit_text(session, CheckoutStep::Email, &value, |s| &mut s.email)
        }
        Command::SubmitPhone(value) => {
            submit_text(session, CheckoutStep::Phone, &value, |s| &mut s.phone)
        }
        Command::ShowMonth(month) => {
            expect_step(session, CheckoutStep::Date)?;
            session.calendar_month = Some(month);
            Ok(Transition::Step(CheckoutStep::Date))
        }
        Command::NextMonth | Command::PreviousMonth => {
            expect_step(session, CheckoutStep::Date)?;
            let shown = session
                .calendar_month
                .or_else(|| availability.map(|a| YearMonth::of(a.today())))
                .ok_or(CheckoutError::ScheduleUnavailable)?;
            session.calendar_month = Some(if matches!(command, Command::NextMonth) {
                shown.next()
            } else {
                shown.previous()
            });
            Ok(Transition::Step(CheckoutStep::Date))
        }
        Command::SelectDate(date) => {
            expect_step(session, CheckoutStep::Date)?;
            let availability = availability.ok_or(CheckoutError::ScheduleUnavailable)?;
            let slots = availability.time_slots(date);
            if !availability.is_date_available(date) || slots.is_empty() {
                return Err(CheckoutError::DateUnavailable(date));
            }

            if session.pickup_date != Some(date)
                || session.pickup_time.is_some_and(|time| !slots.contains(&time))
            {
                session.pickup_time = None;
            }
            session.pickup_date = Some(date);
            session.calendar_month = Some(YearMonth::of(date));
            session.step = Some(CheckoutStep::Time);
            Ok(Transition::Step(CheckoutStep::Time))
        }
        Command::SelectTime(time) => {
            expect_step(session, CheckoutStep::Time)?;
            let availability = availability.ok_or(CheckoutError::ScheduleUnavailable)?;
            let date = session.pickup_date.ok_or(CheckoutError::MissingPickup)?;
            if !availability.time_slots(date).contains(&time)
                || !availability.check_pickup(date, time).is_ok()
            {
                return Err(CheckoutError::SlotUnavailable(time));
            }

            session.pickup_time = Some(time);
            session.step = Some(CheckoutStep::Note);
            Ok(Transition::Step(CheckoutStep::Note))
        }
        Command::SubmitNote(note) => {
            expect_step(session, CheckoutStep::Note)?;
            let (date, time) = session.pickup().ok_or(CheckoutError::MissingPickup)?;
            let availability = availability.ok_or(CheckoutError::ScheduleUnavailable)?;
            let check = availability.check_pickup(date, time);
            if !check.is_ok() {
                return Err(CheckoutError::PickupExpired(check));
            }
            if session.cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }

            note.trim().clone_into(&mut session.note);
            Ok(Transition::Submit)
        }
        Command::Back => Ok(match session.step {
            None | Some(CheckoutStep::Name) => {
                session.step = None;
                Transition::Catalog
            }
            Some(step) => {
                let previous = step.previous().unwrap_or(CheckoutStep::Name);
                session.step = Some(previous);
                Transition::Step(previous)
            }
        }),
    }
}

/// Checkout cannot continue with an empty cart; collected fields are kept.
fn after_cart_change(session: &mut OrderSession) -> Transition {
    if session.cart.is_empty() {
        session.step = None;
    }
    Transition::Cart
}

fn expect_step(session: &OrderSession, expected: CheckoutStep) -> Result<(), CheckoutError> {
    match session.step {
        None => Err(CheckoutError::NotInCheckout),
        Some(actual) if actual != expected => Err(CheckoutError::WrongStep { expected, actual }),
        Some(_) => Ok(()),
    }
}

fn submit_text(
    session: &mut OrderSession,
    step: CheckoutStep,
    value: &str,
    field: fn(&mut OrderSession) -> &mut String,
) -> Result<Transition, CheckoutError> {
    expect_step(session, step)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::BlankField(step));
    }

    value.clone_into(field(session));

    let next = step.next().unwrap_or(CheckoutStep::Note);
    session.step = Some(next);
    Ok(Transition::Step(next))
}

// =============================================================================
// Date step
// =============================================================================

/// The date prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStep {
    pub calendar: CalendarView,
    /// The requested month had no available day and a later one is shown.
    pub substituted: bool,
    /// No month within the booking horizon has an available day.
    pub no_availability: bool,
}

/// Prepare the date prompt.
///
/// Resolves the month to show (never earlier than the current month),
/// records it on the session, and pre-selects the earliest available day
/// when the session has no valid pickup date yet.
pub fn prepare_date_step(session: &mut OrderSession, availability: &Availability<'_>) -> DateStep {
    let current = YearMonth::of(availability.today());
    let requested = session.calendar_month.map_or(current, |month| month.max(current));

    let (month, substituted, no_availability) = match availability.resolve_month(requested) {
        MonthResolution::Found {
            month,
            dates,
            substituted,
        } => {
            // Today can be available with every slot already inside the lead time.
            let bookable = |date: NaiveDate| {
                availability.is_date_available(date) && !availability.time_slots(date).is_empty()
            };
            if !session.pickup_date.is_some_and(bookable) {
                session.pickup_date = dates.iter().copied().find(|date| bookable(*date));
                session.pickup_time = None;
            }
            (month, substituted, false)
        }
        MonthResolution::NoAvailability => (requested, false, true),
    };

    session.calendar_month = Some(month);
    DateStep {
        calendar: availability.calendar(month, session.pickup_date),
        substituted,
        no_availability,
    }
}
