use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, Weekday};
use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::prelude::*;

use super::celebration;
use super::countdown::{ClockPhase, Remaining, TickOutcome, fallback_deadline, next_deadline};
use super::state::{AppState, ClockWidgets};

const TICK_SECS: u64 = 1;
const SECONDS_PULSE_MS: u64 = 200;

pub fn weekday_name(weekday: Weekday) -> String {
    match weekday {
        Weekday::Mon => gettext("Monday"),
        Weekday::Tue => gettext("Tuesday"),
        Weekday::Wed => gettext("Wednesday"),
        Weekday::Thu => gettext("Thursday"),
        Weekday::Fri => gettext("Friday"),
        Weekday::Sat => gettext("Saturday"),
        Weekday::Sun => gettext("Sunday"),
    }
}

fn time_unit(caption: &str) -> (gtk::Box, gtk::Label) {
    let unit = gtk::Box::new(gtk::Orientation::Vertical, 4);
    unit.add_css_class("time-unit");
    let value = gtk::Label::new(Some("00"));
    value.add_css_class("time-value");
    let caption = gtk::Label::new(Some(caption));
    caption.add_css_class("time-caption");
    caption.add_css_class("caption");
    unit.append(&value);
    unit.append(&caption);
    (unit, value)
}

pub(super) fn build_clock_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let weekday = state.borrow().settings.deadline_weekday;

    let root = gtk::Box::new(gtk::Orientation::Vertical, 14);
    root.set_halign(gtk::Align::Center);
    root.add_css_class("countdown-root");

    let heading = gtk::Label::new(Some(
        &gettext("Counting down to {weekday}").replace("{weekday}", &weekday_name(weekday)),
    ));
    heading.add_css_class("countdown-heading");
    heading.add_css_class("title-2");

    let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    row.set_halign(gtk::Align::Center);
    let (days_box, days) = time_unit(&gettext("Days"));
    let (hours_box, hours) = time_unit(&gettext("Hours"));
    let (minutes_box, minutes) = time_unit(&gettext("Minutes"));
    let (seconds_box, seconds) = time_unit(&gettext("Seconds"));
    row.append(&days_box);
    row.append(&hours_box);
    row.append(&minutes_box);
    row.append(&seconds_box);

    let message = gtk::Label::new(None);
    message.add_css_class("countdown-message");
    message.set_wrap(true);
    message.set_justify(gtk::Justification::Center);

    root.append(&heading);
    root.append(&row);
    root.append(&message);

    state.borrow_mut().clock = Some(ClockWidgets {
        days,
        hours,
        minutes,
        seconds,
        message,
    });
    root
}

fn resolve_deadline(now: DateTime<Local>, weekday: Weekday) -> DateTime<Local> {
    match next_deadline(&now, weekday) {
        Ok(deadline) => deadline,
        Err(err) => {
            let fallback = fallback_deadline(&now, weekday);
            log::warn!("{err}; counting down to {fallback} instead");
            fallback
        }
    }
}

fn pulse_seconds(label: &gtk::Label) {
    label.add_css_class("pulse");
    glib::timeout_add_local_once(Duration::from_millis(SECONDS_PULSE_MS), {
        let label_weak = label.downgrade();
        move || {
            if let Some(label) = label_weak.upgrade() {
                label.remove_css_class("pulse");
            }
        }
    });
}

fn show_fields(clock: &ClockWidgets, remaining: Remaining) {
    for (label, text) in clock.fields().into_iter().zip(remaining.fields()) {
        label.set_text(&text);
    }
}

enum Tick {
    Running,
    Finished,
}

/// One refresh of the display. Runs the completion path the first time the
/// deadline is behind us.
fn tick(state: &Rc<RefCell<AppState>>) -> Tick {
    let mut guard = state.borrow_mut();
    let st = &mut *guard;
    let Some(deadline) = st.deadline else {
        return Tick::Finished;
    };
    let Some(clock) = &st.clock else {
        return Tick::Finished;
    };

    match st.clock_phase.advance(&deadline, &Local::now()) {
        TickOutcome::Render(remaining) => {
            show_fields(clock, remaining);
            pulse_seconds(&clock.seconds);
            Tick::Running
        }
        TickOutcome::Idle => Tick::Finished,
        TickOutcome::Finish => {
            show_fields(clock, Remaining::ZERO);
            let weekday = weekday_name(st.settings.deadline_weekday);
            clock
                .message
                .set_text(&gettext("✨ It's {weekday}! ✨").replace("{weekday}", &weekday));
            // The source is ending itself via ControlFlow::Break; forget the handle.
            st.timer_handle = None;
            let layer = st.celebration_layer.clone();
            drop(guard);

            log::info!("countdown reached zero");
            if let Some(layer) = layer {
                celebration::launch(&layer);
            }
            Tick::Finished
        }
    }
}

pub(super) fn start_countdown(state: &Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        if let Some(handle) = st.timer_handle.take() {
            handle.remove();
        }
        let deadline = resolve_deadline(Local::now(), st.settings.deadline_weekday);
        log::info!("Countdown to: {}", deadline.format("%A %Y-%m-%d %H:%M:%S%.3f"));
        st.deadline = Some(deadline);
        st.clock_phase = ClockPhase::Running;
    }

    if let Tick::Finished = tick(state) {
        return;
    }

    let state_tick = state.clone();
    let handle = glib::timeout_add_local(Duration::from_secs(TICK_SECS), move || {
        match tick(&state_tick) {
            Tick::Running => glib::ControlFlow::Continue,
            Tick::Finished => glib::ControlFlow::Break,
        }
    });
    state.borrow_mut().timer_handle = Some(handle);
}
