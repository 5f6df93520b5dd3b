use chrono::{DateTime, Local};
use gtk4 as gtk;

use super::countdown::ClockPhase;
use super::petals::PetalField;
use super::tone::Voices;
use crate::settings::Settings;

/// Widgets of the intro overlay. Dropped once the overlay is detached.
pub struct IntroWidgets {
    pub root: gtk::Overlay,
    pub layer: gtk::Fixed,
    pub content: gtk::Box,
    pub count_label: gtk::Label,
    pub petal_widgets: Vec<gtk::DrawingArea>,
}

pub struct ClockWidgets {
    pub days: gtk::Label,
    pub hours: gtk::Label,
    pub minutes: gtk::Label,
    pub seconds: gtk::Label,
    pub message: gtk::Label,
}

impl ClockWidgets {
    pub fn fields(&self) -> [&gtk::Label; 4] {
        [&self.days, &self.hours, &self.minutes, &self.seconds]
    }
}

pub struct AppState {
    pub settings: Settings,
    pub stage: Option<gtk::Overlay>,
    pub celebration_layer: Option<gtk::Fixed>,
    pub dynamic_css_provider: Option<gtk::CssProvider>,

    // Petal overlay
    pub petals: PetalField,
    pub intro: Option<IntroWidgets>,
    pub reveal_started: bool,
    pub tones: Voices<gtk::MediaFile>,

    // Countdown
    pub deadline: Option<DateTime<Local>>,
    pub clock: Option<ClockWidgets>,
    pub timer_handle: Option<glib::SourceId>,
    pub clock_phase: ClockPhase,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        AppState {
            settings,
            stage: None,
            celebration_layer: None,
            dynamic_css_provider: None,
            petals: PetalField::default(),
            intro: None,
            reveal_started: false,
            tones: Voices::default(),
            deadline: None,
            clock: None,
            timer_handle: None,
            clock_phase: ClockPhase::default(),
        }
    }
}
