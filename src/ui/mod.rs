pub mod app;
mod celebration;
mod clock;
mod countdown;
mod dialogs;
mod overlay;
mod petals;
mod preview;
mod state;
mod tone;
