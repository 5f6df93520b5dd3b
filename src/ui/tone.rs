use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::state::AppState;
use crate::error::{BloomError, Result};

const SAMPLE_RATE: u32 = 44_100;
const TONE_HZ: f64 = 800.0;
const TONE_SECS: f64 = 0.1;
const GAIN_START: f64 = 0.3;
const GAIN_END: f64 = 0.01;
const WAV_HEADER_LEN: usize = 44;

fn gain_at(t: f64) -> f64 {
    GAIN_START * (GAIN_END / GAIN_START).powf(t / TONE_SECS)
}

/// Short sine "pop" as a mono 16-bit PCM WAV file.
pub fn synthesize_pop() -> Vec<u8> {
    let sample_count = (SAMPLE_RATE as f64 * TONE_SECS) as u32;
    let data_len = sample_count * 2;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for n in 0..sample_count {
        let t = n as f64 / SAMPLE_RATE as f64;
        let value = (TAU * TONE_HZ * t).sin() * gain_at(t);
        let sample = (value * i16::MAX as f64).round() as i16;
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Tones still playing. Each one drops itself from here when it ends, so
/// rapid taps overlap instead of cutting each other off.
pub struct Voices<T> {
    next_id: u64,
    live: Vec<(u64, T)>,
}

impl<T> Default for Voices<T> {
    fn default() -> Self {
        Voices {
            next_id: 0,
            live: Vec::new(),
        }
    }
}

impl<T> Voices<T> {
    /// Streams that never report an end are evicted oldest first past this.
    const MAX_LIVE: usize = 32;

    pub fn start(&mut self, voice: T) -> u64 {
        if self.live.len() >= Self::MAX_LIVE {
            self.live.remove(0);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live.push((id, voice));
        id
    }

    pub fn finish(&mut self, id: u64) -> Option<T> {
        let pos = self.live.iter().position(|(live_id, _)| *live_id == id)?;
        Some(self.live.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

fn open_pop() -> Result<gtk::MediaFile> {
    let bytes = glib::Bytes::from_owned(synthesize_pop());
    let stream = gio::MemoryInputStream::from_bytes(&bytes);
    let media = gtk::MediaFile::for_input_stream(&stream);
    match media.error() {
        Some(err) => Err(BloomError::Tone(err.to_string())),
        None => Ok(media),
    }
}

/// Best effort; a missing media backend or blocked playback is silently dropped.
pub fn play_pop(state: &Rc<RefCell<AppState>>) {
    if !state.borrow().settings.sound {
        return;
    }
    let media = match open_pop() {
        Ok(media) => media,
        Err(err) => {
            log::debug!("{err}");
            return;
        }
    };

    let id = state.borrow_mut().tones.start(media.clone());
    let state_weak = Rc::downgrade(state);
    let release = move |media: &gtk::MediaFile| {
        if let Some(err) = media.error() {
            log::debug!("pop tone failed: {err}");
        } else if !media.is_ended() {
            return;
        }
        if let Some(state) = state_weak.upgrade() {
            state.borrow_mut().tones.finish(id);
        }
    };
    media.connect_ended_notify(release.clone());
    media.connect_error_notify(release);
    media.play();
}
