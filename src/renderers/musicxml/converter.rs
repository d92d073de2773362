//! MusicXML document converter
//!
//! Main entry point for converting decoded staff symbols to MusicXML 3.1.
//! Every staff becomes one part; parts are independent, so they may be
//! converted on scoped worker threads and are reassembled in input order.

use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::models::Symbol;
use crate::parse::read_tokens;
use super::builder::MusicXmlWriter;
use super::errors::Result;
use super::measure::build_measures;
use super::types::{Direction, Instrument, Measure, PageLayout, Part, ScorePart, ScorePartwise};

/// Page height in tenths used for `large_page`
pub const LARGE_PAGE_HEIGHT: u32 = 300;
/// Page width in tenths used for `large_page`
pub const LARGE_PAGE_WIDTH: u32 = 110;

/// Configuration options for export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Oversized page so that one page holds every detected staff
    pub large_page: bool,

    /// Quarter-note metronome mark on the first measure of the first part
    pub metronome: Option<u32>,

    /// Playback tempo of the metronome mark; falls back to `metronome`
    pub tempo: Option<u32>,

    /// Work title
    pub title: String,

    /// Convert parts on worker threads
    pub parallel: bool,
}

impl ExportSettings {
    /// Load settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn page_layout(&self) -> Option<PageLayout> {
        self.large_page.then_some(PageLayout {
            page_height: LARGE_PAGE_HEIGHT,
            page_width: LARGE_PAGE_WIDTH,
        })
    }

    pub(crate) fn metronome_direction(&self) -> Option<Direction> {
        let per_minute = self.metronome.filter(|bpm| *bpm > 0)?;
        Some(Direction {
            per_minute,
            tempo: self.tempo.filter(|t| *t > 0).unwrap_or(per_minute),
        })
    }
}

/// Part id for the part at `index`: `P1`, `P2`, ...
pub fn part_id(index: usize) -> String {
    format!("P{}", index + 1)
}

fn score_part(index: usize) -> ScorePart {
    let id = part_id(index);
    ScorePart {
        instrument: Instrument {
            id: format!("{}-I1", id),
            name: "Piano".to_string(),
            sound: "keyboard.piano".to_string(),
            midi_channel: 1,
            midi_program: 1,
            volume: 100,
            pan: 0,
        },
        id,
        name: String::new(),
    }
}

/// Build the document tree for a list of staffs
pub fn generate_document(settings: &ExportSettings, staffs: &[Vec<Symbol>]) -> Result<ScorePartwise> {
    log::debug!("Generating MusicXML for {} staffs (parallel: {})", staffs.len(), settings.parallel);

    let measures = if settings.parallel && staffs.len() > 1 {
        convert_parallel(settings, staffs)?
    } else {
        staffs
            .iter()
            .enumerate()
            .map(|(index, staff)| build_measures(settings, staff, index == 0))
            .collect::<Result<Vec<_>>>()?
    };

    let parts = measures
        .into_iter()
        .enumerate()
        .map(|(index, measures)| Part {
            id: part_id(index),
            measures,
        })
        .collect();

    Ok(ScorePartwise {
        work_title: settings.title.clone(),
        defaults: settings.page_layout(),
        part_list: (0..staffs.len()).map(score_part).collect(),
        parts,
    })
}

/// One scoped thread per part; results keep the input order
fn convert_parallel(settings: &ExportSettings, staffs: &[Vec<Symbol>]) -> Result<Vec<Vec<Measure>>> {
    thread::scope(|scope| {
        let handles: Vec<_> = staffs
            .iter()
            .enumerate()
            .map(|(index, staff)| scope.spawn(move || build_measures(settings, staff, index == 0)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

/// Convert staffs of decoded symbols to MusicXML text
pub fn to_musicxml(settings: &ExportSettings, staffs: &[Vec<Symbol>]) -> Result<String> {
    let document = generate_document(settings, staffs)?;
    Ok(MusicXmlWriter::new().render(&document))
}

/// Convert one token text block per staff to MusicXML text
pub fn tokens_to_musicxml(settings: &ExportSettings, staffs: &[&str]) -> Result<String> {
    let symbols = staffs
        .iter()
        .map(|text| read_tokens(text))
        .collect::<Result<Vec<_>>>()?;
    to_musicxml(settings, &symbols)
}

/// Convert and write the result to `path`
pub fn save_musicxml<P: AsRef<Path>>(path: P, settings: &ExportSettings, staffs: &[Vec<Symbol>]) -> Result<()> {
    let xml = to_musicxml(settings, staffs)?;
    std::fs::write(path.as_ref(), xml)?;
    log::debug!("Wrote MusicXML to {}", path.as_ref().display());
    Ok(())
}
