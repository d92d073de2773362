// MusicXML text writer

use super::types::{
    Attributes, Barline, Direction, Measure, MeasureElement, NotationMark, Notations, Note, NoteContent, Ornament,
    Part, ScorePart, ScorePartwise,
};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const DOCTYPE: &str = "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">";

/// Renders a [`ScorePartwise`] tree as indented MusicXML 3.1 text
pub struct MusicXmlWriter {
    buffer: String,
    depth: usize,
}

impl MusicXmlWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
        }
    }

    /// Render a whole document, consuming the writer
    pub fn render(mut self, score: &ScorePartwise) -> String {
        self.buffer.push_str(XML_DECLARATION);
        self.buffer.push('\n');
        self.buffer.push_str(DOCTYPE);
        self.buffer.push('\n');

        self.open("score-partwise", &[("version", "3.1")]);
        self.open("work", &[]);
        self.text("work-title", &score.work_title);
        self.close("work");

        match &score.defaults {
            Some(layout) => {
                self.open("defaults", &[]);
                self.open("page-layout", &[]);
                self.text("page-height", &layout.page_height.to_string());
                self.text("page-width", &layout.page_width.to_string());
                self.close("page-layout");
                self.close("defaults");
            }
            None => self.empty("defaults", &[]),
        }

        self.open("part-list", &[]);
        for score_part in &score.part_list {
            self.write_score_part(score_part);
        }
        self.close("part-list");

        for part in &score.parts {
            self.write_part(part);
        }
        self.close("score-partwise");
        self.buffer
    }

    fn write_score_part(&mut self, score_part: &ScorePart) {
        let instrument = &score_part.instrument;
        self.open("score-part", &[("id", score_part.id.as_str())]);
        self.text("part-name", &score_part.name);
        self.open("score-instrument", &[("id", instrument.id.as_str())]);
        self.text("instrument-name", &instrument.name);
        self.text("instrument-sound", &instrument.sound);
        self.close("score-instrument");
        self.open("midi-instrument", &[("id", instrument.id.as_str())]);
        self.text("midi-channel", &instrument.midi_channel.to_string());
        self.text("midi-program", &instrument.midi_program.to_string());
        self.text("volume", &instrument.volume.to_string());
        self.text("pan", &instrument.pan.to_string());
        self.close("midi-instrument");
        self.close("score-part");
    }

    fn write_part(&mut self, part: &Part) {
        self.open("part", &[("id", part.id.as_str())]);
        for measure in &part.measures {
            self.write_measure(measure);
        }
        self.close("part");
    }

    fn write_measure(&mut self, measure: &Measure) {
        self.open("measure", &[("number", measure.number.to_string().as_str())]);
        for element in &measure.elements {
            match element {
                MeasureElement::NewSystem => self.empty("print", &[("new-system", "yes")]),
                MeasureElement::Attributes(attributes) => self.write_attributes(attributes),
                MeasureElement::Direction(direction) => self.write_direction(direction),
                MeasureElement::Note(note) => self.write_note(note),
                MeasureElement::Backup(ticks) => {
                    self.open("backup", &[]);
                    self.text("duration", &ticks.to_string());
                    self.close("backup");
                }
                MeasureElement::Forward(ticks) => {
                    self.open("forward", &[]);
                    self.text("duration", &ticks.to_string());
                    self.close("forward");
                }
                MeasureElement::Barline(barline) => self.write_barline(barline),
            }
        }
        self.close("measure");
    }

    fn write_attributes(&mut self, attributes: &Attributes) {
        self.open("attributes", &[]);
        if let Some(divisions) = attributes.divisions {
            self.text("divisions", &divisions.to_string());
        }
        for fifths in &attributes.keys {
            self.open("key", &[]);
            self.text("fifths", &fifths.to_string());
            self.close("key");
        }
        for time in &attributes.times {
            self.open("time", &[]);
            self.text("beats", &time.beats.to_string());
            self.text("beat-type", &time.beat_type.to_string());
            self.close("time");
        }
        if let Some(staves) = attributes.staves {
            self.text("staves", &staves.to_string());
        }
        for clef in &attributes.clefs {
            self.open("clef", &[("number", clef.number.to_string().as_str())]);
            self.text("sign", &clef.sign.to_string());
            self.text("line", &clef.line.to_string());
            self.close("clef");
        }
        if let Some(count) = attributes.multiple_rest {
            self.open("measure-style", &[]);
            self.text("multiple-rest", &count.to_string());
            self.close("measure-style");
        }
        self.close("attributes");
    }

    fn write_direction(&mut self, direction: &Direction) {
        self.open("direction", &[]);
        self.open("direction-type", &[]);
        self.open("metronome", &[]);
        self.text("beat-unit", "quarter");
        self.text("per-minute", &direction.per_minute.to_string());
        self.close("metronome");
        self.close("direction-type");
        self.empty("sound", &[("tempo", direction.tempo.to_string().as_str())]);
        self.close("direction");
    }

    fn write_barline(&mut self, barline: &Barline) {
        self.open("barline", &[("location", barline.location.as_str())]);
        if let Some(style) = &barline.bar_style {
            self.text("bar-style", style);
        }
        for ending in &barline.endings {
            self.empty(
                "ending",
                &[("number", ending.number.to_string().as_str()), ("type", ending.ending_type.as_str())],
            );
        }
        if let Some(repeat) = barline.repeat {
            self.empty("repeat", &[("direction", repeat.as_str())]);
        }
        self.close("barline");
    }

    /// Children in schema order: grace, chord, pitch/rest, duration, voice,
    /// type, dot, time-modification, staff, beam, notations
    fn write_note(&mut self, note: &Note) {
        self.open("note", &[]);
        if note.grace {
            self.empty("grace", &[]);
        }
        if note.chord {
            self.empty("chord", &[]);
        }
        match note.content {
            NoteContent::Pitch { step, octave, alter } => {
                self.open("pitch", &[]);
                self.text("step", &step.to_string());
                if let Some(alter) = alter {
                    self.text("alter", &alter.to_string());
                }
                self.text("octave", &octave.to_string());
                self.close("pitch");
            }
            NoteContent::Rest { measure: true } => self.empty("rest", &[("measure", "yes")]),
            NoteContent::Rest { measure: false } => self.empty("rest", &[]),
        }
        if let Some(duration) = note.duration {
            self.text("duration", &duration.to_string());
        }
        self.text("voice", &note.voice.to_string());
        if let Some(note_type) = &note.note_type {
            self.text("type", note_type);
        }
        for _ in 0..note.dots {
            self.empty("dot", &[]);
        }
        if let Some((actual, normal)) = note.time_modification {
            self.open("time-modification", &[]);
            self.text("actual-notes", &actual.to_string());
            self.text("normal-notes", &normal.to_string());
            self.close("time-modification");
        }
        self.text("staff", &note.staff.to_string());
        if let Some(beam) = note.beam {
            self.open_inline("beam", &[("number", "1")], beam.as_str());
        }
        if !note.notations.is_empty() {
            self.write_notations(&note.notations);
        }
        self.close("note");
    }

    fn write_notations(&mut self, notations: &Notations) {
        self.open("notations", &[]);
        for mark in &notations.marks {
            match mark {
                NotationMark::Fermata => self.empty("fermata", &[]),
                NotationMark::Arpeggiate => self.empty("arpeggiate", &[]),
                NotationMark::Slur { kind, number } => {
                    self.empty("slur", &[("type", kind.as_str()), ("number", number.to_string().as_str())])
                }
                NotationMark::Tied { kind, number: Some(number) } => {
                    self.empty("tied", &[("type", kind.as_str()), ("number", number.to_string().as_str())])
                }
                NotationMark::Tied { kind, number: None } => self.empty("tied", &[("type", kind.as_str())]),
            }
        }
        if let Some(tuplet) = notations.tuplet {
            self.empty("tuplet", &[("type", tuplet.as_str())]);
        }
        if !notations.articulations.is_empty() {
            self.open("articulations", &[]);
            for articulation in &notations.articulations {
                self.empty(articulation.xml_name(), &[]);
            }
            self.close("articulations");
        }
        if !notations.ornaments.is_empty() {
            self.open("ornaments", &[]);
            for ornament in &notations.ornaments {
                match ornament {
                    Ornament::Tremolo(kind) => self.open_inline("tremolo", &[("type", kind.as_str())], "3"),
                    Ornament::TrillMark => self.empty("trill-mark", &[]),
                    Ornament::InvertedTurn => self.empty("inverted-turn", &[]),
                }
            }
            self.close("ornaments");
        }
        self.close("notations");
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
    }

    fn start_tag(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.indent();
        self.buffer.push('<');
        self.buffer.push_str(tag);
        for (name, value) in attributes {
            self.buffer.push_str(&format!(" {}=\"{}\"", name, xml_escape(value)));
        }
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.start_tag(tag, attributes);
        self.buffer.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buffer.push_str(&format!("</{}>\n", tag));
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.start_tag(tag, attributes);
        self.buffer.push_str("/>\n");
    }

    fn text(&mut self, tag: &str, value: &str) {
        self.open_inline(tag, &[], value);
    }

    /// Element with attributes and text content on one line
    fn open_inline(&mut self, tag: &str, attributes: &[(&str, &str)], value: &str) {
        self.start_tag(tag, attributes);
        self.buffer.push_str(&format!(">{}</{}>\n", xml_escape(value), tag));
    }
}

impl Default for MusicXmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
