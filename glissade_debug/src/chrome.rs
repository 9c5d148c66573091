// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][trace-format] JSON to the given writer.
//!
//! Frame-clock run spans become `B`/`E` duration pairs so the timeline shows
//! when the loop was live; everything else is an instant event. Scroll
//! position is additionally emitted as a `C` counter track.
//!
//! [trace-format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use glissade_core::trace::{ClockTransition, EffectOutcome};

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 0;
const TID_CLOCK: u32 = 0;
const TID_SCROLL: u32 = 1;
const TID_LIFECYCLE: u32 = 2;
const TID_EFFECTS: u32 = 3;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Host times are already microseconds, the format's native unit.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut clock_open = false;

    for recorded in decode(bytes) {
        let ts = recorded.at().micros();
        match recorded {
            RecordedEvent::Frame(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Clock",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_CLOCK,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "subscribers": e.subscribers,
                    }
                }));
            }
            RecordedEvent::Clock(e) => match e.transition {
                ClockTransition::Started if !clock_open => {
                    clock_open = true;
                    events.push(json!({
                        "ph": "B",
                        "name": "Running",
                        "cat": "Clock",
                        "ts": ts,
                        "pid": PID,
                        "tid": TID_CLOCK,
                    }));
                }
                ClockTransition::Stopped if clock_open => {
                    clock_open = false;
                    events.push(json!({
                        "ph": "E",
                        "name": "Running",
                        "cat": "Clock",
                        "ts": ts,
                        "pid": PID,
                        "tid": TID_CLOCK,
                    }));
                }
                transition => {
                    events.push(json!({
                        "ph": "i",
                        "name": format!("{transition:?}"),
                        "cat": "Clock",
                        "ts": ts,
                        "pid": PID,
                        "tid": TID_CLOCK,
                        "s": "t",
                    }));
                }
            },
            RecordedEvent::Scroll(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.action),
                    "cat": "Scroll",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_SCROLL,
                    "s": "t",
                    "args": {
                        "position": e.position,
                        "target": e.target,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "scroll",
                    "ts": ts,
                    "pid": PID,
                    "args": {
                        "position": e.position,
                    }
                }));
            }
            RecordedEvent::Lifecycle(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.signal),
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_LIFECYCLE,
                    "s": "g",
                    "args": {
                        "from": format!("{:?}", e.from),
                        "to": format!("{:?}", e.to),
                    }
                }));
            }
            RecordedEvent::Observer(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.transition),
                    "cat": "Observer",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_EFFECTS,
                    "s": "t",
                    "args": {
                        "slot": e.slot,
                        "generation": e.generation,
                        "element": e.element.map(|el| el.0),
                    }
                }));
            }
            RecordedEvent::Effect(e) => {
                let outcome = match e.outcome {
                    EffectOutcome::Bound => "Bound".to_owned(),
                    EffectOutcome::Destroyed => "Destroyed".to_owned(),
                    EffectOutcome::Skipped(reason) => format!("Skipped({reason:?})"),
                };
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Effect",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_EFFECTS,
                    "s": "t",
                    "args": {
                        "element": e.element.map(|el| el.0),
                        "outcome": outcome,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use glissade_core::host::ElementId;
    use glissade_core::time::HostTime;
    use glissade_core::trace::{
        ClockEvent, EffectEvent, EffectKind, FrameEvent, ScrollAction, ScrollEvent, SkipReason,
        TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_clock(&ClockEvent {
            at: HostTime(1_000),
            transition: ClockTransition::Started,
        });
        rec.on_frame(&FrameEvent {
            frame_index: 0,
            now: HostTime(17_000),
            subscribers: 1,
        });
        rec.on_clock(&ClockEvent {
            at: HostTime(18_000),
            transition: ClockTransition::Stopped,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3, "start, frame, stop");

        assert_eq!(parsed[0]["ph"], "B", "start opens a span");
        assert_eq!(parsed[0]["ts"], 1_000, "start timestamp");
        assert_eq!(parsed[1]["ph"], "i", "frames are instants");
        assert_eq!(parsed[1]["name"], "Frame", "frame name");
        assert_eq!(parsed[1]["args"]["subscribers"], 1, "frame args");
        assert_eq!(parsed[2]["ph"], "E", "stop closes the span");
    }

    #[test]
    fn unmatched_stop_is_an_instant() {
        let mut rec = RecorderSink::new();
        rec.on_clock(&ClockEvent {
            at: HostTime(5),
            transition: ClockTransition::Stopped,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 1, "one event");
        assert_eq!(parsed[0]["ph"], "i", "no span was open");
        assert_eq!(parsed[0]["name"], "Stopped", "transition name");
    }

    #[test]
    fn scroll_emits_counter_track() {
        let mut rec = RecorderSink::new();
        rec.on_scroll(&ScrollEvent {
            at: HostTime(40),
            action: ScrollAction::Step,
            position: 120.0,
            target: Some(400.0),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2, "instant plus counter");
        assert_eq!(parsed[0]["args"]["target"], 400.0, "target recorded");
        assert_eq!(parsed[1]["ph"], "C", "counter event");
        assert_eq!(parsed[1]["args"]["position"], 120.0, "counter value");
    }

    #[test]
    fn effect_outcome_is_readable() {
        let mut rec = RecorderSink::new();
        rec.on_effect(&EffectEvent {
            at: HostTime(0),
            kind: EffectKind::Parallax,
            element: Some(ElementId(9)),
            outcome: EffectOutcome::Skipped(SkipReason::InvalidTarget),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Parallax", "effect kind");
        assert_eq!(parsed[0]["args"]["element"], 9, "element id");
        assert_eq!(
            parsed[0]["args"]["outcome"], "Skipped(InvalidTarget)",
            "outcome text"
        );
    }
}
