//! Export event sink
//!
//! Geometric corrections, dropped elements, and renderer fallbacks are
//! reported as structured events instead of being interleaved with the
//! serializer as console output. Components emit to an injectable
//! [`EventSink`]; callers decide whether to record, inspect, or discard.

use std::fmt;

/// A notable decision or correction made during one export run
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    /// Declared arc radius disagreed with the chord geometry and was
    /// replaced by the average of the two center distances
    RadiusCorrected {
        /// Radius as declared by the command.
        declared: f64,
        /// Radius actually used.
        corrected: f64,
    },
    /// A near-semicircle's radius was raised so the chord stays feasible
    SemicircleAdjusted {
        /// Chord length between arc start and end.
        chord: f64,
        /// Radius after adjustment.
        radius: f64,
    },
    /// An arc with a sub-tolerance radius was dropped
    DegenerateArcDropped {
        /// End point X of the dropped arc.
        x: f64,
        /// End point Y of the dropped arc.
        y: f64,
    },
    /// An out-of-plane arc was converted to line segments
    ArcDiscretized {
        /// Number of emitted line segments.
        segments: usize,
    },
    /// An operation contributed no contour elements
    EmptyOperation {
        /// Label of the skipped operation.
        label: String,
    },
    /// The standard-format collaborator failed and the built-in renderer
    /// was used instead
    RendererFallback {
        /// Why the collaborator was rejected.
        reason: String,
    },
}

impl fmt::Display for ExportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportEvent::RadiusCorrected {
                declared,
                corrected,
            } => write!(f, "Arc radius {:.3} corrected to {:.3}", declared, corrected),
            ExportEvent::SemicircleAdjusted { chord, radius } => {
                write!(
                    f,
                    "Semicircle radius raised to {:.3} for chord {:.3}",
                    radius, chord
                )
            }
            ExportEvent::DegenerateArcDropped { x, y } => {
                write!(f, "Degenerate arc to X{:.3} Y{:.3} dropped", x, y)
            }
            ExportEvent::ArcDiscretized { segments } => {
                write!(f, "Out-of-plane arc split into {} segments", segments)
            }
            ExportEvent::EmptyOperation { label } => {
                write!(f, "Operation '{}' has no path, skipped", label)
            }
            ExportEvent::RendererFallback { reason } => {
                write!(f, "Using fallback G-code renderer: {}", reason)
            }
        }
    }
}

/// Receiver for export events
pub trait EventSink {
    /// Record one event
    fn record(&mut self, event: ExportEvent);
}

/// Sink that keeps every event, for tests and reporting
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Recorded events in emission order.
    pub events: Vec<ExportEvent>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching a predicate
    pub fn count_matching(&self, pred: impl Fn(&ExportEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn record(&mut self, event: ExportEvent) {
        self.events.push(event);
    }
}

/// Sink that discards all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: ExportEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.record(ExportEvent::ArcDiscretized { segments: 12 });
        sink.record(ExportEvent::EmptyOperation {
            label: "Profile".to_string(),
        });
        assert_eq!(sink.events.len(), 2);
        assert_eq!(
            sink.count_matching(|e| matches!(e, ExportEvent::ArcDiscretized { .. })),
            1
        );
    }

    #[test]
    fn test_event_display() {
        let event = ExportEvent::RadiusCorrected {
            declared: 5.0,
            corrected: 5.25,
        };
        assert_eq!(event.to_string(), "Arc radius 5.000 corrected to 5.250");
    }
}
