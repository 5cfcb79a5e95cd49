//! Command-line logger
use super::{Event, LogError, Loggable, Logger};
use enum_map::{enum_map, EnumMap};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that writes periodic summaries to standard output.
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Display the summary and clear all stored data.
    pub fn display(&mut self) {
        let mut printed_any = false;
        for (event, event_log) in self.events.iter_mut() {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }
            if !printed_any {
                println!();
                printed_any = true;
            }

            println!(
                "==== {} {} - {} ====",
                Paint::fixed(35, DisplayEventName(event)),
                event_log.summary_start_index,
                event_log.index - 1
            );
            for (name, aggregator) in &mut event_log.aggregators {
                println!("{}: {}", name, aggregator);
                aggregator.clear();
            }
            event_log.summary_start_index = event_log.index;
        }
        self.last_display_time = Instant::now();
    }
}

impl Logger for CLILogger {
    fn log<'a>(
        &mut self,
        event: Event,
        name: &'a str,
        value: Loggable,
    ) -> Result<(), LogError<'a>> {
        let aggregators = &mut self.events[event].aggregators;
        if let Some(aggregator) = aggregators.get_mut(name) {
            if let Err((value, expected)) = aggregator.update(value) {
                return Err(LogError::new(name, value, expected));
            }
        } else {
            let old_value = aggregators.insert(name.into(), Aggregator::new(value));
            assert!(old_value.is_none());
        }
        Ok(())
    }

    fn done(&mut self, event: Event) {
        let event_log = &mut self.events[event];
        event_log.index += 1;
        for aggregator in event_log.aggregators.values_mut() {
            aggregator.commit();
        }

        if self.last_display_time.elapsed() >= self.display_period {
            self.display();
        }
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Ensure everything is flushed.
        self.display();
    }
}

struct DisplayEventName(Event);

impl fmt::Display for DisplayEventName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Event::Step => write!(f, "Steps"),
            Event::Episode => write!(f, "Episodes"),
            Event::Check => write!(f, "Checks"),
        }
    }
}

struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    /// An aggregator for each log entry.
    aggregators: BTreeMap<String, Aggregator>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            aggregators: BTreeMap::new(),
        }
    }
}

/// Aggregates values logged under one name within one event kind.
///
/// Values logged during an event are pending until the event is marked done,
/// at which point they are committed into the summary.
#[derive(Debug)]
enum Aggregator {
    Nothing,
    ScalarMean {
        sum: f64,
        count: u64,
        pending: Option<f64>,
    },
    IndexDistribution {
        counts: Vec<u64>,
        pending: Option<usize>,
    },
    MessageCounts {
        counts: BTreeMap<Cow<'static, str>, u64>,
        pending: Option<Cow<'static, str>>,
    },
}

impl Aggregator {
    fn new(value: Loggable) -> Self {
        match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::Scalar(x) => Self::ScalarMean {
                sum: 0.0,
                count: 0,
                pending: Some(x),
            },
            Loggable::IndexSample { value, size } => Self::IndexDistribution {
                counts: vec![0; size],
                pending: Some(value),
            },
            Loggable::Message(message) => Self::MessageCounts {
                counts: BTreeMap::new(),
                pending: Some(message),
            },
        }
    }

    /// Update with a value logged within the current event.
    ///
    /// Returns `Err((value, expected))` if the value is incompatible.
    fn update(&mut self, value: Loggable) -> Result<(), (Loggable, String)> {
        match (self, value) {
            (Self::Nothing, Loggable::Nothing) => {}
            (Self::ScalarMean { pending, .. }, Loggable::Scalar(x)) => *pending = Some(x),
            (Self::IndexDistribution { counts, pending }, Loggable::IndexSample { value, size })
                if counts.len() == size =>
            {
                *pending = Some(value)
            }
            (Self::MessageCounts { pending, .. }, Loggable::Message(message)) => {
                *pending = Some(message)
            }
            (this, value) => return Err((value, this.expected().into())),
        }
        Ok(())
    }

    /// Commit the pending value into the aggregate.
    fn commit(&mut self) {
        match self {
            Self::Nothing => {}
            Self::ScalarMean {
                sum,
                count,
                pending,
            } => {
                if let Some(value) = pending.take() {
                    *sum += value;
                    *count += 1;
                }
            }
            Self::IndexDistribution { counts, pending } => {
                if let Some(value) = pending.take() {
                    counts[value] += 1;
                }
            }
            Self::MessageCounts { counts, pending } => {
                if let Some(message) = pending.take() {
                    *counts.entry(message).or_insert(0) += 1;
                }
            }
        }
    }

    /// Clear the aggregated values (but not the pending value).
    fn clear(&mut self) {
        match self {
            Self::Nothing => {}
            Self::ScalarMean { sum, count, .. } => {
                *sum = 0.0;
                *count = 0;
            }
            Self::IndexDistribution { counts, .. } => {
                for count in counts.iter_mut() {
                    *count = 0;
                }
            }
            Self::MessageCounts { counts, .. } => counts.clear(),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::Nothing => "Nothing",
            Self::ScalarMean { .. } => "Scalar",
            Self::IndexDistribution { .. } => "IndexSample",
            Self::MessageCounts { .. } => "Message",
        }
    }
}

/// Display the committed aggregated value.
impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::ScalarMean { sum, count, .. } => {
                if *count > 0 {
                    write!(f, "{}", sum / (*count as f64))
                } else {
                    write!(f, "None")
                }
            }
            Self::IndexDistribution { counts, .. } => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "[")?;
                let mut first = true;
                for c in counts {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.3}", (*c as f64) / (total as f64))?;
                }
                write!(f, "]")
            }
            Self::MessageCounts { counts, .. } => {
                for (message, count) in counts {
                    write!(f, "\n\t[x{}] {}", count, message)?;
                }
                Ok(())
            }
        }
    }
}
