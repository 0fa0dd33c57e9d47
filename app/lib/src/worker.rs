//! Background execution of conversions.
//!
//! A front end hands conversions to a [`ConversionWorker`] so it stays
//! responsive while files are read and written. At most one conversion runs
//! at a time; submitting another while one is in flight fails with
//! [`ConvertError::Busy`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::converter::{ConversionReport, Converter};
use crate::error::{ConvertError, Result};
use crate::sink::ChannelSink;

/// Runs conversions on a background thread, one at a time.
#[derive(Debug)]
pub struct ConversionWorker {
    converter: Arc<Converter>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the worker thread finishes, even by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A running conversion.
#[derive(Debug)]
pub struct ConversionTicket {
    messages: Receiver<String>,
    handle: JoinHandle<Result<ConversionReport>>,
}

impl ConversionTicket {
    /// Messages the conversion has produced so far.
    pub fn messages(&self) -> &Receiver<String> {
        &self.messages
    }

    /// Wait for the conversion to finish.
    pub fn join(self) -> Result<ConversionReport> {
        self.handle.join().map_err(|_| ConvertError::WorkerPanicked)?
    }
}

impl ConversionWorker {
    /// Create a worker around a converter.
    pub fn new(converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true while a conversion is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start converting `input` into `output` on a background thread.
    pub fn submit(&self, input: PathBuf, output: PathBuf) -> Result<ConversionTicket> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("rejected conversion of {}: worker busy", input.display());
            return Err(ConvertError::Busy);
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let converter = Arc::clone(&self.converter);
        let (sender, messages) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("tabconv-worker".to_string())
            .spawn(move || {
                let _guard = guard;
                let mut sink = ChannelSink::new(sender);
                converter.convert(&input, &output, &mut sink)
            });

        match spawned {
            Ok(handle) => Ok(ConversionTicket { messages, handle }),
            Err(e) => Err(ConvertError::IoError(e)),
        }
    }
}
