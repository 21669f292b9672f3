//! Scriptable sink and output for exercising the resolver and controller.

use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::probe::{MediaSink, SinkError, SinkEvent};
use super::real::{AudioOutput, PlayError};

#[derive(Debug, Clone)]
pub enum Script {
    Loads(Option<Duration>),
    Errors,
    /// Never answers; only the probe's timeout or cancellation ends it.
    Hangs,
    /// Refuses the URI before loading starts.
    Throws,
    /// Answers with the inner script after a delay.
    After(Duration, Box<Script>),
}

/// URIs without a script report a load error.
#[derive(Default)]
pub struct ScriptedSink {
    scripts: HashMap<String, Script>,
    attempts: Mutex<Vec<String>>,
    parked: Mutex<Vec<Sender<SinkEvent>>>,
}

impl ScriptedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: &str, script: Script) -> Self {
        self.scripts.insert(uri.to_string(), script);
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    fn answer(&self, script: Script, events: Sender<SinkEvent>) {
        match script {
            Script::Loads(duration) => {
                let _ = events.send(SinkEvent::MetadataLoaded { duration });
            }
            Script::Errors | Script::Throws => {
                let _ = events.send(SinkEvent::LoadError("scripted".to_string()));
            }
            Script::Hangs => self.parked.lock().unwrap().push(events),
            Script::After(delay, inner) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    let event = match *inner {
                        Script::Loads(duration) => SinkEvent::MetadataLoaded { duration },
                        _ => SinkEvent::LoadError("scripted".to_string()),
                    };
                    let _ = events.send(event);
                });
            }
        }
    }
}

impl MediaSink for ScriptedSink {
    fn begin_load(&self, uri: &str, events: Sender<SinkEvent>) -> Result<(), SinkError> {
        self.attempts.lock().unwrap().push(uri.to_string());
        let script = self.scripts.get(uri).cloned().unwrap_or(Script::Errors);
        if let Script::Throws = script {
            return Err(SinkError::UnsupportedScheme(uri.to_string()));
        }
        self.answer(script, events);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeOutputState {
    pub opened: Vec<String>,
    pub decoded_duration: Option<Duration>,
    pub refuse_open: bool,
    pub refuse_play: bool,
    pub playing: bool,
    pub position: Duration,
    pub finished: bool,
    pub seeks: Vec<Duration>,
    pub stops: usize,
}

/// Output whose state the test keeps a handle on.
#[derive(Debug, Clone, Default)]
pub struct FakeOutput {
    pub state: Arc<Mutex<FakeOutputState>>,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_play() -> Self {
        let out = Self::default();
        out.state.lock().unwrap().refuse_play = true;
        out
    }

    pub fn set(&self, f: impl FnOnce(&mut FakeOutputState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn get<T>(&self, f: impl FnOnce(&FakeOutputState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

impl AudioOutput for FakeOutput {
    fn open(&mut self, uri: &str) -> Result<Option<Duration>, SinkError> {
        let mut s = self.state.lock().unwrap();
        if s.refuse_open {
            return Err(SinkError::Decode {
                uri: uri.to_string(),
                reason: "scripted".to_string(),
            });
        }
        s.opened.push(uri.to_string());
        s.playing = false;
        s.position = Duration::ZERO;
        s.finished = false;
        Ok(s.decoded_duration)
    }

    fn play(&mut self) -> Result<(), PlayError> {
        let mut s = self.state.lock().unwrap();
        if s.refuse_play {
            return Err(PlayError::Blocked("scripted".to_string()));
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn seek(&mut self, to: Duration) -> Result<(), SinkError> {
        let mut s = self.state.lock().unwrap();
        s.seeks.push(to);
        s.position = to;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn is_finished(&self) -> bool {
        let s = self.state.lock().unwrap();
        s.playing && s.finished
    }

    fn stop(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.playing = false;
        s.stops += 1;
    }
}
