use anyhow::Result;

/// Speech-to-text boundary. A concrete backend is supplied by the
/// embedding shell when the platform offers one; the crate itself ships
/// none.
pub trait SpeechCapture: Send {
    /// Begin capturing; `on_text` receives incremental transcript text.
    fn start(&mut self, on_text: Box<dyn FnMut(&str) + Send>) -> Result<()>;
    fn stop(&mut self);
}

/// Holder that degrades gracefully when no backend is present: the
/// feature reports unavailable and start/stop are no-ops, never errors.
pub struct Dictation {
    backend: Option<Box<dyn SpeechCapture>>,
}

impl Dictation {
    pub fn new(backend: Box<dyn SpeechCapture>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns `Ok(false)` when no backend is present.
    pub fn start(&mut self, on_text: Box<dyn FnMut(&str) + Send>) -> Result<bool> {
        match &mut self.backend {
            Some(backend) => {
                backend.start(on_text)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn stop(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.stop();
        }
    }
}

impl Default for Dictation {
    fn default() -> Self {
        Self::unavailable()
    }
}
