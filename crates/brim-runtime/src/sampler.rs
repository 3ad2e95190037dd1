use std::fmt;

use brim_types::{Level, Report};

use crate::WeakHandle;

/// Reads one tracked queue through a weak handle.
pub struct Sampler {
    call_site: String,
    handle: Box<dyn WeakHandle>,
}

impl Sampler {
    pub fn new(call_site: String, handle: impl WeakHandle) -> Self {
        Self {
            call_site,
            handle: Box::new(handle),
        }
    }

    pub fn call_site(&self) -> &str {
        &self.call_site
    }

    /// Current level, or `None` once the queue is gone.
    pub fn read(&self) -> Option<Level> {
        self.handle.level()
    }

    pub fn report(&self) -> Option<Report> {
        self.read()
            .map(|level| Report::new(self.call_site.as_str(), level))
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("call_site", &self.call_site)
            .finish_non_exhaustive()
    }
}
