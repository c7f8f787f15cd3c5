/// Pipeline state definitions for tracking which catalog page comes next
use crate::ConfigError;
use std::fmt;

/// Number of catalog pages in the listing
pub const PAGE_COUNT: u32 = 10;

/// Entries per catalog page; page N starts at offset `(N - 1) * PAGE_SIZE`
pub const PAGE_SIZE: u32 = 25;

/// Returns the `start` offset for a 1-based page number
pub fn page_offset(page: u32) -> u32 {
    page.saturating_sub(1) * PAGE_SIZE
}

/// Phase of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Created, no page processed yet
    Init,

    /// Iterating catalog pages
    PageLoop,

    /// The last page has been processed
    Done,
}

impl RunPhase {
    /// Returns true once no further pages will be processed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PageLoop => "page_loop",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the next page to process
///
/// Pages are 1-based. The only mutator after construction is [`advance`],
/// which moves forward by exactly one page.
///
/// [`advance`]: PipelineState::advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    start_page: u32,
    next_page: u32,
    phase: RunPhase,
}

impl PipelineState {
    /// Creates the state for a run starting at `resume_page`
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineState)` - `resume_page` is within `1..=PAGE_COUNT`
    /// * `Err(ConfigError)` - the page is out of range
    pub fn new(resume_page: u32) -> Result<Self, ConfigError> {
        if !(1..=PAGE_COUNT).contains(&resume_page) {
            return Err(ConfigError::Validation(format!(
                "resume page must be between 1 and {}, got {}",
                PAGE_COUNT, resume_page
            )));
        }

        Ok(Self {
            start_page: resume_page,
            next_page: resume_page,
            phase: RunPhase::Init,
        })
    }

    /// The page this run started from
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    /// The next page to process; `PAGE_COUNT + 1` once the run is done
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Returns the page to process now, entering the page loop if needed
    pub fn current_page(&mut self) -> Option<u32> {
        match self.phase {
            RunPhase::Done => None,
            RunPhase::Init => {
                self.phase = RunPhase::PageLoop;
                Some(self.next_page)
            }
            RunPhase::PageLoop => Some(self.next_page),
        }
    }

    /// Marks the current page complete
    pub fn advance(&mut self) {
        if self.phase.is_terminal() {
            return;
        }

        self.next_page += 1;
        self.phase = if self.next_page > PAGE_COUNT {
            RunPhase::Done
        } else {
            RunPhase::PageLoop
        };
    }

    /// Pages still to process, including the current one
    pub fn remaining_pages(&self) -> u32 {
        (PAGE_COUNT + 1).saturating_sub(self.next_page)
    }

    /// Pages completed in this run
    pub fn pages_completed(&self) -> u32 {
        self.next_page - self.start_page
    }
}
