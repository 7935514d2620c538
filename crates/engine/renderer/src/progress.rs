//! Coarse progress reporting for long rasterization passes

use std::fmt;

/// Named stages of the shadow and colorize pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    LightDepth,
    SensorPosition,
    Classify,
    ProjectorDepth,
    Colorize,
}

impl Pass {
    pub fn label(&self) -> &'static str {
        match self {
            Pass::LightDepth => "light depth",
            Pass::SensorPosition => "sensor positions",
            Pass::Classify => "classify",
            Pass::ProjectorDepth => "projector depth",
            Pass::Colorize => "colorize",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives pass progress; passes cannot be interrupted through it
pub trait PassProgress {
    fn begin(&mut self, pass: Pass, total: u64);
    fn advance(&mut self, done: u64);
    fn finish(&mut self);
}

/// Discards all progress
impl PassProgress for () {
    fn begin(&mut self, _pass: Pass, _total: u64) {}
    fn advance(&mut self, _done: u64) {}
    fn finish(&mut self) {}
}

/// Items between two `advance` calls
pub(crate) const REPORT_INTERVAL: u64 = 4096;

/// Drive `step` over `count` items, reporting to `progress` as it goes
pub(crate) fn run_pass<P, F>(progress: &mut P, pass: Pass, count: usize, mut step: F)
where
    P: PassProgress + ?Sized,
    F: FnMut(usize),
{
    let total = count as u64;
    progress.begin(pass, total);
    for i in 0..count {
        step(i);
        let done = i as u64 + 1;
        if done % REPORT_INTERVAL == 0 {
            progress.advance(done);
        }
    }
    progress.advance(total);
    progress.finish();
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every progress call, for assertions
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub begun: Vec<(Pass, u64)>,
        pub last_done: u64,
        pub finished: usize,
    }

    impl PassProgress for Recorder {
        fn begin(&mut self, pass: Pass, total: u64) {
            self.begun.push((pass, total));
            self.last_done = 0;
        }

        fn advance(&mut self, done: u64) {
            assert!(done >= self.last_done);
            self.last_done = done;
        }

        fn finish(&mut self) {
            self.finished += 1;
        }
    }
}
