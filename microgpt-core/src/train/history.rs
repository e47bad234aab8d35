//! Step-loss history and the running-average test that decides when to snapshot "best" weights.

/// What [`LossHistory::record`] observed for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// `(window, average)` on logged steps: mean of the last `window` losses.
    pub logged: Option<(usize, f64)>,
    /// The running average reached a new best; the caller should snapshot parameters.
    pub improved: bool,
}

/// Every step's document loss plus the best running average seen so far.
#[derive(Clone, Debug)]
pub struct LossHistory {
    losses: Vec<f64>,
    avg_window: usize,
    log_every: usize,
    check_every: usize,
    best_avg: f64,
}

impl LossHistory {
    /// All three periods must be non-zero (checked by config validation).
    #[must_use]
    pub fn new(avg_window: usize, log_every: usize, check_every: usize) -> Self {
        LossHistory {
            losses: Vec::new(),
            avg_window,
            log_every,
            check_every,
            best_avg: f64::INFINITY,
        }
    }

    /// Appends `loss` for zero-based `step`.
    ///
    /// On step 0 and every `log_every`-th step the mean of the last `min(avg_window, len)`
    /// losses is reported and compared to the best. Independently, once `avg_window` losses
    /// exist, every `check_every`-th step compares the full-window mean.
    pub fn record(&mut self, step: usize, loss: f64) -> StepReport {
        self.losses.push(loss);
        let mut report = StepReport {
            logged: None,
            improved: false,
        };

        if step == 0 || (step + 1).is_multiple_of(self.log_every) {
            let window = self.avg_window.min(self.losses.len());
            let avg = self.recent_mean(window);
            report.logged = Some((window, avg));
            report.improved |= self.offer(avg);
        }
        if self.losses.len() >= self.avg_window && (step + 1).is_multiple_of(self.check_every) {
            let avg = self.recent_mean(self.avg_window);
            report.improved |= self.offer(avg);
        }
        report
    }

    fn recent_mean(&self, window: usize) -> f64 {
        let tail = &self.losses[self.losses.len() - window..];
        tail.iter().sum::<f64>() / window as f64
    }

    fn offer(&mut self, avg: f64) -> bool {
        if avg < self.best_avg {
            self.best_avg = avg;
            true
        } else {
            false
        }
    }

    /// Best running average so far, if any was recorded.
    #[must_use]
    pub fn best_avg(&self) -> Option<f64> {
        self.best_avg.is_finite().then_some(self.best_avg)
    }

    #[must_use]
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    #[must_use]
    pub fn into_losses(self) -> Vec<f64> {
        self.losses
    }
}
