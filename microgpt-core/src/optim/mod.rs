//! Adam with bias correction and a linearly decaying learning rate.

/// Adam moment buffers, one entry per scalar parameter. Lives as long as the training loop.
#[derive(Clone, Debug)]
pub struct Adam {
    m: Vec<f64>,
    v: Vec<f64>,
    beta1: f64,
    beta2: f64,
    eps: f64,
}

impl Adam {
    #[must_use]
    pub fn new(num_params: usize, beta1: f64, beta2: f64, eps: f64) -> Self {
        Adam {
            m: vec![0.0; num_params],
            v: vec![0.0; num_params],
            beta1,
            beta2,
            eps,
        }
    }

    /// Number of parameters tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.m.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }

    /// Applies one update in place. `step` is zero-based; `params` and `grads` must be in the
    /// same order as the moment buffers.
    pub fn step<'a>(
        &mut self,
        params: impl Iterator<Item = &'a mut f64>,
        grads: &[f64],
        lr: f64,
        step: usize,
    ) {
        let t = i32::try_from(step + 1).unwrap_or(i32::MAX);
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);
        for (((p, &g), m), v) in params
            .zip(grads)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *p -= lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

/// `lr * (1 - step / num_steps)`: full rate at step 0, approaching zero at the last step.
#[must_use]
pub fn linear_decay(lr: f64, step: usize, num_steps: usize) -> f64 {
    lr * (1.0 - step as f64 / num_steps as f64)
}
