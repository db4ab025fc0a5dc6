use std::f64::consts::PI;

/// Unit impulse of `len` samples
pub fn impulse(len: usize) -> Vec<f64> {
    let mut signal = vec![0.0; len];
    if let Some(first) = signal.first_mut() {
        *first = 1.0;
    }
    signal
}

/// Constant `level` starting at sample `onset`, zero before
pub fn step(len: usize, onset: usize, level: f64) -> Vec<f64> {
    (0..len)
        .map(|i| if i >= onset { level } else { 0.0 })
        .collect()
}

/// Sum of `(freq_hz, amplitude)` sinusoids plus a DC offset
pub fn tone_mix(components: &[(f64, f64)], offset: f64, sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            offset
                + components
                    .iter()
                    .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                    .sum::<f64>()
        })
        .collect()
}

/// Linear chirp from `start_hz` to `end_hz` over `len` samples
pub fn sweep(start_hz: f64, end_hz: f64, sample_rate: f64, len: usize) -> Vec<f64> {
    let duration = len as f64 / sample_rate;
    let rate = (end_hz - start_hz) / duration;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * PI * (start_hz * t + 0.5 * rate * t * t)).sin()
        })
        .collect()
}

/// Clean 5 Hz + 50 Hz mix at 500 Hz for one second, with a small
/// deterministic high-frequency ripple standing in for measurement noise
pub fn two_tone_scenario_signal() -> Vec<f64> {
    let clean = tone_mix(&[(5.0, 1.0), (50.0, 0.5)], 0.0, 500.0, 500);
    let ripple = tone_mix(&[(97.0, 0.1), (183.0, 0.07), (211.0, 0.05)], 0.0, 500.0, 500);
    clean.iter().zip(ripple.iter()).map(|(c, r)| c + r).collect()
}

/// Textbook difference equation evaluated over a whole buffer from rest
///
/// `y[n] = b0 x[n] + sum_k (b_k x[n-k] - a_k y[n-k])`, with `a[0] == 1`.
/// Independent of the crate's state layout.
pub fn direct_form_reference(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
    let order = a.len() - 1;
    let mut y = vec![0.0; x.len()];
    for n in 0..x.len() {
        let mut acc = b[0] * x[n];
        for k in 1..=order.min(n) {
            acc += b[k] * x[n - k] - a[k] * y[n - k];
        }
        y[n] = acc;
    }
    y
}
