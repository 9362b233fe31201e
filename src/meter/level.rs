use clap::ValueEnum;

/// Curve used to quantize amplitude into an 8-bit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelCurve {
    /// `floor(log2(amplitude * 10000))`.
    #[value(name = "log")]
    LogScale,
    /// `68 * log10(amplitude * 200000) - 120`.
    #[value(name = "db")]
    DbScale,
}

impl LevelCurve {
    pub fn label(self) -> &'static str {
        match self {
            LevelCurve::LogScale => "log",
            LevelCurve::DbScale => "db",
        }
    }

    fn raw(self, amplitude: f64) -> f64 {
        match self {
            LevelCurve::LogScale => (amplitude * 10_000.0).log2(),
            LevelCurve::DbScale => 68.0 * (amplitude * 200_000.0).log10() - 120.0,
        }
    }
}

/// Quantize `amplitude` with `curve`, truncating into `0..=255`.
///
/// Zero or negative amplitudes drive the logarithm to `-inf`/NaN; both land
/// on level 0. A positive overflow saturates at 255.
pub fn encode(curve: LevelCurve, amplitude: f64) -> u8 {
    let raw = curve.raw(amplitude);
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 255.0) as u8
}
