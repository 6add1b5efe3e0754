use clap::Parser;

/// Stream PPG-derived vitals to a remote collector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Collector endpoint URL (e.g. https://collector.example.com/health/metrics)
    #[arg(long)]
    pub endpoint: String,

    /// Device identifier reported with every document
    #[arg(long, default_value = "PULSE_RELAY_001")]
    pub device_id: String,

    /// User/session identifier reported with every document
    #[arg(long)]
    pub user_id: String,

    /// Bearer credential for the collector, taken from the environment
    #[arg(long, env = "PULSE_RELAY_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Number of samples kept in the rolling window
    #[arg(long, default_value = "100")]
    pub window_size: usize,

    /// Sensor acquisition rate in samples per second
    #[arg(long, default_value = "100")]
    pub sample_rate_hz: u32,

    /// Interval between vitals updates in milliseconds
    #[arg(long, default_value = "250")]
    pub update_interval_ms: u64,

    /// Timeout for a single collector POST in milliseconds
    #[arg(long, default_value = "3000")]
    pub post_timeout_ms: u64,

    /// Timeout for the boot-time collector reachability check in milliseconds
    #[arg(long, default_value = "20000")]
    pub boot_timeout_ms: u64,

    /// Heart rate of the synthetic sensor signal in BPM
    #[arg(long, default_value = "72.0")]
    pub synthetic_bpm: f64,

    /// Oxygen saturation of the synthetic sensor signal in percent
    #[arg(long, default_value = "97.0")]
    pub synthetic_spo2: f64,
}
