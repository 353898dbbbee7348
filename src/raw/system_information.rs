use super::RawBuffer;

/// Memory usage in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub remaining: i64,
    pub used: i64,
    pub total: i64,
}

/// CPU load averaged over a measurement window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuUsage {
    /// Fraction of the window spent busy, 0.0 to 1.0
    pub average: f32,
    /// Window length in milliseconds
    pub ms_time: i32,
}

/// Die temperatures in degrees Celsius, per power domain
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChipTemperature {
    pub css: f32,
    pub mss: f32,
    pub upa: f32,
    pub dss: f32,
    pub average: f32,
}

/// Wire form of a device telemetry report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSystemInformation {
    pub buffer: RawBuffer,
    pub ddr_memory_usage: MemoryInfo,
    pub leon_css_memory_usage: MemoryInfo,
    pub leon_mss_memory_usage: MemoryInfo,
    pub leon_css_cpu_usage: CpuUsage,
    pub leon_mss_cpu_usage: CpuUsage,
    pub chip_temperature: ChipTemperature,
}
