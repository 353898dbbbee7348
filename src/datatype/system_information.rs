use crate::raw::{ChipTemperature, CpuUsage, MemoryInfo, RawSystemInformation};

typed_datatype!(
    /// Device telemetry snapshot
    SystemInformation,
    RawSystemInformation
);

impl SystemInformation {
    pub fn get_ddr_memory_usage(&self) -> MemoryInfo {
        self.raw.ddr_memory_usage
    }

    pub fn set_ddr_memory_usage(&mut self, usage: MemoryInfo) -> &mut Self {
        self.raw.ddr_memory_usage = usage;
        self
    }

    pub fn get_leon_css_memory_usage(&self) -> MemoryInfo {
        self.raw.leon_css_memory_usage
    }

    pub fn set_leon_css_memory_usage(&mut self, usage: MemoryInfo) -> &mut Self {
        self.raw.leon_css_memory_usage = usage;
        self
    }

    pub fn get_leon_mss_memory_usage(&self) -> MemoryInfo {
        self.raw.leon_mss_memory_usage
    }

    pub fn set_leon_mss_memory_usage(&mut self, usage: MemoryInfo) -> &mut Self {
        self.raw.leon_mss_memory_usage = usage;
        self
    }

    pub fn get_leon_css_cpu_usage(&self) -> CpuUsage {
        self.raw.leon_css_cpu_usage
    }

    pub fn set_leon_css_cpu_usage(&mut self, usage: CpuUsage) -> &mut Self {
        self.raw.leon_css_cpu_usage = usage;
        self
    }

    pub fn get_leon_mss_cpu_usage(&self) -> CpuUsage {
        self.raw.leon_mss_cpu_usage
    }

    pub fn set_leon_mss_cpu_usage(&mut self, usage: CpuUsage) -> &mut Self {
        self.raw.leon_mss_cpu_usage = usage;
        self
    }

    /// Temperatures in degrees Celsius
    pub fn get_chip_temperature(&self) -> ChipTemperature {
        self.raw.chip_temperature
    }

    pub fn set_chip_temperature(&mut self, temperature: ChipTemperature) -> &mut Self {
        self.raw.chip_temperature = temperature;
        self
    }
}
