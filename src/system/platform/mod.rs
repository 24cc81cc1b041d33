pub trait PlatformExtensions {
    /// Scheduling priority as the OS reports it (nice value on Unix,
    /// priority class on Windows).
    fn process_priority(pid: u32) -> Option<i32>;
    fn process_threads(pid: u32) -> Option<u32>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn process_priority(pid: u32) -> Option<i32> {
    platform_impl::Platform::process_priority(pid)
}

pub fn process_threads(pid: u32) -> Option<u32> {
    platform_impl::Platform::process_threads(pid)
}
