use super::PlatformExtensions;

pub struct Platform;

// Fields of /proc/<pid>/stat after the `comm` field.
const NICE_FIELD: usize = 16;
const NUM_THREADS_FIELD: usize = 17;

fn stat_field<T: std::str::FromStr>(pid: u32, index: usize) -> Option<T> {
    let contents = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    parse_stat_field(&contents, index)
}

fn parse_stat_field<T: std::str::FromStr>(contents: &str, index: usize) -> Option<T> {
    // comm may contain spaces and parens, so split after the last `)`
    let after_comm = contents.rfind(')')? + 1;
    contents[after_comm..]
        .split_whitespace()
        .nth(index)?
        .parse()
        .ok()
}

impl PlatformExtensions for Platform {
    fn process_priority(pid: u32) -> Option<i32> {
        stat_field(pid, NICE_FIELD)
    }

    fn process_threads(pid: u32) -> Option<u32> {
        stat_field(pid, NUM_THREADS_FIELD)
    }
}
