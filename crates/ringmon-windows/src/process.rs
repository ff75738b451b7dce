use std::mem;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ringmon_core::{ProcessCpuSampler, ProcessSnapshot, ScanError};
use windows::Win32::Foundation::{
    CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, FILETIME, HANDLE,
};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::{K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows::Win32::System::Threading::{
    GetCurrentThread, GetProcessTimes, OpenProcess, PROCESS_ACCESS_RIGHTS,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ, SetThreadPriority, THREAD_PRIORITY_LOWEST,
};

use crate::cpu::ft_to_u64;
use crate::enumerate::window_titles;

/// Seconds between 1601-01-01 (the FILETIME epoch) and 1970-01-01.
const FILETIME_UNIX_OFFSET_SECS: u64 = 11_644_473_600;

/// Per-process CPU times read through ToolHelp and `GetProcessTimes`.
#[derive(Debug, Default)]
pub struct WinProcessSampler;

impl WinProcessSampler {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessCpuSampler for WinProcessSampler {
    fn processes(&self) -> Result<Vec<ProcessSnapshot>, ScanError> {
        let entries = process_entries().map_err(|e| ScanError::Enumeration(e.message()))?;
        let titles = window_titles();

        let snapshots = entries
            .into_iter()
            .filter(|(pid, _, _)| *pid != 0)
            .map(|(pid, name, threads)| {
                // Processes we may not open still appear, with zero CPU time.
                let info = query_process(pid).unwrap_or_default();
                ProcessSnapshot {
                    pid,
                    name,
                    window_title: titles.get(&pid).cloned(),
                    total_cpu_time: info.cpu_time,
                    working_set: info.working_set,
                    thread_count: threads,
                    start_time: info.start_time,
                }
            })
            .collect();
        Ok(snapshots)
    }

    fn cpu_time(&self, pid: u32) -> Result<Duration, ScanError> {
        let handle = open(pid, PROCESS_QUERY_LIMITED_INFORMATION)?;
        let times = process_times(handle);
        close(handle);
        times
            .map(|(_, kernel, user)| kernel + user)
            .map_err(|e| map_error(pid, &e))
    }

    fn prepare_scan_thread(&self) {
        // SAFETY: adjusts the calling thread via its pseudo-handle.
        unsafe {
            let _ = SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_LOWEST);
        }
    }
}

#[derive(Debug, Default)]
struct ProcessInfo {
    cpu_time: Duration,
    working_set: u64,
    start_time: Option<SystemTime>,
}

/// Walks the ToolHelp process list. Returns `(pid, exe name, thread count)`.
fn process_entries() -> windows::core::Result<Vec<(u32, String, u32)>> {
    // SAFETY: the snapshot handle is closed on every path below.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)? };

    let mut entry = PROCESSENTRY32W {
        dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };
    let mut out = Vec::new();

    // SAFETY: `entry` has dwSize set as the API requires.
    if let Err(e) = unsafe { Process32FirstW(snapshot, &mut entry) } {
        close(snapshot);
        return Err(e);
    }
    loop {
        out.push((
            entry.th32ProcessID,
            exe_name(&entry.szExeFile),
            entry.cntThreads,
        ));
        // SAFETY: same snapshot and entry as above.
        if unsafe { Process32NextW(snapshot, &mut entry) }.is_err() {
            break;
        }
    }

    close(snapshot);
    Ok(out)
}

fn query_process(pid: u32) -> Result<ProcessInfo, ScanError> {
    let handle = open(pid, PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_VM_READ)
        .or_else(|_| open(pid, PROCESS_QUERY_LIMITED_INFORMATION))?;

    let times = process_times(handle);
    let working_set = working_set(handle);
    close(handle);

    let (created, kernel, user) = times.map_err(|e| map_error(pid, &e))?;
    Ok(ProcessInfo {
        cpu_time: kernel + user,
        working_set,
        start_time: filetime_to_system_time(created),
    })
}

fn open(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> Result<HANDLE, ScanError> {
    // SAFETY: OpenProcess only opens an existing process; the caller
    // closes the handle.
    unsafe { OpenProcess(access, false, pid) }.map_err(|e| map_error(pid, &e))
}

fn close(handle: HANDLE) {
    // SAFETY: the handle was opened by this module and is closed once.
    unsafe {
        let _ = CloseHandle(handle);
    }
}

/// Returns `(creation time, kernel time, user time)`.
fn process_times(handle: HANDLE) -> windows::core::Result<(FILETIME, Duration, Duration)> {
    let mut created = FILETIME::default();
    let mut exited = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();

    // SAFETY: all four out-pointers reference live stack values.
    unsafe { GetProcessTimes(handle, &mut created, &mut exited, &mut kernel, &mut user)? };

    Ok((created, filetime_to_duration(kernel), filetime_to_duration(user)))
}

/// Working set in bytes, or 0 when the counters cannot be read.
fn working_set(handle: HANDLE) -> u64 {
    let cb = mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    let mut counters = PROCESS_MEMORY_COUNTERS {
        cb,
        ..Default::default()
    };
    // SAFETY: `counters` is sized as declared in `cb`. On failure the
    // zeroed struct is kept.
    unsafe {
        let _ = K32GetProcessMemoryInfo(handle, &mut counters, cb);
    }
    counters.WorkingSetSize as u64
}

fn map_error(pid: u32, err: &windows::core::Error) -> ScanError {
    if err.code() == ERROR_ACCESS_DENIED.to_hresult() {
        ScanError::AccessDenied { pid }
    } else if err.code() == ERROR_INVALID_PARAMETER.to_hresult() {
        // OpenProcess reports a pid that no longer exists this way.
        ScanError::ProcessExited { pid }
    } else {
        ScanError::Platform {
            pid,
            message: err.message(),
        }
    }
}

/// Decodes a nul-terminated UTF-16 executable name.
fn exe_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

/// FILETIME intervals count 100 ns units.
fn filetime_to_duration(ft: FILETIME) -> Duration {
    let ticks = ft_to_u64(ft);
    Duration::from_secs(ticks / 10_000_000) + Duration::from_nanos((ticks % 10_000_000) * 100)
}

fn filetime_to_system_time(ft: FILETIME) -> Option<SystemTime> {
    let since_1601 = filetime_to_duration(ft);
    let since_unix = since_1601.checked_sub(Duration::from_secs(FILETIME_UNIX_OFFSET_SECS))?;
    UNIX_EPOCH.checked_add(since_unix)
}
