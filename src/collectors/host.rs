//! Static host information for the /system endpoint.

use std::fs;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::ProviderError;

const PROC_UPTIME: &str = "/proc/uptime";

/// Kernel identification from the uname syscall.
#[derive(Debug, Clone, Serialize)]
pub struct UnameInfo {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

fn query_uname() -> UnameInfo {
    use std::ffi::CStr;
    use std::mem;

    unsafe {
        // SAFETY: libc::utsname contains only c_char arrays, valid when
        // zero-initialized.
        let mut utsname: libc::utsname = mem::zeroed();
        if libc::uname(&mut utsname) == 0 {
            UnameInfo {
                sysname: CStr::from_ptr(utsname.sysname.as_ptr())
                    .to_string_lossy()
                    .into_owned(),
                nodename: CStr::from_ptr(utsname.nodename.as_ptr())
                    .to_string_lossy()
                    .into_owned(),
                release: CStr::from_ptr(utsname.release.as_ptr())
                    .to_string_lossy()
                    .into_owned(),
                version: CStr::from_ptr(utsname.version.as_ptr())
                    .to_string_lossy()
                    .into_owned(),
                machine: CStr::from_ptr(utsname.machine.as_ptr())
                    .to_string_lossy()
                    .into_owned(),
            }
        } else {
            UnameInfo {
                sysname: "unknown".to_string(),
                nodename: "unknown".to_string(),
                release: "unknown".to_string(),
                version: "unknown".to_string(),
                machine: "unknown".to_string(),
            }
        }
    }
}

static UNAME: Lazy<UnameInfo> = Lazy::new(query_uname);

/// Returns kernel identification, queried once per process.
pub fn uname_info() -> &'static UnameInfo {
    &UNAME
}

/// Number of logical cores visible to this process.
pub fn core_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Reads system uptime in seconds from /proc/uptime.
pub fn read_uptime() -> Result<f64, ProviderError> {
    let content = fs::read_to_string(PROC_UPTIME).map_err(|e| ProviderError::Read {
        path: PROC_UPTIME.to_string(),
        source: e,
    })?;

    content
        .split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ProviderError::Format {
            path: PROC_UPTIME.to_string(),
            detail: "missing uptime field".to_string(),
        })
}
