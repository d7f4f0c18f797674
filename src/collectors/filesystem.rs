//! Filesystem usage collector based on /proc/mounts and statvfs.

use std::fs;

use crate::error::ProviderError;

const PROC_MOUNTS: &str = "/proc/mounts";

/// Usage of one mounted filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemUsage {
    pub mount_point: String,
    pub fstype: String,
    pub size_bytes: u64,
    pub available_bytes: u64,
}

impl FilesystemUsage {
    /// Used ratio in `[0, 1]`, counting reserved blocks as used the way
    /// `df` does.
    pub fn used_ratio(&self) -> f64 {
        if self.size_bytes == 0 {
            return 0.0;
        }
        let used = self.size_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.size_bytes as f64
    }
}

/// Pseudo and virtual filesystem types that carry no real capacity.
const SKIP_FSTYPES: &[&str] = &[
    "proc",
    "sysfs",
    "devpts",
    "devtmpfs",
    "tmpfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "bpf",
    "debugfs",
    "tracefs",
    "fusectl",
    "configfs",
    "securityfs",
    "hugetlbfs",
    "mqueue",
    "autofs",
    "binfmt_misc",
    "overlay",
    "squashfs",
];

/// Checks whether a mount entry is a pseudo filesystem or lives under a
/// system path that should not appear on the dashboard.
pub fn should_skip(fstype: &str, mount_point: &str) -> bool {
    if SKIP_FSTYPES.contains(&fstype) {
        return true;
    }

    mount_point.starts_with("/proc")
        || mount_point.starts_with("/sys")
        || mount_point.starts_with("/dev")
        || mount_point.starts_with("/run")
        || mount_point.starts_with("/snap")
}

/// Queries capacity and free space for a mount point via statvfs.
fn statvfs_usage(mount_point: &str) -> Result<(u64, u64), ProviderError> {
    use std::ffi::CString;
    use std::mem;

    let c_path = CString::new(mount_point).map_err(|_| ProviderError::Format {
        path: PROC_MOUNTS.to_string(),
        detail: format!("mount point contains NUL: {:?}", mount_point),
    })?;

    unsafe {
        let mut stat: libc::statvfs = mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(ProviderError::Read {
                path: mount_point.to_string(),
                source: std::io::Error::last_os_error(),
            });
        }

        let block_size = stat.f_frsize as u64;
        let size_bytes = block_size * stat.f_blocks as u64;
        let available_bytes = block_size * stat.f_bavail as u64;
        Ok((size_bytes, available_bytes))
    }
}

/// Reads usage for every real mounted filesystem.
///
/// Mounts that cannot be statted (stale NFS, permissions) are skipped
/// rather than failing the whole reading.
pub fn read_filesystem_usage() -> Result<Vec<FilesystemUsage>, ProviderError> {
    let content = fs::read_to_string(PROC_MOUNTS).map_err(|e| ProviderError::Read {
        path: PROC_MOUNTS.to_string(),
        source: e,
    })?;

    let mut usages = Vec::new();
    let mut seen_mounts = std::collections::HashSet::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let mount_point = parts[1].to_string();
        let fstype = parts[2].to_string();

        if should_skip(&fstype, &mount_point) || !seen_mounts.insert(mount_point.clone()) {
            continue;
        }

        let Ok((size_bytes, available_bytes)) = statvfs_usage(&mount_point) else {
            continue;
        };
        if size_bytes == 0 {
            continue;
        }

        usages.push(FilesystemUsage {
            mount_point,
            fstype,
            size_bytes,
            available_bytes,
        });
    }

    Ok(usages)
}
