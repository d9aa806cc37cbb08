//! Opens the OAuth authorize URL in the default browser.
//!
//! Stands in for the browser-extension identity launcher; the redirect URL
//! is pasted back by the user.

use std::process::Command;

/// Returns `false` when no launcher could be started; the caller then
/// prints the URL for manual opening.
pub fn open_authorize_url(url: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/c", "start", "", url])
            .spawn()
            .is_ok()
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }

    #[cfg(target_os = "linux")]
    {
        if is_wsl() {
            return Command::new("wslview").arg(url).spawn().is_ok()
                || Command::new("cmd.exe")
                    .current_dir("/mnt/c/")
                    .args(["/c", "start", "", url])
                    .stderr(std::process::Stdio::null())
                    .spawn()
                    .is_ok();
        }
        Command::new("xdg-open")
            .arg(url)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .is_ok()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        let _ = url;
        false
    }
}

#[cfg(target_os = "linux")]
fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| {
            let v = v.to_lowercase();
            v.contains("microsoft") || v.contains("wsl")
        })
        .unwrap_or(false)
}
