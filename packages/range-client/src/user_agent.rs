//! Verbose User-Agent so server operators can trace misbehaving clients

use std::env;
use std::path::Path;

const FALLBACK_SCRIPT: &str = "range-client";

/// `{script}/{version} ({user}; {hostname})`
pub fn build_user_agent(script: Option<&str>) -> String {
    let script = script
        .map(str::to_string)
        .or_else(invoking_program)
        .unwrap_or_else(|| FALLBACK_SCRIPT.to_string());

    format_user_agent(&script, &current_user(), &hostname())
}

pub(crate) fn format_user_agent(script: &str, user: &str, host: &str) -> String {
    format!("{}/{} ({}; {})", script, env!("CARGO_PKG_VERSION"), user, host)
}

fn invoking_program() -> Option<String> {
    let arg0 = env::args_os().next()?;
    Path::new(&arg0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

fn current_user() -> String {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn hostname() -> String {
    let host = gethostname::gethostname().to_string_lossy().trim().to_string();
    if host.is_empty() {
        "localhost".to_string()
    } else {
        host
    }
}
