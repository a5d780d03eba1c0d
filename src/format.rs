// Display helpers for sizes, speeds and times

pub const UNKNOWN: &str = "未知";
pub const COMPUTING: &str = "计算中...";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size in base 1024, e.g. `1.50 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return UNKNOWN.to_string();
    }

    let bytes = bytes as f64;
    let exp = (bytes.ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(SIZE_UNITS.len() - 1);
    format!("{:.2} {}", bytes / 1024f64.powi(exp as i32), SIZE_UNITS[exp])
}

/// Bytes per second shown as megabits per second.
pub fn format_speed(bytes_per_second: f64) -> String {
    if bytes_per_second == 0.0 || !bytes_per_second.is_finite() {
        return COMPUTING.to_string();
    }

    let mbps = bytes_per_second * 8.0 / 1024.0 / 1024.0;
    format!("{:.2} Mbps", mbps)
}

pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_eta(seconds: Option<f64>) -> String {
    match seconds {
        None => COMPUTING.to_string(),
        Some(s) if s.is_infinite() => COMPUTING.to_string(),
        Some(s) if s < 60.0 => format!("{}秒", s),
        Some(s) => format!("{}分{}秒", (s / 60.0).floor(), s % 60.0),
    }
}

/// Percentage with one decimal. A missing or zero total reads as `0.0`.
pub fn format_percent(downloaded: Option<f64>, total: Option<f64>) -> String {
    match (downloaded, total) {
        (Some(done), Some(total)) if total > 0.0 => format!("{:.1}", done / total * 100.0),
        _ => "0.0".to_string(),
    }
}
