/// Formats a byte count for the upload tab and `cloudtodo upload` output.
///
/// # Examples
/// ```
/// use cloud_todo::utils::format::format_bytes;
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1572864), "1.5 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

/// Renders `loaded / total` the way the upload tab shows a transfer.
pub fn format_transfer(loaded: u64, total: u64) -> String {
    format!("{} / {}", format_bytes(loaded), format_bytes(total))
}
