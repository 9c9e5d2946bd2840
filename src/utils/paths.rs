use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub fn get_cloud_todo_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".cloud-todo"))
}

pub fn get_config_path() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;
    Ok(dir.join("config.toml"))
}

pub fn get_database_path() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;
    Ok(dir.join("cloud.db"))
}

pub fn get_pid_file_path() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;
    Ok(dir.join("server.pid"))
}

pub fn get_crash_log_path() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;
    Ok(dir.join("crash.log"))
}

pub fn get_logs_dir() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;
    Ok(dir.join("logs"))
}

pub fn ensure_data_dir_exists() -> Result<PathBuf> {
    let dir = get_cloud_todo_dir()?;

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cloud_todo_dir() {
        let dir = get_cloud_todo_dir().unwrap();
        assert!(dir.to_string_lossy().ends_with(".cloud-todo"));
    }

    #[test]
    fn test_get_config_path() {
        let path = get_config_path().unwrap();
        assert!(path.to_string_lossy().contains(".cloud-todo"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_get_database_path() {
        let path = get_database_path().unwrap();
        assert!(path.to_string_lossy().contains(".cloud-todo"));
        assert!(path.to_string_lossy().ends_with("cloud.db"));
    }

    #[test]
    fn test_get_pid_file_path() {
        let path = get_pid_file_path().unwrap();
        assert!(path.to_string_lossy().ends_with("server.pid"));
    }

    #[test]
    fn test_get_logs_dir() {
        let dir = get_logs_dir().unwrap();
        assert!(dir.to_string_lossy().contains(".cloud-todo"));
        assert!(dir.to_string_lossy().ends_with("logs"));
    }
}
